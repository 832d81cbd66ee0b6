//! Player properties (prop.h)
//!
//! Each slot packs a timeout counter and its sources into one word, the same
//! layout the save file uses:
//!
//! | bits        | meaning          |
//! |-------------|------------------|
//! | `0o07777`   | timeout counter  |
//! | `0o10000`   | left ring        |
//! | `0o20000`   | right ring       |
//! | `0o40000`   | intrinsic        |
//!
//! A slot may also name an expiry callback from the closed
//! [`TimeoutCallback`] table.

use bitflags::bitflags;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::world::Impossible;

/// Mask of the timeout counter within a property word
pub const TIMEOUT: u32 = 0o7777;

/// Number of property slots
pub const PROP_COUNT: usize = 16;

/// Property slots, in save-file order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[repr(u8)]
pub enum Property {
    Telepat = 0,
    Fast = 1,
    Confusion = 2,
    Invis = 3,
    Glib = 4,
    Punished = 5,
    Sick = 6,
    Blind = 7,
    WoundedLegs = 8,
    Stoned = 9,
    Levitation = 10,
    SeeInvisible = 11,
    Teleportation = 12,
    Regeneration = 13,
    Searching = 14,
    Aggravate = 15,
}

impl Property {
    pub fn from_index(index: usize) -> Result<Property, Impossible> {
        Property::iter()
            .nth(index)
            .ok_or_else(|| Impossible::PropertyIndex(index).report())
    }
}

bitflags! {
    /// Sources of a property (the non-timeout bits of the word)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropFlags: u32 {
        const LEFT_RING = 0o10000;
        const RIGHT_RING = 0o20000;
        const INTRINSIC = 0o40000;
    }
}

impl PropFlags {
    /// Wounded legs reuse the ring bits as left/right leg
    pub const BOTH_SIDES: PropFlags = PropFlags::LEFT_RING.union(PropFlags::RIGHT_RING);
}

/// Closed set of expiry callbacks. Id 0 is reserved for "none".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[repr(u8)]
pub enum TimeoutCallback {
    FloatDown = 1,
}

impl TimeoutCallback {
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Resolve a nonzero id
    pub fn from_id(id: u8) -> Option<TimeoutCallback> {
        TimeoutCallback::iter().find(|cb| cb.id() == id)
    }
}

/// One property slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropSlot {
    pub flags: PropFlags,
    timeout: u16,
    pub callback: Option<TimeoutCallback>,
}

impl PropSlot {
    pub fn timeout(&self) -> u32 {
        self.timeout as u32
    }

    /// Set the counter, saturating at the field width
    pub fn set_timeout(&mut self, turns: u32) {
        self.timeout = turns.min(TIMEOUT) as u16;
    }

    pub fn incr_timeout(&mut self, turns: u32) {
        self.set_timeout(self.timeout().saturating_add(turns));
    }

    pub fn is_active(&self) -> bool {
        self.timeout > 0 || !self.flags.is_empty()
    }

    pub fn clear(&mut self) {
        *self = PropSlot::default();
    }

    /// Count down one turn. True when this tick expired the timeout.
    pub(crate) fn tick(&mut self) -> bool {
        if self.timeout == 0 {
            return false;
        }
        self.timeout -= 1;
        self.timeout == 0
    }

    pub fn to_word(&self) -> u32 {
        self.flags.bits() | self.timeout()
    }

    /// Rebuild from a saved word. The callback travels separately.
    pub fn from_word(word: u32) -> PropSlot {
        PropSlot {
            flags: PropFlags::from_bits_truncate(word),
            timeout: (word & TIMEOUT) as u16,
            callback: None,
        }
    }
}

/// All property slots of the player
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Properties {
    slots: [PropSlot; PROP_COUNT],
}

impl Properties {
    pub fn get(&self, prop: Property) -> &PropSlot {
        &self.slots[prop as usize]
    }

    pub fn get_mut(&mut self, prop: Property) -> &mut PropSlot {
        &mut self.slots[prop as usize]
    }

    pub fn has(&self, prop: Property) -> bool {
        self.get(prop).is_active()
    }

    /// Index-based access; an index past the table is a programming defect
    pub fn slot(&self, index: usize) -> Result<&PropSlot, Impossible> {
        self.slots
            .get(index)
            .ok_or_else(|| Impossible::PropertyIndex(index).report())
    }

    pub fn slot_mut(&mut self, index: usize) -> Result<&mut PropSlot, Impossible> {
        self.slots
            .get_mut(index)
            .ok_or_else(|| Impossible::PropertyIndex(index).report())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, &PropSlot)> {
        Property::iter().zip(self.slots.iter())
    }
}
