//! Gold piles and traps (def.gold.h, def.trap.h)

use strum::{Display, EnumIter, IntoEnumIterator};

use super::Pos;
use crate::entity::{ChainEntity, EntityId};

/// A pile of gold lying on the floor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldPile {
    pub id: EntityId,
    pub pos: Pos,
    pub amount: i64,
}

impl GoldPile {
    pub fn new(id: EntityId, pos: Pos, amount: i64) -> Self {
        Self { id, pos, amount }
    }

    pub(crate) fn blank(id: EntityId) -> Self {
        Self::new(id, Pos::default(), 0)
    }
}

impl ChainEntity for GoldPile {
    fn id(&self) -> EntityId {
        self.id
    }

    fn pos(&self) -> Option<Pos> {
        Some(self.pos)
    }
}

/// Trap types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
#[repr(u8)]
pub enum TrapKind {
    #[default]
    #[strum(serialize = "bear trap")]
    BearTrap = 0,
    #[strum(serialize = "arrow trap")]
    ArrowTrap = 1,
    #[strum(serialize = "dart trap")]
    DartTrap = 2,
    #[strum(serialize = "trapdoor")]
    TrapDoor = 3,
    #[strum(serialize = "teleportation trap")]
    TeleportTrap = 4,
    #[strum(serialize = "pit")]
    Pit = 5,
    #[strum(serialize = "sleeping gas trap")]
    SleepingGasTrap = 6,
}

impl TrapKind {
    pub fn from_u8(value: u8) -> Option<TrapKind> {
        TrapKind::iter().find(|t| *t as u8 == value)
    }
}

/// A trap on the level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trap {
    pub id: EntityId,
    pub pos: Pos,
    pub kind: TrapKind,
    /// The player knows it is there
    pub seen: bool,
}

impl Trap {
    pub fn new(id: EntityId, pos: Pos, kind: TrapKind) -> Self {
        Self {
            id,
            pos,
            kind,
            seen: false,
        }
    }

    pub(crate) fn blank(id: EntityId) -> Self {
        Self::new(id, Pos::default(), TrapKind::default())
    }
}

impl ChainEntity for Trap {
    fn id(&self) -> EntityId {
        self.id
    }

    fn pos(&self) -> Option<Pos> {
        Some(self.pos)
    }
}
