//! Entity records and identifiers
//!
//! Every object, monster, gold pile, trap and engraving carries an
//! [`EntityId`] drawn from one process-wide counter. Id 0 is reserved.

mod chain;

pub use chain::{relink, Chain, ChainEntity};

use std::fmt;

use strum::{Display, EnumIter};

use crate::consts::PAYLOAD_MAX;
use crate::dungeon::{Engraving, GoldPile, Pos, Trap};
use crate::monster::Monster;
use crate::object::Object;
use crate::world::Impossible;

/// Stable entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityId(pub u32);

impl EntityId {
    pub const NONE: EntityId = EntityId(0);

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id counter (flags.ident)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Resume from a saved counter value
    pub fn from_counter(next: u32) -> Self {
        Self { next: next.max(1) }
    }

    /// Next id to be handed out
    pub fn peek(&self) -> u32 {
        self.next
    }

    /// Hand out a fresh id (post-increment)
    pub fn fresh(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.wrapping_add(1).max(1);
        id
    }

    /// Make sure future ids are strictly above `id`
    pub fn ensure_above(&mut self, id: EntityId) {
        if id.0 >= self.next {
            self.next = id.0.saturating_add(1);
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Entity kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum EntityKind {
    Object,
    Monster,
    Gold,
    Trap,
    Engraving,
}

/// Any entity record, with its kind-specific payload
#[derive(Debug, Clone)]
pub enum Entity {
    Object(Object),
    Monster(Monster),
    Gold(GoldPile),
    Trap(Trap),
    Engraving(Engraving),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Object(o) => o.id,
            Entity::Monster(m) => m.id,
            Entity::Gold(g) => g.id,
            Entity::Trap(t) => t.id,
            Entity::Engraving(e) => e.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Object(_) => EntityKind::Object,
            Entity::Monster(_) => EntityKind::Monster,
            Entity::Gold(_) => EntityKind::Gold,
            Entity::Trap(_) => EntityKind::Trap,
            Entity::Engraving(_) => EntityKind::Engraving,
        }
    }

    pub fn pos(&self) -> Option<Pos> {
        match self {
            Entity::Object(o) => o.pos,
            Entity::Monster(m) => Some(m.pos),
            Entity::Gold(g) => Some(g.pos),
            Entity::Trap(t) => Some(t.pos),
            Entity::Engraving(e) => Some(e.pos),
        }
    }
}

/// Validate a declared payload length against the allocation limit
pub fn check_payload(len: usize) -> Result<(), Impossible> {
    if len > PAYLOAD_MAX {
        return Err(Impossible::PayloadLength {
            len,
            max: PAYLOAD_MAX,
        }
        .report());
    }
    Ok(())
}

/// Create a zeroed record of `kind` with room for `payload_len` bytes.
///
/// Gold piles and traps carry no payload; a nonzero length for them is an
/// inconsistency.
pub fn create(
    ids: &mut IdAllocator,
    kind: EntityKind,
    payload_len: usize,
) -> Result<Entity, Impossible> {
    check_payload(payload_len)?;
    let payload = || (payload_len > 0).then(|| String::with_capacity(payload_len));
    let entity = match kind {
        EntityKind::Object => {
            let mut obj = Object::blank(ids.fresh());
            obj.name = payload();
            Entity::Object(obj)
        }
        EntityKind::Monster => {
            let mut mon = Monster::blank(ids.fresh());
            mon.name = payload();
            Entity::Monster(mon)
        }
        EntityKind::Engraving => {
            let mut engr = Engraving::blank(ids.fresh());
            engr.text.reserve(payload_len);
            Entity::Engraving(engr)
        }
        EntityKind::Gold | EntityKind::Trap if payload_len > 0 => {
            return Err(Impossible::Inconsistent {
                what: format!("{kind} records carry no payload ({payload_len} bytes requested)"),
            }
            .report());
        }
        EntityKind::Gold => Entity::Gold(GoldPile::blank(ids.fresh())),
        EntityKind::Trap => Entity::Trap(Trap::blank(ids.fresh())),
    };
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_ids_are_never_zero_and_increase() {
        let mut ids = IdAllocator::new();
        let a = ids.fresh();
        let b = ids.fresh();
        assert!(!a.is_none());
        assert!(b > a);
    }

    #[test]
    fn test_ensure_above() {
        let mut ids = IdAllocator::new();
        ids.ensure_above(EntityId(41));
        assert_eq!(ids.fresh(), EntityId(42));
        ids.ensure_above(EntityId(3));
        assert_eq!(ids.fresh(), EntityId(43));
    }

    #[test]
    fn test_create_assigns_distinct_ids() {
        let mut ids = IdAllocator::new();
        let mut seen = Vec::new();
        for kind in EntityKind::iter() {
            let entity = create(&mut ids, kind, 0).unwrap();
            assert_eq!(entity.kind(), kind);
            assert!(!seen.contains(&entity.id()));
            seen.push(entity.id());
        }
    }

    #[test]
    fn test_create_rejects_oversized_payload() {
        let mut ids = IdAllocator::new();
        let err = create(&mut ids, EntityKind::Object, PAYLOAD_MAX + 1).unwrap_err();
        assert!(matches!(err, Impossible::PayloadLength { .. }));
        assert_eq!(ids.peek(), 1);
    }

    #[test]
    fn test_create_rejects_payload_on_gold() {
        let mut ids = IdAllocator::new();
        assert!(create(&mut ids, EntityKind::Gold, 4).is_err());
    }
}
