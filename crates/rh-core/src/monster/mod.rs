//! Monsters: species table, monster instances, long worms and movement

mod ai;
mod species;
mod worm;

pub use ai::{movemon, MonsterAi, Wanderer};
pub use species::{species_by_name, Species, SpeciesId, MONSTERS};
pub use worm::{cutworm, worm_at, worm_move, worm_nomove, WormTail};

use bitflags::bitflags;

use crate::dungeon::Pos;
use crate::entity::{Chain, ChainEntity, EntityId};
use crate::object::Object;
use crate::rng::GameRng;

bitflags! {
    /// Monster status bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MonsterFlags: u8 {
        const SLEEPING = 0x01;
        const TAME = 0x02;
        const PEACEFUL = 0x04;
        /// Hiding under an object
        const HIDDEN = 0x08;
        /// Looks invisible to the player
        const INVIS = 0x10;
        const FLEEING = 0x20;
    }
}

/// A monster on a level (or in transit between levels)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monster {
    pub id: EntityId,
    pub species: SpeciesId,
    pub pos: Pos,
    pub hp: i32,
    pub hpmax: i32,
    pub flags: MonsterFlags,
    /// Name given by the player
    pub name: Option<String>,
    pub inventory: Chain<Object>,
    /// Tail segments, for long worms
    pub worm: Option<WormTail>,
}

impl Monster {
    /// Create a monster with rolled hit points
    pub fn new(id: EntityId, species: SpeciesId, pos: Pos, rng: &mut GameRng) -> Self {
        let level = species.data().level as u32;
        let hp = if level == 0 {
            rng.rnd(4)
        } else {
            rng.d(level, 8)
        } as i32;
        let mut mon = Self::blank(id);
        mon.species = species;
        mon.pos = pos;
        mon.hp = hp;
        mon.hpmax = hp;
        if species == SpeciesId::LONG_WORM {
            mon.worm = Some(WormTail::new());
        }
        mon
    }

    pub(crate) fn blank(id: EntityId) -> Self {
        Self {
            id,
            species: SpeciesId::default(),
            pos: Pos::default(),
            hp: 0,
            hpmax: 0,
            flags: MonsterFlags::empty(),
            name: None,
            inventory: Chain::new("minvent"),
            worm: None,
        }
    }

    pub fn data(&self) -> &'static Species {
        self.species.data()
    }

    pub fn is_tame(&self) -> bool {
        self.flags.contains(MonsterFlags::TAME)
    }

    pub fn is_hostile(&self) -> bool {
        !self.flags.intersects(MonsterFlags::TAME | MonsterFlags::PEACEFUL)
    }

    pub fn is_asleep(&self) -> bool {
        self.flags.contains(MonsterFlags::SLEEPING)
    }

    /// "the jackal" / "Fido"
    pub fn monnam(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("the {}", self.data().name),
        }
    }
}

impl ChainEntity for Monster {
    fn id(&self) -> EntityId {
        self.id
    }

    fn pos(&self) -> Option<Pos> {
        Some(self.pos)
    }
}
