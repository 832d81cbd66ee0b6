//! Long worm tails (worm.c)
//!
//! The tail is a growable list of segment positions, oldest first. The head
//! is the monster itself and is not stored here.

use std::collections::VecDeque;

use super::Monster;
use crate::dungeon::{Level, Pos};
use crate::entity::{EntityId, IdAllocator};
use crate::rng::GameRng;
use crate::world::{Impossible, Interface};

/// Segments trailing a long worm
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WormTail {
    segments: VecDeque<Pos>,
    /// Move on which the worm next grows; 0 until the first move
    pub growtime: u64,
}

impl WormTail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(segments: Vec<Pos>, growtime: u64) -> Self {
        Self {
            segments: segments.into(),
            growtime,
        }
    }

    /// Segments from the tip of the tail up to the neck
    pub fn segments(&self) -> impl Iterator<Item = Pos> + '_ {
        self.segments.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.segments.contains(&pos)
    }
}

/// The worm's head moved away from `old_head`: leave a segment behind, then
/// either grow or drop the tip of the tail.
pub fn worm_move(mon: &mut Monster, old_head: Pos, moves: u64, rng: &mut GameRng) {
    let Some(tail) = mon.worm.as_mut() else {
        return;
    };
    tail.segments.push_back(old_head);
    if tail.growtime <= moves {
        if tail.growtime == 0 {
            tail.growtime = moves + rng.rnd(5) as u64;
        } else {
            tail.growtime += 2 + rng.rnd(15) as u64;
        }
        mon.hpmax += 3;
        mon.hp += 3;
        return;
    }
    tail.segments.pop_front();
}

/// The worm stayed put: it shrinks and loses hit points (but not max hp)
pub fn worm_nomove(mon: &mut Monster) {
    let Some(tail) = mon.worm.as_mut() else {
        return;
    };
    if tail.segments.pop_front().is_some() {
        mon.hp = (mon.hp - 3).max(1);
    }
}

/// Worm with a tail segment at `pos`
pub fn worm_at(level: &Level, pos: Pos) -> Option<&Monster> {
    level
        .monsters
        .iter()
        .find(|m| m.worm.as_ref().is_some_and(|w| w.contains(pos)))
}

/// The player hit worm `id` at `at`. A good blow may sever the tail, and
/// sometimes the severed part lives on as a new worm.
pub fn cutworm(
    level: &mut Level,
    ids: &mut IdAllocator,
    rng: &mut GameRng,
    id: EntityId,
    at: Pos,
    good_weapon: bool,
    ui: &mut dyn Interface,
) -> Result<(), Impossible> {
    let Some(mon) = level.monsters.get(id) else {
        return Err(Impossible::NotInChain {
            chain: level.monsters.name(),
            id,
        }
        .report());
    };
    if mon.pos == at || mon.worm.is_none() {
        return Ok(());
    }

    let mut roll = rng.rnd(20);
    if good_weapon {
        roll += 5;
    }
    if roll < 12 {
        return Ok(());
    }

    let species = mon.species;
    let level_of = species.data().level as u32;
    let survivor = rng.rn2(3) == 0;
    let newborn_id = ids.fresh();

    let Some(mon) = level.monsters.get_mut(id) else {
        return Ok(());
    };
    let Some(tail) = mon.worm.as_mut() else {
        return Ok(());
    };

    if tail.segments.front() == Some(&at) {
        tail.segments.pop_front();
        return Ok(());
    }

    let Some(cut) = tail.segments.iter().position(|&p| p == at) else {
        return Err(Impossible::Inconsistent {
            what: format!("cannot find worm segment at {at}"),
        }
        .report());
    };

    // segments[..cut] are severed, segments[cut] is destroyed
    let mut severed: Vec<Pos> = tail.segments.drain(..=cut).collect();
    severed.pop();
    mon.hp = (mon.hp / 2).max(1);

    match severed.pop() {
        Some(new_head) if survivor => {
            let mut half = Monster::blank(newborn_id);
            half.species = species;
            half.pos = new_head;
            half.hp = rng.d(level_of, 8).max(1) as i32;
            half.hpmax = half.hp;
            half.worm = Some(WormTail::from_parts(severed, 0));
            level.monsters.push_front(half)?;
            ui.pline("You cut the worm in half.");
        }
        _ => ui.pline("You cut off part of the worm's tail."),
    }
    Ok(())
}
