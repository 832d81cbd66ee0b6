//! Engravings (engrave.c)
//!
//! At most one engraving per cell. Walking, fighting and time erode the text
//! one character at a time until nothing is left, at which point the record
//! is deleted.

use strum::{Display, EnumIter, IntoEnumIterator};

use super::{Level, Pos};
use crate::entity::{check_payload, ChainEntity, EntityId, IdAllocator};
use crate::rng::GameRng;
use crate::world::{Impossible, Interface, WorldState};

/// How the text was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
#[repr(u8)]
pub enum EngravingKind {
    #[default]
    Dust = 1,
    Engrave = 2,
    Burn = 3,
}

impl EngravingKind {
    pub fn from_u8(value: u8) -> Option<EngravingKind> {
        EngravingKind::iter().find(|k| *k as u8 == value)
    }
}

/// Text engraved on one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engraving {
    pub id: EntityId,
    pub pos: Pos,
    pub kind: EngravingKind,
    /// Move on which the engraving is (or will be) finished
    pub time: u64,
    pub text: String,
}

impl Engraving {
    pub(crate) fn blank(id: EntityId) -> Self {
        Self {
            id,
            pos: Pos::default(),
            kind: EngravingKind::Dust,
            time: 0,
            text: String::new(),
        }
    }
}

impl ChainEntity for Engraving {
    fn id(&self) -> EntityId {
        self.id
    }

    fn pos(&self) -> Option<Pos> {
        Some(self.pos)
    }
}

pub fn engr_at(level: &Level, pos: Pos) -> Option<&Engraving> {
    level.engravings.at(pos)
}

/// Does a finished engraving at `pos` contain `needle`?
pub fn sengr_at(level: &Level, needle: &str, pos: Pos, moves: u64) -> bool {
    engr_at(level, pos).is_some_and(|e| e.time <= moves && e.text.contains(needle))
}

/// Write `text` in the dust at `pos`, replacing whatever was there
pub fn make_engr_at(
    level: &mut Level,
    ids: &mut IdAllocator,
    pos: Pos,
    text: &str,
) -> Result<EntityId, Impossible> {
    check_payload(text.len())?;
    if let Some(old) = engr_at(level, pos).map(|e| e.id) {
        del_engr(level, old)?;
    }
    let id = ids.fresh();
    level.engravings.push_front(Engraving {
        id,
        pos,
        kind: EngravingKind::Dust,
        time: 0,
        text: text.to_string(),
    })?;
    Ok(id)
}

pub fn del_engr(level: &mut Level, id: EntityId) -> Result<Engraving, Impossible> {
    level.engravings.unlink(id)
}

/// Erode the engraving at `pos` by up to `cnt` characters
pub fn wipe_engr_at(
    level: &mut Level,
    rng: &mut GameRng,
    pos: Pos,
    cnt: u32,
    levitating: bool,
) -> Result<(), Impossible> {
    let Some(engr) = level.engravings.at_mut(pos) else {
        return Ok(());
    };
    let mut cnt = cnt;
    if engr.kind != EngravingKind::Dust || levitating {
        cnt = if rng.rn2(1 + 50 / (cnt + 1)) != 0 { 0 } else { 1 };
    }

    let mut chars: Vec<char> = engr.text.chars().collect();
    if !chars.is_empty() {
        for _ in 0..cnt {
            let at = rng.rn2(chars.len() as u32) as usize;
            chars[at] = match chars[at] {
                ' ' => continue,
                '?' => ' ',
                _ => '?',
            };
        }
    }
    engr.text = chars.into_iter().collect::<String>().trim_matches(' ').to_string();

    if engr.text.is_empty() {
        let id = engr.id;
        del_engr(level, id)?;
    }
    Ok(())
}

/// Wipe under the player, unless they cannot reach the floor
pub fn u_wipe_engr(world: &mut WorldState, cnt: u32) -> Result<(), Impossible> {
    if world.you.uswallow || world.you.levitating() {
        return Ok(());
    }
    let pos = world.you.pos;
    wipe_engr_at(&mut world.level, &mut world.rng, pos, cnt, false)
}

pub fn read_engr_at(level: &Level, pos: Pos, ui: &mut dyn Interface) {
    let Some(engr) = engr_at(level, pos) else {
        return;
    };
    if engr.text.is_empty() {
        return;
    }
    ui.pline(match engr.kind {
        EngravingKind::Dust => "Something is written here in the dust.",
        EngravingKind::Engrave => "Something is engraved here on the floor.",
        EngravingKind::Burn => "Some text has been burned here in the floor.",
    });
    ui.pline(&format!("You read: \"{}\".", engr.text));
}
