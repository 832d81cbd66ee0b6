//! Level generation (mklev.c)
//!
//! [`SimpleGenerator`] digs a handful of lit rooms joined by corridors,
//! places the stairs and scatters monsters, objects, gold and traps.

use strum::IntoEnumIterator;
use tracing::debug;

use super::{CellType, GoldPile, Level, Pos, Trap, TrapKind};
use crate::consts::{COLNO, MAXLEVEL, ROWNO};
use crate::entity::IdAllocator;
use crate::monster::{Monster, MonsterFlags, SpeciesId};
use crate::object::{otyp_by_name, Object, ObjectClass, OBJECTS};
use crate::rng::GameRng;
use crate::world::Impossible;

/// Builds a brand new level the first time it is entered
pub trait LevelGenerator {
    fn generate(
        &mut self,
        dlevel: u8,
        rng: &mut GameRng,
        ids: &mut IdAllocator,
        genocided: &str,
    ) -> Result<Level, Impossible>;
}

/// Rooms and corridors
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleGenerator;

/// Interior of a room; the walls lie one square outside
#[derive(Debug, Clone, Copy)]
struct Room {
    lx: i32,
    ly: i32,
    hx: i32,
    hy: i32,
}

impl Room {
    fn overlaps(&self, other: &Room) -> bool {
        self.lx - 2 <= other.hx + 2
            && other.lx - 2 <= self.hx + 2
            && self.ly - 2 <= other.hy + 2
            && other.ly - 2 <= self.hy + 2
    }

    fn center(&self) -> (i32, i32) {
        ((self.lx + self.hx) / 2, (self.ly + self.hy) / 2)
    }

    fn random_point(&self, rng: &mut GameRng) -> Option<Pos> {
        let x = self.lx + rng.rn2((self.hx - self.lx + 1) as u32) as i32;
        let y = self.ly + rng.rn2((self.hy - self.ly + 1) as u32) as i32;
        Pos::checked(x, y).ok()
    }
}

impl LevelGenerator for SimpleGenerator {
    fn generate(
        &mut self,
        dlevel: u8,
        rng: &mut GameRng,
        ids: &mut IdAllocator,
        genocided: &str,
    ) -> Result<Level, Impossible> {
        let mut level = Level::new(dlevel);
        let rooms = make_rooms(rng);
        if rooms.is_empty() {
            return Err(Impossible::Inconsistent {
                what: format!("could not fit a room on level {dlevel}"),
            }
            .report());
        }
        for room in &rooms {
            carve(&mut level, room);
        }
        for pair in rooms.windows(2) {
            join(&mut level, &pair[0], &pair[1]);
        }

        level.upstair = rooms[0].random_point(rng);
        if dlevel < MAXLEVEL {
            let last = &rooms[rooms.len() - 1];
            let up = level.upstair;
            level.downstair = (0..10).find_map(|_| last.random_point(rng).filter(|&p| Some(p) != up));
        }
        if rng.one_in(8) {
            if let Some(pos) = rooms[rng.rn2(rooms.len() as u32) as usize].random_point(rng) {
                if !is_stairs(&level, pos) {
                    level.set_type(pos, CellType::Pool);
                }
            }
        }

        populate(&mut level, &rooms, dlevel, rng, ids, genocided)?;
        debug!(
            dlevel,
            rooms = rooms.len(),
            entities = level.entity_count(),
            "generated level"
        );
        Ok(level)
    }
}

fn make_rooms(rng: &mut GameRng) -> Vec<Room> {
    let wanted = 2 + rng.rnd(3) as usize;
    let mut rooms: Vec<Room> = Vec::new();
    for _ in 0..wanted * 10 {
        let width = 2 + rng.rnd(10) as i32;
        let height = 1 + rng.rnd(4) as i32;
        let lx = 2 + rng.rn2((COLNO as i32 - width - 4) as u32) as i32;
        let ly = 2 + rng.rn2((ROWNO as i32 - height - 4) as u32) as i32;
        let room = Room {
            lx,
            ly,
            hx: lx + width - 1,
            hy: ly + height - 1,
        };
        if rooms.iter().any(|r| r.overlaps(&room)) {
            continue;
        }
        rooms.push(room);
        if rooms.len() == wanted {
            break;
        }
    }
    // left to right, so consecutive rooms make short corridors
    rooms.sort_by_key(|r| r.lx);
    rooms
}

fn carve(level: &mut Level, room: &Room) {
    for y in room.ly - 1..=room.hy + 1 {
        for x in room.lx - 1..=room.hx + 1 {
            let Ok(pos) = Pos::checked(x, y) else {
                continue;
            };
            let typ = if y == room.ly - 1 || y == room.hy + 1 {
                CellType::HWall
            } else if x == room.lx - 1 || x == room.hx + 1 {
                CellType::VWall
            } else {
                CellType::Room
            };
            let cell = level.cell_mut(pos);
            cell.typ = typ;
            cell.lit = true;
        }
    }
}

/// Dig an L-shaped corridor between two room centres. Walls crossed
/// become doors.
fn join(level: &mut Level, a: &Room, b: &Room) {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    let mut dig = |x: i32, y: i32| {
        let Ok(pos) = Pos::checked(x, y) else {
            return;
        };
        let cell = level.cell_mut(pos);
        match cell.typ {
            CellType::Stone => cell.typ = CellType::Corridor,
            CellType::HWall | CellType::VWall => {
                cell.typ = CellType::Door;
                cell.lit = false;
            }
            _ => {}
        }
    };
    let step_x = if bx >= ax { 1 } else { -1 };
    let mut x = ax;
    while x != bx {
        dig(x, ay);
        x += step_x;
    }
    let step_y = if by >= ay { 1 } else { -1 };
    let mut y = ay;
    while y != by {
        dig(bx, y);
        y += step_y;
    }
    dig(bx, by);
}

fn is_stairs(level: &Level, pos: Pos) -> bool {
    level.upstair == Some(pos) || level.downstair == Some(pos)
}

fn free_spot(level: &Level, rooms: &[Room], rng: &mut GameRng) -> Option<Pos> {
    for _ in 0..20 {
        let room = &rooms[rng.rn2(rooms.len() as u32) as usize];
        if let Some(pos) = room.random_point(rng) {
            if level.cell(pos).typ.is_room() && level.occupant(pos).is_none() {
                return Some(pos);
            }
        }
    }
    None
}

fn populate(
    level: &mut Level,
    rooms: &[Room],
    dlevel: u8,
    rng: &mut GameRng,
    ids: &mut IdAllocator,
    genocided: &str,
) -> Result<(), Impossible> {
    let difficulty = dlevel as u32 / 2 + 2;
    let species: Vec<SpeciesId> = SpeciesId::all()
        .filter(|&s| s != SpeciesId::LITTLE_DOG)
        .filter(|s| s.data().level as u32 <= difficulty)
        .filter(|s| !genocided.contains(s.data().symbol))
        .collect();
    let monsters = 1 + rng.rnd(2 + dlevel as u32 / 3);
    for _ in 0..monsters {
        let (Some(&kind), Some(pos)) = (rng.choose(&species), free_spot(level, rooms, rng)) else {
            continue;
        };
        let mut mon = Monster::new(ids.fresh(), kind, pos, rng);
        if rng.one_in(3) {
            mon.flags.insert(MonsterFlags::SLEEPING);
        }
        level.monsters.push_back(mon)?;
    }

    let amulet = otyp_by_name("Amulet of Yendor");
    let loot: Vec<u16> = (0..OBJECTS.len() as u16)
        .filter(|&otyp| Some(otyp) != amulet)
        .filter(|&otyp| !matches!(OBJECTS[otyp as usize].class, ObjectClass::Ball | ObjectClass::Chain))
        .collect();
    for _ in 0..rng.rnd(4) {
        let (Some(&otyp), Some(pos)) = (rng.choose(&loot), free_spot(level, rooms, rng)) else {
            continue;
        };
        let mut obj = Object::new(ids.fresh(), otyp);
        obj.pos = Some(pos);
        if rng.one_in(10) {
            obj.flags.insert(crate::object::ObjFlags::CURSED);
        }
        level.objects.push_back(obj)?;
    }
    if dlevel == MAXLEVEL {
        if let (Some(otyp), Some(pos)) = (amulet, free_spot(level, rooms, rng)) {
            let mut obj = Object::new(ids.fresh(), otyp);
            obj.pos = Some(pos);
            level.objects.push_back(obj)?;
        }
    }

    for _ in 0..rng.rnd(2) {
        let Some(pos) = free_spot(level, rooms, rng) else {
            continue;
        };
        if level.gold_at(pos).is_some() {
            continue;
        }
        let amount = 1 + rng.rnd(dlevel as u32 + 2) as i64 * rng.rnd(30) as i64;
        level.gold.push_back(GoldPile::new(ids.fresh(), pos, amount))?;
    }

    if dlevel > 1 {
        let kinds: Vec<TrapKind> = TrapKind::iter().collect();
        for _ in 0..rng.rn2(dlevel.min(5) as u32) {
            let (Some(&kind), Some(pos)) = (rng.choose(&kinds), free_spot(level, rooms, rng)) else {
                continue;
            };
            if is_stairs(level, pos) || level.trap_at(pos).is_some() {
                continue;
            }
            level.traps.push_back(Trap::new(ids.fresh(), pos, kind))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(dlevel: u8, seed: u64) -> Level {
        let mut ids = IdAllocator::new();
        SimpleGenerator
            .generate(dlevel, &mut GameRng::new(seed), &mut ids, "")
            .unwrap()
    }

    #[test]
    fn test_stairs_on_room_squares() {
        for seed in 0..20 {
            let level = generate(3, seed);
            let up = level.upstair.unwrap();
            assert!(level.cell(up).typ.is_room());
            if let Some(down) = level.downstair {
                assert!(level.cell(down).typ.is_room());
                assert_ne!(up, down);
            }
        }
    }

    #[test]
    fn test_bottom_level_has_no_downstairs() {
        let level = generate(MAXLEVEL, 4);
        assert_eq!(level.downstair, None);
        let amulet = otyp_by_name("Amulet of Yendor").unwrap();
        assert!(level.objects.iter().any(|o| o.otyp == amulet));
    }

    #[test]
    fn test_entities_have_unique_ids() {
        let level = generate(6, 9);
        level.monsters.check_integrity().unwrap();
        level.objects.check_integrity().unwrap();
        assert!(!level.monsters.is_empty());
        for mon in level.monsters.iter() {
            assert!(level.is_accessible(mon.pos));
        }
    }

    #[test]
    fn test_genocided_species_absent() {
        let all: String = SpeciesId::all().map(|s| s.data().symbol).collect();
        let mut ids = IdAllocator::new();
        let level = SimpleGenerator
            .generate(6, &mut GameRng::new(2), &mut ids, &all)
            .unwrap();
        assert!(level.monsters.is_empty());
    }
}
