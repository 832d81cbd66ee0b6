//! What the player can see (see.c)
//!
//! Lit rooms are seen whole on entry; anywhere else only the adjacent
//! squares are. Each seen cell remembers the symbol last drawn there.

use super::{Level, Pos};
use crate::consts::{COLNO, GOLD_SYM, ROWNO, STAIRS_DOWN_SYM, STAIRS_UP_SYM, TRAP_SYM, WORM_TAIL_SYM};
use crate::monster::{worm_at, MonsterFlags};
use crate::world::WorldState;

/// Recompute which cells are in view and refresh their remembered symbols
pub fn setsee(world: &mut WorldState) {
    if world.you.blind() {
        return;
    }
    let visible = visible_from(&world.level, world.you.pos);
    for pos in visible {
        newsym(&mut world.level, pos);
    }
}

/// Cells visible from `from` with normal sight
pub fn visible_from(level: &Level, from: Pos) -> Vec<Pos> {
    let mut marked = vec![false; COLNO * ROWNO];
    let mut visible = Vec::new();
    let mut mark = |pos: Pos, visible: &mut Vec<Pos>| {
        if !marked[pos.index()] {
            marked[pos.index()] = true;
            visible.push(pos);
        }
    };

    mark(from, &mut visible);
    for pos in from.neighbors() {
        mark(pos, &mut visible);
    }

    let start = level.cell(from);
    if !(start.lit && start.typ.is_room()) {
        return visible;
    }

    // flood the lit room, picking up its walls and doors on the way
    let mut flooded = vec![false; COLNO * ROWNO];
    let mut stack = vec![from];
    flooded[from.index()] = true;
    while let Some(pos) = stack.pop() {
        for next in pos.neighbors() {
            mark(next, &mut visible);
            let cell = level.cell(next);
            if cell.lit && cell.typ.is_room() && !flooded[next.index()] {
                flooded[next.index()] = true;
                stack.push(next);
            }
        }
    }
    visible
}

/// Mark `pos` seen and remember what is drawn there
pub fn newsym(level: &mut Level, pos: Pos) {
    let sym = symbol_at(level, pos);
    let cell = level.cell_mut(pos);
    cell.seen = true;
    cell.scrsym = sym;
}

/// The symbol for `pos`, topmost thing first
pub fn symbol_at(level: &Level, pos: Pos) -> char {
    if let Some(mon) = level.monster_at(pos) {
        if !mon.flags.intersects(MonsterFlags::INVIS | MonsterFlags::HIDDEN) {
            return mon.data().symbol;
        }
    }
    if worm_at(level, pos).is_some() {
        return WORM_TAIL_SYM;
    }
    if let Some(obj) = level.object_at(pos) {
        return obj.class.symbol();
    }
    if level.gold_at(pos).is_some() {
        return GOLD_SYM;
    }
    if level.trap_at(pos).is_some_and(|t| t.seen) {
        return TRAP_SYM;
    }
    if level.upstair == Some(pos) {
        return STAIRS_UP_SYM;
    }
    if level.downstair == Some(pos) {
        return STAIRS_DOWN_SYM;
    }
    level.cell(pos).typ.symbol()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::CellType;

    fn at(x: i32, y: i32) -> Pos {
        Pos::checked(x, y).unwrap()
    }

    fn lit_room(level: &mut Level) {
        for y in 2..=6 {
            for x in 2..=10 {
                let wall = y == 2 || y == 6;
                let side = x == 2 || x == 10;
                let typ = match (wall, side) {
                    (true, _) => CellType::HWall,
                    (false, true) => CellType::VWall,
                    _ => CellType::Room,
                };
                level.set_type(at(x, y), typ);
                level.cell_mut(at(x, y)).lit = typ == CellType::Room;
            }
        }
    }

    #[test]
    fn test_lit_room_seen_whole() {
        let mut level = Level::new(1);
        lit_room(&mut level);
        let seen = visible_from(&level, at(4, 4));
        assert!(seen.contains(&at(9, 5)));
        assert!(seen.contains(&at(10, 6)));
        assert!(!seen.contains(&at(12, 4)));
    }

    #[test]
    fn test_dark_square_sees_neighbours_only() {
        let mut level = Level::new(1);
        level.set_type(at(30, 10), CellType::Corridor);
        let seen = visible_from(&level, at(30, 10));
        assert_eq!(seen.len(), 9);
    }

    #[test]
    fn test_symbol_priority() {
        let mut level = Level::new(1);
        lit_room(&mut level);
        let pos = at(5, 4);
        assert_eq!(symbol_at(&level, pos), '.');
        level.upstair = Some(pos);
        assert_eq!(symbol_at(&level, pos), STAIRS_UP_SYM);
        level
            .gold
            .push_back(crate::dungeon::GoldPile::new(crate::EntityId(1), pos, 5))
            .unwrap();
        assert_eq!(symbol_at(&level, pos), GOLD_SYM);
        newsym(&mut level, pos);
        assert!(level.cell(pos).seen);
        assert_eq!(level.cell(pos).scrsym, GOLD_SYM);
    }
}
