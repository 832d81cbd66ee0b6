//! Level structure: the grid plus the chains that populate it

use super::{Cell, CellType, Engraving, GoldPile, Pos, Trap};
use crate::consts::{COLNO, ROWNO};
use crate::entity::{Chain, EntityId};
use crate::monster::Monster;
use crate::object::Object;
use crate::rng::GameRng;
use crate::world::OutOfBounds;

/// One dungeon level
#[derive(Debug, Clone)]
pub struct Level {
    pub dlevel: u8,
    grid: Vec<Cell>,
    pub upstair: Option<Pos>,
    pub downstair: Option<Pos>,
    pub monsters: Chain<Monster>,
    pub objects: Chain<Object>,
    pub gold: Chain<GoldPile>,
    pub traps: Chain<Trap>,
    pub engravings: Chain<Engraving>,
}

impl Level {
    /// An all-stone level with empty chains
    pub fn new(dlevel: u8) -> Self {
        Self {
            dlevel,
            grid: vec![Cell::default(); COLNO * ROWNO],
            upstair: None,
            downstair: None,
            monsters: Chain::new("monsters"),
            objects: Chain::new("objects"),
            gold: Chain::new("gold"),
            traps: Chain::new("traps"),
            engravings: Chain::new("engravings"),
        }
    }

    pub fn cell(&self, pos: Pos) -> &Cell {
        &self.grid[pos.index()]
    }

    pub fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        &mut self.grid[pos.index()]
    }

    /// Raw-coordinate access, validated before touching the grid
    pub fn cell_at(&self, x: i32, y: i32) -> Result<&Cell, OutOfBounds> {
        Pos::checked(x, y).map(|pos| self.cell(pos))
    }

    pub fn set_type(&mut self, pos: Pos, typ: CellType) {
        self.cell_mut(pos).typ = typ;
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (Pos, &Cell)> {
        (0..ROWNO as i32)
            .flat_map(|y| (0..COLNO as i32).map(move |x| (x, y)))
            .filter_map(|(x, y)| Pos::checked(x, y).ok())
            .map(|pos| (pos, self.cell(pos)))
    }

    pub fn is_accessible(&self, pos: Pos) -> bool {
        self.cell(pos).typ.is_accessible()
    }

    /// Monster whose head is at `pos`
    pub fn monster_at(&self, pos: Pos) -> Option<&Monster> {
        self.monsters.at(pos)
    }

    /// Monster occupying `pos` with its head or a tail segment
    pub fn occupant(&self, pos: Pos) -> Option<EntityId> {
        self.monsters
            .iter()
            .find(|m| m.pos == pos || m.worm.as_ref().is_some_and(|w| w.contains(pos)))
            .map(|m| m.id)
    }

    pub fn object_at(&self, pos: Pos) -> Option<&Object> {
        self.objects.at(pos)
    }

    pub fn gold_at(&self, pos: Pos) -> Option<&GoldPile> {
        self.gold.at(pos)
    }

    pub fn trap_at(&self, pos: Pos) -> Option<&Trap> {
        self.traps.at(pos)
    }

    /// Accessible room squares, row-major
    pub fn room_positions(&self) -> Vec<Pos> {
        self.cells()
            .filter(|(_, cell)| cell.typ.is_room())
            .map(|(pos, _)| pos)
            .collect()
    }

    /// A random room square with no monster on it
    pub fn random_free_room_pos(&self, rng: &mut GameRng) -> Option<Pos> {
        let free: Vec<Pos> = self
            .room_positions()
            .into_iter()
            .filter(|&pos| self.occupant(pos).is_none())
            .collect();
        rng.choose(&free).copied()
    }

    /// Total records over all chains of this level, including monster inventories
    pub fn entity_count(&self) -> usize {
        self.monsters.len()
            + self.monsters.iter().map(|m| m.inventory.len()).sum::<usize>()
            + self.objects.len()
            + self.gold.len()
            + self.traps.len()
            + self.engravings.len()
    }

    /// Forget what was seen (used when arriving on a freshly generated level)
    pub fn clear_memory(&mut self) {
        for cell in &mut self.grid {
            cell.seen = false;
            cell.scrsym = ' ';
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_level_is_stone() {
        let level = Level::new(1);
        assert_eq!(level.cells().count(), COLNO * ROWNO);
        assert!(level.cells().all(|(_, c)| c.typ == CellType::Stone));
        assert_eq!(level.entity_count(), 0);
    }

    #[test]
    fn test_cell_at_rejects_out_of_range() {
        let level = Level::new(1);
        assert!(level.cell_at(3, 3).is_ok());
        assert_eq!(
            level.cell_at(COLNO as i32, 3).unwrap_err(),
            OutOfBounds { x: COLNO as i32, y: 3 }
        );
        assert!(level.cell_at(3, -1).is_err());
        assert!(level.cell_at(3, ROWNO as i32).is_err());
    }

    #[test]
    fn test_set_type_and_room_positions() {
        let mut level = Level::new(2);
        let a = Pos::checked(10, 5).unwrap();
        let b = Pos::checked(11, 5).unwrap();
        level.set_type(a, CellType::Room);
        level.set_type(b, CellType::Corridor);
        assert_eq!(level.room_positions(), vec![a]);
        assert!(level.is_accessible(b));
    }
}
