//! Dungeon structure: grid, cells, floor features and level generation

mod cell;
mod engraving;
mod features;
mod generator;
mod level;
pub mod vision;

pub use cell::{Cell, CellType};
pub use engraving::{
    del_engr, engr_at, make_engr_at, read_engr_at, sengr_at, u_wipe_engr, wipe_engr_at,
    Engraving, EngravingKind,
};
pub use features::{GoldPile, Trap, TrapKind};
pub use generator::{LevelGenerator, SimpleGenerator};
pub use level::Level;

use std::fmt;

use crate::consts::{COLNO, ROWNO};
use crate::world::OutOfBounds;

/// A validated grid coordinate.
///
/// The only way to build one is through [`Pos::checked`] (or an offset of an
/// existing position), so every `Pos` is inside the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Pos {
    x: u8,
    y: u8,
}

impl Pos {
    pub fn checked(x: i32, y: i32) -> Result<Pos, OutOfBounds> {
        if (0..COLNO as i32).contains(&x) && (0..ROWNO as i32).contains(&y) {
            Ok(Pos {
                x: x as u8,
                y: y as u8,
            })
        } else {
            Err(OutOfBounds { x, y })
        }
    }

    pub const fn x(self) -> u8 {
        self.x
    }

    pub const fn y(self) -> u8 {
        self.y
    }

    pub fn offset(self, dx: i32, dy: i32) -> Result<Pos, OutOfBounds> {
        Pos::checked(self.x as i32 + dx, self.y as i32 + dy)
    }

    /// Squared euclidean distance (dist in hack)
    pub fn dist2(self, other: Pos) -> i32 {
        let dx = self.x as i32 - other.x as i32;
        let dy = self.y as i32 - other.y as i32;
        dx * dx + dy * dy
    }

    /// True for the eight surrounding squares
    pub fn is_adjacent(self, other: Pos) -> bool {
        self != other && self.dist2(other) <= 2
    }

    /// In-bounds neighbours
    pub fn neighbors(self) -> impl Iterator<Item = Pos> {
        (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .filter_map(move |(dx, dy)| self.offset(dx, dy).ok())
    }

    pub(crate) fn index(self) -> usize {
        self.y as usize * COLNO + self.x as usize
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_bounds() {
        assert!(Pos::checked(0, 0).is_ok());
        assert!(Pos::checked(COLNO as i32 - 1, ROWNO as i32 - 1).is_ok());
        assert_eq!(Pos::checked(-1, 0), Err(OutOfBounds { x: -1, y: 0 }));
        assert!(Pos::checked(COLNO as i32, 0).is_err());
        assert!(Pos::checked(0, ROWNO as i32).is_err());
        assert!(Pos::checked(0, -7).is_err());
    }

    #[test]
    fn test_corner_neighbors() {
        let corner = Pos::checked(0, 0).unwrap();
        assert_eq!(corner.neighbors().count(), 3);
        let mid = Pos::checked(5, 5).unwrap();
        assert_eq!(mid.neighbors().count(), 8);
        assert!(mid.neighbors().all(|p| p.is_adjacent(mid)));
    }

    #[test]
    fn test_offset_rejects_leaving_map() {
        let edge = Pos::checked(COLNO as i32 - 1, 3).unwrap();
        assert!(edge.offset(1, 0).is_err());
        assert_eq!(edge.offset(-1, 1).unwrap(), Pos::checked(COLNO as i32 - 2, 4).unwrap());
    }
}
