//! Map cell types (rm.h)

use strum::{Display, EnumIter, IntoEnumIterator};

/// Cell/terrain type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
#[repr(u8)]
pub enum CellType {
    #[default]
    Stone = 0,
    HWall = 1,
    VWall = 2,
    SecretDoor = 3,
    SecretCorridor = 4,
    Pool = 6,
    Door = 7,
    Corridor = 8,
    Room = 9,
}

impl CellType {
    pub fn from_u8(value: u8) -> Option<CellType> {
        CellType::iter().find(|t| *t as u8 == value)
    }

    /// IS_ROCK: anything below a pool blocks movement
    pub const fn is_rock(&self) -> bool {
        (*self as u8) < (CellType::Pool as u8)
    }

    pub const fn is_wall(&self) -> bool {
        matches!(self, CellType::HWall | CellType::VWall)
    }

    pub const fn is_room(&self) -> bool {
        matches!(self, CellType::Room)
    }

    pub const fn is_corridor(&self) -> bool {
        matches!(self, CellType::Corridor)
    }

    pub const fn is_pool(&self) -> bool {
        matches!(self, CellType::Pool)
    }

    /// ACCESSIBLE: can be walked onto
    pub const fn is_accessible(&self) -> bool {
        (*self as u8) >= (CellType::Door as u8)
    }

    /// Symbol shown once the cell has been seen
    pub const fn symbol(&self) -> char {
        match self {
            CellType::Stone | CellType::SecretCorridor => ' ',
            CellType::HWall => '-',
            CellType::VWall | CellType::SecretDoor => '|',
            CellType::Pool => '}',
            CellType::Door => '+',
            CellType::Corridor => '#',
            CellType::Room => '.',
        }
    }
}

/// A single map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub typ: CellType,
    pub seen: bool,
    pub lit: bool,
    /// Last symbol drawn here
    pub scrsym: char,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            typ: CellType::Stone,
            seen: false,
            lit: false,
            scrsym: ' ',
        }
    }
}
