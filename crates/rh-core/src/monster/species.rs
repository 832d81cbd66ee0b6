//! Static monster table (monst.c)
//!
//! Monsters point at their species by index. The table is shared and never
//! copied into an instance.

/// Read-only species description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Species {
    pub name: &'static str,
    pub symbol: char,
    pub level: u8,
    pub speed: u8,
    pub ac: i8,
    /// Holds on to whoever it touches
    pub sticky: bool,
}

const fn mon(name: &'static str, symbol: char, level: u8, speed: u8, ac: i8) -> Species {
    Species {
        name,
        symbol,
        level,
        speed,
        ac,
        sticky: false,
    }
}

pub static MONSTERS: &[Species] = &[
    mon("little dog", 'd', 2, 18, 6),
    mon("jackal", 'd', 0, 12, 7),
    mon("newt", ':', 0, 6, 8),
    mon("giant rat", 'r', 0, 10, 7),
    mon("kobold", 'k', 1, 6, 7),
    mon("gnome", 'G', 1, 8, 5),
    Species {
        sticky: true,
        ..mon("lichen", 'F', 0, 1, 9)
    },
    mon("giant bat", 'B', 2, 22, 7),
    mon("homunculus", 'i', 2, 12, 6),
    mon("acid blob", 'b', 1, 3, 8),
    mon("floating eye", 'e', 2, 1, 9),
    mon("hill orc", 'o', 4, 9, 10),
    mon("cockatrice", 'c', 4, 6, 6),
    mon("soldier ant", 'a', 6, 18, 3),
    mon("long worm", 'w', 8, 3, 5),
    mon("troll", 'T', 7, 12, 4),
    mon("xorn", 'X', 8, 9, -2),
    mon("dragon", 'D', 10, 9, -1),
];

/// Index into [`MONSTERS`]. Only valid indices can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpeciesId(u16);

impl SpeciesId {
    pub const LITTLE_DOG: SpeciesId = SpeciesId(0);
    pub const LICHEN: SpeciesId = SpeciesId(6);
    pub const LONG_WORM: SpeciesId = SpeciesId(14);

    pub fn new(index: u16) -> Option<SpeciesId> {
        ((index as usize) < MONSTERS.len()).then_some(SpeciesId(index))
    }

    pub const fn index(self) -> u16 {
        self.0
    }

    pub fn data(self) -> &'static Species {
        &MONSTERS[self.0 as usize]
    }

    /// All species, in table order
    pub fn all() -> impl Iterator<Item = SpeciesId> {
        (0..MONSTERS.len() as u16).map(SpeciesId)
    }
}

pub fn species_by_name(name: &str) -> Option<SpeciesId> {
    SpeciesId::all().find(|s| s.data().name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_constants_match_table() {
        assert_eq!(SpeciesId::LITTLE_DOG.data().name, "little dog");
        assert_eq!(SpeciesId::LICHEN.data().name, "lichen");
        assert!(SpeciesId::LICHEN.data().sticky);
        assert_eq!(SpeciesId::LONG_WORM.data().name, "long worm");
    }

    #[test]
    fn test_new_validates_index() {
        assert!(SpeciesId::new(0).is_some());
        assert!(SpeciesId::new(MONSTERS.len() as u16).is_none());
    }
}
