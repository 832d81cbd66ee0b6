//! Objects: classes, the static object table and object instances

mod discoveries;
mod obj;
mod table;

pub use discoveries::Discoveries;
pub use obj::{ObjFlags, Object, WornMask};
pub use table::{def, otyp_by_name, ObjectDef, OBJECTS};

use strum::{Display, EnumIter, IntoEnumIterator};

/// Object class, keyed by its display symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
#[repr(u8)]
pub enum ObjectClass {
    #[default]
    Weapon = b')',
    Armor = b'[',
    Potion = b'!',
    Scroll = b'?',
    Wand = b'/',
    Ring = b'=',
    Food = b'%',
    Tool = b'(',
    Gem = b'*',
    Rock = b'`',
    Ball = b'0',
    Chain = b'_',
    Amulet = b'"',
}

impl ObjectClass {
    pub const fn symbol(&self) -> char {
        *self as u8 as char
    }

    pub fn from_symbol(sym: u8) -> Option<ObjectClass> {
        ObjectClass::iter().find(|c| *c as u8 == sym)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_roundtrip() {
        for class in ObjectClass::iter() {
            assert_eq!(ObjectClass::from_symbol(class.symbol() as u8), Some(class));
        }
        assert_eq!(ObjectClass::from_symbol(b'x'), None);
    }
}
