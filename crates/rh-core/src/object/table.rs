//! Static object table (objects.h)
//!
//! Entries are referenced by index (`otyp`). Save files store the index,
//! never a pointer into this table.

use super::ObjectClass;

/// Read-only description of one object type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectDef {
    pub name: &'static str,
    pub class: ObjectClass,
    pub weight: u16,
    /// Worth in zorkmids (gems)
    pub value: u16,
    /// Nutrition (food)
    pub nutrition: u16,
}

const fn obj(
    name: &'static str,
    class: ObjectClass,
    weight: u16,
    value: u16,
    nutrition: u16,
) -> ObjectDef {
    ObjectDef {
        name,
        class,
        weight,
        value,
        nutrition,
    }
}

const STRANGE_OBJECT: ObjectDef = obj("strange object", ObjectClass::Rock, 0, 0, 0);

pub static OBJECTS: &[ObjectDef] = &[
    obj("arrow", ObjectClass::Weapon, 0, 0, 0),
    obj("dagger", ObjectClass::Weapon, 3, 0, 0),
    obj("mace", ObjectClass::Weapon, 3, 0, 0),
    obj("axe", ObjectClass::Weapon, 3, 0, 0),
    obj("long sword", ObjectClass::Weapon, 3, 0, 0),
    obj("two handed sword", ObjectClass::Weapon, 4, 0, 0),
    obj("bow", ObjectClass::Weapon, 3, 0, 0),
    obj("leather armor", ObjectClass::Armor, 8, 0, 0),
    obj("ring mail", ObjectClass::Armor, 9, 0, 0),
    obj("plate mail", ObjectClass::Armor, 15, 0, 0),
    obj("helmet", ObjectClass::Armor, 1, 0, 0),
    obj("food ration", ObjectClass::Food, 4, 0, 800),
    obj("tripe ration", ObjectClass::Food, 2, 0, 200),
    obj("fortune cookie", ObjectClass::Food, 1, 0, 40),
    obj("apple", ObjectClass::Food, 1, 0, 50),
    obj("tin", ObjectClass::Food, 1, 0, 0),
    obj("dead lizard", ObjectClass::Food, 1, 0, 40),
    obj("dead jackal", ObjectClass::Food, 3, 0, 250),
    obj("potion of healing", ObjectClass::Potion, 2, 0, 0),
    obj("potion of confusion", ObjectClass::Potion, 2, 0, 0),
    obj("potion of blindness", ObjectClass::Potion, 2, 0, 0),
    obj("potion of speed", ObjectClass::Potion, 2, 0, 0),
    obj("potion of levitation", ObjectClass::Potion, 2, 0, 0),
    obj("potion of invisibility", ObjectClass::Potion, 2, 0, 0),
    obj("scroll of identify", ObjectClass::Scroll, 3, 0, 0),
    obj("scroll of light", ObjectClass::Scroll, 3, 0, 0),
    obj("wand of digging", ObjectClass::Wand, 3, 0, 0),
    obj("ring of levitation", ObjectClass::Ring, 1, 0, 0),
    obj("ring of see invisible", ObjectClass::Ring, 1, 0, 0),
    obj("ring of regeneration", ObjectClass::Ring, 1, 0, 0),
    obj("ring of searching", ObjectClass::Ring, 1, 0, 0),
    obj("diamond", ObjectClass::Gem, 1, 4000, 0),
    obj("worthless piece of glass", ObjectClass::Gem, 1, 0, 0),
    obj("boulder", ObjectClass::Rock, 200, 0, 0),
    obj("heavy iron ball", ObjectClass::Ball, 200, 0, 0),
    obj("iron chain", ObjectClass::Chain, 200, 0, 0),
    obj("Amulet of Yendor", ObjectClass::Amulet, 2, 0, 0),
];

/// Look up an object type, falling back to a harmless placeholder
pub fn def(otyp: u16) -> &'static ObjectDef {
    OBJECTS.get(otyp as usize).unwrap_or(&STRANGE_OBJECT)
}

pub fn otyp_by_name(name: &str) -> Option<u16> {
    OBJECTS.iter().position(|d| d.name == name).map(|i| i as u16)
}
