//! Object instances (obj.h)

use bitflags::bitflags;

use super::{def, ObjectClass, ObjectDef};
use crate::dungeon::Pos;
use crate::entity::{ChainEntity, EntityId};

bitflags! {
    /// Knowledge and curse state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ObjFlags: u8 {
        const CURSED = 0x01;
        /// Enchantment known
        const KNOWN = 0x02;
        /// Appearance seen up close
        const DKNOWN = 0x04;
        const UNPAID = 0x08;
    }
}

bitflags! {
    /// Where the object is worn or wielded (owornmask)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WornMask: u16 {
        const ARMOR = 0x0001;
        const HELMET = 0x0002;
        const WEAPON = 0x0004;
        const LEFT_RING = 0x0008;
        const RIGHT_RING = 0x0010;
        const AMULET = 0x0020;
    }
}

/// Object instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub id: EntityId,
    /// Index into [`super::OBJECTS`]
    pub otyp: u16,
    pub class: ObjectClass,
    /// Floor position; `None` in inventories and containers
    pub pos: Option<Pos>,
    pub quantity: u32,
    /// Enchantment / charges
    pub spe: i8,
    pub flags: ObjFlags,
    pub worn: WornMask,
    /// Name given by the player
    pub name: Option<String>,
}

impl Object {
    pub fn new(id: EntityId, otyp: u16) -> Self {
        Self {
            id,
            otyp,
            class: def(otyp).class,
            pos: None,
            quantity: 1,
            spe: 0,
            flags: ObjFlags::empty(),
            worn: WornMask::empty(),
            name: None,
        }
    }

    pub(crate) fn blank(id: EntityId) -> Self {
        let mut obj = Self::new(id, 0);
        obj.quantity = 0;
        obj
    }

    pub fn def(&self) -> &'static ObjectDef {
        def(self.otyp)
    }

    pub fn is_cursed(&self) -> bool {
        self.flags.contains(ObjFlags::CURSED)
    }

    /// Short name with article or count, no identification logic
    pub fn xname(&self) -> String {
        let base = self.def().name;
        let mut name = if self.quantity > 1 {
            format!("{} {}s", self.quantity, base)
        } else if base.starts_with(['a', 'e', 'i', 'o', 'u']) {
            format!("an {base}")
        } else {
            format!("a {base}")
        };
        if let Some(called) = &self.name {
            name.push_str(" named ");
            name.push_str(called);
        }
        name
    }
}

impl ChainEntity for Object {
    fn id(&self) -> EntityId {
        self.id
    }

    fn pos(&self) -> Option<Pos> {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::otyp_by_name;

    #[test]
    fn test_new_takes_class_from_table() {
        let otyp = otyp_by_name("potion of blindness").unwrap();
        let obj = Object::new(EntityId(4), otyp);
        assert_eq!(obj.class, ObjectClass::Potion);
        assert_eq!(obj.quantity, 1);
        assert_eq!(obj.pos, None);
    }

    #[test]
    fn test_xname() {
        let mut obj = Object::new(EntityId(1), otyp_by_name("arrow").unwrap());
        assert_eq!(obj.xname(), "an arrow");
        obj.quantity = 3;
        assert_eq!(obj.xname(), "3 arrows");
        obj.quantity = 1;
        obj.name = Some("Sting".into());
        assert_eq!(obj.xname(), "an arrow named Sting");
    }
}
