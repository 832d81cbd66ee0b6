//! Entity records and chains
//!
//! A chain is a run of records, each introduced by its payload length
//! (custom name or engraving text), and closed by a length of -1.

use std::io::{Read, Write};

use super::{RestoreCtx, SaveError, SaveReader, SaveWriter};
use crate::consts::{COLNO, ROWNO};
use crate::dungeon::{Engraving, EngravingKind, GoldPile, Trap, TrapKind};
use crate::entity::{check_payload, Chain, ChainEntity};
use crate::monster::{Monster, MonsterFlags, SpeciesId, WormTail};
use crate::object::{ObjFlags, Object, ObjectClass, WornMask};

/// End-of-chain marker
pub const CHAIN_END: i32 = -1;

/// A record that can be written into a chain
pub trait Persist: ChainEntity + Sized {
    /// Bytes of variable-length payload
    fn payload(&self) -> &str;

    fn write_body<W: Write>(&self, w: &mut SaveWriter<W>) -> Result<(), SaveError>;

    /// Read the fixed fields, then `payload` bytes of text
    fn read_body<R: Read>(
        r: &mut SaveReader<R>,
        payload: usize,
        ctx: &mut RestoreCtx<'_>,
    ) -> Result<Self, SaveError>;
}

pub fn write_chain<T: Persist, W: Write>(
    w: &mut SaveWriter<W>,
    chain: &Chain<T>,
) -> Result<(), SaveError> {
    for item in chain.iter() {
        let len = item.payload().len();
        check_payload(len)?;
        w.i32(len as i32)?;
        item.write_body(w)?;
    }
    w.i32(CHAIN_END)
}

pub fn read_chain<T: Persist, R: Read>(
    r: &mut SaveReader<R>,
    name: &'static str,
    ctx: &mut RestoreCtx<'_>,
) -> Result<Chain<T>, SaveError> {
    let mut chain = Chain::new(name);
    while let Some(len) = r.length()? {
        let item = T::read_body(r, len, ctx)?;
        chain.push_back(item)?;
    }
    Ok(chain)
}

fn class_of(sym: u8) -> Result<ObjectClass, SaveError> {
    ObjectClass::from_symbol(sym)
        .ok_or_else(|| SaveError::Corrupted(format!("unknown object class {:?}", sym as char)))
}

impl Persist for Object {
    fn payload(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    fn write_body<W: Write>(&self, w: &mut SaveWriter<W>) -> Result<(), SaveError> {
        w.id(self.id)?;
        w.u16(self.otyp)?;
        w.u8(self.class as u8)?;
        w.opt_pos(self.pos)?;
        w.u32(self.quantity)?;
        w.i8(self.spe)?;
        w.u8(self.flags.bits())?;
        w.u16(self.worn.bits())?;
        w.bytes(self.payload().as_bytes())
    }

    fn read_body<R: Read>(
        r: &mut SaveReader<R>,
        payload: usize,
        ctx: &mut RestoreCtx<'_>,
    ) -> Result<Self, SaveError> {
        let mut obj = Object::blank(ctx.claim(r.id()?)?);
        obj.otyp = r.u16()?;
        obj.class = class_of(r.u8()?)?;
        obj.pos = r.opt_pos()?;
        obj.quantity = r.u32()?;
        obj.spe = r.i8()?;
        obj.flags = ObjFlags::from_bits_truncate(r.u8()?);
        obj.worn = WornMask::from_bits_truncate(r.u16()?);
        let name = r.payload(payload)?;
        obj.name = (!name.is_empty()).then_some(name);
        Ok(obj)
    }
}

impl Persist for Monster {
    fn payload(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    fn write_body<W: Write>(&self, w: &mut SaveWriter<W>) -> Result<(), SaveError> {
        w.id(self.id)?;
        w.u16(self.species.index())?;
        w.pos(self.pos)?;
        w.i32(self.hp)?;
        w.i32(self.hpmax)?;
        w.u8(self.flags.bits())?;
        w.bytes(self.payload().as_bytes())?;
        write_chain(w, &self.inventory)?;
        w.bool(self.worm.is_some())?;
        if let Some(tail) = &self.worm {
            w.u64(tail.growtime)?;
            w.u32(tail.len() as u32)?;
            for seg in tail.segments() {
                w.pos(seg)?;
            }
        }
        Ok(())
    }

    fn read_body<R: Read>(
        r: &mut SaveReader<R>,
        payload: usize,
        ctx: &mut RestoreCtx<'_>,
    ) -> Result<Self, SaveError> {
        let mut mon = Monster::blank(ctx.claim(r.id()?)?);
        let species = r.u16()?;
        mon.species = SpeciesId::new(species)
            .ok_or_else(|| SaveError::Corrupted(format!("unknown species {species}")))?;
        mon.pos = r.pos()?;
        mon.hp = r.i32()?;
        mon.hpmax = r.i32()?;
        mon.flags = MonsterFlags::from_bits_truncate(r.u8()?);
        let name = r.payload(payload)?;
        mon.name = (!name.is_empty()).then_some(name);
        mon.inventory = read_chain(r, "minvent", ctx)?;
        if r.bool()? {
            let growtime = r.u64()?;
            let count = r.u32()? as usize;
            if count > COLNO * ROWNO {
                return Err(SaveError::Corrupted(format!("worm with {count} segments")));
            }
            let segments = (0..count).map(|_| r.pos()).collect::<Result<Vec<_>, _>>()?;
            mon.worm = Some(WormTail::from_parts(segments, growtime));
        }
        Ok(mon)
    }
}

impl Persist for GoldPile {
    fn payload(&self) -> &str {
        ""
    }

    fn write_body<W: Write>(&self, w: &mut SaveWriter<W>) -> Result<(), SaveError> {
        w.id(self.id)?;
        w.pos(self.pos)?;
        w.i64(self.amount)
    }

    fn read_body<R: Read>(
        r: &mut SaveReader<R>,
        payload: usize,
        ctx: &mut RestoreCtx<'_>,
    ) -> Result<Self, SaveError> {
        if payload != 0 {
            return Err(SaveError::Corrupted(format!("gold record with {payload} payload bytes")));
        }
        let mut gold = GoldPile::blank(ctx.claim(r.id()?)?);
        gold.pos = r.pos()?;
        gold.amount = r.i64()?;
        Ok(gold)
    }
}

impl Persist for Trap {
    fn payload(&self) -> &str {
        ""
    }

    fn write_body<W: Write>(&self, w: &mut SaveWriter<W>) -> Result<(), SaveError> {
        w.id(self.id)?;
        w.pos(self.pos)?;
        w.u8(self.kind as u8)?;
        w.bool(self.seen)
    }

    fn read_body<R: Read>(
        r: &mut SaveReader<R>,
        payload: usize,
        ctx: &mut RestoreCtx<'_>,
    ) -> Result<Self, SaveError> {
        if payload != 0 {
            return Err(SaveError::Corrupted(format!("trap record with {payload} payload bytes")));
        }
        let mut trap = Trap::blank(ctx.claim(r.id()?)?);
        trap.pos = r.pos()?;
        let kind = r.u8()?;
        trap.kind = TrapKind::from_u8(kind)
            .ok_or_else(|| SaveError::Corrupted(format!("unknown trap kind {kind}")))?;
        trap.seen = r.bool()?;
        Ok(trap)
    }
}

impl Persist for Engraving {
    fn payload(&self) -> &str {
        &self.text
    }

    fn write_body<W: Write>(&self, w: &mut SaveWriter<W>) -> Result<(), SaveError> {
        w.id(self.id)?;
        w.pos(self.pos)?;
        w.u8(self.kind as u8)?;
        w.u64(self.time)?;
        w.bytes(self.text.as_bytes())
    }

    fn read_body<R: Read>(
        r: &mut SaveReader<R>,
        payload: usize,
        ctx: &mut RestoreCtx<'_>,
    ) -> Result<Self, SaveError> {
        let mut engr = Engraving::blank(ctx.claim(r.id()?)?);
        engr.pos = r.pos()?;
        let kind = r.u8()?;
        engr.kind = EngravingKind::from_u8(kind)
            .ok_or_else(|| SaveError::Corrupted(format!("unknown engraving type {kind}")))?;
        engr.time = r.u64()?;
        engr.text = r.payload(payload)?;
        Ok(engr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::Pos;
    use crate::entity::{EntityId, IdAllocator};
    use crate::object::otyp_by_name;

    fn at(x: i32, y: i32) -> Pos {
        Pos::checked(x, y).unwrap()
    }

    fn reread<T: Persist>(chain: &Chain<T>, ids: &mut IdAllocator) -> Result<Chain<T>, SaveError> {
        let mut w = SaveWriter::new(Vec::new());
        write_chain(&mut w, chain)?;
        let bytes = w.into_inner();
        let mut ctx = RestoreCtx::new(ids);
        read_chain(&mut SaveReader::new(bytes.as_slice()), chain.name(), &mut ctx)
    }

    #[test]
    fn test_monster_with_inventory_and_tail() {
        let mut rng = crate::rng::GameRng::new(4);
        let mut worm = Monster::new(EntityId(10), SpeciesId::LONG_WORM, at(9, 9), &mut rng);
        worm.name = Some("Wriggles".into());
        worm.worm = Some(WormTail::from_parts(vec![at(7, 9), at(8, 9)], 55));
        let mut dagger = Object::new(EntityId(11), otyp_by_name("dagger").unwrap());
        dagger.spe = -2;
        worm.inventory.push_back(dagger).unwrap();

        let mut chain = Chain::new("monsters");
        chain.push_back(worm.clone()).unwrap();
        let mut ids = IdAllocator::new();
        let back = reread(&chain, &mut ids).unwrap();
        assert_eq!(back.get(EntityId(10)), Some(&worm));
        assert!(ids.peek() > 11);
    }

    #[test]
    fn test_oversized_name_is_refused_before_writing() {
        let mut obj = Object::new(EntityId(4), otyp_by_name("dagger").unwrap());
        obj.name = Some("x".repeat(crate::consts::PAYLOAD_MAX + 1));
        let mut chain = Chain::new("invent");
        chain.push_back(obj).unwrap();
        let mut w = SaveWriter::new(Vec::new());
        let err = write_chain(&mut w, &chain).unwrap_err();
        assert!(matches!(
            err,
            SaveError::Impossible(crate::world::Impossible::PayloadLength { .. })
        ));
        assert!(w.into_inner().is_empty());
    }

    #[test]
    fn test_zero_id_gets_fresh_id() {
        let mut chain = Chain::new("gold");
        let mut pile = GoldPile::new(EntityId(3), at(1, 1), 40);
        chain.push_back(pile.clone()).unwrap();
        pile.id = EntityId(4);
        chain.push_back(pile).unwrap();

        let mut w = SaveWriter::new(Vec::new());
        write_chain(&mut w, &chain).unwrap();
        let mut bytes = w.into_inner();
        // first record: length prefix (4 bytes) then its id
        bytes[4..8].copy_from_slice(&0u32.to_be_bytes());

        let mut ids = IdAllocator::from_counter(100);
        let mut ctx = RestoreCtx::new(&mut ids);
        let back: Chain<GoldPile> =
            read_chain(&mut SaveReader::new(bytes.as_slice()), "gold", &mut ctx).unwrap();
        assert_eq!(ctx.report.diagnostics.len(), 1);
        assert_eq!(back.ids().collect::<Vec<_>>(), vec![EntityId(100), EntityId(4)]);
    }

    #[test]
    fn test_duplicate_id_is_corruption() {
        let mut chain = Chain::new("traps");
        chain.push_back(Trap::new(EntityId(5), at(2, 2), TrapKind::Pit)).unwrap();
        chain.push_back(Trap::new(EntityId(6), at(3, 2), TrapKind::BearTrap)).unwrap();
        let mut w = SaveWriter::new(Vec::new());
        write_chain(&mut w, &chain).unwrap();
        let mut bytes = w.into_inner();
        // each trap is 4 + 4 + 2 + 1 + 1 bytes
        let second_id = 12 + 4;
        bytes[second_id..second_id + 4].copy_from_slice(&5u32.to_be_bytes());
        let mut ids = IdAllocator::new();
        let mut ctx = RestoreCtx::new(&mut ids);
        let result: Result<Chain<Trap>, _> =
            read_chain(&mut SaveReader::new(bytes.as_slice()), "traps", &mut ctx);
        assert!(matches!(result, Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn test_engraving_text_preserved() {
        let mut chain = Chain::new("engravings");
        let mut engr = Engraving::blank(EntityId(2));
        engr.pos = at(5, 5);
        engr.text = "Elbereth".into();
        engr.kind = EngravingKind::Burn;
        engr.time = 12;
        chain.push_back(engr.clone()).unwrap();
        let back = reread(&chain, &mut IdAllocator::new()).unwrap();
        assert_eq!(back.head(), Some(&engr));
    }
}
