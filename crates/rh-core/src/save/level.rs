//! One level: the grid followed by the level's chains

use std::io::{Read, Write};

use super::{read_chain, write_chain, RestoreCtx, SaveError, SaveReader, SaveWriter};
use crate::consts::MAXLEVEL;
use crate::dungeon::{CellType, Level};

const SEEN: u8 = 0x01;
const LIT: u8 = 0x02;

pub fn write_level<W: Write>(w: &mut SaveWriter<W>, level: &Level) -> Result<(), SaveError> {
    w.u8(level.dlevel)?;
    for (_, cell) in level.cells() {
        w.u8(cell.typ as u8)?;
        let mut bits = 0;
        if cell.seen {
            bits |= SEEN;
        }
        if cell.lit {
            bits |= LIT;
        }
        w.u8(bits)?;
        w.u8(if cell.scrsym.is_ascii() { cell.scrsym as u8 } else { b' ' })?;
    }
    w.opt_pos(level.upstair)?;
    w.opt_pos(level.downstair)?;
    write_chain(w, &level.monsters)?;
    write_chain(w, &level.objects)?;
    write_chain(w, &level.gold)?;
    write_chain(w, &level.traps)?;
    write_chain(w, &level.engravings)
}

pub fn read_level<R: Read>(
    r: &mut SaveReader<R>,
    ctx: &mut RestoreCtx<'_>,
) -> Result<Level, SaveError> {
    let dlevel = r.u8()?;
    if dlevel == 0 || dlevel > MAXLEVEL {
        return Err(SaveError::Corrupted(format!("level number {dlevel}")));
    }
    let mut level = Level::new(dlevel);
    let positions: Vec<_> = level.cells().map(|(pos, _)| pos).collect();
    for pos in positions {
        let typ = r.u8()?;
        let bits = r.u8()?;
        let sym = r.u8()?;
        let cell = level.cell_mut(pos);
        cell.typ = CellType::from_u8(typ)
            .ok_or_else(|| SaveError::Corrupted(format!("unknown terrain {typ} at {pos}")))?;
        cell.seen = bits & SEEN != 0;
        cell.lit = bits & LIT != 0;
        cell.scrsym = sym as char;
    }
    level.upstair = r.opt_pos()?;
    level.downstair = r.opt_pos()?;
    level.monsters = read_chain(r, "monsters", ctx)?;
    level.objects = read_chain(r, "objects", ctx)?;
    level.gold = read_chain(r, "gold", ctx)?;
    level.traps = read_chain(r, "traps", ctx)?;
    level.engravings = read_chain(r, "engravings", ctx)?;
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{LevelGenerator, SimpleGenerator};
    use crate::entity::IdAllocator;
    use crate::rng::GameRng;

    #[test]
    fn test_generated_level_survives() {
        let mut ids = IdAllocator::new();
        let mut level = SimpleGenerator
            .generate(7, &mut GameRng::new(31), &mut ids, "")
            .unwrap();
        if let Some(up) = level.upstair {
            level.cell_mut(up).seen = true;
            level.cell_mut(up).scrsym = '<';
        }

        let mut w = SaveWriter::new(Vec::new());
        write_level(&mut w, &level).unwrap();
        let bytes = w.into_inner();

        let mut fresh = IdAllocator::new();
        let mut ctx = RestoreCtx::new(&mut fresh);
        let back = read_level(&mut SaveReader::new(bytes.as_slice()), &mut ctx).unwrap();
        assert!(ctx.report.is_clean());
        assert_eq!(back.dlevel, 7);
        assert_eq!(back.upstair, level.upstair);
        assert_eq!(back.monsters, level.monsters);
        assert_eq!(back.objects, level.objects);
        assert_eq!(back.gold, level.gold);
        assert_eq!(back.traps, level.traps);
        assert!(back.cells().zip(level.cells()).all(|(a, b)| a.1 == b.1));
        assert!(fresh.peek() >= ids.peek());
    }

    #[test]
    fn test_unknown_terrain_rejected() {
        let level = Level::new(2);
        let mut w = SaveWriter::new(Vec::new());
        write_level(&mut w, &level).unwrap();
        let mut bytes = w.into_inner();
        bytes[1] = 5;
        let mut ids = IdAllocator::new();
        let mut ctx = RestoreCtx::new(&mut ids);
        assert!(matches!(
            read_level(&mut SaveReader::new(bytes.as_slice()), &mut ctx),
            Err(SaveError::Corrupted(_))
        ));
    }
}
