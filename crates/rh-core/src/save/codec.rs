//! Field-at-a-time big-endian reader and writer

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::SaveError;
use crate::dungeon::Pos;
use crate::entity::{check_payload, EntityId};

/// Coordinate byte used for "no position"
const NO_POS: u8 = 0xFF;

pub struct SaveWriter<W: Write> {
    out: W,
}

impl<W: Write> SaveWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn u8(&mut self, v: u8) -> Result<(), SaveError> {
        Ok(self.out.write_u8(v)?)
    }

    pub fn i8(&mut self, v: i8) -> Result<(), SaveError> {
        Ok(self.out.write_i8(v)?)
    }

    pub fn bool(&mut self, v: bool) -> Result<(), SaveError> {
        self.u8(v as u8)
    }

    pub fn u16(&mut self, v: u16) -> Result<(), SaveError> {
        Ok(self.out.write_u16::<BigEndian>(v)?)
    }

    pub fn u32(&mut self, v: u32) -> Result<(), SaveError> {
        Ok(self.out.write_u32::<BigEndian>(v)?)
    }

    pub fn i32(&mut self, v: i32) -> Result<(), SaveError> {
        Ok(self.out.write_i32::<BigEndian>(v)?)
    }

    pub fn u64(&mut self, v: u64) -> Result<(), SaveError> {
        Ok(self.out.write_u64::<BigEndian>(v)?)
    }

    pub fn i64(&mut self, v: i64) -> Result<(), SaveError> {
        Ok(self.out.write_i64::<BigEndian>(v)?)
    }

    pub fn bytes(&mut self, v: &[u8]) -> Result<(), SaveError> {
        Ok(self.out.write_all(v)?)
    }

    pub fn id(&mut self, id: EntityId) -> Result<(), SaveError> {
        self.u32(id.0)
    }

    /// Length-prefixed string
    pub fn str(&mut self, s: &str) -> Result<(), SaveError> {
        check_payload(s.len())?;
        self.i32(s.len() as i32)?;
        self.bytes(s.as_bytes())
    }

    pub fn opt_str(&mut self, s: Option<&str>) -> Result<(), SaveError> {
        self.bool(s.is_some())?;
        match s {
            Some(s) => self.str(s),
            None => Ok(()),
        }
    }

    pub fn pos(&mut self, pos: Pos) -> Result<(), SaveError> {
        self.u8(pos.x())?;
        self.u8(pos.y())
    }

    pub fn opt_pos(&mut self, pos: Option<Pos>) -> Result<(), SaveError> {
        match pos {
            Some(pos) => self.pos(pos),
            None => {
                self.u8(NO_POS)?;
                self.u8(NO_POS)
            }
        }
    }
}

pub struct SaveReader<R: Read> {
    input: R,
}

impl<R: Read> SaveReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    pub fn u8(&mut self) -> Result<u8, SaveError> {
        Ok(self.input.read_u8()?)
    }

    pub fn i8(&mut self) -> Result<i8, SaveError> {
        Ok(self.input.read_i8()?)
    }

    pub fn bool(&mut self) -> Result<bool, SaveError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SaveError::Corrupted(format!("bad boolean byte {other}"))),
        }
    }

    pub fn u16(&mut self) -> Result<u16, SaveError> {
        Ok(self.input.read_u16::<BigEndian>()?)
    }

    pub fn u32(&mut self) -> Result<u32, SaveError> {
        Ok(self.input.read_u32::<BigEndian>()?)
    }

    pub fn i32(&mut self) -> Result<i32, SaveError> {
        Ok(self.input.read_i32::<BigEndian>()?)
    }

    pub fn u64(&mut self) -> Result<u64, SaveError> {
        Ok(self.input.read_u64::<BigEndian>()?)
    }

    pub fn i64(&mut self) -> Result<i64, SaveError> {
        Ok(self.input.read_i64::<BigEndian>()?)
    }

    pub fn bytes(&mut self, buf: &mut [u8]) -> Result<(), SaveError> {
        Ok(self.input.read_exact(buf)?)
    }

    pub fn id(&mut self) -> Result<EntityId, SaveError> {
        self.u32().map(EntityId)
    }

    /// Read `len` bytes of UTF-8. The length is checked before allocating.
    pub fn payload(&mut self, len: usize) -> Result<String, SaveError> {
        check_payload(len)?;
        let mut buf = vec![0; len];
        self.bytes(&mut buf)?;
        String::from_utf8(buf).map_err(|_| SaveError::Corrupted("text is not UTF-8".into()))
    }

    /// Read a length prefix: `Ok(None)` for the -1 end marker
    pub fn length(&mut self) -> Result<Option<usize>, SaveError> {
        match self.i32()? {
            -1 => Ok(None),
            len if len < 0 => Err(SaveError::Corrupted(format!("negative length {len}"))),
            len => {
                check_payload(len as usize)?;
                Ok(Some(len as usize))
            }
        }
    }

    pub fn str(&mut self) -> Result<String, SaveError> {
        match self.length()? {
            Some(len) => self.payload(len),
            None => Err(SaveError::Corrupted("string marked as end of chain".into())),
        }
    }

    pub fn opt_str(&mut self) -> Result<Option<String>, SaveError> {
        if self.bool()? {
            self.str().map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn pos(&mut self) -> Result<Pos, SaveError> {
        let (x, y) = (self.u8()?, self.u8()?);
        Pos::checked(x as i32, y as i32)
            .map_err(|e| SaveError::Corrupted(e.to_string()))
    }

    pub fn opt_pos(&mut self) -> Result<Option<Pos>, SaveError> {
        let (x, y) = (self.u8()?, self.u8()?);
        if x == NO_POS && y == NO_POS {
            return Ok(None);
        }
        Pos::checked(x as i32, y as i32)
            .map(Some)
            .map_err(|e| SaveError::Corrupted(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PAYLOAD_MAX;
    use crate::world::Impossible;

    #[test]
    fn test_big_endian_layout() {
        let mut w = SaveWriter::new(Vec::new());
        w.u16(0x0102).unwrap();
        w.u32(0x0304_0506).unwrap();
        w.i32(-1).unwrap();
        assert_eq!(
            w.into_inner(),
            vec![1, 2, 3, 4, 5, 6, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_oversized_length_rejected_before_allocation() {
        let mut w = SaveWriter::new(Vec::new());
        w.i32(i32::MAX).unwrap();
        let bytes = w.into_inner();
        let mut r = SaveReader::new(bytes.as_slice());
        match r.str() {
            Err(SaveError::Impossible(Impossible::PayloadLength { len, max })) => {
                assert_eq!(len, i32::MAX as usize);
                assert_eq!(max, PAYLOAD_MAX);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_negative_length_is_corruption() {
        let bytes = (-7i32).to_be_bytes();
        let mut r = SaveReader::new(&bytes[..]);
        assert!(matches!(r.length(), Err(SaveError::Corrupted(_))));
        let end = (-1i32).to_be_bytes();
        let mut r = SaveReader::new(&end[..]);
        assert!(matches!(r.length(), Ok(None)));
    }

    #[test]
    fn test_out_of_map_position_is_corruption() {
        let bytes = [200u8, 3];
        let mut r = SaveReader::new(&bytes[..]);
        assert!(matches!(r.pos(), Err(SaveError::Corrupted(_))));
        let none = [NO_POS, NO_POS];
        let mut r = SaveReader::new(&none[..]);
        assert_eq!(r.opt_pos().unwrap(), None);
    }

    #[test]
    fn test_truncated_input_is_io_error() {
        let mut r = SaveReader::new(&[0u8, 1][..]);
        assert!(matches!(r.u32(), Err(SaveError::Io(_))));
    }
}
