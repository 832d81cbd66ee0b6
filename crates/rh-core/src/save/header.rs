//! Versioned file header
//!
//! | bytes | field                       |
//! |-------|-----------------------------|
//! | 4     | magic `RHCK`                |
//! | 2     | format version              |
//! | 4     | byte-order tag `0x01020304` |
//! | 4     | reserved, zero              |

use std::io::{Read, Write};

use super::{SaveError, SaveReader, SaveWriter};

pub const MAGIC: [u8; 4] = *b"RHCK";
pub const VERSION: u16 = 1;
pub const ENDIAN_TAG: u32 = 0x0102_0304;

pub fn write_header<W: Write>(w: &mut SaveWriter<W>) -> Result<(), SaveError> {
    w.bytes(&MAGIC)?;
    w.u16(VERSION)?;
    w.u32(ENDIAN_TAG)?;
    w.u32(0)
}

/// Validate the header. Nothing past it is read when it does not match.
pub fn check_header<R: Read>(r: &mut SaveReader<R>) -> Result<(), SaveError> {
    let mut magic = [0u8; 4];
    r.bytes(&mut magic)
        .map_err(|_| SaveError::UnrecognizedFormat)?;
    if magic != MAGIC {
        return Err(SaveError::UnrecognizedFormat);
    }
    let version = r.u16()?;
    let tag = r.u32()?;
    let _reserved = r.u32()?;
    if tag != ENDIAN_TAG {
        return Err(SaveError::EndianMismatch { found: tag });
    }
    if version != VERSION {
        return Err(SaveError::VersionMismatch {
            found: version,
            expected: VERSION,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes() -> Vec<u8> {
        let mut w = SaveWriter::new(Vec::new());
        write_header(&mut w).unwrap();
        w.into_inner()
    }

    fn check(bytes: &[u8]) -> Result<(), SaveError> {
        check_header(&mut SaveReader::new(bytes))
    }

    #[test]
    fn test_header_layout() {
        assert_eq!(
            header_bytes(),
            vec![b'R', b'H', b'C', b'K', 0, 1, 1, 2, 3, 4, 0, 0, 0, 0]
        );
        check(&header_bytes()).unwrap();
    }

    #[test]
    fn test_wrong_magic() {
        let mut bytes = header_bytes();
        bytes[0] = b'X';
        assert!(matches!(check(&bytes), Err(SaveError::UnrecognizedFormat)));
        assert!(matches!(check(b"RH"), Err(SaveError::UnrecognizedFormat)));
    }

    #[test]
    fn test_future_version() {
        let mut bytes = header_bytes();
        bytes[5] = 2;
        assert!(matches!(
            check(&bytes),
            Err(SaveError::VersionMismatch { found: 2, .. })
        ));
    }

    #[test]
    fn test_reversed_byte_order() {
        let mut bytes = header_bytes();
        bytes[6..10].copy_from_slice(&[4, 3, 2, 1]);
        assert!(matches!(
            check(&bytes),
            Err(SaveError::EndianMismatch { found: 0x0403_0201 })
        ));
    }
}
