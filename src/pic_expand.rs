//! Nibble packing used by v3 pictures (resource flag 0x80).
//!
//! The colour operands of 0xF0 and 0xF2 are stored as a single nibble, which leaves the rest
//! of the stream misaligned by four bits until the next such opcode. Everything else is a
//! plain byte.

use bitreader::BitReader;
use log::debug;

use crate::error::{ResourceError, ResourceResult};

fn read_bits(reader: &mut BitReader, count: u8) -> ResourceResult<u8> {
    let available = reader.remaining().min(count as u64) as u8;
    if available == 0 {
        return Ok(0);
    }
    let v = reader
        .read_u8(available)
        .map_err(|e| ResourceError::corrupt(format!("pic expand: {:?}", e)))?;
    Ok(v << (count - available))
}

/// Unpacks a picture into `capacity` bytes; a short stream is zero padded
pub fn pic_expand(input: &[u8], capacity: usize) -> ResourceResult<Vec<u8>> {
    let mut reader = BitReader::new(input);
    let mut out = Vec::with_capacity(capacity);

    while reader.remaining() > 0 && out.len() < capacity {
        let b = read_bits(&mut reader, 8)?;
        out.push(b);
        match b {
            0xf0 | 0xf2 => {
                let colour = read_bits(&mut reader, 4)?;
                if out.len() < capacity {
                    out.push(colour);
                }
            }
            0xff => break,
            _ => {}
        }
    }

    debug!("pic expand: {} bytes -> {} bytes", input.len(), out.len());
    out.resize(capacity, 0);
    Ok(out)
}
