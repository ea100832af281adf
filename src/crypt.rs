//! XOR obfuscation used by logic message blocks and object files.

use log::debug;

use crate::binary::{read_u16_le, read_u8};
use crate::error::{ResourceError, ResourceResult};

pub const CRYPT_KEY: &[u8; 11] = b"Avis Durgan";

/// XORs `data` with the repeating key, starting at key index 0
pub fn xor_with_key(data: &mut [u8]) {
    for (i, b) in data.iter_mut().enumerate() {
        *b ^= CRYPT_KEY[i % CRYPT_KEY.len()];
    }
}

/// Decrypts the text region of a logic resource's message block in place.
///
/// Layout: `[code length][code][count][block length][count pointers][text]`. Only the text
/// is encrypted; the key restarts at the first message.
pub fn decrypt_logic_messages(buf: &mut [u8]) -> ResourceResult<()> {
    let start = read_u16_le(buf, 0)? as usize + 2;
    let count = read_u8(buf, start)? as usize;
    if count == 0 {
        return Ok(());
    }
    let end = start + 1 + read_u16_le(buf, start + 1)? as usize;
    let first = start + 3 + count * 2;
    if first > buf.len() {
        return Err(ResourceError::corrupt(format!(
            "message pointers for {} messages end at {:#06x}, past the {} byte resource",
            count,
            first,
            buf.len()
        )));
    }
    let end = end.min(buf.len());
    if end > first {
        debug!("decrypting messages {:#06x}..{:#06x}", first, end);
        xor_with_key(&mut buf[first..end]);
    }
    Ok(())
}

/// Object files are encrypted when their leading item count cannot be a plaintext count,
/// that is when it exceeds the length of the whole buffer.
pub fn objects_look_encrypted(buf: &[u8]) -> bool {
    match read_u16_le(buf, 0) {
        Ok(count) => count as usize > buf.len(),
        Err(_) => false,
    }
}

/// Applies the objects heuristic and decrypts in place when it fires
pub fn decrypt_objects(buf: &mut [u8]) -> bool {
    if objects_look_encrypted(buf) {
        xor_with_key(buf);
        true
    } else {
        false
    }
}
