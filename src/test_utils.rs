// Fixture builders for unit tests: resource headers, directory records, packed LZW codes
// and logic resources, all built in memory.

pub const ABSENT_RECORD: [u8; 3] = [0xff, 0xff, 0xff];

pub fn dir_record(volume: u8, offset: u32) -> [u8; 3] {
    [
        (volume << 4) | ((offset >> 16) as u8 & 0x0f),
        (offset >> 8) as u8,
        offset as u8,
    ]
}

pub fn v2_header(declared: usize) -> Vec<u8> {
    vec![0x12, 0x34, 0x00, declared as u8, (declared >> 8) as u8]
}

pub fn v3_header(flags: u8, declared: usize, compressed: usize) -> Vec<u8> {
    vec![
        0x12,
        0x34,
        flags,
        declared as u8,
        (declared >> 8) as u8,
        compressed as u8,
        (compressed >> 8) as u8,
    ]
}

/// Packs (code, width) pairs least-significant bit first
pub fn pack_codes(codes: &[(u16, u32)]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut acc: u32 = 0;
    let mut nbits = 0;
    for &(code, width) in codes {
        acc |= (code as u32) << nbits;
        nbits += width;
        while nbits >= 8 {
            out.push(acc as u8);
            acc >>= 8;
            nbits -= 8;
        }
    }
    if nbits > 0 {
        out.push(acc as u8);
    }
    out
}

/// Plain-text logic resource: code followed by the message block.
/// An empty message gets a zero pointer and no text.
pub fn logic_resource(code: &[u8], messages: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(code.len() as u16).to_le_bytes());
    out.extend_from_slice(code);

    let start = out.len();
    let mut text = Vec::new();
    let mut pointers = Vec::new();
    let text_base = 2 + messages.len() * 2;
    for m in messages {
        if m.is_empty() {
            pointers.push(0u16);
        } else {
            pointers.push((text_base + text.len()) as u16);
            text.extend_from_slice(m.as_bytes());
            text.push(0);
        }
    }

    out.push(messages.len() as u8);
    out.extend_from_slice(&((text_base + text.len()) as u16).to_le_bytes());
    for p in pointers {
        out.extend_from_slice(&p.to_le_bytes());
    }
    out.extend_from_slice(&text);
    debug_assert_eq!(out.len(), start + 1 + text_base + text.len());
    out
}
