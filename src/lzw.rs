//! Variable-width LZW decompressor for v3 resources.
//!
//! Codes start 9 bits wide and are read least-significant bit first. Code 0x100 resets the
//! dictionary, 0x101 ends the stream. The width grows once the next code to be defined passes
//! `(1 << bits) - 2`, one earlier than a textbook LZW, and never reaches 12 bits: archives
//! were written by an encoder with the same thresholds.

use bitvec::prelude::*;
use log::debug;

use crate::error::{ResourceError, ResourceResult};

const START_BITS: u32 = 9;
const MAX_BITS: u32 = 12;
const TABLE_SIZE: usize = 4096;
const STACK_SIZE: usize = 4096;

const RESET_CODE: u16 = 0x100;
const END_CODE: u16 = 0x101;

struct CodeReader<'a> {
    bits: &'a BitSlice<u8, Lsb0>,
    pos: usize,
}

impl<'a> CodeReader<'a> {
    fn new(input: &'a [u8]) -> CodeReader<'a> {
        CodeReader {
            bits: input.view_bits::<Lsb0>(),
            pos: 0,
        }
    }

    /// Bits past the end of the input read as zero
    fn read(&mut self, width: u32) -> u16 {
        let start = self.pos.min(self.bits.len());
        let end = (self.pos + width as usize).min(self.bits.len());
        self.pos += width as usize;
        if start == end {
            return 0;
        }
        self.bits[start..end].load_le::<u16>()
    }
}

struct Expander {
    bits: u32,
    max_code: u16,
    prefix: Vec<u16>,
    append: Vec<u8>,
    stack: Vec<u8>,
}

impl Expander {
    fn new() -> Expander {
        let mut e = Expander {
            bits: 0,
            max_code: 0,
            prefix: vec![0; TABLE_SIZE],
            append: vec![0; TABLE_SIZE],
            stack: vec![0; STACK_SIZE],
        };
        e.set_bits(START_BITS);
        e
    }

    fn set_bits(&mut self, bits: u32) {
        if bits == MAX_BITS {
            return;
        }
        self.bits = bits;
        self.max_code = (1u16 << bits) - 2;
    }

    /// Writes the string for `code` into the stack from `ptr`, last character first,
    /// and returns the index of its first character.
    fn decode_string(&mut self, mut ptr: usize, mut code: u16) -> ResourceResult<usize> {
        while code > 0xff {
            if ptr >= STACK_SIZE {
                return Err(ResourceError::corrupt(format!(
                    "lzw: code {:#05x} expands past {} characters",
                    code, STACK_SIZE
                )));
            }
            self.stack[ptr] = self.append[code as usize];
            code = self.prefix[code as usize];
            ptr += 1;
        }
        if ptr >= STACK_SIZE {
            return Err(ResourceError::corrupt("lzw: decode stack overflow"));
        }
        self.stack[ptr] = code as u8;
        Ok(ptr)
    }

    fn expand(&mut self, input: &[u8], capacity: usize) -> ResourceResult<Vec<u8>> {
        let mut reader = CodeReader::new(input);
        let mut out = Vec::with_capacity(capacity);

        let mut next: u16 = 257;
        let mut old = reader.read(self.bits);
        let mut c = old;
        let mut new = reader.read(self.bits);

        while out.len() < capacity && new != END_CODE {
            if new == RESET_CODE {
                next = 258;
                self.set_bits(START_BITS);
                old = reader.read(self.bits);
                new = reader.read(self.bits);
                out.push(old as u8);
                c = old;
                continue;
            }

            let mut s = if new >= next {
                self.stack[0] = c as u8;
                self.decode_string(1, old)?
            } else {
                self.decode_string(0, new)?
            };

            c = self.stack[s] as u16;
            loop {
                if out.len() == capacity {
                    break;
                }
                out.push(self.stack[s]);
                if s == 0 {
                    break;
                }
                s -= 1;
            }

            if next > self.max_code {
                self.set_bits(self.bits + 1);
            }
            if (next as usize) < TABLE_SIZE {
                self.prefix[next as usize] = old;
                self.append[next as usize] = c as u8;
            }
            next = next.saturating_add(1);
            old = new;
            new = reader.read(self.bits);
        }

        if out.len() != capacity {
            return Err(ResourceError::Truncated {
                expected: capacity,
                produced: out.len(),
            });
        }
        debug!("lzw: {} bytes -> {} bytes", input.len(), out.len());
        Ok(out)
    }
}

/// Decompresses `input` into exactly `capacity` bytes
pub fn expand(input: &[u8], capacity: usize) -> ResourceResult<Vec<u8>> {
    Expander::new().expand(input, capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::pack_codes;
    use test_log::test;

    #[test]
    fn reads_lsb_first_codes() {
        let input = pack_codes(&[(0x1a5, 9), (0x0f3, 9), (0x7ff, 11)]);
        let mut r = CodeReader::new(&input);
        assert_eq!(r.read(9), 0x1a5);
        assert_eq!(r.read(9), 0x0f3);
        assert_eq!(r.read(11), 0x7ff);
        assert_eq!(r.read(9), 0);
    }

    #[test]
    fn expands_dictionary_references() {
        let input = pack_codes(&[(0x100, 9), (0x41, 9), (0x42, 9), (0x102, 9), (0x103, 9), (0x101, 9)]);
        assert_eq!(expand(&input, 6).unwrap(), b"ABABBA".to_vec());
    }

    #[test]
    fn expands_code_defined_by_itself() {
        let input = pack_codes(&[(0x100, 9), (0x41, 9), (0x42, 9), (0x103, 9), (0x101, 9)]);
        assert_eq!(expand(&input, 4).unwrap(), b"ABBB".to_vec());
    }

    #[test]
    fn stops_at_capacity() {
        let input = pack_codes(&[(0x100, 9), (0x41, 9), (0x42, 9), (0x101, 9)]);
        assert_eq!(expand(&input, 1).unwrap(), b"A".to_vec());
        assert!(expand(&input, 0).unwrap().is_empty());
    }

    #[test]
    fn short_output_is_truncated() {
        let input = pack_codes(&[(0x100, 9), (0x41, 9), (0x101, 9)]);
        match expand(&input, 4) {
            Err(ResourceError::Truncated { expected, produced }) => {
                assert_eq!((expected, produced), (4, 1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn self_referencing_code_is_corrupt() {
        let input = pack_codes(&[(0x100, 9), (0x41, 9), (0x103, 9), (0x41, 9), (0x103, 9), (0x101, 9)]);
        let err = expand(&input, 100).unwrap_err();
        assert!(matches!(err, ResourceError::CorruptResource(_)));
    }

    #[test]
    fn width_never_reaches_twelve_bits() {
        let mut e = Expander::new();
        e.set_bits(11);
        assert_eq!(e.max_code, 2046);
        e.set_bits(12);
        assert_eq!((e.bits, e.max_code), (11, 2046));
    }
}
