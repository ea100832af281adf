//! Walks a logic resource and reports messages, conditions and commands to a
//! [`LogicVisitor`].
//!
//! Layout of a decrypted logic resource:
//!
//! ```text
//! +0  u16            length of the code area
//! +2  code           commands, with 0xFF-bracketed conditions
//! ..  u8             message count
//!     u16            length of the message block, from this field on
//!     u16 * count    message offsets, from the length field; 0 = no message
//!     text           zero-terminated strings
//! ```
//!
//! Positions are offsets from the start of the code area. The end of a condition branches
//! to its own position plus the displacement; `goto` branches to the byte after its
//! opcode plus a signed displacement. Both wrap as 16-bit values.

use log::debug;

use super::instruction_set::{InstructionSet, OpcodeInfo, OperandKind};
use super::{DecodedInstruction, LogicVisitor, Operand};
use crate::binary::{read_u16_le, read_u8, ByteCursor};
use crate::error::{ResourceError, ResourceResult};

pub const CODE_START: usize = 2;

const CONDITION_BRACKET: u8 = 0xff;
const GOTO: u8 = 0xfe;
const NOT: u8 = 0xfd;
const OR: u8 = 0xfc;

/// Extracts the message table: entry `i` is message number `i + 1`. Text is Latin-1.
pub fn decode_messages(data: &[u8]) -> ResourceResult<Vec<String>> {
    let start = read_u16_le(data, 0)? as usize + CODE_START;
    let count = read_u8(data, start)? as usize;
    let base = start + 1;
    let mut messages = Vec::with_capacity(count);
    for i in 0..count {
        let pointer = read_u16_le(data, start + 3 + i * 2)? as usize;
        if pointer == 0 {
            messages.push(String::new());
            continue;
        }
        let text_start = base + pointer;
        if text_start > data.len() {
            return Err(ResourceError::corrupt(format!(
                "message {} points to {:#06x}, past the end of the resource",
                i + 1,
                text_start
            )));
        }
        let text: String = data[text_start..]
            .iter()
            .take_while(|b| **b != 0)
            .map(|b| *b as char)
            .collect();
        messages.push(text);
    }
    Ok(messages)
}

struct Decoder<'a, 'v> {
    cursor: ByteCursor<'a>,
    set: &'static InstructionSet,
    visitor: &'v mut dyn LogicVisitor,
}

impl<'a, 'v> Decoder<'a, 'v> {
    fn operands(&mut self, info: &OpcodeInfo) -> ResourceResult<Vec<Operand>> {
        let mut operands = Vec::with_capacity(info.operands.len());
        if info.word_list {
            let count = self.cursor.u8()?;
            for _ in 0..count {
                operands.push(Operand {
                    kind: OperandKind::Word,
                    value: self.cursor.u16_le()?,
                });
            }
            return Ok(operands);
        }
        for kind in info.operands {
            let value = match kind.width() {
                2 => self.cursor.u16_le()?,
                _ => self.cursor.u8()? as u16,
            };
            operands.push(Operand { kind: *kind, value });
        }
        Ok(operands)
    }

    fn decoded(
        &mut self,
        position: usize,
        opcode: u8,
        info: &OpcodeInfo,
    ) -> ResourceResult<DecodedInstruction> {
        let operands = self.operands(info)?;
        Ok(DecodedInstruction {
            position,
            opcode,
            mnemonic: info.name,
            operands,
            destination: position,
        })
    }

    fn marker(position: usize, opcode: u8, mnemonic: &'static str, destination: usize) -> DecodedInstruction {
        DecodedInstruction {
            position,
            opcode,
            mnemonic,
            operands: Vec::new(),
            destination,
        }
    }

    fn branch_target(origin: usize, displacement: u16) -> usize {
        (origin as u16).wrapping_add(displacement) as usize
    }

    fn test(&mut self, position: usize, opcode: u8) -> ResourceResult<()> {
        let info = self.set.condition(opcode).ok_or_else(|| {
            ResourceError::corrupt(format!(
                "unknown condition {:#04x} at {:#06x}",
                opcode, position
            ))
        })?;
        let ins = self.decoded(position, opcode, info)?;
        self.visitor.condition(&ins);
        Ok(())
    }

    fn run(&mut self) -> ResourceResult<()> {
        let mut in_condition = false;
        let mut in_or = false;

        while !self.cursor.is_empty() {
            let position = self.cursor.position();
            let opcode = self.cursor.u8()?;

            if opcode == CONDITION_BRACKET {
                if !in_condition {
                    in_condition = true;
                    let ins = Self::marker(position, opcode, "if", position);
                    self.visitor.begin_condition(&ins);
                    self.visitor.begin_and(position);
                } else {
                    in_condition = false;
                    if in_or {
                        debug!("logic: OR group still open at {:#06x}", position);
                        self.visitor.end_or(position);
                        in_or = false;
                    }
                    let displacement = self.cursor.u16_le()?;
                    let target = Self::branch_target(position, displacement);
                    let ins = Self::marker(position, opcode, "then", target);
                    self.visitor.end_and(position);
                    self.visitor.end_condition(&ins);
                }
                continue;
            }

            if in_condition {
                match opcode {
                    OR => {
                        if in_or {
                            self.visitor.end_or(position);
                        } else {
                            self.visitor.begin_or(position);
                        }
                        in_or = !in_or;
                    }
                    NOT => {
                        self.visitor.begin_not(position);
                        let test_position = self.cursor.position();
                        let test = self.cursor.u8()?;
                        self.test(test_position, test)?;
                        self.visitor.end_not(position);
                    }
                    _ => self.test(position, opcode)?,
                }
                continue;
            }

            if opcode == GOTO {
                let displacement = self.cursor.i16_le()?;
                let target = Self::branch_target(position + 1, displacement as u16);
                let ins = Self::marker(position, opcode, "goto", target);
                self.visitor.instruction(&ins);
                continue;
            }

            let info = self.set.command(opcode).ok_or_else(|| {
                ResourceError::corrupt(format!(
                    "unknown command {:#04x} at {:#06x}",
                    opcode, position
                ))
            })?;
            let ins = self.decoded(position, opcode, info)?;
            self.visitor.instruction(&ins);
        }

        if in_condition {
            debug!("logic: code ends inside a condition");
        }
        Ok(())
    }
}

/// Reports every message, then every condition and command of the code area, in order.
/// Operands are passed through raw; nothing is resolved against the message table.
pub fn decode_logic(data: &[u8], visitor: &mut dyn LogicVisitor) -> ResourceResult<()> {
    let code_end = read_u16_le(data, 0)? as usize + CODE_START;
    if code_end > data.len() {
        return Err(ResourceError::OutOfBounds {
            offset: CODE_START,
            wanted: code_end - CODE_START,
            length: data.len(),
        });
    }

    let messages = decode_messages(data)?;
    for (i, text) in messages.iter().enumerate() {
        visitor.message(i + 1, text);
    }
    debug!(
        "logic: {} code bytes, {} messages",
        code_end - CODE_START,
        messages.len()
    );

    let mut decoder = Decoder {
        cursor: ByteCursor::new(&data[CODE_START..code_end]),
        set: InstructionSet::standard(),
        visitor,
    };
    decoder.run()
}
