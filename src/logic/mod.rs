//! Logic resources: room scripts stored as bytecode with a trailing message table.

pub mod decoder;
pub mod disassembler;
pub mod instruction_set;

pub use decoder::{decode_logic, decode_messages};
pub use disassembler::LogicDisassembler;
pub use instruction_set::{InstructionSet, OpcodeInfo, OperandKind};

use std::fmt::{Display, Error, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub kind: OperandKind,
    pub value: u16,
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let v = self.value;
        match self.kind {
            OperandKind::Variable => write!(f, "v{}", v),
            OperandKind::Flag => write!(f, "f{}", v),
            OperandKind::FlagReference => write!(f, "f[v{}]", v),
            OperandKind::VariableReference => write!(f, "*v{}", v),
            OperandKind::Object => write!(f, "o{}", v),
            OperandKind::Inventory => write!(f, "i{}", v),
            OperandKind::Controller => write!(f, "c{}", v),
            OperandKind::String => write!(f, "s{}", v),
            OperandKind::Message => write!(f, "m{}", v),
            OperandKind::Word => write!(f, "w{}", v),
            OperandKind::Constant
            | OperandKind::View
            | OperandKind::Logic
            | OperandKind::Picture
            | OperandKind::Sound => write!(f, "{}", v),
        }
    }
}

/// One decoded command, test or control-flow marker.
///
/// `destination` equals `position` except for `goto` and the closing bracket of a
/// condition (`then`), where it is the branch target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub position: usize,
    pub opcode: u8,
    pub mnemonic: &'static str,
    pub operands: Vec<Operand>,
    pub destination: usize,
}

impl DecodedInstruction {
    pub fn is_branch(&self) -> bool {
        self.destination != self.position
    }
}

impl Display for DecodedInstruction {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{}", self.mnemonic)?;
        if !self.operands.is_empty() {
            let parts: Vec<String> = self.operands.iter().map(|o| o.to_string()).collect();
            write!(f, "({})", parts.join(", "))?;
        }
        Ok(())
    }
}

/// Receives the contents of a logic resource. Every hook defaults to doing nothing.
///
/// Messages are reported first, numbered from 1. A bracketed condition is reported as
/// `begin_condition`, `begin_and`, its tests, `end_and`, `end_condition`; tests may be
/// wrapped in `begin_not`/`end_not` or grouped by `begin_or`/`end_or`.
pub trait LogicVisitor {
    /// `index` is the message number as commands refer to it, starting at 1; an empty
    /// slot in the table is reported with empty text
    fn message(&mut self, _index: usize, _text: &str) {}
    fn begin_condition(&mut self, _marker: &DecodedInstruction) {}
    fn condition(&mut self, _test: &DecodedInstruction) {}
    fn end_condition(&mut self, _marker: &DecodedInstruction) {}
    fn begin_and(&mut self, _position: usize) {}
    fn end_and(&mut self, _position: usize) {}
    fn begin_or(&mut self, _position: usize) {}
    fn end_or(&mut self, _position: usize) {}
    fn begin_not(&mut self, _position: usize) {}
    fn end_not(&mut self, _position: usize) {}
    fn instruction(&mut self, _instruction: &DecodedInstruction) {}
}
