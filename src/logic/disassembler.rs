use std::collections::BTreeMap;
use std::fmt::{Display, Error, Formatter};

use super::{DecodedInstruction, LogicVisitor};

struct Line {
    position: usize,
    depth: usize,
    text: String,
    target: Option<usize>,
}

/// Collects a decoded logic resource and renders it as a labelled listing
#[derive(Default)]
pub struct LogicDisassembler {
    messages: Vec<(usize, String)>,
    instructions: Vec<DecodedInstruction>,
    lines: Vec<Line>,
    depth: usize,
    negate: bool,
}

impl LogicDisassembler {
    pub fn new() -> LogicDisassembler {
        LogicDisassembler::default()
    }

    /// (number, text) pairs in message order
    pub fn messages(&self) -> &[(usize, String)] {
        &self.messages
    }

    /// Commands outside conditions, including `goto`
    pub fn instructions(&self) -> &[DecodedInstruction] {
        &self.instructions
    }

    fn push(&mut self, position: usize, text: String, target: Option<usize>) {
        self.lines.push(Line {
            position,
            depth: self.depth,
            text,
            target,
        });
    }

    /// Branch targets in ascending order, numbered from 1
    fn labels(&self) -> BTreeMap<usize, String> {
        let mut labels: BTreeMap<usize, String> =
            self.lines.iter().filter_map(|l| l.target).map(|t| (t, String::new())).collect();
        for (n, name) in labels.values_mut().enumerate() {
            *name = format!("L{}", n + 1);
        }
        labels
    }
}

impl LogicVisitor for LogicDisassembler {
    fn message(&mut self, index: usize, text: &str) {
        self.messages.push((index, text.to_string()));
    }

    fn begin_condition(&mut self, marker: &DecodedInstruction) {
        self.push(marker.position, "if (".to_string(), None);
        self.depth += 1;
    }

    fn condition(&mut self, test: &DecodedInstruction) {
        let prefix = if self.negate { "!" } else { "" };
        self.push(test.position, format!("{}{}", prefix, test), None);
    }

    fn end_condition(&mut self, marker: &DecodedInstruction) {
        self.depth = self.depth.saturating_sub(1);
        self.push(marker.position, ") else".to_string(), Some(marker.destination));
    }

    fn begin_or(&mut self, position: usize) {
        self.push(position, "or (".to_string(), None);
        self.depth += 1;
    }

    fn end_or(&mut self, position: usize) {
        self.depth = self.depth.saturating_sub(1);
        self.push(position, ")".to_string(), None);
    }

    fn begin_not(&mut self, _position: usize) {
        self.negate = true;
    }

    fn end_not(&mut self, _position: usize) {
        self.negate = false;
    }

    fn instruction(&mut self, instruction: &DecodedInstruction) {
        let target = if instruction.is_branch() {
            Some(instruction.destination)
        } else {
            None
        };
        self.push(instruction.position, instruction.to_string(), target);
        self.instructions.push(instruction.clone());
    }
}

impl Display for LogicDisassembler {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let labels = self.labels();
        let mut pending = labels.iter().peekable();

        for line in &self.lines {
            while let Some((_, name)) = pending.next_if(|(pos, _)| **pos <= line.position) {
                writeln!(f, "{}:", name)?;
            }
            write!(f, "{:04x}  {}{}", line.position, "    ".repeat(line.depth), line.text)?;
            match line.target.and_then(|t| labels.get(&t)) {
                Some(label) if line.text == ") else" => writeln!(f, " {}", label)?,
                Some(label) => writeln!(f, " -> {}", label)?,
                None => writeln!(f)?,
            }
        }
        // targets at or past the end of the code
        for (_, name) in pending {
            writeln!(f, "{}:", name)?;
        }

        if !self.messages.is_empty() {
            writeln!(f)?;
            writeln!(f, "messages:")?;
            for (n, text) in &self.messages {
                writeln!(f, "  m{} {:?}", n, text)?;
            }
        }
        Ok(())
    }
}
