//! Opcode tables for logic bytecode: one for commands, one for the tests that may appear
//! inside a bracketed condition. Operand kinds only label the raw bytes; nothing here
//! evaluates them.

use std::fmt::{Display, Error, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Variable,
    Constant,
    Flag,
    /// a variable holding a flag number
    FlagReference,
    /// a variable holding a variable number
    VariableReference,
    Object,
    Inventory,
    Controller,
    String,
    View,
    Logic,
    Picture,
    Message,
    Sound,
    Word,
}

impl OperandKind {
    /// Bytes the operand occupies in the bytecode
    pub fn width(&self) -> usize {
        match self {
            OperandKind::Word => 2,
            _ => 1,
        }
    }
}

impl Display for OperandKind {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let name = match self {
            OperandKind::Variable => "var",
            OperandKind::Constant => "num",
            OperandKind::Flag => "flag",
            OperandKind::FlagReference => "flag-ref",
            OperandKind::VariableReference => "var-ref",
            OperandKind::Object => "obj",
            OperandKind::Inventory => "item",
            OperandKind::Controller => "ctl",
            OperandKind::String => "str",
            OperandKind::View => "view",
            OperandKind::Logic => "logic",
            OperandKind::Picture => "pic",
            OperandKind::Message => "msg",
            OperandKind::Sound => "sound",
            OperandKind::Word => "word",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub name: &'static str,
    pub operands: &'static [OperandKind],
    /// `said`: a count byte followed by that many 16-bit word numbers
    pub word_list: bool,
}

const V: OperandKind = OperandKind::Variable;
const N: OperandKind = OperandKind::Constant;
const F: OperandKind = OperandKind::Flag;
const FR: OperandKind = OperandKind::FlagReference;
const VR: OperandKind = OperandKind::VariableReference;
const O: OperandKind = OperandKind::Object;
const I: OperandKind = OperandKind::Inventory;
const C: OperandKind = OperandKind::Controller;
const S: OperandKind = OperandKind::String;
const VW: OperandKind = OperandKind::View;
const L: OperandKind = OperandKind::Logic;
const M: OperandKind = OperandKind::Message;
const SN: OperandKind = OperandKind::Sound;

#[rustfmt::skip]
const COMMANDS: [(&str, &[OperandKind]); 0xb7] = [
    ("return", &[]),                       // 00
    ("increment", &[V]),
    ("decrement", &[V]),
    ("assignn", &[V, N]),
    ("assignv", &[V, V]),
    ("addn", &[V, N]),
    ("addv", &[V, V]),
    ("subn", &[V, N]),
    ("subv", &[V, V]),
    ("lindirectv", &[VR, V]),
    ("rindirect", &[V, VR]),
    ("lindirectn", &[VR, N]),
    ("set", &[F]),
    ("reset", &[F]),
    ("toggle", &[F]),
    ("set.v", &[FR]),
    ("reset.v", &[FR]),                    // 10
    ("toggle.v", &[FR]),
    ("new.room", &[L]),
    ("new.room.v", &[V]),
    ("load.logics", &[L]),
    ("load.logics.v", &[V]),
    ("call", &[L]),
    ("call.v", &[V]),
    ("load.pic", &[V]),
    ("draw.pic", &[V]),
    ("show.pic", &[]),
    ("discard.pic", &[V]),
    ("overlay.pic", &[V]),
    ("show.pri.screen", &[]),
    ("load.view", &[VW]),
    ("load.view.v", &[V]),
    ("discard.view", &[VW]),               // 20
    ("animate.obj", &[O]),
    ("unanimate.all", &[]),
    ("draw", &[O]),
    ("erase", &[O]),
    ("position", &[O, N, N]),
    ("position.v", &[O, V, V]),
    ("get.posn", &[O, VR, VR]),
    ("reposition", &[O, V, V]),
    ("set.view", &[O, VW]),
    ("set.view.v", &[O, V]),
    ("set.loop", &[O, N]),
    ("set.loop.v", &[O, V]),
    ("fix.loop", &[O]),
    ("release.loop", &[O]),
    ("set.cel", &[O, N]),
    ("set.cel.v", &[O, V]),                // 30
    ("last.cel", &[O, V]),
    ("current.cel", &[O, V]),
    ("current.loop", &[O, V]),
    ("current.view", &[O, V]),
    ("number.of.loops", &[O, V]),
    ("set.priority", &[O, N]),
    ("set.priority.v", &[O, V]),
    ("release.priority", &[O]),
    ("get.priority", &[O, V]),
    ("stop.update", &[O]),
    ("start.update", &[O]),
    ("force.update", &[O]),
    ("ignore.horizon", &[O]),
    ("observe.horizon", &[O]),
    ("set.horizon", &[N]),
    ("object.on.water", &[O]),             // 40
    ("object.on.land", &[O]),
    ("object.on.anything", &[O]),
    ("ignore.objs", &[O]),
    ("observe.objs", &[O]),
    ("distance", &[O, O, V]),
    ("stop.cycling", &[O]),
    ("start.cycling", &[O]),
    ("normal.cycle", &[O]),
    ("end.of.loop", &[O, F]),
    ("reverse.cycle", &[O]),
    ("reverse.loop", &[O, F]),
    ("cycle.time", &[O, V]),
    ("stop.motion", &[O]),
    ("start.motion", &[O]),
    ("step.size", &[O, V]),
    ("step.time", &[O, V]),                // 50
    ("move.obj", &[O, N, N, N, F]),
    ("move.obj.v", &[O, V, V, V, F]),
    ("follow.ego", &[O, N, F]),
    ("wander", &[O]),
    ("normal.motion", &[O]),
    ("set.dir", &[O, V]),
    ("get.dir", &[O, V]),
    ("ignore.blocks", &[O]),
    ("observe.blocks", &[O]),
    ("block", &[N, N, N, N]),
    ("unblock", &[]),
    ("get", &[I]),
    ("get.v", &[V]),
    ("drop", &[I]),
    ("put", &[I, V]),
    ("put.v", &[V, V]),                    // 60
    ("get.room.v", &[V, V]),
    ("load.sound", &[SN]),
    ("sound", &[SN, F]),
    ("stop.sound", &[]),
    ("print", &[M]),
    ("print.v", &[V]),
    ("display", &[N, N, M]),
    ("display.v", &[V, V, V]),
    ("clear.lines", &[N, N, N]),
    ("text.screen", &[]),
    ("graphics", &[]),
    ("set.cursor.char", &[M]),
    ("set.text.attribute", &[N, N]),
    ("shake.screen", &[N]),
    ("configure.screen", &[N, N, N]),
    ("status.line.on", &[]),               // 70
    ("status.line.off", &[]),
    ("set.string", &[S, M]),
    ("get.string", &[S, M, N, N, N]),
    ("word.to.string", &[S, N]),
    ("parse", &[S]),
    ("get.num", &[M, V]),
    ("prevent.input", &[]),
    ("accept.input", &[]),
    ("set.key", &[N, N, C]),
    ("add.to.pic", &[VW, N, N, N, N, N, N]),
    ("add.to.pic.v", &[V, V, V, V, V, V, V]),
    ("status", &[]),
    ("save.game", &[]),
    ("restore.game", &[]),
    ("init.disk", &[]),
    ("restart.game", &[]),                 // 80
    ("show.obj", &[VW]),
    ("random", &[N, N, V]),
    ("program.control", &[]),
    ("player.control", &[]),
    ("obj.status.v", &[V]),
    ("quit", &[N]),
    ("show.mem", &[]),
    ("pause", &[]),
    ("echo.line", &[]),
    ("cancel.line", &[]),
    ("init.joy", &[]),
    ("toggle.monitor", &[]),
    ("version", &[]),
    ("script.size", &[N]),
    ("set.game.id", &[M]),
    ("log", &[M]),                         // 90
    ("set.scan.start", &[]),
    ("reset.scan.start", &[]),
    ("reposition.to", &[O, N, N]),
    ("reposition.to.v", &[O, V, V]),
    ("trace.on", &[]),
    ("trace.info", &[L, N, N]),
    ("print.at", &[M, N, N, N]),
    ("print.at.v", &[V, N, N, N]),
    ("discard.view.v", &[V]),
    ("clear.text.rect", &[N, N, N, N, N]),
    ("set.upper.left", &[N, N]),
    ("set.menu", &[M]),
    ("set.menu.item", &[M, C]),
    ("submit.menu", &[]),
    ("enable.item", &[C]),
    ("disable.item", &[C]),                // a0
    ("menu.input", &[]),
    ("show.obj.v", &[V]),
    ("open.dialogue", &[]),
    ("close.dialogue", &[]),
    ("mul.n", &[V, N]),
    ("mul.v", &[V, V]),
    ("div.n", &[V, N]),
    ("div.v", &[V, V]),
    ("close.window", &[]),
    ("set.simple", &[S]),
    ("push.script", &[]),
    ("pop.script", &[]),
    ("hold.key", &[]),
    ("set.pri.base", &[N]),
    ("discard.sound", &[SN]),
    ("hide.mouse", &[]),                   // b0
    ("allow.menu", &[N]),
    ("show.mouse", &[]),
    ("fence.mouse", &[N, N, N, N]),
    ("mouse.posn", &[V, V]),
    ("release.key", &[]),
    ("adj.ego.move.to.x.y", &[]),
];

#[rustfmt::skip]
const CONDITIONS: [(&str, &[OperandKind]); 0x14] = [
    ("false", &[]),                        // 00
    ("equaln", &[V, N]),
    ("equalv", &[V, V]),
    ("lessn", &[V, N]),
    ("lessv", &[V, V]),
    ("greatern", &[V, N]),
    ("greaterv", &[V, V]),
    ("isset", &[F]),
    ("issetv", &[FR]),
    ("has", &[I]),
    ("obj.in.room", &[I, V]),
    ("posn", &[O, N, N, N, N]),
    ("controller", &[C]),
    ("have.key", &[]),
    ("said", &[]),
    ("compare.strings", &[S, S]),
    ("obj.in.box", &[O, N, N, N, N]),      // 10
    ("center.posn", &[O, N, N, N, N]),
    ("right.posn", &[O, N, N, N, N]),
    ("in.motion.using.mouse", &[]),
];

const SAID: u8 = 0x0e;

pub struct InstructionSet {
    commands: Vec<OpcodeInfo>,
    conditions: Vec<OpcodeInfo>,
}

lazy_static! {
    static ref STANDARD: InstructionSet = InstructionSet {
        commands: COMMANDS
            .iter()
            .map(|&(name, operands)| OpcodeInfo {
                name,
                operands,
                word_list: false,
            })
            .collect(),
        conditions: CONDITIONS
            .iter()
            .enumerate()
            .map(|(op, &(name, operands))| OpcodeInfo {
                name,
                operands,
                word_list: op == SAID as usize,
            })
            .collect(),
    };
}

impl InstructionSet {
    /// The command and condition tables shared by v2 and v3 interpreters
    pub fn standard() -> &'static InstructionSet {
        &STANDARD
    }

    pub fn command(&self, opcode: u8) -> Option<&OpcodeInfo> {
        self.commands.get(opcode as usize)
    }

    pub fn condition(&self, opcode: u8) -> Option<&OpcodeInfo> {
        self.conditions.get(opcode as usize)
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    pub fn command_by_name(&self, name: &str) -> Option<(u8, &OpcodeInfo)> {
        self.commands
            .iter()
            .enumerate()
            .find(|(_, info)| info.name == name)
            .map(|(op, info)| (op as u8, info))
    }
}
