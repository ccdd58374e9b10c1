// Wed Jan 14 2026 - Alex

use serde::Serialize;
use std::fmt;

pub use crate::memory::Word;

/// Words per instruction.
pub const INSTRUCTION_WORDS: usize = 2;

pub const OP_BRANCH: u8 = 14;
pub const OP_IMMEDIATE: u8 = 15;

/// One 64-bit QPU instruction, stored as the two words it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Instruction {
    pub i0: Word,
    pub i1: Word,
}

impl Instruction {
    pub const fn new(i0: Word, i1: Word) -> Self {
        Self { i0, i1 }
    }

    /// The 4-bit opcode in `i1[31:28]`.
    pub const fn op(&self) -> u8 {
        ((self.i1 >> 28) & 0x0f) as u8
    }

    pub fn shape(&self) -> InstructionShape {
        InstructionShape::from_op(self.op())
    }

    pub fn words(&self) -> [Word; INSTRUCTION_WORDS] {
        [self.i0, self.i1]
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x} {:08x}", self.i0, self.i1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InstructionShape {
    AluOp,
    Branch,
    Immediate,
}

impl InstructionShape {
    /// Total over the 4-bit opcode; bits above the low nibble are ignored.
    pub fn from_op(op: u8) -> Self {
        match op & 0x0f {
            OP_BRANCH => InstructionShape::Branch,
            OP_IMMEDIATE => InstructionShape::Immediate,
            _ => InstructionShape::AluOp,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InstructionShape::AluOp => "alu",
            InstructionShape::Branch => "branch",
            InstructionShape::Immediate => "imm32",
        }
    }
}

impl fmt::Display for InstructionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Add/mul ALU operation (opcode 0-13).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AluOpFields {
    pub mulop: u8,
    pub addop: u8,
    pub ra: u8,
    pub rb: u8,
    pub adda: u8,
    pub addb: u8,
    pub mula: u8,
    pub mulb: u8,
    pub op: u8,
    pub packbits: u8,
    pub addcc: u8,
    pub mulcc: u8,
    #[serde(rename = "F")]
    pub f: u8,
    #[serde(rename = "X")]
    pub x: u8,
    pub wa: u8,
    pub wb: u8,
}

/// Branch (opcode 14). `unknown` is passed through as found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct BranchFields {
    pub addr: u32,
    pub unknown: u8,
    pub cond: u8,
    pub pcrel: u8,
    pub addreg: u8,
    pub ra: u8,
    #[serde(rename = "X")]
    pub x: u8,
    pub wa: u8,
    pub wb: u8,
}

/// 32-bit immediate load (opcode 15). `unknown` is passed through as found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ImmediateFields {
    pub data: u32,
    pub unknown: u8,
    pub addcc: u8,
    pub mulcc: u8,
    #[serde(rename = "F")]
    pub f: u8,
    #[serde(rename = "X")]
    pub x: u8,
    pub wa: u8,
    pub wb: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodedFields {
    AluOp(AluOpFields),
    Branch(BranchFields),
    Immediate(ImmediateFields),
}

impl DecodedFields {
    pub fn shape(&self) -> InstructionShape {
        match self {
            DecodedFields::AluOp(_) => InstructionShape::AluOp,
            DecodedFields::Branch(_) => InstructionShape::Branch,
            DecodedFields::Immediate(_) => InstructionShape::Immediate,
        }
    }
}
