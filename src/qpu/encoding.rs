// Thu Jan 15 2026 - Alex

//! Packs field records back into instruction words.
//!
//! Each field is masked to its width, so out-of-range values lose their high
//! bits rather than corrupting neighbouring fields. `AluOpFields::op` is
//! packed as given; an `op` of 14 or 15 produces a pair that decodes as a
//! branch or immediate instead.

use super::{
    AluOpFields, BranchFields, DecodedFields, ImmediateFields, Instruction, Word, OP_BRANCH,
    OP_IMMEDIATE,
};

#[inline]
fn put(value: u8, width: u32, shift: u32) -> Word {
    ((value as Word) & ((1 << width) - 1)) << shift
}

impl AluOpFields {
    pub fn encode(&self) -> Instruction {
        let i0 = put(self.mulop, 3, 29)
            | put(self.addop, 5, 24)
            | put(self.ra, 6, 18)
            | put(self.rb, 6, 12)
            | put(self.adda, 3, 9)
            | put(self.addb, 3, 6)
            | put(self.mula, 3, 3)
            | put(self.mulb, 3, 0);
        let i1 = put(self.op, 4, 28)
            | put(self.packbits, 8, 20)
            | put(self.addcc, 3, 17)
            | put(self.mulcc, 3, 14)
            | put(self.f, 1, 13)
            | put(self.x, 1, 12)
            | put(self.wa, 6, 6)
            | put(self.wb, 6, 0);
        Instruction::new(i0, i1)
    }
}

impl BranchFields {
    pub fn encode(&self) -> Instruction {
        let i1 = put(OP_BRANCH, 4, 28)
            | put(self.unknown, 4, 24)
            | put(self.cond, 4, 20)
            | put(self.pcrel, 1, 19)
            | put(self.addreg, 1, 18)
            | put(self.ra, 5, 13)
            | put(self.x, 1, 12)
            | put(self.wa, 6, 6)
            | put(self.wb, 6, 0);
        Instruction::new(self.addr, i1)
    }
}

impl ImmediateFields {
    pub fn encode(&self) -> Instruction {
        let i1 = put(OP_IMMEDIATE, 4, 28)
            | put(self.unknown, 8, 20)
            | put(self.addcc, 3, 17)
            | put(self.mulcc, 3, 14)
            | put(self.f, 1, 13)
            | put(self.x, 1, 12)
            | put(self.wa, 6, 6)
            | put(self.wb, 6, 0);
        Instruction::new(self.data, i1)
    }
}

impl DecodedFields {
    pub fn encode(&self) -> Instruction {
        match self {
            DecodedFields::AluOp(a) => a.encode(),
            DecodedFields::Branch(b) => b.encode(),
            DecodedFields::Immediate(i) => i.encode(),
        }
    }
}
