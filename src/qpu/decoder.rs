// Wed Jan 14 2026 - Alex

use super::{
    AluOpFields, BranchFields, DecodeError, DecodedFields, ImmediateFields, Instruction,
    InstructionShape, Word, INSTRUCTION_WORDS,
};
use crate::memory::WordSource;
use serde::Serialize;

pub struct InstructionDecoder;

impl InstructionDecoder {
    /// Never fails: every pair of words is some instruction.
    pub fn decode(i0: Word, i1: Word) -> (InstructionShape, DecodedFields) {
        let inst = Instruction::new(i0, i1);
        let fields = match inst.shape() {
            InstructionShape::AluOp => DecodedFields::AluOp(Self::decode_alu(i0, i1)),
            InstructionShape::Branch => DecodedFields::Branch(Self::decode_branch(i0, i1)),
            InstructionShape::Immediate => DecodedFields::Immediate(Self::decode_imm32(i0, i1)),
        };
        (fields.shape(), fields)
    }

    fn decode_alu(i0: Word, i1: Word) -> AluOpFields {
        AluOpFields {
            mulop: ((i0 >> 29) & 0x07) as u8,
            addop: ((i0 >> 24) & 0x1f) as u8,
            ra: ((i0 >> 18) & 0x3f) as u8,
            rb: ((i0 >> 12) & 0x3f) as u8,
            adda: ((i0 >> 9) & 0x07) as u8,
            addb: ((i0 >> 6) & 0x07) as u8,
            mula: ((i0 >> 3) & 0x07) as u8,
            mulb: (i0 & 0x07) as u8,
            op: ((i1 >> 28) & 0x0f) as u8,
            packbits: ((i1 >> 20) & 0xff) as u8,
            addcc: ((i1 >> 17) & 0x07) as u8,
            mulcc: ((i1 >> 14) & 0x07) as u8,
            f: ((i1 >> 13) & 0x01) as u8,
            x: ((i1 >> 12) & 0x01) as u8,
            wa: ((i1 >> 6) & 0x3f) as u8,
            wb: (i1 & 0x3f) as u8,
        }
    }

    fn decode_branch(i0: Word, i1: Word) -> BranchFields {
        BranchFields {
            addr: i0,
            unknown: ((i1 >> 24) & 0x0f) as u8,
            cond: ((i1 >> 20) & 0x0f) as u8,
            pcrel: ((i1 >> 19) & 0x01) as u8,
            addreg: ((i1 >> 18) & 0x01) as u8,
            ra: ((i1 >> 13) & 0x1f) as u8,
            x: ((i1 >> 12) & 0x01) as u8,
            wa: ((i1 >> 6) & 0x3f) as u8,
            wb: (i1 & 0x3f) as u8,
        }
    }

    fn decode_imm32(i0: Word, i1: Word) -> ImmediateFields {
        ImmediateFields {
            data: i0,
            unknown: ((i1 >> 20) & 0xff) as u8,
            addcc: ((i1 >> 17) & 0x07) as u8,
            mulcc: ((i1 >> 14) & 0x07) as u8,
            f: ((i1 >> 13) & 0x01) as u8,
            x: ((i1 >> 12) & 0x01) as u8,
            wa: ((i1 >> 6) & 0x3f) as u8,
            wb: (i1 & 0x3f) as u8,
        }
    }
}

/// One instruction of a fragment, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecodedRecord {
    /// Word offset of `i0` from the start of the decoded buffer.
    pub offset: usize,
    pub instruction: Instruction,
    pub shape: InstructionShape,
    pub fields: DecodedFields,
}

impl DecodedRecord {
    pub fn decode(offset: usize, instruction: Instruction) -> Self {
        let (shape, fields) = InstructionDecoder::decode(instruction.i0, instruction.i1);
        Self {
            offset,
            instruction,
            shape,
            fields,
        }
    }
}

/// Lazily decodes `length` words, two at a time, from the start of a buffer.
pub struct FragmentDecoder<'a, S: WordSource + ?Sized> {
    words: &'a S,
    offset: usize,
    end: usize,
}

impl<'a, S: WordSource + ?Sized> FragmentDecoder<'a, S> {
    /// Rejects odd lengths and lengths past the end of `words` up front so the
    /// iterator itself never has to truncate.
    pub fn new(words: &'a S, length: usize) -> Result<Self, DecodeError> {
        if length % INSTRUCTION_WORDS != 0 {
            return Err(DecodeError::MalformedLength(length));
        }
        let available = words.len_words();
        if length > available {
            return Err(DecodeError::OutOfBounds {
                requested: length,
                available,
            });
        }
        Ok(Self {
            words,
            offset: 0,
            end: length,
        })
    }

    pub fn remaining(&self) -> usize {
        (self.end - self.offset) / INSTRUCTION_WORDS
    }
}

impl<'a, S: WordSource + ?Sized> Iterator for FragmentDecoder<'a, S> {
    type Item = DecodedRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.end {
            return None;
        }
        // Both indices are below `end`, which was checked against the buffer.
        let i0 = self.words.read_word(self.offset)?;
        let i1 = self.words.read_word(self.offset + 1)?;
        let record = DecodedRecord::decode(self.offset, Instruction::new(i0, i1));
        self.offset += INSTRUCTION_WORDS;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mulop_only() {
        let (shape, fields) = InstructionDecoder::decode(0xE0000000, 0x00000000);
        assert_eq!(shape, InstructionShape::AluOp);
        match fields {
            DecodedFields::AluOp(a) => {
                assert_eq!(a.mulop, 7);
                assert_eq!(
                    AluOpFields { mulop: 0, ..a },
                    AluOpFields::default()
                );
            }
            other => panic!("expected alu op, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_nop() {
        let (shape, fields) = InstructionDecoder::decode(0x009e7000, 0x100009e7);
        assert_eq!(shape, InstructionShape::AluOp);
        let DecodedFields::AluOp(a) = fields else {
            panic!("expected alu op");
        };
        assert_eq!(a.op, 1);
        assert_eq!(a.ra, 39);
        assert_eq!(a.rb, 39);
        assert_eq!(a.wa, 39);
        assert_eq!(a.wb, 39);
        assert_eq!(a.addop, 0);
        assert_eq!(a.mulop, 0);
    }

    #[test]
    fn test_decode_branch_fields() {
        // op=14, unknown=0x3, cond=9, pcrel, !addreg, ra=0x15, X, wa=0x2a, wb=0x15
        let i1 = (0xe << 28)
            | (0x3 << 24)
            | (9 << 20)
            | (1 << 19)
            | (0x15 << 13)
            | (1 << 12)
            | (0x2a << 6)
            | 0x15;
        let (shape, fields) = InstructionDecoder::decode(0x12345678, i1);
        assert_eq!(shape, InstructionShape::Branch);
        assert_eq!(
            fields,
            DecodedFields::Branch(BranchFields {
                addr: 0x12345678,
                unknown: 3,
                cond: 9,
                pcrel: 1,
                addreg: 0,
                ra: 0x15,
                x: 1,
                wa: 0x2a,
                wb: 0x15,
            })
        );
    }

    #[test]
    fn test_decode_imm32_fields() {
        let (shape, fields) = InstructionDecoder::decode(0xdeadbeef, 0xfa5ea9e7);
        assert_eq!(shape, InstructionShape::Immediate);
        let DecodedFields::Immediate(imm) = fields else {
            panic!("expected immediate");
        };
        assert_eq!(imm.data, 0xdeadbeef);
        assert_eq!(imm.unknown, 0xa5);
        assert_eq!(imm.addcc, 7);
        assert_eq!(imm.mulcc, 2);
        assert_eq!(imm.f, 1);
        assert_eq!(imm.x, 0);
        assert_eq!(imm.wa, 39);
        assert_eq!(imm.wb, 39);
    }

    #[test]
    fn test_fragment_decoder_offsets() {
        let words: Vec<Word> = vec![0x009e7000, 0x100009e7, 0, 0xe0000000, 1, 0xf0000000];
        let records: Vec<_> = FragmentDecoder::new(&words[..], 6).unwrap().collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].offset, 0);
        assert_eq!(records[1].offset, 2);
        assert_eq!(records[1].shape, InstructionShape::Branch);
        assert_eq!(records[2].offset, 4);
        assert_eq!(records[2].shape, InstructionShape::Immediate);
    }

    #[test]
    fn test_fragment_decoder_prefix_only() {
        let words: Vec<Word> = vec![0; 8];
        let decoder = FragmentDecoder::new(&words[..], 4).unwrap();
        assert_eq!(decoder.size_hint(), (2, Some(2)));
        assert_eq!(decoder.count(), 2);
    }

    #[test]
    fn test_fragment_decoder_rejects_bad_lengths() {
        let words: Vec<Word> = vec![0; 4];
        assert!(FragmentDecoder::new(&words[..], 0).unwrap().next().is_none());
        assert!(matches!(
            FragmentDecoder::new(&words[..], 3),
            Err(DecodeError::MalformedLength(3))
        ));
        assert!(matches!(
            FragmentDecoder::new(&words[..], 6),
            Err(DecodeError::OutOfBounds { requested: 6, available: 4 })
        ));
    }
}
