// Wed Jan 14 2026 - Alex

pub mod instruction;
pub mod decoder;
pub mod encoding;
pub mod fragment;
pub mod error;

pub use instruction::{
    AluOpFields, BranchFields, DecodedFields, ImmediateFields, Instruction, InstructionShape, Word,
    INSTRUCTION_WORDS, OP_BRANCH, OP_IMMEDIATE,
};
pub use decoder::{DecodedRecord, FragmentDecoder, InstructionDecoder};
pub use fragment::{load_fragment, Fragment};
pub use error::DecodeError;

use crate::memory::WordSource;

pub fn classify_and_decode(i0: Word, i1: Word) -> (InstructionShape, DecodedFields) {
    InstructionDecoder::decode(i0, i1)
}

/// Decodes the first `length` words of `words` as instructions.
///
/// `length` must be even and no larger than the buffer; nothing is truncated.
pub fn decode_fragment<S: WordSource + ?Sized>(
    words: &S,
    length: usize,
) -> Result<FragmentDecoder<'_, S>, DecodeError> {
    FragmentDecoder::new(words, length)
}
