// Tue Jan 13 2026 - Alex

use crate::memory::{Word, WORD_SIZE};
use crate::qpu::{DecodedRecord, Instruction, INSTRUCTION_WORDS};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Epilogue,
    Noop,
}

/// A signature hit inside a scanned buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanMatch {
    /// Word index into the scanned buffer.
    pub offset: usize,
    pub kind: MatchKind,
    /// The words read at `offset`, as seen when the hit was confirmed.
    pub words: Vec<Word>,
    /// Instructions leading up to the hit, when requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<DecodedRecord>,
}

impl ScanMatch {
    pub fn new(offset: usize, kind: MatchKind, words: Vec<Word>) -> Self {
        Self {
            offset,
            kind,
            words,
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: Vec<DecodedRecord>) -> Self {
        self.context = context;
        self
    }

    pub fn byte_offset(&self) -> usize {
        self.offset * WORD_SIZE
    }

    pub fn instructions(&self) -> impl Iterator<Item = Instruction> + '_ {
        self.words
            .chunks_exact(INSTRUCTION_WORDS)
            .map(|pair| Instruction::new(pair[0], pair[1]))
    }
}
