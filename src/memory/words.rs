// Wed Jan 14 2026 - Alex

use crate::memory::MemoryError;
use log::warn;
use std::fs;
use std::path::Path;

pub type Word = u32;

pub const WORD_SIZE: usize = 4;

/// A readable run of 32-bit words.
///
/// Every `read_word` is an independent load. Nothing is promised about two
/// reads of the same index returning the same value, or about a multi-word
/// window being read atomically: the backing memory may be written by another
/// agent (a running QPU, the VideoCore firmware) while we look at it. Callers
/// re-read instead of caching and treat inconsistent windows as non-matches.
pub trait WordSource {
    fn len_words(&self) -> usize;

    /// Returns `None` when `index` is past the end.
    fn read_word(&self, index: usize) -> Option<Word>;

    fn is_empty(&self) -> bool {
        self.len_words() == 0
    }

    /// Copies `count` words starting at `start`, one independent read per word.
    fn snapshot(&self, start: usize, count: usize) -> Result<Vec<Word>, MemoryError> {
        let len = self.len_words();
        let end = start
            .checked_add(count)
            .filter(|&end| end <= len)
            .ok_or(MemoryError::OutOfBounds { index: start.saturating_add(count), len })?;
        (start..end)
            .map(|i| self.read_word(i).ok_or(MemoryError::OutOfBounds { index: i, len }))
            .collect()
    }
}

impl WordSource for [Word] {
    fn len_words(&self) -> usize {
        self.len()
    }

    fn read_word(&self, index: usize) -> Option<Word> {
        self.get(index).copied()
    }
}

impl WordSource for Vec<Word> {
    fn len_words(&self) -> usize {
        self.len()
    }

    fn read_word(&self, index: usize) -> Option<Word> {
        self.get(index).copied()
    }
}

/// Owned, host-resident words, e.g. a fragment file read into memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBuffer {
    words: Vec<Word>,
}

impl WordBuffer {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// Little-endian words; a trailing partial word is dropped.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let tail = bytes.len() % WORD_SIZE;
        if tail != 0 {
            warn!("Dropping {} trailing byte(s) that do not form a whole word", tail);
        }
        let words = bytes
            .chunks_exact(WORD_SIZE)
            .map(|c| Word::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Self { words }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let bytes = fs::read(path.as_ref())?;
        Ok(Self::from_bytes(&bytes))
    }

    pub fn as_slice(&self) -> &[Word] {
        &self.words
    }

    pub fn into_inner(self) -> Vec<Word> {
        self.words
    }

    pub fn size_bytes(&self) -> usize {
        self.words.len() * WORD_SIZE
    }
}

impl WordSource for WordBuffer {
    fn len_words(&self) -> usize {
        self.words.len()
    }

    fn read_word(&self, index: usize) -> Option<Word> {
        self.words.get(index).copied()
    }
}

impl From<Vec<Word>> for WordBuffer {
    fn from(words: Vec<Word>) -> Self {
        Self::new(words)
    }
}

/// Word view over memory that someone else may be writing.
///
/// Reads go through `read_volatile` so the compiler neither elides nor merges
/// them; a value torn by a concurrent writer is just another word.
pub struct VolatileWords<'a> {
    ptr: *const Word,
    len: usize,
    _mapping: std::marker::PhantomData<&'a [u8]>,
}

impl<'a> VolatileWords<'a> {
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `len_bytes` bytes for `'a`.
    pub unsafe fn from_raw(ptr: *const u8, len_bytes: usize) -> Result<Self, MemoryError> {
        if (ptr as usize) % WORD_SIZE != 0 {
            return Err(MemoryError::Misaligned(ptr as usize));
        }
        Ok(Self {
            ptr: ptr as *const Word,
            len: len_bytes / WORD_SIZE,
            _mapping: std::marker::PhantomData,
        })
    }
}

impl WordSource for VolatileWords<'_> {
    fn len_words(&self) -> usize {
        self.len
    }

    fn read_word(&self, index: usize) -> Option<Word> {
        if index >= self.len {
            return None;
        }
        // In bounds and aligned per `from_raw`.
        Some(unsafe { std::ptr::read_volatile(self.ptr.add(index)) })
    }
}
