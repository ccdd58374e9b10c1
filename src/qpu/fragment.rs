// Thu Jan 15 2026 - Alex

use super::{DecodeError, FragmentDecoder, Word, INSTRUCTION_WORDS};
use crate::memory::{WordBuffer, WordSource};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// The instruction payload of a QPU fragment file, header already stripped.
#[derive(Debug, Clone)]
pub struct Fragment {
    path: Option<PathBuf>,
    total_words: usize,
    header_words: usize,
    payload: Vec<Word>,
}

impl Fragment {
    /// Splits `header_words` off the front of `words`.
    pub fn from_words(words: Vec<Word>, header_words: usize) -> Result<Self, DecodeError> {
        let total_words = words.len();
        if header_words > total_words {
            return Err(DecodeError::OutOfBounds {
                requested: header_words,
                available: total_words,
            });
        }
        let payload = words[header_words..].to_vec();
        Ok(Self {
            path: None,
            total_words,
            header_words,
            payload,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P, header_words: usize) -> Result<Self, DecodeError> {
        let buffer = WordBuffer::from_file(path.as_ref())?;
        debug!(
            "Loaded {} ({} bytes, {} words)",
            path.as_ref().display(),
            buffer.size_bytes(),
            buffer.len_words()
        );
        let mut fragment = Self::from_words(buffer.into_inner(), header_words)?;
        fragment.path = Some(path.as_ref().to_path_buf());
        Ok(fragment)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// File size in words, header included.
    pub fn total_words(&self) -> usize {
        self.total_words
    }

    pub fn header_words(&self) -> usize {
        self.header_words
    }

    pub fn words(&self) -> &[Word] {
        &self.payload
    }

    /// Payload length rounded down to whole instructions.
    pub fn instruction_words(&self) -> usize {
        self.payload.len() - self.payload.len() % INSTRUCTION_WORDS
    }

    /// Decodes every whole instruction in the payload.
    ///
    /// A trailing unpaired word is reported and left out; it cannot be
    /// decoded without reading past the file.
    pub fn decode(&self) -> Result<FragmentDecoder<'_, [Word]>, DecodeError> {
        let length = self.instruction_words();
        if length != self.payload.len() {
            warn!(
                "Fragment {} has an unpaired trailing word {:08x}; not decoded",
                self.path.as_deref().map(|p| p.display().to_string()).unwrap_or_default(),
                self.payload[length]
            );
        }
        FragmentDecoder::new(self.words(), length)
    }
}

pub fn load_fragment<P: AsRef<Path>>(
    path: P,
    header_words: usize,
) -> Result<Fragment, DecodeError> {
    Fragment::load(path, header_words)
}
