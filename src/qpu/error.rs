// Wed Jan 14 2026 - Alex

use crate::memory::MemoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Out of bounds: {requested} words requested, {available} available")]
    OutOfBounds { requested: usize, available: usize },
    #[error("Malformed length: {0} words is not a whole number of instructions")]
    MalformedLength(usize),
    #[error(transparent)]
    Memory(#[from] MemoryError),
}
