// Tue Jan 13 2026 - Alex

pub mod words;
pub mod mmap;
pub mod vcmem;
pub mod error;

pub use words::{VolatileWords, Word, WordBuffer, WordSource, WORD_SIZE};
pub use mmap::MmapMemory;
pub use vcmem::{VcMem, VcMemInfo};
pub use error::MemoryError;
