// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Out of bounds: word {index} not within {len} words")]
    OutOfBounds { index: usize, len: usize },
    #[error("ioctl {request} failed on {device}: {source}")]
    DeviceIoctl {
        device: String,
        request: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("mmap of {size} bytes failed on {device}: {source}")]
    MapFailed {
        device: String,
        size: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("Alignment error: mapping at {0:#x} not aligned to 4 bytes")]
    Misaligned(usize),
    #[error("Not supported: {0}")]
    NotSupported(String),
}
