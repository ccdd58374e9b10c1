// Tue Jan 13 2026 - Alex

pub mod signature;
pub mod match_result;
pub mod scanner;

pub use signature::{
    epilogue_signature, is_epilogue, is_noop, EPILOGUE_HEAD, EPILOGUE_TAIL_I1, EPILOGUE_WORDS,
    NOOP_WORDS, QPU_NOP, SCAN_WINDOW_WORDS,
};
pub use match_result::{MatchKind, ScanMatch};
pub use scanner::{FragmentScanner, ScanReport, SignatureScan};

use crate::memory::WordSource;

/// Every program epilogue in `buffer[start..start + length]`.
pub fn scan<S: WordSource + ?Sized>(
    buffer: &S,
    start: usize,
    length: usize,
) -> SignatureScan<'_, S> {
    SignatureScan::new(buffer, MatchKind::Epilogue, start, length)
}

/// Every canonical nop in `buffer[start..start + length]`.
pub fn scan_noops<S: WordSource + ?Sized>(
    buffer: &S,
    start: usize,
    length: usize,
) -> SignatureScan<'_, S> {
    SignatureScan::new(buffer, MatchKind::Noop, start, length)
}
