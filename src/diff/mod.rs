// Tue Jan 15 2026 - Alex

pub mod analyzer;

pub use analyzer::{ScanDiff, ScanChange};
