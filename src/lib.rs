// Tue Jan 13 2026 - Alex

pub mod config;
pub mod memory;
pub mod qpu;
pub mod pattern;
pub mod diff;
pub mod output;
pub mod ui;

pub use config::Config;
pub use memory::{WordBuffer, WordSource};
pub use qpu::{classify_and_decode, decode_fragment, DecodedFields, Instruction, InstructionShape};
pub use pattern::{is_epilogue, is_noop, scan, scan_noops, FragmentScanner, ScanMatch};
pub use output::TextFormatter;
