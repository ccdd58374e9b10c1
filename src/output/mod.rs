// Tue Jan 13 2026 - Alex

pub mod formatter;
pub mod json;

pub use formatter::TextFormatter;
pub use json::{JsonSerializer, OutputError};
