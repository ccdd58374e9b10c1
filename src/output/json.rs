// Tue Jan 13 2026 - Alex

use crate::diff::ScanDiff;
use crate::pattern::{MatchKind, ScanReport};
use crate::qpu::DecodedRecord;
use serde::Serialize;
use serde_json::{json, to_string, to_string_pretty, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub struct JsonSerializer {
    pretty_print: bool,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self { pretty_print: true }
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn fragment_value(
        &self,
        name: &str,
        total_words: usize,
        records: &[DecodedRecord],
    ) -> Result<Value, OutputError> {
        Ok(json!({
            "fragment": name,
            "size_words": total_words,
            "instructions": serde_json::to_value(records)?,
        }))
    }

    pub fn scan_value(&self, report: &ScanReport) -> Result<Value, OutputError> {
        Ok(json!({
            "start_word": report.start,
            "scanned_words": report.scanned_words,
            "epilogues": serde_json::to_value(&report.epilogues)?,
            "noops": serde_json::to_value(&report.noops)?,
        }))
    }

    pub fn diff_value(
        &self,
        round: usize,
        kind: MatchKind,
        diff: &ScanDiff,
    ) -> Result<Value, OutputError> {
        Ok(json!({
            "round": round,
            "kind": kind,
            "diff": serde_json::to_value(diff)?,
        }))
    }

    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, OutputError> {
        if self.pretty_print {
            Ok(to_string_pretty(value)?)
        } else {
            Ok(to_string(value)?)
        }
    }

    pub fn write_to<W, T>(&self, writer: W, value: &T) -> Result<(), OutputError>
    where
        W: Write,
        T: Serialize + ?Sized,
    {
        let mut writer = BufWriter::new(writer);
        writer.write_all(self.serialize(value)?.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to_file<T>(&self, path: &Path, value: &T) -> Result<(), OutputError>
    where
        T: Serialize + ?Sized,
    {
        self.write_to(File::create(path)?, value)
    }
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::new()
    }
}
