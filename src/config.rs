// Tue Jan 13 2026 - Alex

use crate::memory::WORD_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Words of header in front of the instructions in a fragment file.
pub const FRAGMENT_HEADER_WORDS: usize = 8;

/// Bytes at the top of VideoCore memory holding start.elf and the buffers it
/// sets up early; not scanned.
pub const VC_MEM_IMAGE_RESERVED: u64 = 18_706_228;

pub const VC_MEM_DEVICE: &str = "/dev/vc-mem";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub header_words: usize,
    pub reserved_bytes: u64,
    pub device: PathBuf,
    pub scan_noops: bool,
    pub context_instructions: usize,
    pub rescan_interval_secs: u64,
    pub rescan_rounds: usize,
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header_words: FRAGMENT_HEADER_WORDS,
            reserved_bytes: VC_MEM_IMAGE_RESERVED,
            device: PathBuf::from(VC_MEM_DEVICE),
            scan_noops: false,
            context_instructions: 0,
            rescan_interval_secs: 15,
            rescan_rounds: 0,
            progress: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn with_header_words(mut self, words: usize) -> Self {
        self.header_words = words;
        self
    }

    pub fn with_reserved_bytes(mut self, bytes: u64) -> Self {
        self.reserved_bytes = bytes;
        self
    }

    pub fn with_device(mut self, device: PathBuf) -> Self {
        self.device = device;
        self
    }

    pub fn with_noops(mut self, scan_noops: bool) -> Self {
        self.scan_noops = scan_noops;
        self
    }

    pub fn with_context(mut self, instructions: usize) -> Self {
        self.context_instructions = instructions;
        self
    }

    pub fn with_rescan(mut self, interval_secs: u64, rounds: usize) -> Self {
        self.rescan_interval_secs = interval_secs;
        self.rescan_rounds = rounds;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Words of a `total_bytes` window left to scan once the reserved tail is
    /// excluded.
    pub fn scan_length_words(&self, total_bytes: u64) -> usize {
        (total_bytes.saturating_sub(self.reserved_bytes) / WORD_SIZE as u64) as usize
    }

    /// True when the reserved tail swallows the whole `total_bytes` window,
    /// as it does for dumps smaller than the firmware reservation.
    pub fn reserved_covers(&self, total_bytes: u64) -> bool {
        self.reserved_bytes > 0 && total_bytes <= self.reserved_bytes
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.rescan_rounds > 0 && self.rescan_interval_secs == 0 {
            return Err("rescan_interval_secs must be greater than 0 when rescanning".to_string());
        }
        if self.device.as_os_str().is_empty() {
            return Err("device must not be empty".to_string());
        }
        Ok(())
    }
}
