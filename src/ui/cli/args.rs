// Wed Jan 15 2026 - Alex

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "qpu-sniff")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Disassemble VideoCore IV QPU fragments and find QPU code in VideoCore memory", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    /// JSON config file; command-line flags override it
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub no_color: bool,

    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Disassemble a QPU fragment file
    Dis(DisArgs),
    /// Scan VideoCore memory (or a saved image of it) for QPU program epilogues
    Scan(ScanArgs),
}

#[derive(Parser, Debug)]
pub struct DisArgs {
    pub file: PathBuf,

    /// Header words to skip before the first instruction
    #[arg(long)]
    pub header_words: Option<usize>,

    /// Write the decoded records as JSON to FILE instead of printing them
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Memory device to map
    #[arg(short, long, conflicts_with = "dump")]
    pub device: Option<PathBuf>,

    /// Scan a saved memory image instead of the device
    #[arg(long)]
    pub dump: Option<PathBuf>,

    /// Bytes at the end of memory to leave unscanned
    #[arg(long)]
    pub reserved: Option<u64>,

    /// First word to scan
    #[arg(long, default_value = "0")]
    pub start: usize,

    /// Also report every canonical nop
    #[arg(long)]
    pub nops: bool,

    /// Instructions to decode before each epilogue
    #[arg(long)]
    pub context: Option<usize>,

    /// Seconds between rescans
    #[arg(long)]
    pub rescan_interval: Option<u64>,

    /// Rescans to run after the first scan, reporting differences
    #[arg(long)]
    pub rounds: Option<usize>,

    #[arg(long)]
    pub no_progress: bool,
}

impl ScanArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.rescan_interval == Some(0) {
            return Err("--rescan-interval must be greater than 0".to_string());
        }
        Ok(())
    }
}
