// Wed Jan 15 2026 - Alex

use super::args::{Args, Command, DisArgs, ScanArgs};
use crate::config::Config;
use crate::diff::ScanDiff;
use crate::memory::{MmapMemory, VcMem, WordSource, WORD_SIZE};
use crate::output::{JsonSerializer, TextFormatter};
use crate::pattern::{FragmentScanner, MatchKind, ScanReport};
use crate::qpu::Fragment;
use crate::ui::progress::ProgressManager;
use anyhow::Context;
use colored::Colorize;
use log::{info, warn};
use std::io;
use std::thread;
use std::time::Duration;

pub struct CommandHandler {
    formatter: TextFormatter,
    json: JsonSerializer,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self {
            formatter: TextFormatter::new(),
            json: JsonSerializer::new(),
        }
    }

    pub fn execute(&self, args: Args) -> anyhow::Result<()> {
        self.setup_logging(&args)?;

        if args.no_color {
            colored::control::set_override(false);
        }

        let config = match &args.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };

        match args.command {
            Command::Dis(dis_args) => self.handle_dis(config, dis_args, args.json),
            Command::Scan(scan_args) => self.handle_scan(config, scan_args, args.json),
        }
    }

    fn setup_logging(&self, args: &Args) -> anyhow::Result<()> {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Warn,
        };

        env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp(None)
            .try_init()
            .context("Failed to initialise logging")?;

        Ok(())
    }

    fn handle_dis(&self, config: Config, args: DisArgs, json: bool) -> anyhow::Result<()> {
        let config = match args.header_words {
            Some(words) => config.with_header_words(words),
            None => config,
        };
        config.validate().map_err(|e| anyhow::anyhow!(e))?;

        let name = args.file.display().to_string();
        if !json && args.out.is_none() {
            println!("Disassembling {}", name);
        }

        let fragment = Fragment::load(&args.file, config.header_words)
            .with_context(|| format!("Couldn't read fragment {}", name))?;
        let records: Vec<_> = fragment.decode()?.collect();
        info!("Decoded {} instructions from {}", records.len(), name);

        if let Some(out) = &args.out {
            let value = self.json.fragment_value(&name, fragment.total_words(), &records)?;
            self.json
                .write_to_file(out, &value)
                .with_context(|| format!("Couldn't write {}", out.display()))?;
            eprintln!("{} Wrote {} records to {}", "[+]".green(), records.len(), out.display());
            return Ok(());
        }

        if json {
            let value = self.json.fragment_value(&name, fragment.total_words(), &records)?;
            self.json.write_to(io::stdout().lock(), &value)?;
            return Ok(());
        }

        println!("{}", self.formatter.fragment_header(&name, fragment.total_words()));
        for record in &records {
            println!("{}", self.formatter.format_record(record));
        }
        Ok(())
    }

    fn handle_scan(&self, config: Config, args: ScanArgs, json: bool) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let scan_noops = args.nops || config.scan_noops;
        let interval = args.rescan_interval.unwrap_or(config.rescan_interval_secs);
        let rounds = args.rounds.unwrap_or(config.rescan_rounds);
        let progress = config.progress && !args.no_progress && !json;

        let mut config = config
            .with_noops(scan_noops)
            .with_rescan(interval, rounds)
            .with_progress(progress);
        if let Some(device) = args.device.clone() {
            config = config.with_device(device);
        }
        if let Some(reserved) = args.reserved {
            config = config.with_reserved_bytes(reserved);
        }
        if let Some(context) = args.context {
            config = config.with_context(context);
        }
        config.validate().map_err(|e| anyhow::anyhow!(e))?;

        match &args.dump {
            Some(path) => {
                let image = MmapMemory::from_file(path)
                    .with_context(|| format!("Unable to map {}", path.display()))?;
                info!("Scanning image {} ({} bytes)", image.path().display(), image.size());
                let words = image.words()?;
                self.scan_source(&config, &words, image.size() as u64, args.start, json)
            }
            None => {
                let mem = VcMem::open(&config.device).with_context(|| {
                    format!("Unable to open {}, run as root", config.device.display())
                })?;
                let words = mem.words()?;
                self.scan_source(&config, &words, mem.size() as u64, args.start, json)
            }
        }
    }

    fn scan_source<S: WordSource + ?Sized>(
        &self,
        config: &Config,
        words: &S,
        total_bytes: u64,
        start: usize,
        json: bool,
    ) -> anyhow::Result<()> {
        if config.reserved_covers(total_bytes) {
            warn!(
                "Image of {} bytes lies inside the {} byte reserved tail, nothing to scan \
                 (use --reserved 0 for partial dumps)",
                total_bytes, config.reserved_bytes
            );
        }
        let scan_end = config.scan_length_words(total_bytes);
        let length = scan_end.saturating_sub(start);
        let scanner = FragmentScanner::new()
            .with_noops(config.scan_noops)
            .with_context(config.context_instructions);

        if !json {
            println!("Scanning for QPU code fragments...");
        }

        let mut previous = self.scan_once(config, &scanner, words, start, length)?;
        self.print_report(&previous, json)?;

        for round in 1..=config.rescan_rounds {
            thread::sleep(Duration::from_secs(config.rescan_interval_secs));
            let report = self.scan_once(config, &scanner, words, start, length)?;
            let epilogues = ScanDiff::between(&previous.epilogues, &report.epilogues);
            let noops = ScanDiff::between(&previous.noops, &report.noops);
            self.print_diff(round, MatchKind::Epilogue, &epilogues, json)?;
            if config.scan_noops {
                self.print_diff(round, MatchKind::Noop, &noops, json)?;
            }
            previous = report;
        }
        Ok(())
    }

    fn scan_once<S: WordSource + ?Sized>(
        &self,
        config: &Config,
        scanner: &FragmentScanner,
        words: &S,
        start: usize,
        length: usize,
    ) -> anyhow::Result<ScanReport> {
        let progress = ProgressManager::new().with_enabled(config.progress);
        let bar = progress.create(length as u64, "scanning");
        let report = scanner.run(words, start, length, |done| bar.set_position(done as u64));
        bar.finish_and_clear();
        Ok(report)
    }

    fn print_report(&self, report: &ScanReport, json: bool) -> anyhow::Result<()> {
        if json {
            let value = self.json.scan_value(report)?;
            self.json.write_to(io::stdout().lock(), &value)?;
            return Ok(());
        }

        for m in &report.epilogues {
            for record in &m.context {
                println!("    {}", self.formatter.format_record(record).dimmed());
            }
            println!("{}", self.formatter.format_match(m));
        }
        for m in &report.noops {
            println!("{} {}", self.formatter.format_match(m), "nop".dimmed());
        }
        eprintln!(
            "{} {} epilogue(s) in {} words",
            "[+]".green(),
            report.epilogues.len(),
            report.scanned_words
        );
        Ok(())
    }

    fn print_diff(
        &self,
        round: usize,
        kind: MatchKind,
        diff: &ScanDiff,
        json: bool,
    ) -> anyhow::Result<()> {
        if json {
            let value = self.json.diff_value(round, kind, diff)?;
            self.json.write_to(io::stdout().lock(), &value)?;
            return Ok(());
        }

        eprintln!("{} Rescan {} {:?}: {}", "[*]".blue(), round, kind, diff);
        for m in &diff.appeared {
            println!("{} {}", "+".green(), self.formatter.format_match(m));
        }
        for m in &diff.vanished {
            println!("{} {}", "-".red(), self.formatter.format_match(m));
        }
        for change in &diff.changed {
            println!(
                "{} {:08x}: {:08x?} -> {:08x?}",
                "~".yellow(),
                change.offset * WORD_SIZE,
                change.old_words,
                change.new_words
            );
        }
        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
