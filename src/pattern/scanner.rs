// Tue Jan 13 2026 - Alex

use crate::memory::WordSource;
use crate::pattern::signature::{is_epilogue, is_noop, NOOP_WORDS, SCAN_WINDOW_WORDS};
use crate::pattern::{MatchKind, ScanMatch};
use crate::qpu::{decode_fragment, DecodedRecord, INSTRUCTION_WORDS};
use log::{debug, info, trace, warn};

/// Lazy, single-pass search of one buffer region for one signature.
///
/// Every offset in the region is tested on its own; hits that overlap are all
/// reported. Nothing at or past `start + length` is read.
pub struct SignatureScan<'a, S: WordSource + ?Sized> {
    buffer: &'a S,
    kind: MatchKind,
    offset: usize,
    end: usize,
}

impl<'a, S: WordSource + ?Sized> SignatureScan<'a, S> {
    pub fn new(buffer: &'a S, kind: MatchKind, start: usize, length: usize) -> Self {
        let end = start.saturating_add(length).min(buffer.len_words());
        Self {
            buffer,
            kind,
            offset: start,
            end,
        }
    }

    /// Words that must fit between an offset and the region end for the
    /// offset to be tested.
    pub fn window(&self) -> usize {
        match self.kind {
            MatchKind::Epilogue => SCAN_WINDOW_WORDS,
            MatchKind::Noop => NOOP_WORDS,
        }
    }

    fn match_at(&self, offset: usize) -> Option<ScanMatch> {
        let hit = match self.kind {
            MatchKind::Epilogue => is_epilogue(self.buffer, offset),
            MatchKind::Noop => is_noop(self.buffer, offset),
        };
        if !hit {
            return None;
        }
        // Re-read the window and confirm against the copy, so a hit torn by a
        // concurrent writer is dropped rather than reported with words that
        // do not match.
        let words = self.buffer.snapshot(offset, self.window()).ok()?;
        let confirmed = match self.kind {
            MatchKind::Epilogue => is_epilogue(&words[..], 0),
            MatchKind::Noop => is_noop(&words[..], 0),
        };
        if !confirmed {
            debug!("Discarding torn {:?} hit at word {:#x}", self.kind, offset);
            return None;
        }
        Some(ScanMatch::new(offset, self.kind, words))
    }
}

impl<'a, S: WordSource + ?Sized> Iterator for SignatureScan<'a, S> {
    type Item = ScanMatch;

    fn next(&mut self) -> Option<Self::Item> {
        let window = self.window();
        while self.offset.saturating_add(window) <= self.end {
            let offset = self.offset;
            self.offset += 1;
            if let Some(m) = self.match_at(offset) {
                trace!("{:?} at word {:#x}", m.kind, offset);
                return Some(m);
            }
        }
        self.offset = self.end;
        None
    }
}

/// Everything one pass over a region found.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub start: usize,
    pub scanned_words: usize,
    pub epilogues: Vec<ScanMatch>,
    pub noops: Vec<ScanMatch>,
}

impl ScanReport {
    pub fn total_matches(&self) -> usize {
        self.epilogues.len() + self.noops.len()
    }
}

/// Chunked driver over `SignatureScan` with optional no-op search and
/// decoded context for each epilogue.
pub struct FragmentScanner {
    chunk_words: usize,
    include_noops: bool,
    context_instructions: usize,
}

impl FragmentScanner {
    pub fn new() -> Self {
        Self {
            chunk_words: 0x10000,
            include_noops: false,
            context_instructions: 0,
        }
    }

    pub fn with_chunk_words(mut self, words: usize) -> Self {
        self.chunk_words = words.max(1);
        self
    }

    pub fn with_noops(mut self, include: bool) -> Self {
        self.include_noops = include;
        self
    }

    pub fn with_context(mut self, instructions: usize) -> Self {
        self.context_instructions = instructions;
        self
    }

    /// Scans `length` words from `start`, calling `on_progress` with the
    /// number of words covered after each chunk.
    pub fn run<S, F>(
        &self,
        buffer: &S,
        start: usize,
        length: usize,
        mut on_progress: F,
    ) -> ScanReport
    where
        S: WordSource + ?Sized,
        F: FnMut(usize),
    {
        let available = buffer.len_words().saturating_sub(start);
        if length > available {
            warn!(
                "Scan region of {} words from {:#x} exceeds buffer; clamping to {} words",
                length, start, available
            );
        }
        let length = length.min(available);
        let end = start + length;
        info!("Scanning {} words from word {:#x}", length, start);

        let mut report = ScanReport {
            start,
            scanned_words: length,
            ..Default::default()
        };

        let mut chunk_start = start;
        while chunk_start < end {
            let chunk_end = chunk_start.saturating_add(self.chunk_words).min(end);
            let chunk_len = chunk_end - chunk_start;

            // Extend each chunk by one window less a word so that every
            // offset is tested exactly once across chunks.
            let epilogue_len = (chunk_len + SCAN_WINDOW_WORDS - 1).min(end - chunk_start);
            for m in SignatureScan::new(buffer, MatchKind::Epilogue, chunk_start, epilogue_len) {
                let m = if self.context_instructions > 0 {
                    let context = self.context_for(buffer, start, m.offset);
                    m.with_context(context)
                } else {
                    m
                };
                report.epilogues.push(m);
            }

            if self.include_noops {
                let noop_len = (chunk_len + NOOP_WORDS - 1).min(end - chunk_start);
                report
                    .noops
                    .extend(SignatureScan::new(buffer, MatchKind::Noop, chunk_start, noop_len));
            }

            on_progress(chunk_end - start);
            chunk_start = chunk_end;
        }

        info!(
            "Found {} epilogue(s), {} nop(s)",
            report.epilogues.len(),
            report.noops.len()
        );
        report
    }

    /// Up to `context_instructions` instructions ending right before `offset`,
    /// never reaching below `floor`.
    fn context_for<S: WordSource + ?Sized>(
        &self,
        buffer: &S,
        floor: usize,
        offset: usize,
    ) -> Vec<DecodedRecord> {
        let pairs = ((offset - floor) / INSTRUCTION_WORDS).min(self.context_instructions);
        let base = offset - pairs * INSTRUCTION_WORDS;
        let words = match buffer.snapshot(base, pairs * INSTRUCTION_WORDS) {
            Ok(words) => words,
            Err(e) => {
                debug!("No context for hit at {:#x}: {}", offset, e);
                return Vec::new();
            }
        };
        match decode_fragment(&words[..], words.len()) {
            Ok(records) => records
                .map(|r| DecodedRecord { offset: base + r.offset, ..r })
                .collect(),
            Err(e) => {
                debug!("No context for hit at {:#x}: {}", offset, e);
                Vec::new()
            }
        }
    }
}

impl Default for FragmentScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Word;
    use crate::pattern::signature::{epilogue_signature, QPU_NOP};
    use crate::qpu::InstructionShape;
    use std::cell::Cell;

    fn plant(buf: &mut [Word], at: usize, tail: Word) {
        buf[at..at + SCAN_WINDOW_WORDS].copy_from_slice(&epilogue_signature(tail));
    }

    #[test]
    fn test_single_epilogue() {
        let mut buf = vec![0; 1000];
        plant(&mut buf, 100, 0x100009e7);
        let hits: Vec<_> =
            SignatureScan::new(&buf[..], MatchKind::Epilogue, 0, buf.len()).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].offset, 100);
        assert_eq!(hits[0].byte_offset(), 400);
        assert_eq!(hits[0].words.len(), SCAN_WINDOW_WORDS);
        assert_eq!(hits[0].instructions().count(), 6);
    }

    #[test]
    fn test_window_must_fit_before_end() {
        let mut buf = vec![0; 40];
        plant(&mut buf, 20, 0x500009e7);
        assert_eq!(SignatureScan::new(&buf[..], MatchKind::Epilogue, 0, 32).count(), 1);
        assert_eq!(SignatureScan::new(&buf[..], MatchKind::Epilogue, 0, 31).count(), 0);
        assert_eq!(SignatureScan::new(&buf[..], MatchKind::Epilogue, 21, 100).count(), 0);
    }

    #[test]
    fn test_noop_scan_reports_overlaps() {
        let buf: Vec<Word> = [QPU_NOP.words(), QPU_NOP.words()].concat();
        let offsets: Vec<_> = SignatureScan::new(&buf[..], MatchKind::Noop, 0, 4)
            .map(|m| m.offset)
            .collect();
        assert_eq!(offsets, vec![0, 2]);
    }

    #[test]
    fn test_chunked_run_matches_unchunked() {
        let mut buf = vec![0; 300];
        for &at in &[0usize, 15, 16, 60, 288] {
            plant(&mut buf, at, 0x100009e7);
        }
        let expected: Vec<_> = SignatureScan::new(&buf[..], MatchKind::Epilogue, 0, buf.len())
            .map(|m| m.offset)
            .collect();
        for chunk in [1, 7, 16, 64, 1000] {
            let report = FragmentScanner::new()
                .with_chunk_words(chunk)
                .run(&buf[..], 0, buf.len(), |_| {});
            let got: Vec<_> = report.epilogues.iter().map(|m| m.offset).collect();
            assert_eq!(got, expected, "chunk {}", chunk);
        }
    }

    #[test]
    fn test_run_clamps_and_reports_progress() {
        let mut buf = vec![0; 64];
        plant(&mut buf, 40, 0x100009e7);
        let mut last = 0;
        let report = FragmentScanner::new()
            .with_chunk_words(16)
            .with_noops(true)
            .run(&buf[..], 8, 1_000_000, |done| last = done);
        assert_eq!(report.scanned_words, 56);
        assert_eq!(last, 56);
        assert_eq!(report.epilogues.len(), 1);
        // The epilogue window holds five nops after its head.
        assert_eq!(report.noops.len(), 5);
    }

    #[test]
    fn test_context_stops_at_region_start() {
        let mut buf = vec![0; 64];
        buf[10] = 0x00000010;
        buf[11] = 0xe0000000;
        plant(&mut buf, 13, 0x100009e7);
        let report = FragmentScanner::new().with_context(4).run(&buf[..], 4, 60, |_| {});
        let context = &report.epilogues[0].context;
        // (13 - 4) / 2 = 4 pairs: words 5..13.
        assert_eq!(context.len(), 4);
        assert_eq!(context[0].offset, 5);
        assert_eq!(context[3].offset, 11);

        let report = FragmentScanner::new().with_context(1).run(&buf[..], 0, 64, |_| {});
        let context = &report.epilogues[0].context;
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].offset, 11);
        assert_eq!(context[0].instruction.i1, 0);
    }

    /// Returns a different value for one word on every read after the first.
    struct TornWords {
        words: Vec<Word>,
        flaky: usize,
        reads: Cell<usize>,
    }

    impl WordSource for TornWords {
        fn len_words(&self) -> usize {
            self.words.len()
        }

        fn read_word(&self, index: usize) -> Option<Word> {
            let w = *self.words.get(index)?;
            if index == self.flaky {
                let n = self.reads.get();
                self.reads.set(n + 1);
                if n > 0 {
                    return Some(w ^ 0xffff_ffff);
                }
            }
            Some(w)
        }
    }

    #[test]
    fn test_torn_window_is_not_reported() {
        let mut words = vec![0; 32];
        plant(&mut words, 4, 0x100009e7);
        let torn = TornWords {
            words,
            flaky: 7,
            reads: Cell::new(0),
        };
        assert_eq!(SignatureScan::new(&torn, MatchKind::Epilogue, 0, 32).count(), 0);
        assert!(torn.reads.get() >= 2);
    }

    #[test]
    fn test_torn_word_outside_signature_still_matches() {
        let mut words = vec![0; 32];
        plant(&mut words, 4, 0x100009e7);
        let torn = TornWords {
            words,
            flaky: 14,
            reads: Cell::new(0),
        };
        let hits: Vec<_> = SignatureScan::new(&torn, MatchKind::Epilogue, 0, 32).collect();
        assert_eq!(hits.len(), 1);
        let last = hits[0].instructions().nth(5).map(|i| i.shape());
        assert_eq!(last, Some(InstructionShape::AluOp));
    }
}
