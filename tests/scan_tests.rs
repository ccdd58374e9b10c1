use qpu_sniff::memory::{Word, WordSource};
use qpu_sniff::pattern::{
    epilogue_signature, scan, scan_noops, FragmentScanner, MatchKind, SCAN_WINDOW_WORDS,
};
use std::cell::Cell;

fn zeroed_with(at: &[usize], len: usize) -> Vec<Word> {
    let mut buf = vec![0; len];
    for &offset in at {
        buf[offset..offset + SCAN_WINDOW_WORDS].copy_from_slice(&epilogue_signature(0x100009e7));
    }
    buf
}

#[test]
fn test_one_embedded_epilogue() {
    let buf = zeroed_with(&[100], 4096);
    let hits: Vec<_> = scan(&buf[..], 0, buf.len()).collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].offset, 100);
    assert_eq!(hits[0].kind, MatchKind::Epilogue);
    assert_eq!(hits[0].words, epilogue_signature(0x100009e7).to_vec());
}

#[test]
fn test_two_embedded_epilogues() {
    let buf = zeroed_with(&[100, 150], 4096);
    let offsets: Vec<_> = scan(&buf[..], 0, buf.len()).map(|m| m.offset).collect();
    assert_eq!(offsets, vec![100, 150]);
}

#[test]
fn test_scan_respects_start_and_length() {
    let buf = zeroed_with(&[100, 150], 4096);
    let offsets: Vec<_> = scan(&buf[..], 101, 1000).map(|m| m.offset).collect();
    assert_eq!(offsets, vec![150]);
    assert_eq!(scan(&buf[..], 0, 111).count(), 0);
    assert_eq!(scan(&buf[..], 0, 112).count(), 1);
}

#[test]
fn test_scan_short_or_empty_buffers() {
    let empty: Vec<Word> = Vec::new();
    assert_eq!(scan(&empty[..], 0, 100).count(), 0);
    let short = vec![0x009e7000; 11];
    assert_eq!(scan(&short[..], 0, 11).count(), 0);
    assert_eq!(scan(&short[..], usize::MAX, usize::MAX).count(), 0);
}

#[test]
fn test_noop_scan() {
    let buf = zeroed_with(&[10], 40);
    let offsets: Vec<_> = scan_noops(&buf[..], 0, buf.len()).map(|m| m.offset).collect();
    assert_eq!(offsets, vec![12, 14, 16, 18, 20]);
}

/// Counts reads so the test can prove nothing past the scan end is touched.
struct CountingWords {
    words: Vec<Word>,
    highest: Cell<Option<usize>>,
}

impl WordSource for CountingWords {
    fn len_words(&self) -> usize {
        self.words.len()
    }

    fn read_word(&self, index: usize) -> Option<Word> {
        self.highest.set(Some(self.highest.get().map_or(index, |h| h.max(index))));
        self.words.get(index).copied()
    }
}

#[test]
fn test_scan_never_reads_past_region() {
    let words = vec![0x009e7000; 1000];
    let source = CountingWords {
        words,
        highest: Cell::new(None),
    };
    let report = FragmentScanner::new()
        .with_noops(true)
        .with_chunk_words(37)
        .run(&source, 0, 500, |_| {});
    assert_eq!(report.total_matches(), 0);
    assert!(source.highest.get().unwrap() < 500);
}
