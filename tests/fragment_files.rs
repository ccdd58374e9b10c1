use qpu_sniff::config::FRAGMENT_HEADER_WORDS;
use qpu_sniff::memory::{MmapMemory, WordSource};
use qpu_sniff::output::TextFormatter;
use qpu_sniff::pattern::{epilogue_signature, FragmentScanner};
use qpu_sniff::qpu::{decode_fragment, load_fragment, DecodeError, InstructionShape};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_words(words: &[u32]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for w in words {
        file.write_all(&w.to_le_bytes()).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_disassemble_fragment_file() {
    let mut words = vec![0xcccccccc; FRAGMENT_HEADER_WORDS];
    words.extend([
        0x15827d80, 0x10020827,
        0x00000004, 0xf0e20a67,
        0xfffffff0, 0xe0020c27,
        0x009e7000, 0x300009e7,
    ]);
    let file = write_words(&words);

    let fragment = load_fragment(file.path(), FRAGMENT_HEADER_WORDS).unwrap();
    assert_eq!(fragment.total_words(), 16);
    let records: Vec<_> = fragment.decode().unwrap().collect();
    let shapes: Vec<_> = records.iter().map(|r| r.shape).collect();
    assert_eq!(
        shapes,
        vec![
            InstructionShape::AluOp,
            InstructionShape::Immediate,
            InstructionShape::Branch,
            InstructionShape::AluOp,
        ]
    );

    let formatter = TextFormatter::new();
    let lines: Vec<_> = records.iter().map(|r| formatter.format_record(r)).collect();
    assert!(lines[1].starts_with("00000002: 00000004 f0e20a67 data=0x00000004"));
    assert!(lines[3].starts_with("00000006: 009e7000 300009e7 ra=39"));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_fragment(dir.path().join("absent.bin"), FRAGMENT_HEADER_WORDS).unwrap_err();
    assert!(matches!(err, DecodeError::Memory(_)));
}

#[test]
fn test_decode_fragment_lengths() {
    let words = vec![0u32; 10];
    assert_eq!(decode_fragment(&words[..], 0).unwrap().count(), 0);
    assert!(matches!(
        decode_fragment(&words[..], 7),
        Err(DecodeError::MalformedLength(7))
    ));
    assert!(matches!(
        decode_fragment(&words[..], 12),
        Err(DecodeError::OutOfBounds { requested: 12, available: 10 })
    ));
}

#[test]
fn test_scan_memory_image() {
    let mut words = vec![0u32; 512];
    words[200..212].copy_from_slice(&epilogue_signature(0x500009e7));
    let file = write_words(&words);

    let image = MmapMemory::from_file(file.path()).unwrap();
    assert_eq!(image.size(), 2048);
    let view = image.words().unwrap();
    assert_eq!(view.len_words(), 512);

    let report = FragmentScanner::new().with_context(2).run(&view, 0, view.len_words(), |_| {});
    assert_eq!(report.epilogues.len(), 1);
    let hit = &report.epilogues[0];
    assert_eq!(hit.byte_offset(), 800);
    assert_eq!(hit.context.len(), 2);
    assert_eq!(
        TextFormatter::new().format_match(hit),
        "00000320: 009e7000 300009e7 009e7000 100009e7 009e7000 500009e7 009e7000 100009e7"
    );
}
