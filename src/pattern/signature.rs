// Tue Jan 13 2026 - Alex

use crate::memory::{Word, WordSource};
use crate::qpu::Instruction;

/// `nop ra39, rb39 -> wa39, wb39`, the encoding compilers pad with.
pub const QPU_NOP: Instruction = Instruction::new(0x009e7000, 0x100009e7);

/// First instruction of a program epilogue.
pub const EPILOGUE_HEAD: Instruction = Instruction::new(0x009e7000, 0x300009e7);

/// Either word may close an epilogue; both have been seen on hardware.
pub const EPILOGUE_TAIL_I1: [Word; 2] = [0x100009e7, 0x500009e7];

pub const NOOP_WORDS: usize = 2;

/// Words compared by `is_epilogue`: three instructions.
pub const EPILOGUE_WORDS: usize = 6;

/// Words captured for each epilogue hit.
pub const SCAN_WINDOW_WORDS: usize = 12;

#[inline]
fn word_is<S: WordSource + ?Sized>(buffer: &S, index: usize, expected: Word) -> bool {
    buffer.read_word(index) == Some(expected)
}

fn fits<S: WordSource + ?Sized>(buffer: &S, offset: usize, count: usize) -> bool {
    offset
        .checked_add(count)
        .map_or(false, |end| end <= buffer.len_words())
}

pub fn is_noop<S: WordSource + ?Sized>(buffer: &S, offset: usize) -> bool {
    fits(buffer, offset, NOOP_WORDS)
        && word_is(buffer, offset, QPU_NOP.i0)
        && word_is(buffer, offset + 1, QPU_NOP.i1)
}

/// Matches `EPILOGUE_HEAD`, `QPU_NOP`, then a nop whose second word is one of
/// `EPILOGUE_TAIL_I1`. Reads stop at the first mismatch.
pub fn is_epilogue<S: WordSource + ?Sized>(buffer: &S, offset: usize) -> bool {
    if !fits(buffer, offset, EPILOGUE_WORDS) {
        return false;
    }
    word_is(buffer, offset, EPILOGUE_HEAD.i0)
        && word_is(buffer, offset + 1, EPILOGUE_HEAD.i1)
        && word_is(buffer, offset + 2, QPU_NOP.i0)
        && word_is(buffer, offset + 3, QPU_NOP.i1)
        && word_is(buffer, offset + 4, QPU_NOP.i0)
        && buffer
            .read_word(offset + 5)
            .map_or(false, |w| EPILOGUE_TAIL_I1.contains(&w))
}

/// The canonical epilogue with the given closing word, padded with nops to a
/// full scan window.
pub fn epilogue_signature(tail_i1: Word) -> [Word; SCAN_WINDOW_WORDS] {
    let mut words = [0; SCAN_WINDOW_WORDS];
    for pair in words.chunks_exact_mut(2) {
        pair.copy_from_slice(&QPU_NOP.words());
    }
    words[..2].copy_from_slice(&EPILOGUE_HEAD.words());
    words[5] = tail_i1;
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epilogue(tail: Word) -> Vec<Word> {
        vec![0x009e7000, 0x300009e7, 0x009e7000, 0x100009e7, 0x009e7000, tail]
    }

    #[test]
    fn test_is_noop() {
        let buf: Vec<Word> = vec![0, 0x009e7000, 0x100009e7];
        assert!(is_noop(&buf, 1));
        assert!(!is_noop(&buf, 0));
        assert!(!is_noop(&buf, 2));
        assert!(!is_noop(&buf, usize::MAX));
    }

    #[test]
    fn test_is_noop_single_bit_flip() {
        for word in 0..2 {
            for bit in 0..32 {
                let mut buf = QPU_NOP.words().to_vec();
                buf[word] ^= 1 << bit;
                assert!(!is_noop(&buf, 0), "word {} bit {}", word, bit);
            }
        }
    }

    #[test]
    fn test_is_epilogue_both_tails() {
        assert!(is_epilogue(&epilogue(0x100009e7), 0));
        assert!(is_epilogue(&epilogue(0x500009e7), 0));
        assert!(!is_epilogue(&epilogue(0x300009e7), 0));
    }

    #[test]
    fn test_is_epilogue_rejects_any_altered_word() {
        for tail in EPILOGUE_TAIL_I1 {
            for i in 0..EPILOGUE_WORDS {
                let mut buf = epilogue(tail);
                buf[i] ^= 0x0000_0100;
                assert!(!is_epilogue(&buf, 0), "tail {:08x} word {}", tail, i);
            }
        }
    }

    #[test]
    fn test_is_epilogue_truncated() {
        let buf = epilogue(0x100009e7);
        assert!(!is_epilogue(&buf[..5], 0));
        assert!(!is_epilogue(&buf, 1));
    }

    #[test]
    fn test_epilogue_signature_window() {
        let sig = epilogue_signature(0x500009e7);
        assert!(is_epilogue(&sig[..], 0));
        assert!(is_noop(&sig[..], 2));
        assert!(is_noop(&sig[..], 10));
        assert_eq!(sig[5], 0x500009e7);
    }
}
