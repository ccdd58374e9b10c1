// Tue Jan 15 2026 - Alex

use crate::memory::Word;
use crate::pattern::{MatchKind, ScanMatch};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanChange {
    pub kind: MatchKind,
    pub offset: usize,
    pub old_words: Vec<Word>,
    pub new_words: Vec<Word>,
}

/// Difference between two scans of the same memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanDiff {
    /// Hits present only in the newer scan.
    pub appeared: Vec<ScanMatch>,
    /// Hits present only in the older scan.
    pub vanished: Vec<ScanMatch>,
    /// Same offset, different captured words.
    pub changed: Vec<ScanChange>,
}

impl ScanDiff {
    pub fn between(old: &[ScanMatch], new: &[ScanMatch]) -> Self {
        let old_by_offset: BTreeMap<_, _> = old.iter().map(|m| ((m.kind, m.offset), m)).collect();
        let new_by_offset: BTreeMap<_, _> = new.iter().map(|m| ((m.kind, m.offset), m)).collect();

        let mut diff = ScanDiff::default();

        for (key, m) in &new_by_offset {
            match old_by_offset.get(key) {
                None => diff.appeared.push((*m).clone()),
                Some(prev) if prev.words != m.words => diff.changed.push(ScanChange {
                    kind: m.kind,
                    offset: m.offset,
                    old_words: prev.words.clone(),
                    new_words: m.words.clone(),
                }),
                Some(_) => {}
            }
        }

        for (key, m) in &old_by_offset {
            if !new_by_offset.contains_key(key) {
                diff.vanished.push((*m).clone());
            }
        }

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.appeared.is_empty() && self.vanished.is_empty() && self.changed.is_empty()
    }
}

impl fmt::Display for ScanDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "+{} -{} ~{}",
            self.appeared.len(),
            self.vanished.len(),
            self.changed.len()
        )
    }
}
