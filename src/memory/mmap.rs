// Tue Jan 13 2026 - Alex

use crate::memory::{MemoryError, VolatileWords};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A saved memory image (e.g. a copy of `/dev/vc-mem`) mapped read-only.
pub struct MmapMemory {
    mmap: Mmap,
    path: PathBuf,
}

impl MmapMemory {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let file = File::open(path.as_ref())?;
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> usize {
        self.mmap.len()
    }

    pub fn words(&self) -> Result<VolatileWords<'_>, MemoryError> {
        unsafe { VolatileWords::from_raw(self.mmap.as_ptr(), self.mmap.len()) }
    }
}
