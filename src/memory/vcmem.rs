// Thu Jan 15 2026 - Alex

use crate::memory::{MemoryError, VolatileWords};
use log::debug;
use std::path::{Path, PathBuf};

/// Window parameters reported by the vc-mem driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VcMemInfo {
    pub phys_addr: u64,
    pub size: u64,
    pub base: u64,
    pub load: u64,
}

/// The VideoCore memory window exposed by `/dev/vc-mem`, mapped shared.
///
/// Requires root. The firmware and any running QPU program keep writing to
/// this memory while it is mapped.
pub struct VcMem {
    map: memmap2::MmapRaw,
    info: VcMemInfo,
    device: PathBuf,
}

impl VcMem {
    pub fn info(&self) -> VcMemInfo {
        self.info
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    pub fn size(&self) -> usize {
        self.map.len()
    }

    pub fn words(&self) -> Result<VolatileWords<'_>, MemoryError> {
        unsafe { VolatileWords::from_raw(self.map.as_ptr() as *const u8, self.map.len()) }
    }
}

#[cfg(target_os = "linux")]
mod sys {
    use super::{VcMem, VcMemInfo};
    use crate::memory::MemoryError;
    use libc::{c_int, c_ulong};
    use log::debug;
    use memmap2::MmapOptions;
    use std::fs::{File, OpenOptions};
    use std::mem::size_of;
    use std::os::unix::fs::OpenOptionsExt;
    use std::os::unix::io::AsRawFd;
    use std::path::Path;

    const VC_MEM_IOC_MAGIC: u8 = b'v';
    const IOC_READ: c_ulong = 2;

    const fn ior(nr: u8, size: usize) -> c_ulong {
        (IOC_READ << 30)
            | ((size as c_ulong) << 16)
            | ((VC_MEM_IOC_MAGIC as c_ulong) << 8)
            | nr as c_ulong
    }

    const VC_MEM_IOC_MEM_PHYS_ADDR: c_ulong = ior(0, size_of::<c_ulong>());
    const VC_MEM_IOC_MEM_SIZE: c_ulong = ior(1, size_of::<u32>());
    const VC_MEM_IOC_MEM_BASE: c_ulong = ior(2, size_of::<u32>());
    const VC_MEM_IOC_MEM_LOAD: c_ulong = ior(3, size_of::<u32>());

    fn query(
        file: &File,
        device: &Path,
        request: c_ulong,
        name: &'static str,
    ) -> Result<u64, MemoryError> {
        // The driver writes at most an unsigned long; zero-init covers the u32 requests.
        let mut value: c_ulong = 0;
        let rc: c_int =
            unsafe { libc::ioctl(file.as_raw_fd(), request as _, &mut value as *mut c_ulong) };
        if rc < 0 {
            return Err(MemoryError::DeviceIoctl {
                device: device.display().to_string(),
                request: name,
                source: std::io::Error::last_os_error(),
            });
        }
        Ok(value as u64)
    }

    pub(super) fn open(device: &Path) -> Result<VcMem, MemoryError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(device)?;

        let info = VcMemInfo {
            phys_addr: query(&file, device, VC_MEM_IOC_MEM_PHYS_ADDR, "VC_MEM_IOC_MEM_PHYS_ADDR")?,
            size: query(&file, device, VC_MEM_IOC_MEM_SIZE, "VC_MEM_IOC_MEM_SIZE")?,
            base: query(&file, device, VC_MEM_IOC_MEM_BASE, "VC_MEM_IOC_MEM_BASE")?,
            load: query(&file, device, VC_MEM_IOC_MEM_LOAD, "VC_MEM_IOC_MEM_LOAD")?,
        };
        debug!("VC_MEM_IOC_MEM_PHYS_ADDR = {:08x}", info.phys_addr);
        debug!("VC_MEM_IOC_MEM_SIZE = {:08x}", info.size);
        debug!("VC_MEM_IOC_MEM_BASE = {:08x}", info.base);
        debug!("VC_MEM_IOC_MEM_LOAD = {:08x}", info.load);

        let size = info.size as usize;
        let map = MmapOptions::new()
            .len(size)
            .map_raw(&file)
            .map_err(|source| MemoryError::MapFailed {
                device: device.display().to_string(),
                size,
                source,
            })?;

        Ok(VcMem {
            map,
            info,
            device: device.to_path_buf(),
        })
    }

}

impl VcMem {
    #[cfg(target_os = "linux")]
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, MemoryError> {
        let mem = sys::open(device.as_ref())?;
        debug!("Mapped {} bytes of {}", mem.size(), mem.device.display());
        Ok(mem)
    }

    #[cfg(not(target_os = "linux"))]
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, MemoryError> {
        Err(MemoryError::NotSupported(format!(
            "{} is only available on Linux",
            device.as_ref().display()
        )))
    }
}
