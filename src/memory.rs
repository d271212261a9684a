//! Process resident-memory probe
//!
//! Reads the resident set size from `/proc/self/statm` on Linux. The probe
//! verifies a first reading at construction time so a trial fails fast with
//! a capability error instead of producing fabricated numbers. Before each
//! reading the caller runs [`MemoryProbe::collect`], which asks the
//! allocator to return freed pages to the OS so consecutive readings are
//! stable.

use crate::error::{LetheError, Result};
use tracing::debug;

/// Resident-memory probe for the current process
#[derive(Debug, Clone, Copy)]
pub struct MemoryProbe {
    page_size: u64,
}

impl MemoryProbe {
    /// Construct a probe, failing fast if resident memory cannot be read
    /// on this host
    pub fn new() -> Result<Self> {
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if page_size <= 0 {
            return Err(LetheError::CapabilityUnavailable(
                "cannot determine page size".to_string(),
            ));
        }
        let probe = Self {
            page_size: page_size as u64,
        };
        let initial = probe.resident_bytes()?;
        debug!(resident_bytes = initial, page_size, "memory probe ready");
        Ok(probe)
    }

    /// Current resident set size in bytes
    #[cfg(target_os = "linux")]
    pub fn resident_bytes(&self) -> Result<u64> {
        let statm = std::fs::read_to_string("/proc/self/statm").map_err(|e| {
            LetheError::CapabilityUnavailable(format!("cannot read /proc/self/statm: {}", e))
        })?;
        // statm fields: size resident shared text lib data dt (in pages)
        let resident_pages: u64 = statm
            .split_whitespace()
            .nth(1)
            .and_then(|field| field.parse().ok())
            .ok_or_else(|| {
                LetheError::CapabilityUnavailable(
                    "unexpected /proc/self/statm format".to_string(),
                )
            })?;
        Ok(resident_pages * self.page_size)
    }

    /// Resident memory introspection is only wired up for Linux; other
    /// hosts abort the trial rather than report fabricated numbers.
    #[cfg(not(target_os = "linux"))]
    pub fn resident_bytes(&self) -> Result<u64> {
        Err(LetheError::CapabilityUnavailable(
            "resident memory sampling requires /proc (Linux)".to_string(),
        ))
    }

    /// Force a reclamation pass so the next reading is stable
    ///
    /// Rust drops released values deterministically, so the only work left
    /// is asking glibc to hand freed pages back to the OS. On other
    /// allocators this is a no-op; drop already reclaimed the memory.
    pub fn collect(&self) {
        #[cfg(all(target_os = "linux", target_env = "gnu"))]
        unsafe {
            libc::malloc_trim(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_os = "linux")]
    fn test_probe_reads_nonzero_resident_memory() {
        let probe = MemoryProbe::new().unwrap();
        let bytes = probe.resident_bytes().unwrap();
        assert!(bytes > 0);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_collect_then_read() {
        let probe = MemoryProbe::new().unwrap();
        probe.collect();
        assert!(probe.resident_bytes().is_ok());
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_probe_sees_large_allocation() {
        let probe = MemoryProbe::new().unwrap();
        probe.collect();
        let before = probe.resident_bytes().unwrap();

        // 64MB touched so the pages are actually resident
        let block = vec![1u8; 64 * 1024 * 1024];
        let after = probe.resident_bytes().unwrap();
        assert!(after > before);
        drop(block);
    }
}
