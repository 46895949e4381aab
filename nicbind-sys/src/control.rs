//! Writes to the kernel control files that steer interrupts and packet processing.
//!
//! # Usage
//!
//! ```no_run
//! use nicbind_sys::{control::{self, ControlFile}, CpuMask, SysPaths};
//!
//! let paths = SysPaths::default();
//!
//! // Service IRQ 42 on CPU 3 only.
//! control::write(&paths, ControlFile::SmpAffinity(42), CpuMask::single(3))?;
//!
//! // Disable RPS on the first receive queue of eth0.
//! control::write(&paths, ControlFile::RpsCpus { device: "eth0", queue: "rx-0" }, CpuMask::NULL)?;
//! # Ok::<(), nicbind_sys::Error>(())
//! ```

use std::{fs::OpenOptions, io::Write as _, path::PathBuf};

use crate::{CpuMask, Error, Irq, Result, SysPaths};

/// A kernel file accepting a CPU mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlFile<'a> {
    /// CPUs allowed to service an IRQ.
    ///
    /// `/proc/irq/<irq>/smp_affinity`
    SmpAffinity(Irq),

    /// CPUs allowed to process packets received on a queue.
    ///
    /// `/sys/class/net/<device>/queues/<queue>/rps_cpus`
    RpsCpus { device: &'a str, queue: &'a str },
}

impl ControlFile<'_> {
    pub fn path(&self, paths: &SysPaths) -> PathBuf {
        match self {
            Self::SmpAffinity(irq) => paths.smp_affinity(*irq),
            Self::RpsCpus { device, queue } => paths.rps_cpus(device, queue),
        }
    }
}

/// Overwrites `file` with `mask`.
///
/// The file must already exist: control files are created by the kernel, never by us.
///
/// # Errors
///
/// Returns an error if:
/// - The IRQ or queue doesn't exist
/// - Permission denied (not running as root)
/// - The kernel rejects the mask (e.g. CPU offline, or not allowed for a managed IRQ)
pub fn write(paths: &SysPaths, file: ControlFile<'_>, mask: CpuMask) -> Result<()> {
    let path = file.path(paths);

    let mut handle =
        OpenOptions::new().write(true).truncate(true).open(&path).map_err(Error::io(&path))?;
    handle.write_all(mask.to_string().as_bytes()).map_err(Error::io(&path))?;

    tracing::trace!(path = %path.display(), %mask, "wrote mask");

    Ok(())
}
