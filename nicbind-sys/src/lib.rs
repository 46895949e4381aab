//! Access to the Linux pseudo-filesystems used to steer NIC interrupts.
//!
//! Everything here is a thin, typed layer over files the kernel exposes under `/proc` and
//! `/sys`:
//!
//! - [`paths`] resolves the location of every file relative to a [`SysPaths`] root, so tests can
//!   point the whole crate at a temporary directory.
//! - [`interrupts`] reads `/proc/interrupts` once and answers "which IRQs belong to this device".
//! - [`device`] lists the real network devices and their receive queues.
//! - [`cpu`] counts the logical CPUs in `/proc/cpuinfo`.
//! - [`mask`] renders CPU masks in the format the kernel expects.
//! - [`control`] writes masks into `smp_affinity` and `rps_cpus`.
//!
//! # Usage
//!
//! ```no_run
//! use nicbind_sys::{control::{self, ControlFile}, device, CpuMask, InterruptsCache, SysPaths};
//!
//! let paths = SysPaths::default();
//! let cache = InterruptsCache::from_paths(&paths);
//!
//! for dev in device::list_real_devices(&paths, &cache)? {
//!     for irq in &dev.interrupts {
//!         control::write(&paths, ControlFile::SmpAffinity(*irq), CpuMask::single(0))?;
//!     }
//! }
//! # Ok::<(), nicbind_sys::Error>(())
//! ```
#![doc(issue_tracker_base_url = "https://github.com/nicbind/nicbind/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use std::{io, path::PathBuf};

pub mod control;
pub mod cpu;
pub mod device;
pub mod interrupts;
pub mod mask;
pub mod paths;

pub use device::Device;
pub use interrupts::InterruptsCache;
pub use mask::CpuMask;
pub use paths::SysPaths;

/// Identifier of a kernel IRQ line, as listed in the first column of `/proc/interrupts`.
pub type Irq = u32;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid irq number in interrupts line: {line:?}")]
    InvalidIrq { line: String },
    #[error("invalid device pattern: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Returns a closure that tags an [`io::Error`] with the path it happened on, for use with
    /// `map_err`.
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
