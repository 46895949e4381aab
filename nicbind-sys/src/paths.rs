//! Locations of the kernel pseudo-files.
//!
//! The kernel exposes interrupt and queue configuration through two virtual filesystems:
//!
//! - `/proc` for the interrupt table (`/proc/interrupts`), the CPU list (`/proc/cpuinfo`) and the
//!   per-IRQ affinity masks (`/proc/irq/<irq>/smp_affinity`).
//! - `/sys` for network devices (`/sys/class/net/<dev>`) and their queues
//!   (`/sys/class/net/<dev>/queues/<queue>/rps_cpus`).
//!
//! [`SysPaths`] keeps both roots so that every other module resolves paths the same way.

use std::path::{Path, PathBuf};

use crate::Irq;

/// Default mount point of procfs.
pub const PROC_ROOT: &str = "/proc";

/// Default mount point of sysfs.
pub const SYS_ROOT: &str = "/sys";

/// Roots of the proc and sys pseudo-filesystems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysPaths {
    proc_root: PathBuf,
    sys_root: PathBuf,
}

impl Default for SysPaths {
    fn default() -> Self {
        Self::new(PROC_ROOT, SYS_ROOT)
    }
}

impl SysPaths {
    pub fn new(proc_root: impl Into<PathBuf>, sys_root: impl Into<PathBuf>) -> Self {
        Self { proc_root: proc_root.into(), sys_root: sys_root.into() }
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    pub fn sys_root(&self) -> &Path {
        &self.sys_root
    }

    /// `/proc/interrupts`: one line per IRQ with per-CPU counters and the owner label.
    pub fn interrupts(&self) -> PathBuf {
        self.proc_root.join("interrupts")
    }

    /// `/proc/cpuinfo`: one blank-line separated stanza per logical CPU.
    pub fn cpuinfo(&self) -> PathBuf {
        self.proc_root.join("cpuinfo")
    }

    /// `/proc/irq/<irq>/smp_affinity`
    pub fn smp_affinity(&self, irq: Irq) -> PathBuf {
        self.proc_root.join("irq").join(irq.to_string()).join("smp_affinity")
    }

    /// `/sys/class/net`: one entry per network interface.
    pub fn net_dir(&self) -> PathBuf {
        self.sys_root.join("class").join("net")
    }

    /// `/sys/class/net/<device>/queues`
    pub fn queues_dir(&self, device: &str) -> PathBuf {
        self.net_dir().join(device).join("queues")
    }

    /// `/sys/class/net/<device>/queues/<queue>/rps_cpus`
    pub fn rps_cpus(&self, device: &str, queue: &str) -> PathBuf {
        self.queues_dir(device).join(queue).join("rps_cpus")
    }
}
