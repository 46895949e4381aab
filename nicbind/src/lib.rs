//! Binds NIC queue interrupts and receive packet steering to CPUs.
//!
//! A run goes through four steps:
//!
//! 1. Discover the network devices that own interrupts ([`nicbind_sys::device`]).
//! 2. Count the CPUs of the host ([`nicbind_sys::cpu`]).
//! 3. Pick and validate the config tier for that CPU count ([`nicbind_config`]).
//! 4. Write `smp_affinity` for every queue IRQ and `rps_cpus` for every receive queue
//!    ([`affinity`]).
//!
//! Nothing is retried or rolled back. A failed write stops the run and leaves the files written
//! so far in their new state; running again with a fixed config converges.
#![doc(issue_tracker_base_url = "https://github.com/nicbind/nicbind/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use nicbind_config::{ConfigError, NicBindConfig, NicConfig};
use nicbind_sys::{cpu, device, Device, InterruptsCache, SysPaths};

pub mod affinity;
pub use affinity::{AffinityWriter, IrqCursor, RpsCursor};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("system error: {0}")]
    Sys(#[from] nicbind_sys::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub cpu_count: usize,
    pub devices: Vec<Device>,
    /// The tier settings after normalization.
    pub nic: NicConfig,
    /// Number of `smp_affinity` files written.
    pub irqs: usize,
    /// Number of `rps_cpus` files written.
    pub queues: usize,
}

/// Applies `config` to the host whose pseudo-filesystems are rooted at `paths`.
///
/// A [`Error::Config`] is returned before anything is written.
pub fn run(paths: &SysPaths, config: &NicBindConfig) -> Result<Report> {
    tracing::debug!(
        proc = %paths.proc_root().display(),
        sys = %paths.sys_root().display(),
        "pseudo-filesystem roots"
    );

    let cache = InterruptsCache::from_paths(paths);
    let devices = device::list_real_devices(paths, &cache)?;

    let cpu_count = cpu::count_cpus(paths)?;
    tracing::info!(cpu_count, "current cpu count");

    let nic = config.general.resolve(cpu_count)?;
    tracing::info!(?nic, reverse_queues = config.general.reverse_queues, "resolved config");

    for dev in &devices {
        tracing::info!(device = %dev.name, queues = dev.queue_count, "found device");
    }

    let writer = AffinityWriter::new(paths, &nic, config.general.reverse_queues);
    let irqs = writer.bind_irqs(&devices)?;
    let queues = writer.bind_rps(&devices)?;

    Ok(Report { cpu_count, devices, nic, irqs, queues })
}
