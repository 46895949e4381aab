//! Discovery of network devices backed by hardware interrupts.

use std::{fs, path::Path};

use crate::{Error, InterruptsCache, Irq, Result, SysPaths};

/// A network interface with at least one interrupt line attributed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: String,
    /// IRQs of the device queues, in `/proc/interrupts` order.
    pub interrupts: Vec<Irq>,
    pub queue_count: usize,
}

impl Device {
    pub fn new(name: impl Into<String>, interrupts: Vec<Irq>) -> Self {
        let queue_count = interrupts.len();
        Self { name: name.into(), interrupts, queue_count }
    }
}

/// Lists the devices under `/sys/class/net` that appear in the interrupt table.
///
/// Virtual interfaces (loopback, bridges, veths, tunnels) own no interrupt and are skipped.
/// Devices are returned sorted by name.
pub fn list_real_devices(paths: &SysPaths, cache: &InterruptsCache) -> Result<Vec<Device>> {
    let mut devices = Vec::new();

    for name in sorted_entries(&paths.net_dir())? {
        if !cache.mentions(&name)? {
            tracing::trace!(device = %name, "no interrupts, skipping");
            continue;
        }

        let interrupts = cache.irqs_for(&name)?;
        tracing::debug!(device = %name, ?interrupts, "found device");

        devices.push(Device::new(name, interrupts));
    }

    Ok(devices)
}

/// Lists the receive queues of `device`, sorted by name.
///
/// Transmit queues (`tx-*`) have no `rps_cpus` and are left out.
pub fn list_rx_queues(paths: &SysPaths, device: &str) -> Result<Vec<String>> {
    let mut queues = sorted_entries(&paths.queues_dir(device))?;
    queues.retain(|queue| !queue.contains("tx"));

    Ok(queues)
}

/// Names of the entries of `dir`, sorted.
fn sorted_entries(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(Error::io(dir))? {
        let entry = entry.map_err(Error::io(dir))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    Ok(names)
}
