//! Lookup of device interrupt lines in `/proc/interrupts`.
//!
//! The file has one line per IRQ. The first token is the IRQ number followed by a colon, then
//! one counter per CPU, then the controller and the owner label. Multi-queue NIC drivers name
//! their queues `<dev>-<suffix>`:
//!
//! ```text
//!            CPU0       CPU1
//!   42:    1200345          0  IR-PCI-MSI 524289-edge      eth0-TxRx-0
//!   43:          0     882101  IR-PCI-MSI 524290-edge      eth0-TxRx-1
//! ```

use std::{
    cell::OnceCell,
    fs,
    path::PathBuf,
};

use regex::Regex;

use crate::{Error, Irq, Result, SysPaths};

/// Contents of the interrupts file, read on first use and kept for the lifetime of the cache.
///
/// The table is only read once per run. Nothing depends on that for correctness, it just avoids
/// re-reading the file for every device.
#[derive(Debug)]
pub struct InterruptsCache {
    path: PathBuf,
    contents: OnceCell<String>,
}

impl InterruptsCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), contents: OnceCell::new() }
    }

    pub fn from_paths(paths: &SysPaths) -> Self {
        Self::new(paths.interrupts())
    }

    /// Returns the file contents, reading them on the first call.
    pub fn contents(&self) -> Result<&str> {
        if let Some(contents) = self.contents.get() {
            return Ok(contents);
        }

        let data = fs::read_to_string(&self.path).map_err(Error::io(&self.path))?;
        tracing::debug!(path = %self.path.display(), bytes = data.len(), "read interrupts");

        Ok(self.contents.get_or_init(|| data))
    }

    /// Whether `device` appears anywhere in the table, preceded by a space.
    ///
    /// Devices without any interrupt attributed to them (bridges, veths, loopback) never show
    /// up in the table.
    pub fn mentions(&self, device: &str) -> Result<bool> {
        Ok(self.contents()?.contains(&format!(" {device}")))
    }

    /// IRQs whose owner label is `<device>-...`, in table order.
    pub fn irqs_for(&self, device: &str) -> Result<Vec<Irq>> {
        parse_irqs(self.contents()?, device)
    }
}

/// Collects the IRQ numbers of all lines carrying a `<device>-` label.
///
/// Each line contributes at most one IRQ. Lines without a leading number (`NMI:`, `LOC:`, the
/// CPU header) never match.
pub fn parse_irqs(contents: &str, device: &str) -> Result<Vec<Irq>> {
    let re = Regex::new(&format!(r"^\s*(\d+):.*\s{}-", regex::escape(device)))?;

    let mut irqs = Vec::new();
    for line in contents.lines() {
        let Some(caps) = re.captures(line) else {
            continue;
        };

        let irq: Irq =
            caps[1].parse().map_err(|_| Error::InvalidIrq { line: line.to_owned() })?;
        irqs.push(irq);
    }

    Ok(irqs)
}
