//! Assignment of CPUs to queue IRQs and receive queues.
//!
//! Both assignments are computed up front by iterating a cursor over the configured CPU range,
//! then written out one control file at a time.
//!
//! # IRQs
//!
//! The IRQs of all devices are walked in device order. Each IRQ gets the CPU under the cursor,
//! then the cursor moves one CPU up. When it reaches the end of the range it either wraps to the
//! start, or with `reverse_queues` turns around and sweeps back down:
//!
//! ```text
//! range 2..5, wrap:     2 3 4 2 3 4 2 ...
//! range 2..5, reverse:  2 3 4 4 3 2 2 3 ...
//! ```
//!
//! Turning around repeats the edge CPU, so consecutive IRQs at either end share a CPU.
//!
//! # RPS
//!
//! Every device restarts at `rps_begin`. Each receive queue gets CPU `id % rps_end`, then `id`
//! moves by `rps_step` and resets to `rps_begin` when it lands exactly on `rps_end`. The modulo
//! is taken over `rps_end`, not over the range width, so a step that skips past `rps_end` can
//! select CPUs below `rps_begin`.

use std::ops::Range;

use nicbind_config::NicConfig;
use nicbind_sys::{
    control::{self, ControlFile},
    device, CpuMask, Device, Irq, SysPaths,
};

/// CPU sequence for queue IRQs.
#[derive(Debug, Clone)]
pub struct IrqCursor {
    id: usize,
    range: Range<usize>,
    reverse: bool,
    forward: bool,
}

impl IrqCursor {
    pub fn new(range: Range<usize>, reverse: bool) -> Self {
        Self { id: range.start, range, reverse, forward: true }
    }

    fn advance(&mut self) {
        if !self.reverse {
            self.id += 1;
            if self.id == self.range.end {
                self.id = self.range.start;
            }
            return;
        }

        if self.forward {
            if self.id + 1 == self.range.end {
                self.forward = false;
            } else {
                self.id += 1;
            }
        } else if self.id == self.range.start {
            self.forward = true;
        } else {
            self.id -= 1;
        }
    }
}

impl Iterator for IrqCursor {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.range.is_empty() {
            return None;
        }

        let cpu = self.id;
        self.advance();
        Some(cpu)
    }
}

/// CPU sequence for the receive queues of one device.
#[derive(Debug, Clone)]
pub struct RpsCursor {
    id: i64,
    begin: i64,
    end: i64,
    step: i64,
}

impl RpsCursor {
    pub fn new(range: Range<usize>, step: i64) -> Self {
        let begin = i64::try_from(range.start).unwrap_or(i64::MAX);
        let end = i64::try_from(range.end).unwrap_or(i64::MAX);
        Self { id: begin, begin, end, step }
    }
}

impl Iterator for RpsCursor {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.begin >= self.end {
            return None;
        }

        // `end` is positive here, so the remainder is in `0..end`.
        let cpu = self.id.rem_euclid(self.end) as usize;

        self.id = self.id.wrapping_add(self.step);
        if self.id == self.end {
            self.id = self.begin;
        }

        Some(cpu)
    }
}

/// All queue IRQs, device after device.
pub fn collect_irqs(devices: &[Device]) -> Vec<Irq> {
    devices.iter().flat_map(|dev| dev.interrupts.iter().copied()).collect()
}

/// Masks for `irqs`: one CPU each when IRQ binding is enabled, the null mask otherwise.
pub fn plan_irqs(irqs: &[Irq], nic: &NicConfig, reverse: bool) -> Vec<(Irq, CpuMask)> {
    if !nic.rx_queues_enable {
        return irqs.iter().map(|irq| (*irq, CpuMask::NULL)).collect();
    }

    let cursor = IrqCursor::new(nic.rx_queues_range(), reverse);
    irqs.iter().copied().zip(cursor.map(CpuMask::single)).collect()
}

/// Masks for the receive queues of one device: one CPU each when RPS is enabled, the null
/// mask otherwise.
pub fn plan_rps<'a>(queues: &'a [String], nic: &NicConfig) -> Vec<(&'a str, CpuMask)> {
    if !nic.rps_enable {
        return queues.iter().map(|queue| (queue.as_str(), CpuMask::NULL)).collect();
    }

    let cursor = RpsCursor::new(nic.rps_range(), nic.rps_step);
    queues.iter().map(String::as_str).zip(cursor.map(CpuMask::single)).collect()
}

/// Writes the IRQ and RPS masks of a resolved [`NicConfig`].
#[derive(Debug)]
pub struct AffinityWriter<'a> {
    paths: &'a SysPaths,
    nic: &'a NicConfig,
    reverse: bool,
}

impl<'a> AffinityWriter<'a> {
    pub fn new(paths: &'a SysPaths, nic: &'a NicConfig, reverse: bool) -> Self {
        Self { paths, nic, reverse }
    }

    /// Writes `smp_affinity` for every queue IRQ of `devices`. Returns the number of IRQs
    /// written.
    ///
    /// Stops at the first failed write. IRQs written before it keep their new mask.
    pub fn bind_irqs(&self, devices: &[Device]) -> nicbind_sys::Result<usize> {
        let irqs = collect_irqs(devices);

        if self.nic.rx_queues_enable {
            tracing::info!(irqs = irqs.len(), reverse = self.reverse, "binding rx queues");
        } else {
            tracing::info!(irqs = irqs.len(), "unbinding rx queues");
        }

        let plan = plan_irqs(&irqs, self.nic, self.reverse);
        for (irq, mask) in &plan {
            tracing::debug!(irq, cpu = ?mask.cpu(), %mask, "bind irq");
            control::write(self.paths, ControlFile::SmpAffinity(*irq), *mask)?;
        }

        Ok(plan.len())
    }

    /// Writes `rps_cpus` for every receive queue of `devices`. Returns the number of queues
    /// written.
    pub fn bind_rps(&self, devices: &[Device]) -> nicbind_sys::Result<usize> {
        let mut written = 0;

        for dev in devices {
            let queues = device::list_rx_queues(self.paths, &dev.name)?;

            if self.nic.rps_enable {
                tracing::info!(device = %dev.name, queues = queues.len(), "binding rps");
            } else {
                tracing::info!(device = %dev.name, queues = queues.len(), "unbinding rps");
            }

            for (queue, mask) in plan_rps(&queues, self.nic) {
                tracing::debug!(device = %dev.name, queue, %mask, "bind rps");
                let file = ControlFile::RpsCpus { device: &dev.name, queue };
                control::write(self.paths, file, mask)?;
                written += 1;
            }
        }

        Ok(written)
    }
}
