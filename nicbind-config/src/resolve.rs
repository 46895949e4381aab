//! Selection of the CPU tier and validation of its ranges.

use std::ops::Range;

use crate::{ConfigError, GeneralConfig, NicConfig, RangeField, Result};

/// Returns the smallest threshold that is `>= cpu_count`, if any.
pub fn select_threshold_key(
    thresholds: impl IntoIterator<Item = i64>,
    cpu_count: usize,
) -> Option<i64> {
    let cpu_count = i64::try_from(cpu_count).unwrap_or(i64::MAX);
    thresholds.into_iter().filter(|threshold| cpu_count <= *threshold).min()
}

impl GeneralConfig {
    /// Parsed tier thresholds, sorted ascending, with their settings.
    pub fn tiers(&self) -> Result<Vec<(i64, &NicConfig)>> {
        let mut tiers = self
            .cpu
            .iter()
            .map(|(key, nic)| {
                let threshold: i64 =
                    key.parse().map_err(|_| ConfigError::InvalidThreshold(key.clone()))?;
                Ok((threshold, nic))
            })
            .collect::<Result<Vec<_>>>()?;
        tiers.sort_by_key(|(threshold, _)| *threshold);

        Ok(tiers)
    }

    /// Settings of the tier matching `cpu_count`, not yet normalized.
    pub fn tier(&self, cpu_count: usize) -> Result<(i64, &NicConfig)> {
        let tiers = self.tiers()?;
        let thresholds = tiers.iter().map(|(threshold, _)| *threshold);
        let threshold = select_threshold_key(thresholds, cpu_count)
            .ok_or(ConfigError::NoMatchingTier { cpu_count })?;

        tiers
            .into_iter()
            .find(|(t, _)| *t == threshold)
            .ok_or(ConfigError::NoMatchingTier { cpu_count })
    }

    /// Selects the tier for `cpu_count` and returns a normalized copy of its settings.
    pub fn resolve(&self, cpu_count: usize) -> Result<NicConfig> {
        let (threshold, nic) = self.tier(cpu_count)?;
        tracing::debug!(threshold, cpu_count, "selected cpu tier");

        let mut nic = nic.clone();
        nic.normalize(cpu_count)?;

        Ok(nic)
    }
}

impl NicConfig {
    /// Validates the range begins and replaces missing or out of bounds ends by `cpu_count`.
    ///
    /// A begin is never corrected: one past the last CPU is an error. An end that is `<= 0` or
    /// past the last CPU means "up to the last CPU".
    ///
    /// Negative begins and empty ranges are only rejected for enabled features. A disabled
    /// feature writes null masks and never reads its range.
    pub fn normalize(&mut self, cpu_count: usize) -> Result<()> {
        let cpus = i64::try_from(cpu_count).unwrap_or(i64::MAX);

        check_begin(RangeField::RxQueues, self.rx_queues_begin, cpu_count)?;
        self.rx_queues_end = clamp_end(self.rx_queues_end, cpus);

        check_begin(RangeField::Rps, self.rps_begin, cpu_count)?;
        self.rps_end = clamp_end(self.rps_end, cpus);

        if self.rx_queues_enable {
            check_span(RangeField::RxQueues, self.rx_queues_begin, self.rx_queues_end)?;
        }
        if self.rps_enable {
            check_span(RangeField::Rps, self.rps_begin, self.rps_end)?;
        }

        Ok(())
    }

    /// CPUs available to queue IRQs. Only meaningful once normalized.
    pub fn rx_queues_range(&self) -> Range<usize> {
        to_range(self.rx_queues_begin, self.rx_queues_end)
    }

    /// CPUs available to RPS. Only meaningful once normalized.
    pub fn rps_range(&self) -> Range<usize> {
        to_range(self.rps_begin, self.rps_end)
    }
}

fn check_begin(field: RangeField, begin: i64, cpu_count: usize) -> Result<()> {
    if begin >= i64::try_from(cpu_count).unwrap_or(i64::MAX) {
        return Err(ConfigError::RangeTooLarge { field, begin, cpu_count });
    }

    Ok(())
}

const fn clamp_end(end: i64, cpus: i64) -> i64 {
    if end > cpus || end <= 0 {
        cpus
    } else {
        end
    }
}

fn check_span(field: RangeField, begin: i64, end: i64) -> Result<()> {
    if begin < 0 {
        return Err(ConfigError::NegativeBegin { field, begin });
    }
    if end <= begin {
        return Err(ConfigError::EmptyRange { field, begin, end });
    }

    Ok(())
}

fn to_range(begin: i64, end: i64) -> Range<usize> {
    let clip = |v: i64| usize::try_from(v).unwrap_or(0);
    clip(begin)..clip(end)
}
