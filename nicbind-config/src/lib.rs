//! Configuration for nicbind.
//!
//! The config is a TOML document with a single `general` table. Per-NIC settings are grouped in
//! tiers keyed by a CPU count threshold: a host uses the tier with the smallest threshold that is
//! greater than or equal to its number of CPUs.
//!
//! ```toml
//! [general]
//! reverse_queues = true
//!
//! # Hosts with up to 8 CPUs.
//! [general.cpu.8]
//! rx_queues_enable = true
//! rx_queues_begin = 0
//! rx_queues_end = 0     # 0 means "up to the last CPU"
//! rps_enable = false
//!
//! # Hosts with 9 to 64 CPUs.
//! [general.cpu.64]
//! rx_queues_enable = true
//! rx_queues_begin = 2
//! rx_queues_end = 32
//! rps_enable = true
//! rps_begin = 32
//! rps_end = 0
//! rps_step = 1
//! ```
//!
//! Missing keys default to `false` / `0`, unknown keys are ignored.

use std::{collections::BTreeMap, fmt, fs, io, path::Path};

use serde::Deserialize;

mod resolve;
pub use resolve::select_threshold_key;

/// Top-level config document.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct NicBindConfig {
    pub general: GeneralConfig,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Sweep IRQs back and forth over the CPU range instead of wrapping around.
    pub reverse_queues: bool,
    /// Per-NIC settings keyed by stringified CPU count threshold.
    pub cpu: BTreeMap<String, NicConfig>,
}

/// Per-NIC settings of one CPU count tier.
///
/// Ranges are half-open: CPUs `begin..end`. After [`NicConfig::normalize`], an end of `0` (or
/// past the last CPU) has been replaced by the CPU count.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct NicConfig {
    /// Bind queue IRQs to CPUs. When disabled, IRQ masks are cleared.
    pub rx_queues_enable: bool,
    pub rx_queues_begin: i64,
    pub rx_queues_end: i64,
    /// Accepted for compatibility. IRQs are always spread one CPU apart.
    pub rx_queues_step: i64,

    /// Spread receive packet steering over CPUs. When disabled, RPS masks are cleared.
    pub rps_enable: bool,
    pub rps_begin: i64,
    pub rps_end: i64,
    pub rps_step: i64,
}

/// The two CPU ranges of a [`NicConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeField {
    RxQueues,
    Rps,
}

impl fmt::Display for RangeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RxQueues => f.write_str("rx_queues"),
            Self::Rps => f.write_str("rps"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid cpu threshold {0:?}, expected an integer")]
    InvalidThreshold(String),
    #[error("no cpu tier configured for {cpu_count} cpus")]
    NoMatchingTier { cpu_count: usize },
    #[error("{field}_begin too big: {begin} >= {cpu_count} cpus")]
    RangeTooLarge { field: RangeField, begin: i64, cpu_count: usize },
    #[error("{field}_begin is negative: {begin}")]
    NegativeBegin { field: RangeField, begin: i64 },
    #[error("{field} range is empty: begin {begin}, end {end}")]
    EmptyRange { field: RangeField, begin: i64, end: i64 },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl NicBindConfig {
    /// Reads and parses the config file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_toml(&data)
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }
}
