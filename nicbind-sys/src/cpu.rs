//! Logical CPU count from `/proc/cpuinfo`.

use std::fs;

use crate::{Error, Result, SysPaths};

/// Counts the logical CPUs listed in `/proc/cpuinfo`.
pub fn count_cpus(paths: &SysPaths) -> Result<usize> {
    let path = paths.cpuinfo();
    let contents = fs::read_to_string(&path).map_err(Error::io(&path))?;

    let count = count_stanzas(&contents);
    tracing::debug!(path = %path.display(), count, "counted cpus");

    Ok(count)
}

/// Counts blank-line terminated stanzas.
///
/// Every stanza in `cpuinfo` is followed by an empty line, and the file ends with a newline.
/// Splitting on `\n` therefore yields one empty element per CPU plus a final empty element for
/// the trailing newline, which is not a CPU.
pub fn count_stanzas(contents: &str) -> usize {
    let lines: Vec<&str> = contents.split('\n').collect();
    let last = lines.len() - 1;

    lines.iter().enumerate().filter(|(i, line)| line.is_empty() && *i != last).count()
}
