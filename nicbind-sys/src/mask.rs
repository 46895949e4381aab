//! CPU bitmasks as written to `smp_affinity` and `rps_cpus`.
//!
//! The kernel parses these files as hex bitmaps split in 32-bit groups separated by commas,
//! most significant group first (`bitmap_parse` in `lib/bitmap.c`). A mask for CPU 3 is `8`, a
//! mask for CPU 35 is `8,00000000`. Writing `0` clears the mask.

use std::fmt;

/// Number of CPUs covered by one comma separated group.
const GROUP_BITS: usize = 32;

/// Either no CPU at all or exactly one CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CpuMask(Option<usize>);

impl CpuMask {
    /// The empty mask. Writing it unbinds the IRQ or disables RPS on the queue.
    pub const NULL: Self = Self(None);

    /// Mask with only `cpu` set.
    pub const fn single(cpu: usize) -> Self {
        Self(Some(cpu))
    }

    /// The CPU selected by this mask, if any.
    pub const fn cpu(&self) -> Option<usize> {
        self.0
    }
}

impl fmt::Display for CpuMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(cpu) = self.0 else {
            return f.write_str("0");
        };

        write!(f, "{:x}", 1u32 << (cpu % GROUP_BITS))?;
        for _ in 0..cpu / GROUP_BITS {
            f.write_str(",00000000")?;
        }

        Ok(())
    }
}
