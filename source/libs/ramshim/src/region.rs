// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Shimmed region descriptor and the address validity predicate
//! OWNERS: @kernel-team
//! STATUS: Functional
//! API_STABILITY: Stable
//! TEST_COVERAGE: Unit tests (boundaries, construction errors)
//! PUBLIC API: Region, RegionError
//! INVARIANTS: size is a non-zero power of two; base is naturally aligned to size

use thiserror::Error;

include!(concat!(env!("OUT_DIR"), "/region_defaults.rs"));

/// Errors produced when describing a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegionError {
    /// Size is zero or not a power of two.
    #[error("region size 0x{0:x} is not a non-zero power of two")]
    SizeNotPowerOfTwo(u32),
    /// Base is not a multiple of the size.
    #[error("region base 0x{base:08x} is not aligned to size 0x{size:x}")]
    BaseMisaligned { base: u32, size: u32 },
}

/// The fixed, half-open address range `[base, base + size)` serviced by the
/// fault handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    base: u32,
    size: u32,
}

impl Region {
    /// Region selected at build time through `RAMSHIM_REGION_BASE` and
    /// `RAMSHIM_REGION_SIZE`.
    pub const DEFAULT: Region = match Region::new(DEFAULT_BASE, DEFAULT_SIZE) {
        Ok(region) => region,
        Err(_) => panic!("build-time region defaults are invalid"),
    };

    pub const fn new(base: u32, size: u32) -> Result<Self, RegionError> {
        if size == 0 || !size.is_power_of_two() {
            return Err(RegionError::SizeNotPowerOfTwo(size));
        }
        if base & (size - 1) != 0 {
            return Err(RegionError::BaseMisaligned { base, size });
        }
        Ok(Self { base, size })
    }

    #[inline]
    pub const fn base(&self) -> u32 {
        self.base
    }

    #[inline]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Highest address inside the region.
    #[inline]
    pub const fn last(&self) -> u32 {
        self.base + (self.size - 1)
    }

    /// Validity predicate: `(address & !(size - 1)) == base`.
    #[inline]
    pub const fn contains(&self, address: u32) -> bool {
        (address & !(self.size - 1)) == self.base
    }

    /// True when every byte of `[address, address + len)` lies inside the
    /// region. A zero-length span is never accepted.
    #[inline]
    pub const fn contains_span(&self, address: u32, len: u32) -> bool {
        if len == 0 {
            return false;
        }
        match address.checked_add(len - 1) {
            Some(end) => self.contains(address) && self.contains(end),
            None => false,
        }
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::DEFAULT
    }
}
