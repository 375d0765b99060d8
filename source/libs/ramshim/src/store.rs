// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Access contract for the cache/store that actually backs the region.
//!
//! Every address handed to a [`BackingStore`] has already been validated
//! against the configured [`Region`](crate::region::Region); implementations
//! need not re-check it. Methods take `&self`: the handler performs no locking,
//! so a store shared between independently faulting cores must serialise
//! itself.

/// Width- and signedness-aware read/write primitives.
pub trait BackingStore {
    fn u8(&self, address: u32) -> u8;
    fn u16(&self, address: u32) -> u16;
    fn u32(&self, address: u32) -> u32;

    /// Sign-extending byte read.
    fn s8(&self, address: u32) -> i8 {
        self.u8(address) as i8
    }

    /// Sign-extending half-word read.
    fn s16(&self, address: u32) -> i16 {
        self.u16(address) as i16
    }

    fn write_u8(&self, address: u32, value: u8);
    fn write_u16(&self, address: u32, value: u16);
    fn write_u32(&self, address: u32, value: u32);
}

impl<S: BackingStore + ?Sized> BackingStore for &S {
    fn u8(&self, address: u32) -> u8 {
        (**self).u8(address)
    }

    fn u16(&self, address: u32) -> u16 {
        (**self).u16(address)
    }

    fn u32(&self, address: u32) -> u32 {
        (**self).u32(address)
    }

    fn s8(&self, address: u32) -> i8 {
        (**self).s8(address)
    }

    fn s16(&self, address: u32) -> i16 {
        (**self).s16(address)
    }

    fn write_u8(&self, address: u32, value: u8) {
        (**self).write_u8(address, value)
    }

    fn write_u16(&self, address: u32, value: u16) {
        (**self).write_u16(address, value)
    }

    fn write_u32(&self, address: u32, value: u32) {
        (**self).write_u32(address, value)
    }
}
