// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Write-once cells usable from the fault path.
//!
//! ARMv6-M has no compare-and-swap, so these rely on atomic loads and stores
//! only and push exclusivity of the writer onto the caller.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use ramshim::{FatalKind, FatalTrap};

/// Set once during bring-up, read from fault context afterwards.
pub struct InstallCell<T> {
    ready: AtomicBool,
    value: UnsafeCell<Option<T>>,
}

// SAFETY: `value` is written only by `set`, whose contract excludes concurrent
// writers, and published to readers through the Release/Acquire on `ready`.
unsafe impl<T: Send + Sync> Sync for InstallCell<T> {}

impl<T> InstallCell<T> {
    pub const fn new() -> Self {
        Self { ready: AtomicBool::new(false), value: UnsafeCell::new(None) }
    }

    /// Stores `value` unless the cell is already set.
    ///
    /// # Safety
    /// Must not run concurrently with another `set` on the same cell.
    pub unsafe fn set(&self, value: T) -> Result<(), T> {
        if self.ready.load(Ordering::Acquire) {
            return Err(value);
        }
        // SAFETY: single writer per the contract; readers only look after `ready`.
        unsafe { *self.value.get() = Some(value) };
        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    pub fn get(&self) -> Option<&T> {
        if !self.ready.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: published and never written again.
        unsafe { (*self.value.get()).as_ref() }
    }
}

const NO_RECORD: u32 = 0;
const KIND_UNSUPPORTED: u32 = 1;
const KIND_OUT_OF_RANGE: u32 = 2;

/// Last fatal trap, kept for an attached debugger.
///
/// Fields are independent atomics; two cores failing at once may leave a
/// mixed record, which is acceptable for diagnostics.
pub struct FatalRecord {
    kind: AtomicU32,
    instruction: AtomicU32,
    pc: AtomicU32,
    address: AtomicU32,
}

impl FatalRecord {
    pub const fn new() -> Self {
        Self {
            kind: AtomicU32::new(NO_RECORD),
            instruction: AtomicU32::new(0),
            pc: AtomicU32::new(0),
            address: AtomicU32::new(0),
        }
    }

    pub fn record(&self, trap: &FatalTrap) {
        let kind = match trap.kind {
            FatalKind::UnsupportedInstruction => KIND_UNSUPPORTED,
            FatalKind::OutOfRangeAddress => KIND_OUT_OF_RANGE,
        };
        self.kind.store(NO_RECORD, Ordering::Release);
        self.instruction.store(u32::from(trap.instruction), Ordering::Relaxed);
        self.pc.store(trap.pc, Ordering::Relaxed);
        self.address.store(trap.address.unwrap_or(0), Ordering::Relaxed);
        self.kind.store(kind, Ordering::Release);
    }

    pub fn get(&self) -> Option<FatalTrap> {
        let kind = self.kind.load(Ordering::Acquire);
        let instruction = self.instruction.load(Ordering::Relaxed) as u16;
        let pc = self.pc.load(Ordering::Relaxed);
        let address = self.address.load(Ordering::Relaxed);
        match kind {
            KIND_UNSUPPORTED => Some(FatalTrap::unsupported(instruction, pc)),
            KIND_OUT_OF_RANGE => Some(FatalTrap::out_of_range(instruction, pc, address)),
            _ => None,
        }
    }
}
