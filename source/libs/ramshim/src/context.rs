// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Process-wide fault context: region, backing store and fault counter
//! OWNERS: @kernel-team
//! STATUS: Functional
//! API_STABILITY: Stable
//! TEST_COVERAGE: tests/emulation.rs
//! PUBLIC API: FaultContext, Service
//! DEPENDS_ON: decode, emulate
//! INVARIANTS: constructed once during bring-up, before the fault vector is armed;
//!             single owner, never re-entered on the same core
//!
//! The context replaces ambient globals: the platform builds one, places it in
//! a `static`, and hands a `&'static` reference to the installation step.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::ShimConfig;
use crate::decode::decode;
use crate::emulate::emulate;
use crate::fatal::FatalTrap;
use crate::frame::ExceptionFrame;
use crate::store::BackingStore;

const TARGET: &str = "ramshim";

pub struct FaultContext<S> {
    config: ShimConfig,
    store: S,
    faults: AtomicU32,
}

impl<S: BackingStore> FaultContext<S> {
    pub const fn new(config: ShimConfig, store: S) -> Self {
        Self { config, store, faults: AtomicU32::new(0) }
    }

    #[inline]
    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Faults serviced so far, successful or fatal.
    #[inline]
    pub fn faults(&self) -> u32 {
        self.faults.load(Ordering::Relaxed)
    }

    /// Emulates the faulting `instruction` against `frame`.
    ///
    /// On `Err` the frame is untouched and the caller must not resume the
    /// interrupted program.
    pub fn service(&self, frame: &mut ExceptionFrame, instruction: u16) -> Result<(), FatalTrap> {
        // ARMv6-M has no atomic read-modify-write; the count is diagnostic only.
        self.faults.store(self.faults().wrapping_add(1), Ordering::Relaxed);

        let pc = frame.program_counter();
        let op = decode(instruction, self.config.access)
            .map_err(|_| FatalTrap::unsupported(instruction, pc))?;
        log::trace!(target: TARGET, "pc=0x{pc:08x} {op}");

        emulate(&op, frame, &self.store, &self.config.region)
            .map_err(|err| FatalTrap::out_of_range(instruction, pc, err.address))
    }
}

/// Object-safe view of a [`FaultContext`] for the installation step.
pub trait Service: Sync {
    fn service(&self, frame: &mut ExceptionFrame, instruction: u16) -> Result<(), FatalTrap>;
    fn faults(&self) -> u32;
    fn config(&self) -> &ShimConfig;
}

impl<S: BackingStore + Sync> Service for FaultContext<S> {
    fn service(&self, frame: &mut ExceptionFrame, instruction: u16) -> Result<(), FatalTrap> {
        FaultContext::service(self, frame, instruction)
    }

    fn faults(&self) -> u32 {
        FaultContext::faults(self)
    }

    fn config(&self) -> &ShimConfig {
        FaultContext::config(self)
    }
}
