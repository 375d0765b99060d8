// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Platform glue that turns ARMv6-M HardFaults into ramshim emulation
//! OWNERS: @kernel-team
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: Unit tests (cells, policy) + tests/ (host-side fault path)
//! PUBLIC API: install(), install_vector(), service_frame(), last_fatal(), FatalPolicy
//! DEPENDS_ON: ramshim
//!
//! Bring-up order: build a `FaultContext` in a `static`, [`install`] it with a
//! [`FatalPolicy`], then either call [`install_vector`] (RAM vector table) or
//! point the HardFault entry of the linked vector table at
//! `__ramshim_hardfault`.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]

mod arch;
mod cell;
pub mod policy;
pub mod trap;

pub use arch::install_vector;
pub use policy::FatalPolicy;
pub use trap::{install, installed, last_fatal, service_frame, InstallError};
