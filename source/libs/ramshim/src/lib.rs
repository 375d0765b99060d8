// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Trap-and-emulate access to an aliased memory region (ARMv6-M Thumb)
//! OWNERS: @kernel-team
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: Unit tests per module, tests/emulation.rs, tests/props.rs
//! PUBLIC API: FaultContext, ExceptionFrame, Region, BackingStore, decode(), emulate(), FatalTrap
//! DEPENDS_ON: platform fault trampoline (ramshim-trap) supplies frames
//! INVARIANTS: no allocation, no locking, no recovery from FatalTrap
//!
//! Accesses to the shimmed region fault; the platform trampoline captures the
//! register context and calls into [`FaultContext::service`], which decodes
//! the instruction, performs the access against the [`BackingStore`] and
//! resumes the program one instruction later.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]

pub mod addr;
pub mod config;
pub mod context;
pub mod decode;
pub mod emulate;
pub mod fatal;
pub mod frame;
pub mod region;
pub mod store;

pub use config::{AccessMode, ShimConfig};
pub use context::{FaultContext, Service};
pub use decode::{decode, Operation, Unsupported};
pub use emulate::{emulate, OutOfRange};
pub use fatal::{FatalKind, FatalTrap};
pub use frame::{fmt_frame, ExceptionFrame, Reg, RegList};
pub use region::{Region, RegionError};
pub use store::BackingStore;
