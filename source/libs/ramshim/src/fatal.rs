// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Terminal outcomes of the fault handler
//! OWNERS: @kernel-team
//! STATUS: Functional
//! API_STABILITY: Stable
//! TEST_COVERAGE: Unit tests (formatting)
//! PUBLIC API: FatalKind, FatalTrap
//! INVARIANTS: a FatalTrap is produced before any frame mutation; callers never resume the program

use core::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FatalKind {
    /// The faulting instruction matches no enabled decode form.
    #[error("unsupported instruction")]
    UnsupportedInstruction,
    /// An effective address falls outside the shimmed region.
    #[error("address outside shimmed region")]
    OutOfRangeAddress,
}

/// Diagnostic payload handed to the platform's terminal action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub struct FatalTrap {
    pub kind: FatalKind,
    pub instruction: u16,
    pub pc: u32,
    /// Offending effective address; `None` for undecodable instructions.
    pub address: Option<u32>,
}

impl FatalTrap {
    pub const fn unsupported(instruction: u16, pc: u32) -> Self {
        Self { kind: FatalKind::UnsupportedInstruction, instruction, pc, address: None }
    }

    pub const fn out_of_range(instruction: u16, pc: u32, address: u32) -> Self {
        Self { kind: FatalKind::OutOfRangeAddress, instruction, pc, address: Some(address) }
    }
}

impl fmt::Display for FatalTrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ins=0x{:04x} pc=0x{:08x}", self.kind, self.instruction, self.pc)?;
        if let Some(address) = self.address {
            write!(f, " addr=0x{address:08x}")?;
        }
        Ok(())
    }
}
