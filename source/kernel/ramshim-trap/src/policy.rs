// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Terminal action taken when a fault cannot be emulated.

use core::fmt;

use ramshim::FatalTrap;

use crate::arch;

/// Single policy point for the fatal path. None of these return.
#[derive(Clone, Copy, Default)]
pub enum FatalPolicy {
    /// `bkpt` with r0 = instruction, r1 = address (or pc), then halt.
    #[default]
    Breakpoint,
    /// Park the core in a `wfi` loop.
    Halt,
    /// System reset via AIRCR.
    Reset,
    /// Platform-provided terminal action.
    Custom(fn(&FatalTrap) -> !),
}

impl FatalPolicy {
    pub fn terminate(self, trap: &FatalTrap) -> ! {
        match self {
            FatalPolicy::Breakpoint => arch::breakpoint(trap.instruction, trap.address.unwrap_or(trap.pc)),
            FatalPolicy::Halt => arch::halt(),
            FatalPolicy::Reset => arch::system_reset(),
            FatalPolicy::Custom(hook) => hook(trap),
        }
    }
}

impl fmt::Debug for FatalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalPolicy::Breakpoint => f.write_str("Breakpoint"),
            FatalPolicy::Halt => f.write_str("Halt"),
            FatalPolicy::Reset => f.write_str("Reset"),
            FatalPolicy::Custom(_) => f.write_str("Custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hook(trap: &FatalTrap) -> ! {
        panic!("hook: {trap}");
    }

    #[test]
    #[should_panic(expected = "hook: unsupported instruction: ins=0xffff")]
    fn custom_hook_receives_trap() {
        FatalPolicy::Custom(hook).terminate(&FatalTrap::unsupported(0xffff, 0x100));
    }

    #[test]
    #[should_panic(expected = "breakpoint: ins=0x6808 addr=0x2efffffc")]
    fn breakpoint_reports_address() {
        FatalPolicy::default().terminate(&FatalTrap::out_of_range(0x6808, 0x100, 0x2eff_fffc));
    }

    #[test]
    fn debug_names_variant() {
        assert_eq!(format!("{:?}", FatalPolicy::Custom(hook)), "Custom");
        assert_eq!(format!("{:?}", FatalPolicy::Reset), "Reset");
    }
}
