// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: HardFault entry: context installation and the Rust side of the trampoline
//! OWNERS: @kernel-team
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: tests/install.rs, tests/fatal.rs
//! PUBLIC API: install(), installed(), service_frame(), last_fatal(), InstallError
//! DEPENDS_ON: ramshim::Service, arch trampoline
//! INVARIANTS: install happens once before the vector is armed; a FatalTrap never returns to the program

use ramshim::{ExceptionFrame, FatalTrap, Service};
use thiserror::Error;

use crate::cell::{FatalRecord, InstallCell};
use crate::policy::FatalPolicy;

const TARGET: &str = "ramshim";

struct Installed {
    service: &'static dyn Service,
    policy: FatalPolicy,
}

static INSTALLED: InstallCell<Installed> = InstallCell::new();
static LAST_FATAL: FatalRecord = FatalRecord::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InstallError {
    #[error("fault context already installed")]
    AlreadyInstalled,
}

/// Registers the context serviced by the fault handler and the terminal
/// action for faults it cannot emulate.
///
/// # Safety
/// Caller must ensure single-core bring-up: no concurrent `install`, and the
/// fault vector is not yet pointing at the trampoline.
pub unsafe fn install(service: &'static dyn Service, policy: FatalPolicy) -> Result<(), InstallError> {
    // SAFETY: forwarded from the caller's contract.
    unsafe { INSTALLED.set(Installed { service, policy }) }
        .map_err(|_| InstallError::AlreadyInstalled)?;
    let config = service.config();
    log::info!(
        target: TARGET,
        "installed: region 0x{:08x}+0x{:x} {:?} policy={:?}",
        config.region.base(),
        config.region.size(),
        config.access,
        policy
    );
    Ok(())
}

pub fn installed() -> Option<&'static dyn Service> {
    INSTALLED.get().map(|installed| installed.service)
}

/// Last trap that took the fatal path.
pub fn last_fatal() -> Option<FatalTrap> {
    LAST_FATAL.get()
}

/// Services one fault. `fetch` reads the 16-bit instruction at the saved pc.
///
/// Returns only after a successful emulation; every other outcome ends in the
/// installed [`FatalPolicy`].
pub fn service_frame(frame: &mut ExceptionFrame, fetch: impl FnOnce(u32) -> u16) {
    let pc = frame.program_counter();
    let Some(installed) = INSTALLED.get() else {
        log::error!(target: TARGET, "fault with no context installed: pc=0x{pc:08x}");
        crate::arch::breakpoint(0, pc);
    };
    let instruction = fetch(pc);
    if let Err(trap) = installed.service.service(frame, instruction) {
        fatal(&trap, frame, installed.policy);
    }
}

#[cold]
fn fatal(trap: &FatalTrap, frame: &ExceptionFrame, policy: FatalPolicy) -> ! {
    LAST_FATAL.record(trap);
    log::error!(target: TARGET, "{trap} {frame:?}");
    policy.terminate(trap)
}

// Called from `__ramshim_hardfault` with the base of the combined frame.
#[no_mangle]
extern "C" fn __ramshim_fault_rust(base: *mut u32) {
    // SAFETY: the trampoline passes the 13-word frame it just completed on the
    // stack; nothing else references it until the handler returns.
    let frame = unsafe { ExceptionFrame::from_raw(base) };
    // SAFETY: the stacked pc addresses the faulting Thumb instruction.
    service_frame(frame, |pc| unsafe { core::ptr::read_volatile(pc as usize as *const u16) });
}
