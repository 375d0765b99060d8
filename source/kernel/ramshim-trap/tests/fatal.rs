// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Fatal path: unsupported and out-of-range faults end in the policy
//! OWNERS: @kernel-team
//! STATUS: Functional
//! TEST_COVERAGE: 2 integration tests (single install per test binary)

use std::panic::{catch_unwind, AssertUnwindSafe};

use ramshim::{BackingStore, ExceptionFrame, FatalKind, FatalTrap, FaultContext, Region, ShimConfig};
use ramshim_trap::{install, last_fatal, service_frame, FatalPolicy};

const BASE: u32 = 0x2f00_0000;

struct ZeroStore;

impl BackingStore for ZeroStore {
    fn u8(&self, _address: u32) -> u8 {
        0
    }

    fn u16(&self, _address: u32) -> u16 {
        0
    }

    fn u32(&self, _address: u32) -> u32 {
        0
    }

    fn write_u8(&self, _address: u32, _value: u8) {}

    fn write_u16(&self, _address: u32, _value: u16) {}

    fn write_u32(&self, _address: u32, _value: u32) {}
}

static CONTEXT: FaultContext<ZeroStore> = FaultContext::new(
    ShimConfig::new(match Region::new(BASE, 0x80_0000) {
        Ok(region) => region,
        Err(_) => panic!("bad test region"),
    }),
    ZeroStore,
);

fn panic_policy(trap: &FatalTrap) -> ! {
    panic!("fatal: {trap}");
}

#[test]
fn fatal_paths_record_and_terminate() {
    assert_eq!(last_fatal(), None);
    unsafe { install(&CONTEXT, FatalPolicy::Custom(panic_policy)) }.unwrap();

    // ldr r1, [r0, #0] with r0 one word below the region.
    let mut frame = ExceptionFrame::new([BASE - 4, 7, 0, 0, 0, 0, 0, 0], 0x1000_0040);
    let before = frame;
    let result = catch_unwind(AssertUnwindSafe(|| service_frame(&mut frame, |_| 0x6801)));
    assert!(result.is_err());
    assert_eq!(frame, before);
    assert_eq!(last_fatal(), Some(FatalTrap::out_of_range(0x6801, 0x1000_0040, BASE - 4)));

    // Store forms are disabled in the default loads-only configuration.
    let mut frame = ExceptionFrame::new([BASE, 7, 0, 0, 0, 0, 0, 0], 0x1000_0080);
    let result = catch_unwind(AssertUnwindSafe(|| service_frame(&mut frame, |_| 0x6001)));
    assert!(result.is_err());
    let trap = last_fatal().unwrap();
    assert_eq!(trap.kind, FatalKind::UnsupportedInstruction);
    assert_eq!(trap.pc, 0x1000_0080);
    assert_eq!(CONTEXT.faults(), 2);
}
