// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! ARMv6-M specific pieces: fault entry trampoline, vector installation and
//! terminal actions.
//!
//! Host builds compile stubs so the Rust side of the fault path stays
//! testable; the stubs for terminal actions panic instead of stopping the core.

#[cfg(all(target_arch = "arm", target_os = "none"))]
const VTOR: usize = 0xE000_ED08;
#[cfg(all(target_arch = "arm", target_os = "none"))]
const AIRCR: usize = 0xE000_ED0C;
#[cfg(all(target_arch = "arm", target_os = "none"))]
const AIRCR_SYSRESETREQ: u32 = 0x05FA_0004;
#[cfg(all(target_arch = "arm", target_os = "none"))]
const HARDFAULT_SLOT: usize = 3;

// Hardware stacks r0-r3, r12, lr, pc, xpsr on whichever stack was active
// (EXC_RETURN bit 2). The trampoline stores r4-r7 and EXC_RETURN in the five
// words directly below that frame, calls the Rust entry with their base, then
// reloads r4-r7 from the (possibly updated) frame before returning.
#[cfg(all(target_arch = "arm", target_os = "none"))]
core::arch::global_asm!(
    r#"
    .section .text.__ramshim_hardfault, "ax", %progbits
    .globl __ramshim_hardfault
    .type  __ramshim_hardfault, %function
    .thumb_func
    .align 1
__ramshim_hardfault:
    movs  r0, #4
    mov   r1, lr
    tst   r0, r1
    bne   1f

    /* MSP: the software half is a plain push. */
    push  {{r4-r7, lr}}
    mov   r0, sp
    /* Keep the AAPCS 8-byte alignment for the call. */
    sub   sp, #4
    bl    __ramshim_fault_rust
    add   sp, #4
    pop   {{r4-r7, pc}}

1:
    /* PSP: write the software half below the process stack. */
    mrs   r0, psp
    subs  r0, #20
    mov   r2, r0
    stmia r2!, {{r4-r7}}
    str   r1, [r2]
    push  {{r0, r1}}
    bl    __ramshim_fault_rust
    pop   {{r0, r1}}
    ldmia r0!, {{r4-r7}}
    bx    r1
    .size __ramshim_hardfault, .-__ramshim_hardfault
"#
);

#[cfg(all(target_arch = "arm", target_os = "none"))]
extern "C" {
    fn __ramshim_hardfault();
}

/// Points the HardFault slot of the active vector table at the trampoline.
///
/// # Safety
/// The table addressed by VTOR must be in writable RAM, and the call must
/// happen once during bring-up, after the fault context is installed.
pub unsafe fn install_vector() {
    #[cfg(all(target_arch = "arm", target_os = "none"))]
    unsafe {
        let table = core::ptr::read_volatile(VTOR as *const u32) as usize as *mut u32;
        let entry = (__ramshim_hardfault as usize as u32) | 1;
        core::ptr::write_volatile(table.add(HARDFAULT_SLOT), entry);
        core::arch::asm!("dsb", "isb", options(nostack, preserves_flags));
    }
}

/// Raises a debug breakpoint with `r0` = instruction and `r1` = address,
/// then halts.
#[cold]
#[cfg(all(target_arch = "arm", target_os = "none"))]
pub fn breakpoint(instruction: u16, address: u32) -> ! {
    unsafe {
        core::arch::asm!(
            "bkpt #0",
            in("r0") u32::from(instruction),
            in("r1") address,
            options(nomem, nostack)
        );
    }
    halt()
}

#[cold]
#[cfg(not(all(target_arch = "arm", target_os = "none")))]
pub fn breakpoint(instruction: u16, address: u32) -> ! {
    panic!("breakpoint: ins=0x{instruction:04x} addr=0x{address:08x}");
}

/// Parks the core.
#[cold]
#[cfg(all(target_arch = "arm", target_os = "none"))]
pub fn halt() -> ! {
    loop {
        unsafe { core::arch::asm!("wfi", options(nomem, nostack, preserves_flags)) };
    }
}

#[cold]
#[cfg(not(all(target_arch = "arm", target_os = "none")))]
pub fn halt() -> ! {
    panic!("halt requested");
}

/// Requests a system reset through AIRCR.SYSRESETREQ.
#[cold]
#[cfg(all(target_arch = "arm", target_os = "none"))]
pub fn system_reset() -> ! {
    unsafe {
        core::arch::asm!("dsb", options(nostack, preserves_flags));
        core::ptr::write_volatile(AIRCR as *mut u32, AIRCR_SYSRESETREQ);
        core::arch::asm!("dsb", options(nostack, preserves_flags));
    }
    loop {
        core::hint::spin_loop();
    }
}

#[cold]
#[cfg(not(all(target_arch = "arm", target_os = "none")))]
pub fn system_reset() -> ! {
    panic!("system reset requested");
}
