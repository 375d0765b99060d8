// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Exception frame model over the trampoline + hardware stack
//! OWNERS: @kernel-team
//! STATUS: Functional
//! API_STABILITY: Stable
//! TEST_COVERAGE: Unit tests (slot map, accessors, formatting)
//! PUBLIC API: ExceptionFrame, Reg, RegList, fmt_frame()
//! INVARIANTS: low registers are addressed only through REGISTER_SLOTS; layout matches the trampoline
//!
//! Layout, lowest address first:
//!
//! ```text
//!  base ->  r4 r5 r6 r7 exc_return | r0 r1 r2 r3 r12 lr pc xpsr
//!           pushed by trampoline   | pushed by hardware on entry
//! ```
//!
//! The two halves are contiguous but were written by different actors in
//! different orders, so logical register `n` is never at word `n`.

use bitflags::bitflags;
use core::fmt::{self, Write};
use static_assertions::{const_assert, const_assert_eq};

/// Words pushed by the trampoline (r4-r7 and its own return link).
pub const SOFTWARE_WORDS: usize = 5;
/// Words pushed by the processor on exception entry.
pub const HARDWARE_WORDS: usize = 8;
/// Total size of the combined frame.
pub const FRAME_WORDS: usize = SOFTWARE_WORDS + HARDWARE_WORDS;

// Offsets relative to the first hardware-pushed word (r0).
const R4: i8 = -5;
const R5: i8 = -4;
const R6: i8 = -3;
const R7: i8 = -2;
const EXC_RETURN: i8 = -1;
const R0: i8 = 0;
const R1: i8 = 1;
const R2: i8 = 2;
const R3: i8 = 3;
const R12: i8 = 4;
const LR: i8 = 5;
const PC: i8 = 6;
const XPSR: i8 = 7;

/// Register Index Map: logical register number to stack offset.
const REGISTER_SLOTS: [i8; 8] = [R0, R1, R2, R3, R4, R5, R6, R7];

const fn physical(offset: i8) -> usize {
    (SOFTWARE_WORDS as isize + offset as isize) as usize
}

const fn slots_are_distinct() -> bool {
    let mut seen = 0u16;
    let mut i = 0;
    while i < REGISTER_SLOTS.len() {
        let slot = physical(REGISTER_SLOTS[i]);
        if slot >= FRAME_WORDS || seen & (1 << slot) != 0 {
            return false;
        }
        seen |= 1 << slot;
        i += 1;
    }
    true
}

const_assert!(slots_are_distinct());
const_assert_eq!(physical(R4), 0);
const_assert_eq!(physical(XPSR), FRAME_WORDS - 1);
const_assert_eq!(core::mem::size_of::<ExceptionFrame>(), FRAME_WORDS * 4);

/// One of the eight low registers the emulated instructions can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Reg {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
}

impl Reg {
    pub const ALL: [Reg; 8] =
        [Reg::R0, Reg::R1, Reg::R2, Reg::R3, Reg::R4, Reg::R5, Reg::R6, Reg::R7];

    /// Returns `None` for anything outside r0..r7.
    pub const fn new(index: u8) -> Option<Self> {
        if index < 8 {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// Decodes a 3-bit register field from the low bits of `bits`.
    #[inline]
    pub const fn from_field(bits: u16) -> Self {
        Self::ALL[(bits & 0b111) as usize]
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    const fn slot(self) -> usize {
        physical(REGISTER_SLOTS[self as usize])
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.index())
    }
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    /// Register-presence mask of a block transfer.
    pub struct RegList: u8 {
        const R0 = 1 << 0;
        const R1 = 1 << 1;
        const R2 = 1 << 2;
        const R3 = 1 << 3;
        const R4 = 1 << 4;
        const R5 = 1 << 5;
        const R6 = 1 << 6;
        const R7 = 1 << 7;
    }
}

impl RegList {
    /// Selected registers in ascending index order.
    pub fn regs(self) -> impl Iterator<Item = Reg> {
        Reg::ALL.into_iter().filter(move |reg| self.contains(RegList::from(*reg)))
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.bits().count_ones()
    }
}

impl From<Reg> for RegList {
    fn from(reg: Reg) -> Self {
        RegList::from_bits_retain(1 << reg.index())
    }
}

impl fmt::Display for RegList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('{')?;
        for (i, reg) in self.regs().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{reg}")?;
        }
        f.write_char('}')
    }
}

/// Register context saved at fault time.
///
/// Must match the push order of the fault entry trampoline.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ExceptionFrame {
    words: [u32; FRAME_WORDS],
}

impl ExceptionFrame {
    /// Builds a frame from raw words in stack order.
    pub const fn from_words(words: [u32; FRAME_WORDS]) -> Self {
        Self { words }
    }

    /// Builds a frame holding `registers` (logical order r0..r7) and `pc`.
    pub fn new(registers: [u32; 8], pc: u32) -> Self {
        let mut frame = Self::default();
        for reg in Reg::ALL {
            frame.write(reg, registers[reg.index()]);
        }
        frame.set_program_counter(pc);
        frame
    }

    /// Reinterprets the combined frame the trampoline built on the stack.
    ///
    /// # Safety
    /// `base` must point at [`FRAME_WORDS`] writable, word-aligned words laid out
    /// as described in the module docs, valid and unaliased for `'a`.
    pub unsafe fn from_raw<'a>(base: *mut u32) -> &'a mut Self {
        // SAFETY: repr(C) wrapper around [u32; FRAME_WORDS]; the caller upholds
        // validity, alignment and exclusivity.
        unsafe { &mut *base.cast::<Self>() }
    }

    #[inline]
    pub const fn words(&self) -> &[u32; FRAME_WORDS] {
        &self.words
    }

    #[inline]
    pub const fn read(&self, reg: Reg) -> u32 {
        self.words[reg.slot()]
    }

    #[inline]
    pub fn write(&mut self, reg: Reg, value: u32) {
        self.words[reg.slot()] = value;
    }

    /// r0..r7 in logical order.
    pub fn registers(&self) -> [u32; 8] {
        Reg::ALL.map(|reg| self.read(reg))
    }

    /// Address of the faulting instruction (the exception return address).
    #[inline]
    pub const fn program_counter(&self) -> u32 {
        self.words[physical(PC)]
    }

    #[inline]
    pub fn set_program_counter(&mut self, address: u32) {
        self.words[physical(PC)] = address;
    }

    #[inline]
    pub fn advance_program_counter(&mut self, bytes: u32) {
        let pc = self.program_counter().wrapping_add(bytes);
        self.set_program_counter(pc);
    }

    #[inline]
    pub const fn r12(&self) -> u32 {
        self.words[physical(R12)]
    }

    /// Link register of the interrupted program.
    #[inline]
    pub const fn lr(&self) -> u32 {
        self.words[physical(LR)]
    }

    #[inline]
    pub const fn xpsr(&self) -> u32 {
        self.words[physical(XPSR)]
    }

    /// EXC_RETURN value the trampoline will return through.
    #[inline]
    pub const fn exc_return(&self) -> u32 {
        self.words[physical(EXC_RETURN)]
    }
}

impl fmt::Debug for ExceptionFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionFrame")
            .field("pc", &format_args!("0x{:08x}", self.program_counter()))
            .field("r", &format_args!("{:08x?}", self.registers()))
            .finish_non_exhaustive()
    }
}

/// Writes a multi-line register dump.
pub fn fmt_frame<W: Write>(frame: &ExceptionFrame, f: &mut W) -> fmt::Result {
    writeln!(f, " pc=0x{:08x} lr=0x{:08x} xpsr=0x{:08x}", frame.program_counter(), frame.lr(), frame.xpsr())?;
    writeln!(f, " r12=0x{:08x} exc_return=0x{:08x}", frame.r12(), frame.exc_return())?;
    writeln!(f, " r0..r7 = {:08x?}", frame.registers())
}
