// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Decoder for the 16-bit Thumb load/store forms emitted against the region
//! OWNERS: @kernel-team
//! STATUS: Functional
//! API_STABILITY: Stable
//! TEST_COVERAGE: Unit tests (every table row, store gating, disassembly)
//! PUBLIC API: decode(), Form, Operation, SingleTransfer, BlockTransfer, Access, Addressing
//! INVARIANTS: anything not in Form::lookup, or disabled by AccessMode, is Unsupported
//!
//! Encodings (primary opcode = bits 15..11, variant = bits 10..9):
//!
//! ```text
//! str   reg   01010 00mmmnnnttt      ldr   reg   01011 00mmmnnnttt
//! strh  reg   01010 01mmmnnnttt      ldrh  reg   01011 01mmmnnnttt
//! strb  reg   01010 10mmmnnnttt      ldrb  reg   01011 10mmmnnnttt
//! ldrsb reg   01010 11mmmnnnttt      ldrsh reg   01011 11mmmnnnttt
//! str   imm   01100 iiiiinnnttt      ldr   imm   01101 iiiiinnnttt
//! strb  imm   01110 iiiiinnnttt      ldrb  imm   01111 iiiiinnnttt
//! strh  imm   10000 iiiiinnnttt      ldrh  imm   10001 iiiiinnnttt
//! stm         11000 nnnrrrrrrrr      ldm         11001 nnnrrrrrrrr
//! ```

use core::fmt;
use thiserror::Error;

use crate::config::AccessMode;
use crate::frame::{Reg, RegList};

/// Every supported form is a single 16-bit instruction.
pub const INSTRUCTION_BYTES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported instruction 0x{0:04x}")]
pub struct Unsupported(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Load,
    Store,
}

/// Width and signedness of a single transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    U8,
    S8,
    U16,
    S16,
    U32,
}

impl Access {
    #[inline]
    pub const fn bytes(self) -> u32 {
        match self {
            Access::U8 | Access::S8 => 1,
            Access::U16 | Access::S16 => 2,
            Access::U32 => 4,
        }
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(self, Access::S8 | Access::S16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// `[rn, rm]`
    Register { rn: Reg, rm: Reg },
    /// `[rn, #offset]`, offset already scaled by the access width.
    Immediate { rn: Reg, offset: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleTransfer {
    pub direction: Direction,
    pub access: Access,
    pub addressing: Addressing,
    /// Target (load) or source (store) register.
    pub rt: Reg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTransfer {
    pub direction: Direction,
    pub base: Reg,
    pub list: RegList,
}

impl BlockTransfer {
    /// Base register is updated unless it is itself part of the transfer.
    #[inline]
    pub fn writeback(&self) -> bool {
        !self.list.contains(RegList::from(self.base))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Single(SingleTransfer),
    Block(BlockTransfer),
}

impl Operation {
    pub const fn direction(&self) -> Direction {
        match self {
            Operation::Single(t) => t.direction,
            Operation::Block(t) => t.direction,
        }
    }
}

/// Decode table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    StrReg,
    StrhReg,
    StrbReg,
    LdrsbReg,
    LdrReg,
    LdrhReg,
    LdrbReg,
    LdrshReg,
    StrImm,
    LdrImm,
    StrbImm,
    LdrbImm,
    StrhImm,
    LdrhImm,
    Stm,
    Ldm,
}

impl Form {
    pub const fn lookup(opcode: u8, variant: u8) -> Option<Form> {
        let form = match (opcode, variant) {
            (0b01010, 0b00) => Form::StrReg,
            (0b01010, 0b01) => Form::StrhReg,
            (0b01010, 0b10) => Form::StrbReg,
            (0b01010, 0b11) => Form::LdrsbReg,
            (0b01011, 0b00) => Form::LdrReg,
            (0b01011, 0b01) => Form::LdrhReg,
            (0b01011, 0b10) => Form::LdrbReg,
            (0b01011, 0b11) => Form::LdrshReg,
            (0b01100, _) => Form::StrImm,
            (0b01101, _) => Form::LdrImm,
            (0b01110, _) => Form::StrbImm,
            (0b01111, _) => Form::LdrbImm,
            (0b10000, _) => Form::StrhImm,
            (0b10001, _) => Form::LdrhImm,
            (0b11000, _) => Form::Stm,
            (0b11001, _) => Form::Ldm,
            _ => return None,
        };
        Some(form)
    }

    pub const fn direction(self) -> Direction {
        match self {
            Form::StrReg
            | Form::StrhReg
            | Form::StrbReg
            | Form::StrImm
            | Form::StrbImm
            | Form::StrhImm
            | Form::Stm => Direction::Store,
            Form::LdrsbReg
            | Form::LdrReg
            | Form::LdrhReg
            | Form::LdrbReg
            | Form::LdrshReg
            | Form::LdrImm
            | Form::LdrbImm
            | Form::LdrhImm
            | Form::Ldm => Direction::Load,
        }
    }
}

/// Classifies `instruction`; store forms are only accepted when `mode`
/// allows them.
pub fn decode(instruction: u16, mode: AccessMode) -> Result<Operation, Unsupported> {
    let opcode = ((instruction >> 11) & 0b1_1111) as u8;
    let variant = ((instruction >> 9) & 0b11) as u8;
    let form = Form::lookup(opcode, variant).ok_or(Unsupported(instruction))?;
    if form.direction() == Direction::Store && !mode.allows_stores() {
        return Err(Unsupported(instruction));
    }

    let rt = Reg::from_field(instruction);
    let rn = Reg::from_field(instruction >> 3);
    let rm = Reg::from_field(instruction >> 6);
    let imm5 = u32::from((instruction >> 6) & 0b1_1111);

    let register = Addressing::Register { rn, rm };
    let scaled = |access: Access| Addressing::Immediate { rn, offset: imm5 * access.bytes() };
    let single = |direction, access, addressing| {
        Operation::Single(SingleTransfer { direction, access, addressing, rt })
    };
    use Access::*;
    use Direction::*;

    let op = match form {
        Form::StrReg => single(Store, U32, register),
        Form::StrhReg => single(Store, U16, register),
        Form::StrbReg => single(Store, U8, register),
        Form::LdrsbReg => single(Load, S8, register),
        Form::LdrReg => single(Load, U32, register),
        Form::LdrhReg => single(Load, U16, register),
        Form::LdrbReg => single(Load, U8, register),
        Form::LdrshReg => single(Load, S16, register),
        Form::StrImm => single(Store, U32, scaled(U32)),
        Form::LdrImm => single(Load, U32, scaled(U32)),
        Form::StrbImm => single(Store, U8, scaled(U8)),
        Form::LdrbImm => single(Load, U8, scaled(U8)),
        Form::StrhImm => single(Store, U16, scaled(U16)),
        Form::LdrhImm => single(Load, U16, scaled(U16)),
        Form::Stm | Form::Ldm => {
            let list = RegList::from_bits_retain(instruction as u8);
            // An empty register list is UNPREDICTABLE.
            if list.is_empty() {
                return Err(Unsupported(instruction));
            }
            Operation::Block(BlockTransfer {
                direction: form.direction(),
                base: Reg::from_field(instruction >> 8),
                list,
            })
        }
    };
    Ok(op)
}

const fn mnemonic(direction: Direction, access: Access) -> &'static str {
    match (direction, access) {
        (Direction::Load, Access::U32) => "ldr",
        (Direction::Load, Access::U16) => "ldrh",
        (Direction::Load, Access::S16) => "ldrsh",
        (Direction::Load, Access::U8) => "ldrb",
        (Direction::Load, Access::S8) => "ldrsb",
        (Direction::Store, Access::U32) => "str",
        (Direction::Store, Access::U16 | Access::S16) => "strh",
        (Direction::Store, Access::U8 | Access::S8) => "strb",
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Single(t) => {
                write!(f, "{} {}, ", mnemonic(t.direction, t.access), t.rt)?;
                match t.addressing {
                    Addressing::Register { rn, rm } => write!(f, "[{rn}, {rm}]"),
                    Addressing::Immediate { rn, offset } => write!(f, "[{rn}, #{offset}]"),
                }
            }
            Operation::Block(t) => {
                let mnemonic = match t.direction {
                    Direction::Load => "ldm",
                    Direction::Store => "stm",
                };
                let bang = if t.writeback() { "!" } else { "" };
                write!(f, "{mnemonic} {}{bang}, {}", t.base, t.list)
            }
        }
    }
}
