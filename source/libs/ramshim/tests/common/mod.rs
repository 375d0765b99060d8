// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared host-side test doubles.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;

use ramshim::{BackingStore, Region};

pub const BASE: u32 = 0x2f00_0000;
pub const SIZE: u32 = 0x0080_0000;

pub fn region() -> Region {
    Region::new(BASE, SIZE).unwrap()
}

/// Sparse little-endian byte store; unwritten bytes read as zero.
#[derive(Default)]
pub struct MemStore {
    bytes: RefCell<BTreeMap<u32, u8>>,
    accesses: RefCell<Vec<(char, u32)>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_word(self, address: u32, value: u32) -> Self {
        self.write_u32(address, value);
        self.accesses.borrow_mut().clear();
        self
    }

    /// (kind, address) for every primitive call, in order.
    pub fn accesses(&self) -> Vec<(char, u32)> {
        self.accesses.borrow().clone()
    }

    fn get(&self, address: u32) -> u8 {
        self.bytes.borrow().get(&address).copied().unwrap_or(0)
    }

    fn put(&self, address: u32, value: u8) {
        self.bytes.borrow_mut().insert(address, value);
    }

    fn note(&self, kind: char, address: u32) {
        self.accesses.borrow_mut().push((kind, address));
    }
}

impl BackingStore for MemStore {
    fn u8(&self, address: u32) -> u8 {
        self.note('r', address);
        self.get(address)
    }

    fn u16(&self, address: u32) -> u16 {
        self.note('r', address);
        u16::from_le_bytes([self.get(address), self.get(address + 1)])
    }

    fn u32(&self, address: u32) -> u32 {
        self.note('r', address);
        u32::from_le_bytes([0, 1, 2, 3].map(|i| self.get(address + i)))
    }

    fn write_u8(&self, address: u32, value: u8) {
        self.note('w', address);
        self.put(address, value);
    }

    fn write_u16(&self, address: u32, value: u16) {
        self.note('w', address);
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.put(address + i as u32, b);
        }
    }

    fn write_u32(&self, address: u32, value: u32) {
        self.note('w', address);
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.put(address + i as u32, b);
        }
    }
}

/// Thumb encoders for the forms under test.
pub mod enc {
    pub fn reg(opcode: u16, variant: u16, rm: u16, rn: u16, rt: u16) -> u16 {
        (opcode << 11) | (variant << 9) | (rm << 6) | (rn << 3) | rt
    }

    pub fn imm(opcode: u16, imm5: u16, rn: u16, rt: u16) -> u16 {
        (opcode << 11) | (imm5 << 6) | (rn << 3) | rt
    }

    pub fn block(opcode: u16, rn: u16, list: u8) -> u16 {
        (opcode << 11) | (rn << 8) | u16::from(list)
    }

    pub const LDR_REG: (u16, u16) = (0b01011, 0b00);
    pub const LDRH_REG: (u16, u16) = (0b01011, 0b01);
    pub const LDRB_REG: (u16, u16) = (0b01011, 0b10);
    pub const LDRSH_REG: (u16, u16) = (0b01011, 0b11);
    pub const LDRSB_REG: (u16, u16) = (0b01010, 0b11);
    pub const STR_REG: (u16, u16) = (0b01010, 0b00);
    pub const STRH_REG: (u16, u16) = (0b01010, 0b01);
    pub const STRB_REG: (u16, u16) = (0b01010, 0b10);

    pub const LDR_IMM: u16 = 0b01101;
    pub const LDRB_IMM: u16 = 0b01111;
    pub const LDRH_IMM: u16 = 0b10001;
    pub const STR_IMM: u16 = 0b01100;
    pub const STRB_IMM: u16 = 0b01110;
    pub const STRH_IMM: u16 = 0b10000;

    pub const LDM: u16 = 0b11001;
    pub const STM: u16 = 0b11000;
}
