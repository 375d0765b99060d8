// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Emulation dispatcher: validate, access the backing store, update the frame
//! OWNERS: @kernel-team
//! STATUS: Functional
//! API_STABILITY: Stable
//! TEST_COVERAGE: Unit tests + tests/emulation.rs + tests/props.rs
//! PUBLIC API: emulate(), OutOfRange
//! DEPENDS_ON: store::BackingStore, region::Region
//! INVARIANTS: every touched address is validated before the first store access or frame write;
//!             on success pc advances by one instruction and only target/base registers change

use thiserror::Error;

use crate::addr::{block_span, effective_address, BLOCK_STRIDE};
use crate::decode::{Access, BlockTransfer, Direction, Operation, SingleTransfer, INSTRUCTION_BYTES};
use crate::frame::ExceptionFrame;
use crate::region::Region;
use crate::store::BackingStore;

/// An effective address outside the region; nothing was modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("address 0x{address:08x} outside shimmed region")]
pub struct OutOfRange {
    pub address: u32,
}

/// Performs `op` against `store`, writes results into `frame` and advances
/// the saved program counter.
pub fn emulate<S: BackingStore + ?Sized>(
    op: &Operation,
    frame: &mut ExceptionFrame,
    store: &S,
    region: &Region,
) -> Result<(), OutOfRange> {
    match op {
        Operation::Single(transfer) => single(transfer, frame, store, region)?,
        Operation::Block(transfer) => block(transfer, frame, store, region)?,
    }
    frame.advance_program_counter(INSTRUCTION_BYTES);
    Ok(())
}

fn single<S: BackingStore + ?Sized>(
    transfer: &SingleTransfer,
    frame: &mut ExceptionFrame,
    store: &S,
    region: &Region,
) -> Result<(), OutOfRange> {
    let address = effective_address(transfer, frame);
    if !region.contains_span(address, transfer.access.bytes()) {
        return Err(OutOfRange { address });
    }
    match transfer.direction {
        Direction::Load => {
            let value = load(store, transfer.access, address);
            frame.write(transfer.rt, value);
        }
        Direction::Store => store_value(store, transfer.access, address, frame.read(transfer.rt)),
    }
    Ok(())
}

fn block<S: BackingStore + ?Sized>(
    transfer: &BlockTransfer,
    frame: &mut ExceptionFrame,
    store: &S,
    region: &Region,
) -> Result<(), OutOfRange> {
    let span = block_span(transfer, frame);
    // Region is contiguous and the transfer only ascends.
    for address in [span.first, span.last] {
        if !region.contains_span(address, BLOCK_STRIDE) {
            return Err(OutOfRange { address });
        }
    }

    let mut address = span.first;
    for reg in transfer.list.regs() {
        match transfer.direction {
            Direction::Load => {
                let value = store.u32(address);
                frame.write(reg, value);
            }
            Direction::Store => store.write_u32(address, frame.read(reg)),
        }
        address = address.wrapping_add(BLOCK_STRIDE);
    }

    if transfer.writeback() {
        frame.write(transfer.base, address);
    }
    Ok(())
}

/// Reads at `access` width, zero- or sign-extending to a full register.
#[inline]
fn load<S: BackingStore + ?Sized>(store: &S, access: Access, address: u32) -> u32 {
    match access {
        Access::U8 => u32::from(store.u8(address)),
        Access::S8 => i32::from(store.s8(address)) as u32,
        Access::U16 => u32::from(store.u16(address)),
        Access::S16 => i32::from(store.s16(address)) as u32,
        Access::U32 => store.u32(address),
    }
}

/// Writes the low `access` bytes of `value`.
#[inline]
fn store_value<S: BackingStore + ?Sized>(store: &S, access: Access, address: u32, value: u32) {
    match access {
        Access::U8 | Access::S8 => store.write_u8(address, value as u8),
        Access::U16 | Access::S16 => store.write_u16(address, value as u16),
        Access::U32 => store.write_u32(address, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccessMode;
    use crate::decode::decode;
    use core::cell::RefCell;
    use std::collections::BTreeMap;

    const BASE: u32 = 0x2f00_0000;

    #[derive(Default)]
    struct MockStore {
        bytes: RefCell<BTreeMap<u32, u8>>,
        reads: RefCell<usize>,
    }

    impl MockStore {
        fn byte(&self, address: u32) -> u8 {
            *self.reads.borrow_mut() += 1;
            self.bytes.borrow().get(&address).copied().unwrap_or(0)
        }
    }

    impl BackingStore for MockStore {
        fn u8(&self, address: u32) -> u8 {
            self.byte(address)
        }

        fn u16(&self, address: u32) -> u16 {
            u16::from_le_bytes([self.byte(address), self.byte(address + 1)])
        }

        fn u32(&self, address: u32) -> u32 {
            u32::from_le_bytes([0, 1, 2, 3].map(|i| self.byte(address + i)))
        }

        fn write_u8(&self, address: u32, value: u8) {
            self.bytes.borrow_mut().insert(address, value);
        }

        fn write_u16(&self, address: u32, value: u16) {
            for (i, b) in value.to_le_bytes().into_iter().enumerate() {
                self.write_u8(address + i as u32, b);
            }
        }

        fn write_u32(&self, address: u32, value: u32) {
            for (i, b) in value.to_le_bytes().into_iter().enumerate() {
                self.write_u8(address + i as u32, b);
            }
        }
    }

    fn region() -> Region {
        Region::new(BASE, 0x80_0000).unwrap()
    }

    fn run(ins: u16, frame: &mut ExceptionFrame, store: &MockStore) -> Result<(), OutOfRange> {
        let op = decode(ins, AccessMode::LoadsAndStores).unwrap();
        emulate(&op, frame, store, &region())
    }

    #[test]
    fn signed_half_word_extends() {
        let store = MockStore::default();
        store.write_u16(BASE + 2, 0x8001);
        let mut frame = ExceptionFrame::new([BASE, 2, 0, 0, 0, 0, 0, 0], 0x100);
        // ldrsh r3, [r0, r1]
        run(0b01011_11_001_000_011, &mut frame, &store).unwrap();
        assert_eq!(frame.read(crate::frame::Reg::R3), 0xffff_8001);
        // ldrh r3, [r0, r1]
        run(0b01011_01_001_000_011, &mut frame, &store).unwrap();
        assert_eq!(frame.read(crate::frame::Reg::R3), 0x0000_8001);
        assert_eq!(frame.program_counter(), 0x104);
    }

    #[test]
    fn store_truncates_to_width() {
        let store = MockStore::default();
        let mut frame = ExceptionFrame::new([BASE, 0, 0, 0, 0, 0, 0, 0x1234_5678], 0x100);
        // strb r7, [r0, #1]
        run(0b01110_00001_000_111, &mut frame, &store).unwrap();
        // strh r7, [r0, #4]
        run(0b10000_00010_000_111, &mut frame, &store).unwrap();
        assert_eq!(store.u8(BASE + 1), 0x78);
        assert_eq!(store.u16(BASE + 4), 0x5678);
        assert_eq!(store.u8(BASE + 6), 0);
    }

    #[test]
    fn out_of_range_touches_nothing() {
        let store = MockStore::default();
        let mut frame = ExceptionFrame::new([BASE - 4, 0, 0, 0, 0, 0, 0, 0], 0x100);
        let before = frame;
        // ldr r1, [r0, #0]
        assert_eq!(run(0b01101_00000_000_001, &mut frame, &store), Err(OutOfRange { address: BASE - 4 }));
        assert_eq!(frame, before);
        assert_eq!(*store.reads.borrow(), 0);
    }

    #[test]
    fn block_rejects_tail_outside_region() {
        let store = MockStore::default();
        let top = BASE + 0x80_0000 - 4;
        let mut frame = ExceptionFrame::new([top, 0, 0, 0, 0, 0, 0, 0], 0x100);
        let before = frame;
        // ldm r0!, {r1, r2}
        assert_eq!(run(0b11001_000_0000_0110, &mut frame, &store), Err(OutOfRange { address: top + 4 }));
        assert_eq!(frame, before);
        assert_eq!(*store.reads.borrow(), 0);
    }

    #[test]
    fn stm_writes_ascending_and_writes_back() {
        let store = MockStore::default();
        let mut frame = ExceptionFrame::new([0xa, 0xb, 0, 0, BASE + 8, 0, 0, 0xc], 0x100);
        // stm r4!, {r0, r1, r7}
        run(0b11000_100_1000_0011, &mut frame, &store).unwrap();
        assert_eq!(store.u32(BASE + 8), 0xa);
        assert_eq!(store.u32(BASE + 12), 0xb);
        assert_eq!(store.u32(BASE + 16), 0xc);
        assert_eq!(frame.read(crate::frame::Reg::R4), BASE + 20);
    }
}
