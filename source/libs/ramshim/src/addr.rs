// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Effective-address calculation for decoded transfers.

use crate::decode::{Addressing, BlockTransfer, SingleTransfer};
use crate::frame::ExceptionFrame;

/// Bytes per element of a block transfer.
pub const BLOCK_STRIDE: u32 = 4;

/// Address of a single-register transfer: `rn + rm` or `rn + imm5 * scale`.
#[inline]
pub fn effective_address(transfer: &SingleTransfer, frame: &ExceptionFrame) -> u32 {
    match transfer.addressing {
        Addressing::Register { rn, rm } => frame.read(rn).wrapping_add(frame.read(rm)),
        Addressing::Immediate { rn, offset } => frame.read(rn).wrapping_add(offset),
    }
}

/// Addresses touched by a block transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Value of the base register; address of the lowest-numbered register.
    pub first: u32,
    /// Address of the highest-numbered register.
    pub last: u32,
    /// Address after the final element, i.e. the writeback value.
    pub end: u32,
}

pub fn block_span(transfer: &BlockTransfer, frame: &ExceptionFrame) -> BlockSpan {
    let first = frame.read(transfer.base);
    let len = transfer.list.count().wrapping_mul(BLOCK_STRIDE);
    BlockSpan {
        first,
        last: first.wrapping_add(len.saturating_sub(BLOCK_STRIDE)),
        end: first.wrapping_add(len),
    }
}
