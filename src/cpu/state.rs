/*!
state.rs - Canonical 6502 architectural state (registers + flags) and
inline-friendly helpers.

Overview
========
`CpuState` owns every architecturally visible register and nothing else:
  - no memory access (the `Cpu` façade routes that through the mapper)
  - no decode / dispatch logic
  - no run-loop bookkeeping (ticks, history, halt)

It is `Copy`, so `Cpu::state()` / `Cpu::set_state()` are plain value copies
and a debugger or speculative explorer can hold as many snapshots as it
likes.

Status Register Bit Layout
==========================
Bit: 7 6 5 4 3 2 1 0
     N V 1 B D I Z C
Where:
  N = NEGATIVE
  V = OVERFLOW
  1 = UNUSED  \ the "B pair": only ever set in the byte pushed by PHP / BRK /
  B = BREAK   / interrupts, and stripped again when a status byte is pulled
  D = DECIMAL (stored and pushed, ignored by the binary-only ALU)
  I = IRQ_DISABLE
  Z = ZERO
  C = CARRY
*/

use core::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Processor status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Status: u8 {
        const CARRY = 0b0000_0001;
        const ZERO = 0b0000_0010;
        const IRQ_DISABLE = 0b0000_0100;
        const DECIMAL = 0b0000_1000;
        const BREAK = 0b0001_0000;
        const UNUSED = 0b0010_0000;
        const OVERFLOW = 0b0100_0000;
        const NEGATIVE = 0b1000_0000;
    }
}

impl Status {
    /// Both framing bits, as pushed by PHP and BRK.
    pub const BREAK_PAIR: Status = Status::BREAK.union(Status::UNUSED);

    /// Bit OR'd into the status pushed by hardware interrupts.
    pub const INTERRUPT_CONTEXT: Status = Status::UNUSED;

    /// Strip the framing bits from a pulled status byte.
    #[inline]
    pub fn from_pulled(byte: u8) -> Self {
        Status::from_bits_retain(byte).difference(Status::BREAK_PAIR)
    }
}

impl fmt::Display for Status {
    /// `NV--DIZC`, with `-` for every clear flag and for the two framing bits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = |flag: Status, c: char| if self.contains(flag) { c } else { '-' };
        write!(
            f,
            "{}{}--{}{}{}{}",
            letter(Status::NEGATIVE, 'N'),
            letter(Status::OVERFLOW, 'V'),
            letter(Status::DECIMAL, 'D'),
            letter(Status::IRQ_DISABLE, 'I'),
            letter(Status::ZERO, 'Z'),
            letter(Status::CARRY, 'C'),
        )
    }
}

/// Register snapshot of the 6502.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: Status,
}

impl Default for CpuState {
    fn default() -> Self {
        // Power-up defaults: SP=0xFD, IRQ disabled.
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0x0000,
            status: Status::IRQ_DISABLE,
        }
    }
}

impl CpuState {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Program Counter Helpers
    // ---------------------------------------------------------------------

    /// Advance PC by `delta` (wrapping at 16 bits).
    #[inline]
    pub fn advance_pc(&mut self, delta: u16) {
        self.pc = self.pc.wrapping_add(delta);
    }

    // ---------------------------------------------------------------------
    // Flag Helpers
    // ---------------------------------------------------------------------

    #[inline]
    pub fn flag(&self, flag: Status) -> bool {
        self.status.contains(flag)
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Status, on: bool) {
        self.status.set(flag, on);
    }

    /// Zero = (v == 0), Negative = bit 7 of v. Both bits are always overwritten.
    #[inline]
    pub fn set_zero_negative(&mut self, v: u8) {
        self.status.set(Status::ZERO, v == 0);
        self.status.set(Status::NEGATIVE, v & 0x80 != 0);
    }

    /// Address of the current stack slot.
    #[inline]
    pub fn stack_addr(&self) -> u16 {
        0x0100 | self.sp as u16
    }
}

impl fmt::Display for CpuState {
    /// Register line used by traces: `A: 01 (1  ) X: .. Y: .. SP: .. [P] NV--DIZC`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A: {:02X} ({:<3}) X: {:02X} ({:<3}) Y: {:02X} ({:<3}) SP: {:02X} ({:<3}) [{:02X}] {}",
            self.a,
            self.a,
            self.x,
            self.x,
            self.y,
            self.y,
            self.sp,
            self.sp,
            self.status.bits(),
            self.status,
        )
    }
}
