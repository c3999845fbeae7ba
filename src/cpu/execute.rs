/*!
execute.rs - 6502 ALU and flag semantics.

Purpose
=======
Every value-producing operation lives here as a pure function of
`CpuState` plus operands. The dispatch shapes do the memory traffic
(resolve, read, write back) and call into these helpers for the result and
the flags, so each flag rule exists exactly once.

Scope
-----
Flags:
    set_zero_negative (on `CpuState`), compare
Arithmetic (binary only, D flag ignored):
    twos_comp_add, twos_comp_subtract
Logic:
    and, ora, eor, bit
Read-modify-write transforms (value in, value out, flags updated):
    asl, lsr, rol, ror, inc, dec
Branches:
    branch_target

Design Notes
============
- Subtraction is addition of the one's complement with Carry acting as
  "no borrow", the same path compare takes. `SEC; SBC #b` after `CLC; ADC #b`
  restores the accumulator for every `a` and `b`.
- Compare never touches Overflow.
*/

use crate::cpu::state::{CpuState, Status};

// -------------------------------------------------------------------------
// Arithmetic
// -------------------------------------------------------------------------

/// `a + b + C`. Sets C on unsigned overflow, V on signed overflow, then Z/N.
pub fn twos_comp_add(cpu: &mut CpuState, a: u8, b: u8) -> u8 {
    let carry_in = cpu.flag(Status::CARRY) as u16;
    let sum = a as u16 + b as u16 + carry_in;
    let result = sum as u8;
    cpu.set_flag(Status::CARRY, sum > 0xFF);
    cpu.set_flag(Status::OVERFLOW, (a ^ result) & (b ^ result) & 0x80 != 0);
    cpu.set_zero_negative(result);
    result
}

/// `a - b - !C`, as an add of the one's complement of `b`.
pub fn twos_comp_subtract(cpu: &mut CpuState, a: u8, b: u8) -> u8 {
    twos_comp_add(cpu, a, b ^ 0xFF)
}

/// CMP / CPX / CPY: C = (reg >= v), Z/N from `reg - v`, V preserved.
pub fn compare(cpu: &mut CpuState, reg: u8, v: u8) {
    let overflow = cpu.flag(Status::OVERFLOW);
    cpu.set_flag(Status::CARRY, true);
    twos_comp_add(cpu, reg, v ^ 0xFF);
    cpu.set_flag(Status::OVERFLOW, overflow);
}

// -------------------------------------------------------------------------
// Logic
// -------------------------------------------------------------------------

pub fn and(cpu: &mut CpuState, v: u8) {
    cpu.a &= v;
    cpu.set_zero_negative(cpu.a);
}

pub fn ora(cpu: &mut CpuState, v: u8) {
    cpu.a |= v;
    cpu.set_zero_negative(cpu.a);
}

pub fn eor(cpu: &mut CpuState, v: u8) {
    cpu.a ^= v;
    cpu.set_zero_negative(cpu.a);
}

/// Z from `A & v`; N and V copied from bits 7 and 6 of `v`.
pub fn bit(cpu: &mut CpuState, v: u8) {
    cpu.set_flag(Status::ZERO, cpu.a & v == 0);
    cpu.set_flag(Status::NEGATIVE, v & 0x80 != 0);
    cpu.set_flag(Status::OVERFLOW, v & 0x40 != 0);
}

// -------------------------------------------------------------------------
// Read-modify-write transforms
// -------------------------------------------------------------------------

pub fn asl(cpu: &mut CpuState, v: u8) -> u8 {
    cpu.set_flag(Status::CARRY, v & 0x80 != 0);
    let r = v << 1;
    cpu.set_zero_negative(r);
    r
}

pub fn lsr(cpu: &mut CpuState, v: u8) -> u8 {
    cpu.set_flag(Status::CARRY, v & 0x01 != 0);
    let r = v >> 1;
    cpu.set_zero_negative(r);
    r
}

pub fn rol(cpu: &mut CpuState, v: u8) -> u8 {
    let carry_in = cpu.flag(Status::CARRY) as u8;
    cpu.set_flag(Status::CARRY, v & 0x80 != 0);
    let r = (v << 1) | carry_in;
    cpu.set_zero_negative(r);
    r
}

pub fn ror(cpu: &mut CpuState, v: u8) -> u8 {
    let carry_in = (cpu.flag(Status::CARRY) as u8) << 7;
    cpu.set_flag(Status::CARRY, v & 0x01 != 0);
    let r = (v >> 1) | carry_in;
    cpu.set_zero_negative(r);
    r
}

pub fn inc(cpu: &mut CpuState, v: u8) -> u8 {
    let r = v.wrapping_add(1);
    cpu.set_zero_negative(r);
    r
}

pub fn dec(cpu: &mut CpuState, v: u8) -> u8 {
    let r = v.wrapping_sub(1);
    cpu.set_zero_negative(r);
    r
}

// -------------------------------------------------------------------------
// Branches
// -------------------------------------------------------------------------

/// Target of a relative branch whose opcode sits at `opcode_pc`.
#[inline]
pub fn branch_target(opcode_pc: u16, offset: u8) -> u16 {
    opcode_pc
        .wrapping_add(2)
        .wrapping_add(offset as i8 as i16 as u16)
}
