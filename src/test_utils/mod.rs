//! Shared test utilities: flat-memory CPUs, tagged PRG images and iNES builders.
//!
//! Notes on the iNES (v1) header fields used here:
//! - bytes[0..4] = b"NES\x1A"
//! - byte 4 = PRG ROM size in 16 KiB units
//! - byte 5 = CHR ROM size in 8 KiB units (always 0 here)
//! - byte 6 = Flags 6 (mirroring, battery, trainer, mapper low nibble)
//! - byte 7 = Flags 7 (mapper high nibble)
//! - bytes 8..15 = padding
//!
//! These builders do minimal validation (sufficient for unit tests).

#![allow(dead_code)]

use crate::cpu::core::Cpu;
use crate::mappers::FullRw;

/// Base address `flat_cpu` loads programs at.
pub const PROGRAM_BASE: u16 = 0x8000;

/// A CPU over 64 KiB of flat RAM with `program` at $8000 and PC there.
pub fn flat_cpu(program: &[u8]) -> Cpu<FullRw> {
    let mut mem = FullRw::with_program(PROGRAM_BASE, program);
    mem.set_reset_vector(PROGRAM_BASE);
    Cpu::new(mem).unwrap()
}

/// `banks` x 16 KiB of PRG where every byte holds its bank index.
pub fn tagged_prg(banks: usize) -> Vec<u8> {
    (0..banks)
        .flat_map(|bank| std::iter::repeat(bank as u8).take(0x4000))
        .collect()
}

/// Wrap `prg` (a whole number of 16 KiB units) in an iNES header.
///
/// With `trainer`, the trainer bit is set in flags 6 and 512 filler bytes
/// precede the PRG data.
pub fn build_ines(prg: &[u8], flags6: u8, flags7: u8, trainer: bool) -> Vec<u8> {
    assert_eq!(prg.len() % 0x4000, 0, "PRG must be whole 16 KiB units");
    let mut bytes = Vec::with_capacity(16 + if trainer { 512 } else { 0 } + prg.len());

    // Header
    bytes.extend_from_slice(b"NES\x1A");
    bytes.push((prg.len() / 0x4000) as u8);
    bytes.push(0);
    bytes.push(if trainer { flags6 | 0x04 } else { flags6 });
    bytes.push(flags7);
    bytes.extend_from_slice(&[0u8; 8]);

    if trainer {
        bytes.extend(std::iter::repeat(0xEE).take(512));
    }
    bytes.extend_from_slice(prg);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_basic_ines() {
        let rom = build_ines(&[0u8; 0x8000], 0x11, 0x20, false);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(rom[4], 2);
        assert_eq!(rom[6], 0x11);
        assert_eq!(rom[7], 0x20);
        assert_eq!(rom.len(), 16 + 0x8000);
    }

    #[test]
    fn trainer_adds_512_bytes() {
        let rom = build_ines(&[0u8; 0x4000], 0, 0, true);
        assert_eq!(rom[6] & 0x04, 0x04);
        assert_eq!(rom.len(), 16 + 512 + 0x4000);
    }

    #[test]
    fn tagged_banks() {
        let prg = tagged_prg(3);
        assert_eq!(prg.len(), 3 * 0x4000);
        assert_eq!(prg[0x3FFF], 0);
        assert_eq!(prg[0x4000], 1);
        assert_eq!(prg[0xBFFF], 2);
    }

    #[test]
    fn flat_cpu_starts_at_program() {
        let cpu = flat_cpu(&[0xEA]);
        assert_eq!(cpu.state().pc, PROGRAM_BASE);
    }
}
