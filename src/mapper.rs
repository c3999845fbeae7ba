/*!
Mapper subsystem: trait definition and NROM (mapper 0) implementation.

Purpose:
- Own the whole CPU-visible address space behind a single capability set
  (read / write / offset / snapshot / clear-RAM) so the CPU core never needs
  to know which board it is running on.
- Give external tooling a stable way to correlate a CPU address with a
  position in the PRG image (`offset`) and to snapshot / restore the bank
  configuration for speculative execution.

Address decode is shared through `crate::bus::Region`; each mapper decides
what the cartridge windows mean.

Snapshots are plain values. Every mapper names its own `State` type and
`state()` returns a deep copy: later writes to the live mapper never reach a
snapshot already taken.
*/

use core::fmt;

use crate::bus::{CART_RAM_SIZE, CART_RAM_START, CART_ROM_START, OPEN_BUS, Ram, Region};
use crate::error::MapperError;

/// Nametable mirroring a mapper may select at runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Mirroring {
    SingleScreenLower,
    SingleScreenUpper,
    Vertical,
    Horizontal,
}

impl Mirroring {
    /// Decode the two mirroring bits of a control register.
    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
    }
}

/// Common interface all cartridge mappers implement.
///
/// Semantics:
/// - All methods take full CPU addresses (unmasked).
/// - Reads may fail only when the bank configuration points past the image.
/// - Writes never fail; writes into ROM space are register writes or dropped.
pub trait Mapper {
    /// Snapshot of everything mutable: bank registers and volatile RAM, never the ROM.
    type State: Clone + fmt::Debug;

    /// Short board name used in logs and traces.
    fn name(&self) -> &'static str;

    /// CPU-visible read anywhere in $0000..=$FFFF.
    fn read(&mut self, addr: u16) -> Result<u8, MapperError>;

    /// CPU-visible write anywhere in $0000..=$FFFF.
    fn write(&mut self, addr: u16, value: u8);

    /// Position of `addr` in its backing store and whether that store is the ROM image.
    ///
    /// ROM offsets are relative to the start of PRG data (no file header).
    fn offset(&self, addr: u16) -> Result<(u32, bool), MapperError>;

    fn state(&self) -> Self::State;

    fn set_state(&mut self, state: &Self::State) -> Result<(), MapperError>;

    /// Zero volatile RAM. Bank configuration is left alone.
    fn clear_ram(&mut self);

    /// One-line description of the current bank configuration.
    fn describe(&self) -> String {
        self.name().to_string()
    }

    /// Mirroring override, for mappers that control it.
    fn mirroring(&self) -> Option<Mirroring> {
        None
    }
}

/// Offset of a non-ROM address inside the store that backs it.
#[inline]
pub(crate) fn ram_offset(addr: u16) -> (u32, bool) {
    match Region::of(addr) {
        Region::WorkRam => (Ram::mirror_index(addr) as u32, false),
        Region::CartRam => ((addr - CART_RAM_START) as u32, false),
        _ => (addr as u32, false),
    }
}

/// NROM (mapper 0) implementation.
///
/// PRG ROM is either 16 KiB (mirrored across $8000-$FFFF) or 32 KiB.
/// Optional 8 KiB cartridge RAM at $6000-$7FFF.
#[derive(Clone, Debug)]
pub struct Nrom {
    prg_rom: Vec<u8>,
    ram: Ram,
    cart_ram: Option<Vec<u8>>,
}

/// NROM snapshot: just its RAM.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NromState {
    pub ram: Vec<u8>,
    pub cart_ram: Option<Vec<u8>>,
}

impl Nrom {
    pub fn new(prg_rom: Vec<u8>, has_ram: bool) -> Result<Self, MapperError> {
        if prg_rom.len() != 0x4000 && prg_rom.len() != 0x8000 {
            return Err(MapperError::RomSize(prg_rom.len()));
        }
        Ok(Self {
            prg_rom,
            ram: Ram::new(),
            cart_ram: has_ram.then(|| vec![0; CART_RAM_SIZE]),
        })
    }

    #[inline]
    fn rom_index(&self, addr: u16) -> usize {
        (addr - CART_ROM_START) as usize & (self.prg_rom.len() - 1)
    }
}

impl Mapper for Nrom {
    type State = NromState;

    fn name(&self) -> &'static str {
        "NROM"
    }

    fn read(&mut self, addr: u16) -> Result<u8, MapperError> {
        Ok(match Region::of(addr) {
            Region::WorkRam => self.ram.read(addr),
            Region::OpenBus => OPEN_BUS,
            Region::CartRam => match &self.cart_ram {
                Some(ram) => ram[(addr - CART_RAM_START) as usize],
                None => OPEN_BUS,
            },
            Region::CartRom => self.prg_rom[self.rom_index(addr)],
        })
    }

    fn write(&mut self, addr: u16, value: u8) {
        match Region::of(addr) {
            Region::WorkRam => self.ram.write(addr, value),
            Region::CartRam => {
                if let Some(ram) = &mut self.cart_ram {
                    ram[(addr - CART_RAM_START) as usize] = value;
                }
            }
            Region::OpenBus | Region::CartRom => {}
        }
    }

    fn offset(&self, addr: u16) -> Result<(u32, bool), MapperError> {
        if addr < CART_ROM_START {
            return Ok(ram_offset(addr));
        }
        Ok((self.rom_index(addr) as u32, true))
    }

    fn state(&self) -> NromState {
        NromState {
            ram: self.ram.as_slice().to_vec(),
            cart_ram: self.cart_ram.clone(),
        }
    }

    fn set_state(&mut self, state: &NromState) -> Result<(), MapperError> {
        match (&mut self.cart_ram, &state.cart_ram) {
            (Some(live), Some(saved)) if live.len() == saved.len() => live.copy_from_slice(saved),
            (None, None) => {}
            (live, saved) => {
                return Err(MapperError::StateRamSize {
                    expected: live.as_ref().map_or(0, Vec::len),
                    found: saved.as_ref().map_or(0, Vec::len),
                });
            }
        }
        self.ram
            .load(&state.ram)
            .map_err(|found| MapperError::StateRamSize {
                expected: self.ram.as_slice().len(),
                found,
            })
    }

    fn clear_ram(&mut self) {
        self.ram.clear();
        if let Some(ram) = &mut self.cart_ram {
            ram.fill(0);
        }
    }

    fn describe(&self) -> String {
        format!("NROM-{}", self.prg_rom.len() / 0x400 * 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i >> 8) as u8).collect()
    }

    #[test]
    fn sixteen_k_image_is_mirrored() {
        let mut nrom = Nrom::new(tagged(0x4000), false).unwrap();
        assert_eq!(nrom.read(0x8100).unwrap(), 0x01);
        assert_eq!(nrom.read(0xC100).unwrap(), 0x01);
        assert_eq!(nrom.offset(0xC100).unwrap(), (0x0100, true));
    }

    #[test]
    fn rejects_odd_sizes() {
        assert_eq!(
            Nrom::new(vec![0; 0x3000], false).unwrap_err(),
            MapperError::RomSize(0x3000)
        );
    }

    #[test]
    fn work_ram_and_open_bus() {
        let mut nrom = Nrom::new(tagged(0x8000), false).unwrap();
        nrom.write(0x0002, 0x77);
        assert_eq!(nrom.read(0x0802).unwrap(), 0x77);
        nrom.write(0x3000, 0x55);
        assert_eq!(nrom.read(0x3000).unwrap(), 0);
        // No cartridge RAM on this board.
        nrom.write(0x6000, 0x12);
        assert_eq!(nrom.read(0x6000).unwrap(), 0);
        assert_eq!(nrom.offset(0x0802).unwrap(), (0x0002, false));
    }

    #[test]
    fn snapshot_is_independent_of_live_ram() {
        let mut nrom = Nrom::new(tagged(0x8000), true).unwrap();
        nrom.write(0x6001, 0xAB);
        let snap = nrom.state();
        nrom.write(0x6001, 0xCD);
        assert_eq!(snap.cart_ram.as_ref().unwrap()[1], 0xAB);

        nrom.set_state(&snap).unwrap();
        assert_eq!(nrom.read(0x6001).unwrap(), 0xAB);
    }

    #[test]
    fn mirroring_bits_decode() {
        assert_eq!(Mirroring::from_bits(0), Mirroring::SingleScreenLower);
        assert_eq!(Mirroring::from_bits(2), Mirroring::Vertical);
        assert_eq!(Mirroring::from_bits(7), Mirroring::Horizontal);
    }
}
