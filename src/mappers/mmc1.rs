//! MMC1 (Mapper 1) implementation.
//!
//! Implements:
//! - Serial shift register writes (5-bit) to control / CHR0 / CHR1 / PRG registers
//! - PRG banking modes (32K switch, or 16K with fixed low or high)
//! - CHR bank selectors and mirroring bits stored for snapshotting (no PPU side)
//! - 2 KiB work RAM and optional 8 KiB cartridge RAM at $6000-$7FFF
//!
//! Simplified:
//! - Bit 4 of the PRG register enables cartridge RAM and it stays enabled
//! - Large board variants (SUROM / SOROM / etc.) are not modelled

use serde::{Deserialize, Serialize};

use crate::bus::{CART_RAM_SIZE, CART_RAM_START, CART_ROM_START, OPEN_BUS, Ram, Region};
use crate::error::MapperError;
use crate::mapper::{Mapper, Mirroring, ram_offset};

const PRG_BANK_SIZE: u32 = 0x4000;

/// Power-on PRG bank mode: switch $8000, fix the last bank at $C000.
pub const DEFAULT_PRG_BANK_MODE: u8 = 3;

/// Bank-switch configuration, including the in-flight shift register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConfig {
    /// Control bits 0-1.
    pub mirroring: u8,
    /// Control bits 2-3.
    pub prg_bank_mode: u8,
    /// Control bit 4.
    pub chr_bank_mode: u8,
    pub chr_bank0: u8,
    pub chr_bank1: u8,
    /// Low four bits of the PRG register.
    pub prg_bank: u8,
    pub has_ram: bool,
    pub shift: u8,
    /// Writes accumulated so far (0-4).
    pub shift_count: u8,
}

impl BankConfig {
    fn power_on(has_ram: bool) -> Self {
        Self {
            mirroring: 0,
            prg_bank_mode: DEFAULT_PRG_BANK_MODE,
            chr_bank_mode: 0,
            chr_bank0: 0,
            chr_bank1: 0,
            prg_bank: 0,
            has_ram,
            shift: 0,
            shift_count: 0,
        }
    }

    #[inline]
    fn reset_shift(&mut self) {
        self.shift = 0;
        self.shift_count = 0;
    }
}

/// MMC1 snapshot: bank configuration plus both RAMs. The ROM is never copied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mmc1State {
    pub config: BankConfig,
    pub ram: Vec<u8>,
    pub cart_ram: Vec<u8>,
}

/// MMC1 mapper core state.
#[derive(Debug, Clone)]
pub struct Mmc1 {
    prg_rom: Vec<u8>,
    config: BankConfig,
    ram: Ram,
    cart_ram: Vec<u8>,
}

impl Mmc1 {
    /// The PRG image must be a non-empty whole number of 16 KiB banks.
    pub fn new(prg_rom: Vec<u8>, has_ram: bool) -> Result<Self, MapperError> {
        if prg_rom.is_empty() || prg_rom.len() % PRG_BANK_SIZE as usize != 0 {
            return Err(MapperError::RomSize(prg_rom.len()));
        }
        Ok(Self {
            prg_rom,
            config: BankConfig::power_on(has_ram),
            ram: Ram::new(),
            cart_ram: vec![0; CART_RAM_SIZE],
        })
    }

    #[inline]
    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    #[inline]
    fn last_bank(&self) -> u32 {
        self.prg_rom.len() as u32 / PRG_BANK_SIZE - 1
    }

    /// Feed one write into the serial port.
    fn serial_write(&mut self, addr: u16, data: u8) {
        if data & 0x80 != 0 {
            self.config.reset_shift();
            return;
        }
        self.config.shift |= (data & 1) << self.config.shift_count;
        self.config.shift_count += 1;
        if self.config.shift_count == 5 {
            let value5 = self.config.shift & 0x1F;
            self.commit_register(addr, value5);
            self.config.reset_shift();
        }
    }

    fn commit_register(&mut self, addr: u16, value5: u8) {
        log::trace!("MMC1 commit ${addr:04X} <- %{value5:05b}");
        match addr {
            0x8000..=0x9FFF => {
                self.config.mirroring = value5 & 0x03;
                self.config.prg_bank_mode = (value5 >> 2) & 0x03;
                self.config.chr_bank_mode = (value5 >> 4) & 0x01;
            }
            0xA000..=0xBFFF => self.config.chr_bank0 = value5,
            0xC000..=0xDFFF => self.config.chr_bank1 = value5,
            _ => {
                self.config.prg_bank = value5 & 0x0F;
                if value5 & 0x10 != 0 {
                    self.config.has_ram = true;
                }
            }
        }
    }

    /// Offset into the PRG image for an address in $8000-$FFFF.
    fn rom_offset(&self, addr: u16) -> Result<u32, MapperError> {
        let rel = (addr - CART_ROM_START) as u32;
        let bank = self.config.prg_bank as u32;
        let offset = match self.config.prg_bank_mode {
            0 | 1 => (bank & 0x0E) * PRG_BANK_SIZE + rel,
            2 => {
                if rel < PRG_BANK_SIZE {
                    rel
                } else {
                    bank * PRG_BANK_SIZE + (rel - PRG_BANK_SIZE)
                }
            }
            _ => {
                if rel < PRG_BANK_SIZE {
                    bank * PRG_BANK_SIZE + rel
                } else {
                    self.last_bank() * PRG_BANK_SIZE + (rel - PRG_BANK_SIZE)
                }
            }
        };
        if offset as usize >= self.prg_rom.len() {
            return Err(MapperError::OffsetOutOfRange {
                address: addr,
                offset,
                len: self.prg_rom.len(),
                state: self.describe(),
            });
        }
        Ok(offset)
    }
}

impl Mapper for Mmc1 {
    type State = Mmc1State;

    fn name(&self) -> &'static str {
        "MMC1"
    }

    fn read(&mut self, addr: u16) -> Result<u8, MapperError> {
        match Region::of(addr) {
            Region::WorkRam => Ok(self.ram.read(addr)),
            Region::OpenBus => Ok(OPEN_BUS),
            Region::CartRam if self.config.has_ram => {
                Ok(self.cart_ram[(addr - CART_RAM_START) as usize])
            }
            Region::CartRam => Ok(OPEN_BUS),
            Region::CartRom => Ok(self.prg_rom[self.rom_offset(addr)? as usize]),
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match Region::of(addr) {
            Region::WorkRam => self.ram.write(addr, value),
            Region::OpenBus => {}
            Region::CartRam => {
                if self.config.has_ram {
                    self.cart_ram[(addr - CART_RAM_START) as usize] = value;
                }
            }
            Region::CartRom => self.serial_write(addr, value),
        }
    }

    fn offset(&self, addr: u16) -> Result<(u32, bool), MapperError> {
        if addr < CART_ROM_START {
            return Ok(ram_offset(addr));
        }
        Ok((self.rom_offset(addr)?, true))
    }

    fn state(&self) -> Mmc1State {
        Mmc1State {
            config: self.config,
            ram: self.ram.as_slice().to_vec(),
            cart_ram: self.cart_ram.clone(),
        }
    }

    fn set_state(&mut self, state: &Mmc1State) -> Result<(), MapperError> {
        if state.cart_ram.len() != CART_RAM_SIZE {
            return Err(MapperError::StateRamSize {
                expected: CART_RAM_SIZE,
                found: state.cart_ram.len(),
            });
        }
        self.ram
            .load(&state.ram)
            .map_err(|found| MapperError::StateRamSize {
                expected: self.ram.as_slice().len(),
                found,
            })?;
        self.cart_ram.copy_from_slice(&state.cart_ram);
        self.config = state.config;
        Ok(())
    }

    fn clear_ram(&mut self) {
        self.ram.clear();
        self.cart_ram.fill(0);
    }

    fn describe(&self) -> String {
        let c = &self.config;
        format!(
            "Mirroring: {:X} PrgMode: {:X} ChrMode: {:X} Chr0: {:02X} Chr1: {:02X} Prg: {:02X} Ram: {}",
            c.mirroring, c.prg_bank_mode, c.chr_bank_mode, c.chr_bank0, c.chr_bank1, c.prg_bank, c.has_ram
        )
    }

    fn mirroring(&self) -> Option<Mirroring> {
        Some(Mirroring::from_bits(self.config.mirroring))
    }
}
