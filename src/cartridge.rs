/*!
Minimal iNES (v1) loader that picks a mapper from the header.

Features:
- Validate the 16-byte header magic
- Skip the 512-byte trainer when flag 6 bit 2 is set
- Slice out PRG ROM (CHR data is ignored; there is no PPU)
- Build the matching `AnyMapper`: 0 => NROM, 1 => MMC1

Notes:
- Every board is given cartridge RAM at $6000-$7FFF; iNES v1 has no reliable
  way to say otherwise.
*/

use crate::error::CartridgeError;
use crate::mapper::Nrom;
use crate::mappers::{AnyMapper, Mmc1};

pub const HEADER_LEN: usize = 16;
const TRAINER_LEN: usize = 512;

/// The header fields the core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub mapper_id: u8,
    pub prg_len: usize,
    pub battery: bool,
    pub has_trainer: bool,
}

impl Header {
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_LEN {
            return Err(CartridgeError::TooShort(data.len()));
        }
        if &data[0..4] != b"NES\x1A" {
            return Err(CartridgeError::BadMagic);
        }
        let flags6 = data[6];
        let flags7 = data[7];
        Ok(Self {
            mapper_id: (flags7 & 0xF0) | (flags6 >> 4),
            prg_len: data[4] as usize * 0x4000,
            battery: flags6 & 0b0000_0010 != 0,
            has_trainer: flags6 & 0b0000_0100 != 0,
        })
    }

    /// Byte offset of PRG data inside the file.
    #[inline]
    pub fn prg_start(&self) -> usize {
        HEADER_LEN + if self.has_trainer { TRAINER_LEN } else { 0 }
    }
}

/// Parse an iNES image and construct its mapper.
pub fn load(data: &[u8]) -> Result<AnyMapper, CartridgeError> {
    let header = Header::parse(data)?;
    let start = header.prg_start();
    let needed = start + header.prg_len;
    if data.len() < needed {
        return Err(CartridgeError::Truncated {
            needed,
            available: data.len(),
        });
    }
    let prg = data[start..needed].to_vec();
    log::debug!(
        "iNES mapper {} with {} KiB PRG",
        header.mapper_id,
        header.prg_len / 1024
    );

    Ok(match header.mapper_id {
        0 => Nrom::new(prg, true)?.into(),
        1 => Mmc1::new(prg, true)?.into(),
        id => return Err(CartridgeError::UnsupportedMapper(id)),
    })
}
