/*!
CPU address-space decode shared by every cartridge mapper.

Address map
===========
- $0000-$1FFF: 2 KiB work RAM, mirrored every $0800
- $2000-$5FFF: unmapped register window; reads return open bus (0), writes are dropped
- $6000-$7FFF: cartridge work RAM (when the board has it)
- $8000-$FFFF: cartridge ROM; writes go to the mapper's registers

The mappers own the devices behind these windows. This module only answers
"which window is this address in", so every mapper routes addresses the same
way and the ranges live in one place.
*/

pub mod ram;

pub use ram::{Ram, WORK_RAM_SIZE};

/// Value returned for reads that hit nothing.
pub const OPEN_BUS: u8 = 0;

/// Start of the cartridge RAM window.
pub const CART_RAM_START: u16 = 0x6000;
/// Size of the cartridge RAM window.
pub const CART_RAM_SIZE: usize = 0x2000;
/// Start of the cartridge ROM / register window.
pub const CART_ROM_START: u16 = 0x8000;

/// The window a CPU address falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    WorkRam,
    OpenBus,
    CartRam,
    CartRom,
}

impl Region {
    #[inline]
    pub fn of(addr: u16) -> Self {
        match addr {
            0x0000..=0x1FFF => Region::WorkRam,
            0x2000..=0x5FFF => Region::OpenBus,
            0x6000..=0x7FFF => Region::CartRam,
            _ => Region::CartRom,
        }
    }
}
