//! Error types shared by the CPU core, the mappers and the cartridge loader.
//!
//! Every fatal condition the core can hit is represented here. Nothing is
//! retried: an error means either an incomplete instruction set or a bad
//! image, and execution stops at the instruction that raised it.

use thiserror::Error;

/// Failures raised by a mapper while decoding or restoring state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapperError {
    /// The bank configuration produced an offset past the end of the PRG image.
    #[error("address out of range for ROM: ${address:04X} -> 0x{offset:06X}; len: 0x{len:06X} [{state}]")]
    OffsetOutOfRange {
        address: u16,
        offset: u32,
        len: usize,
        state: String,
    },

    #[error("ROM data is incorrect size: {0} bytes")]
    RomSize(usize),

    /// A snapshot taken from a different mapper kind was handed to `set_state`.
    #[error("snapshot does not belong to a {expected} mapper")]
    StateMismatch { expected: &'static str },

    #[error("snapshot RAM is {found} bytes, expected {expected}")]
    StateRamSize { expected: usize, found: usize },
}

/// Failures raised while executing instructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("opcode not implemented: [${address:04X}] ${opcode:02X}")]
    UnimplementedOpcode { address: u16, opcode: u8 },

    /// The program counter did not move across a step (stuck-PC diagnostic).
    #[error("stuck at ${0:04X}")]
    Stuck(u16),

    #[error("instruction limit hit after {0} instructions")]
    InstructionLimit(u64),

    #[error(transparent)]
    Mapper(#[from] MapperError),
}

/// Failures raised while turning an iNES image into a mapper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartridgeError {
    #[error("image too short for an iNES header ({0} bytes)")]
    TooShort(usize),

    #[error("missing iNES magic")]
    BadMagic,

    #[error("image truncated: PRG data needs {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),

    #[error(transparent)]
    Mapper(#[from] MapperError),
}

/// A fatal run-loop error together with the instruction history leading up to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct Fault {
    #[source]
    pub error: CpuError,
    pub trace: Vec<String>,
}

impl Fault {
    /// Address the fault points at, when the error carries one.
    pub fn address(&self) -> Option<u16> {
        match &self.error {
            CpuError::UnimplementedOpcode { address, .. } => Some(*address),
            CpuError::Stuck(address) => Some(*address),
            CpuError::Mapper(MapperError::OffsetOutOfRange { address, .. }) => Some(*address),
            _ => None,
        }
    }
}
