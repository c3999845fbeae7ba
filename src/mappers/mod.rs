/*!
Module: mappers

Declares the concrete mapper submodules and `AnyMapper`, the closed set of
boards the loader can hand the CPU. `AnyMapper` forwards every call to the
variant it wraps; its snapshot type is the matching closed set of states, and
restoring a snapshot taken from another board kind is an error.

Implemented:
- NROM (Mapper 0), in `crate::mapper`
- MMC1 (Mapper 1)
- FullRW: flat 64 KiB test harness memory
*/

pub mod full_rw;
pub mod mmc1;

use serde::{Deserialize, Serialize};

pub use full_rw::{FullRw, FullRwState};
pub use mmc1::{BankConfig, Mmc1, Mmc1State};

use crate::error::MapperError;
use crate::mapper::{Mapper, Mirroring, Nrom, NromState};

/// Any supported board, chosen at load time.
#[derive(Debug, Clone)]
pub enum AnyMapper {
    Nrom(Nrom),
    Mmc1(Mmc1),
    FullRw(FullRw),
}

/// Snapshot of an `AnyMapper`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnyMapperState {
    Nrom(NromState),
    Mmc1(Mmc1State),
    FullRw(FullRwState),
}

impl From<Nrom> for AnyMapper {
    fn from(m: Nrom) -> Self {
        AnyMapper::Nrom(m)
    }
}

impl From<Mmc1> for AnyMapper {
    fn from(m: Mmc1) -> Self {
        AnyMapper::Mmc1(m)
    }
}

impl From<FullRw> for AnyMapper {
    fn from(m: FullRw) -> Self {
        AnyMapper::FullRw(m)
    }
}

macro_rules! forward {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            AnyMapper::Nrom($m) => $body,
            AnyMapper::Mmc1($m) => $body,
            AnyMapper::FullRw($m) => $body,
        }
    };
}

impl Mapper for AnyMapper {
    type State = AnyMapperState;

    fn name(&self) -> &'static str {
        forward!(self, m => m.name())
    }

    fn read(&mut self, addr: u16) -> Result<u8, MapperError> {
        forward!(self, m => m.read(addr))
    }

    fn write(&mut self, addr: u16, value: u8) {
        forward!(self, m => m.write(addr, value))
    }

    fn offset(&self, addr: u16) -> Result<(u32, bool), MapperError> {
        forward!(self, m => m.offset(addr))
    }

    fn state(&self) -> AnyMapperState {
        match self {
            AnyMapper::Nrom(m) => AnyMapperState::Nrom(m.state()),
            AnyMapper::Mmc1(m) => AnyMapperState::Mmc1(m.state()),
            AnyMapper::FullRw(m) => AnyMapperState::FullRw(m.state()),
        }
    }

    fn set_state(&mut self, state: &AnyMapperState) -> Result<(), MapperError> {
        match (self, state) {
            (AnyMapper::Nrom(m), AnyMapperState::Nrom(s)) => m.set_state(s),
            (AnyMapper::Mmc1(m), AnyMapperState::Mmc1(s)) => m.set_state(s),
            (AnyMapper::FullRw(m), AnyMapperState::FullRw(s)) => m.set_state(s),
            (m, _) => Err(MapperError::StateMismatch { expected: m.name() }),
        }
    }

    fn clear_ram(&mut self) {
        forward!(self, m => m.clear_ram())
    }

    fn describe(&self) -> String {
        forward!(self, m => m.describe())
    }

    fn mirroring(&self) -> Option<Mirroring> {
        forward!(self, m => m.mirroring())
    }
}
