#![doc = r#"
m6502 library crate.

An instruction-level MOS 6502 interpreter with pluggable memory mappers,
address breakpoints and execution tracing.

Modules:
- breakpoints: named READ / WRITE / EXECUTE callbacks keyed by address
- bus: 2 KiB work RAM and the address-space regions mappers decode
- cartridge: iNES v1 loader that builds a mapper from a ROM image
- cpu: registers, opcode table, dispatch and the `Cpu` façade
- error: error types for mappers, the CPU and the loader
- mapper: the `Mapper` trait and NROM (mapper 0)
- mappers: MMC1 (mapper 1), a flat 64 KiB RAM test mapper, and `AnyMapper`

In tests, shared image builders are available under `crate::test_utils`.
"#]

pub mod breakpoints;
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod error;
pub mod mapper;
pub mod mappers;

// Re-export commonly used types at the crate root for convenience.
pub use breakpoints::{BreakContext, Breakpoints, Event};
pub use cpu::{Cpu, CpuConfig, CpuState, HaltHandle, RunOutcome, Status};
pub use error::{CartridgeError, CpuError, Fault, MapperError};
pub use mapper::{Mapper, Mirroring, Nrom};
pub use mappers::{AnyMapper, AnyMapperState, FullRw, Mmc1};

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
