/*!
cpu - 6502 instruction-set interpreter.

Layout
======
```text
    state.rs        - Registers and the `Status` flag set.
    config.rs       - Run-loop settings and the shareable halt flag.
    addressing.rs   - Addressing modes: effective address, length, operand text.
    execute.rs      - ALU / flag semantics as pure functions of `CpuState`.
    table.rs        - Immutable opcode table (`OPCODES`).
    dispatch/       - One instruction step, split by instruction shape.
    trace.rs        - Trace lines and the history ring.
    cdl.rs          - Code/data log of ROM usage.
    core/           - The `Cpu<M>` façade tying it together.
```

Execution is instruction-granular. There is no cycle counting and no
decimal mode; the D flag is stored and pushed but arithmetic ignores it.

Usage:
```rust
use m6502::cpu::{Cpu, CpuConfig, RunOutcome};
use m6502::mappers::FullRw;

let mut mem = FullRw::with_program(0x0400, &[0xA9, 0x01, 0xDB]);
mem.set_reset_vector(0x0400);
let mut cpu = Cpu::new(mem).unwrap();
cpu.set_config(CpuConfig { stop_opcode: Some(0xDB), ..CpuConfig::default() });
assert_eq!(cpu.run().unwrap(), RunOutcome::Stopped);
assert_eq!(cpu.state().a, 1);
```
*/

pub mod addressing;
pub mod cdl;
pub mod config;
pub mod core;
pub(crate) mod dispatch;
pub mod execute;
pub mod state;
pub mod table;
pub mod trace;

pub use crate::cpu::addressing::AddressingMode;
pub use crate::cpu::cdl::{CdlFlags, CodeDataLog};
pub use crate::cpu::config::{CpuConfig, DEFAULT_HISTORY_LEN, HaltHandle};
pub use crate::cpu::core::{Access, Cpu, Interrupt, RunOutcome};
pub use crate::cpu::state::{CpuState, Status};
pub use crate::cpu::table::{Instruction, OPCODES};
