/*!
trace.rs - Per-instruction trace lines and the bounded history behind fault reports.

Line Format
===========
```text
[000042] $8004: 69 03     ADC #$03              A: 08 (8  ) X: 00 ... [24] --1--I--  $80 $02
```
- instruction counter, six digits
- PC and the raw instruction bytes
- mnemonic and operand (with the resolved address where it helps)
- register line, then the occupied stack from $01FF downward

Everything here reads memory through peeks, so building a line never
fires a breakpoint and never changes mapper state.
*/

use std::collections::VecDeque;

use crate::cpu::core::Cpu;
use crate::cpu::table::Instruction;
use crate::error::CpuError;
use crate::mapper::Mapper;

/// Ring of the most recent trace lines.
#[derive(Debug, Clone, Default)]
pub struct History {
    lines: VecDeque<String>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.lines.len() > capacity {
            self.lines.pop_front();
        }
    }
}

/// `$01 $80 ...`: bytes from $01FF down to SP+1. Empty when the stack is empty.
pub fn stack_string<M: Mapper>(cpu: &mut Cpu<M>) -> Result<String, CpuError> {
    let top = cpu.state().sp;
    let mut out = Vec::new();
    let mut sp = 0xFFu8;
    while sp > top {
        out.push(format!("${:02X}", cpu.peek_byte(0x0100 | sp as u16)?));
        sp -= 1;
    }
    Ok(out.join(" "))
}

/// Render the line for `instruction` sitting at the current PC.
pub fn format_line<M: Mapper>(
    cpu: &mut Cpu<M>,
    instruction: Instruction,
) -> Result<String, CpuError> {
    let pc = cpu.state().pc;
    let mut bytes = Vec::with_capacity(3);
    for i in 0..instruction.len() as u16 {
        bytes.push(format!("{:02X}", cpu.peek_byte(pc.wrapping_add(i))?));
    }
    let operand = instruction.mode().asm(cpu)?;
    let stack = stack_string(cpu)?;
    Ok(format!(
        "[{:06}] ${pc:04X}: {:<9} {} {operand:<17} {} {stack}",
        cpu.ticks(),
        bytes.join(" "),
        instruction.mnemonic(),
        cpu.registers(),
    )
    .trim_end()
    .to_string())
}
