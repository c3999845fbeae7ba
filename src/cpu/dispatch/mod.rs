/*!
dispatch - Executes one 6502 instruction.

Sequence
========
1. Fetch the opcode at PC with an instrumented read (READ breakpoints fire).
2. Fire EXECUTE breakpoints at PC with the opcode.
3. Look the opcode up; a missing entry is `CpuError::UnimplementedOpcode`.
4. When tracing, render the trace line (peeks only) before any side effect.
5. When the code/data log is on, mark the instruction's ROM bytes as code.
6. Hand off to the handler for the instruction's shape:
   - `standard`: loads, stores, ALU, transfers, stack, flags
   - `rmw`: shifts, rotates, INC/DEC on memory or A
   - `branches`: conditional relative branches
   - `control_flow`: JMP, JSR, RTS, RTI, BRK

Handlers own their PC update. Standard and RMW shapes advance PC by the
addressing-mode length; branches and control flow compute it.
*/

pub(crate) mod branches;
pub(crate) mod control_flow;
pub(crate) mod rmw;
pub(crate) mod standard;

use crate::breakpoints::Event;
use crate::cpu::core::Cpu;
use crate::cpu::table::{self, Instruction};
use crate::cpu::trace;
use crate::error::CpuError;
use crate::mapper::Mapper;

pub(crate) fn step<M: Mapper>(cpu: &mut Cpu<M>) -> Result<(), CpuError> {
    let pc = cpu.state().pc;
    cpu.set_operand_span(pc, 1);
    let opcode = cpu.read_byte(pc)?;
    cpu.fire(Event::EXECUTE, pc, opcode);

    let instruction = table::lookup(opcode).ok_or(CpuError::UnimplementedOpcode {
        address: pc,
        opcode,
    })?;
    cpu.set_operand_span(pc, instruction.len());

    if cpu.tracing() {
        let line = trace::format_line(cpu, instruction)?;
        cpu.record(line);
    }
    if cpu.config().cdl {
        cpu.log_code(instruction)?;
    }

    match instruction {
        Instruction::Standard { op, mode } => standard::execute(cpu, op, mode),
        Instruction::ReadModifyWrite { op, mode } => rmw::execute(cpu, op, mode),
        Instruction::Branch { op } => branches::execute(cpu, op),
        Instruction::Jump { op, mode } => control_flow::execute(cpu, op, mode),
    }
}
