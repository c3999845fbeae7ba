/*!
core::Cpu - Canonical 6502 CPU façade.

Overview
========
`Cpu<M>` owns everything one emulated processor needs:
- `CpuState`: the architectural registers
- the mapper `M`, which owns the whole address space
- the breakpoint registry
- run-loop bookkeeping: config, halt flag, tick counter, trace history

Memory Access
=============
Every CPU-initiated access goes through `read_byte` / `write_byte`:
- reads ask the mapper for the byte, then fire READ breakpoints with it
- writes hand the byte to the mapper, then fire WRITE breakpoints
- opcode fetches additionally fire EXECUTE breakpoints with the opcode

With `CpuConfig::cdl` on, instrumented reads that land in ROM outside the
executing instruction are also flagged as data in the code/data log.

`peek_byte` / `peek_word` read the mapper directly. Tracing and stack dumps
use them so observing the machine never trips a breakpoint.

Reads are fallible: a mapper whose bank configuration points past its image
reports `MapperError::OffsetOutOfRange`, which surfaces as a fatal
`CpuError` for the instruction that caused it.

Run Loop
========
`step` executes exactly one instruction. `run` repeats it until a stop
condition is met, checking the halt flag, the routine depth, the
instruction budget and the stop opcode between instructions, never inside
one. Fatal errors come back as `Fault`, carrying the recent trace.
*/

use core::fmt;

use crate::breakpoints::{BreakContext, Breakpoints, Event};
use crate::cpu::cdl::{CdlFlags, CodeDataLog};
use crate::cpu::config::{CpuConfig, HaltHandle};
use crate::cpu::dispatch;
use crate::cpu::state::{CpuState, Status};
use crate::cpu::table::Instruction;
use crate::cpu::trace::{self, History};
use crate::error::{CpuError, Fault};
use crate::mapper::Mapper;

/// Which path a memory read takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Fires breakpoints; what execution uses.
    Instrumented,
    /// Straight to the mapper; what observers use.
    Peek,
}

/// Hardware interrupt kinds and their vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Nmi,
    Reset,
    Irq,
}

impl Interrupt {
    pub const fn vector(self) -> u16 {
        match self {
            Interrupt::Nmi => 0xFFFA,
            Interrupt::Reset => 0xFFFC,
            Interrupt::Irq => 0xFFFE,
        }
    }
}

/// Why `run` returned without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The halt flag was raised (by `halt`, a `HaltHandle`, or a breakpoint).
    Halted,
    /// The configured instruction budget ran out.
    LimitReached,
    /// The PC reached the configured stop opcode.
    Stopped,
    /// `run_routine`'s routine executed its final RTS.
    Returned,
}

pub struct Cpu<M: Mapper> {
    state: CpuState,
    mapper: M,
    breakpoints: Breakpoints,
    config: CpuConfig,
    halt: HaltHandle,
    history: History,
    ticks: u64,
    cdl: CodeDataLog,
    operand_span: Option<(u16, u8)>,
    routine_depth: Option<i32>,
}

impl<M: Mapper> fmt::Debug for Cpu<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("mapper", &self.mapper.describe())
            .field("breakpoints", &self.breakpoints)
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl<M: Mapper> Cpu<M> {
    /// Power-up registers with PC loaded from the RESET vector.
    pub fn new(mapper: M) -> Result<Self, CpuError> {
        Self::with_config(mapper, CpuConfig::default())
    }

    pub fn with_config(mapper: M, config: CpuConfig) -> Result<Self, CpuError> {
        let history = History::new(config.history_len);
        let mut cpu = Self {
            state: CpuState::new(),
            mapper,
            breakpoints: Breakpoints::new(),
            config,
            halt: HaltHandle::new(),
            history,
            ticks: 0,
            cdl: CodeDataLog::new(),
            operand_span: None,
            routine_depth: None,
        };
        cpu.state.pc = cpu.peek_word(Interrupt::Reset.vector())?;
        Ok(cpu)
    }

    // ---------------------------------------------------------------------
    // State snapshots
    // ---------------------------------------------------------------------

    /// Copy of the registers.
    #[inline]
    pub fn state(&self) -> CpuState {
        self.state
    }

    #[inline]
    pub fn set_state(&mut self, state: CpuState) {
        self.state = state;
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    /// Register line: `A: .. X: .. Y: .. SP: .. [P] NV--DIZC`.
    pub fn registers(&self) -> String {
        self.state.to_string()
    }

    #[inline]
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    #[inline]
    pub fn mapper_mut(&mut self) -> &mut M {
        &mut self.mapper
    }

    pub fn mapper_state(&self) -> M::State {
        self.mapper.state()
    }

    pub fn set_mapper_state(&mut self, state: &M::State) -> Result<(), CpuError> {
        Ok(self.mapper.set_state(state)?)
    }

    /// Position of `addr` in the PRG image (or RAM) under the current bank configuration.
    pub fn offset(&self, addr: u16) -> Result<(u32, bool), CpuError> {
        Ok(self.mapper.offset(addr)?)
    }

    pub fn into_mapper(self) -> M {
        self.mapper
    }

    // ---------------------------------------------------------------------
    // Configuration / run-loop state
    // ---------------------------------------------------------------------

    #[inline]
    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: CpuConfig) {
        self.history.set_capacity(config.history_len);
        self.config = config;
    }

    /// Instructions executed since construction or the last hard reset.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Recorded trace lines, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lines()
    }

    /// Ask the run loop to stop before the next instruction.
    pub fn halt(&self) {
        self.halt.halt();
    }

    pub fn is_halted(&self) -> bool {
        self.halt.is_halted()
    }

    /// A handle that can raise the halt flag from elsewhere (signal handler, other thread).
    pub fn halt_handle(&self) -> HaltHandle {
        self.halt.clone()
    }

    // ---------------------------------------------------------------------
    // Breakpoints
    // ---------------------------------------------------------------------

    pub fn register_breakpoint<F>(
        &mut self,
        events: Event,
        name: impl Into<String>,
        address: u16,
        callback: F,
    ) where
        F: FnMut(&mut BreakContext) + 'static,
    {
        self.breakpoints.register(events, name, address, callback);
    }

    #[inline]
    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    #[inline]
    pub fn breakpoints_mut(&mut self) -> &mut Breakpoints {
        &mut self.breakpoints
    }

    pub(crate) fn fire(&mut self, event: Event, address: u16, value: u8) {
        if self.breakpoints.is_empty() {
            return;
        }
        if self.breakpoints.fire(event, address, value, &self.state) {
            log::debug!("Halt requested by breakpoint at ${address:04X} ({event})");
            self.halt.halt();
        }
    }

    // ---------------------------------------------------------------------
    // Memory access
    // ---------------------------------------------------------------------

    pub fn read_byte(&mut self, addr: u16) -> Result<u8, CpuError> {
        let value = self.mapper.read(addr)?;
        if self.config.cdl {
            self.log_data(addr)?;
        }
        self.fire(Event::READ, addr, value);
        Ok(value)
    }

    /// Little-endian word from `addr` and `addr + 1` (wrapping at $FFFF).
    pub fn read_word(&mut self, addr: u16) -> Result<u16, CpuError> {
        let lo = self.read_byte(addr)? as u16;
        let hi = self.read_byte(addr.wrapping_add(1))? as u16;
        Ok(lo | (hi << 8))
    }

    /// Write through the mapper, then fire WRITE breakpoints with the value.
    pub fn write_byte(&mut self, addr: u16, value: u8) {
        self.mapper.write(addr, value);
        self.fire(Event::WRITE, addr, value);
    }

    /// Un-instrumented read.
    pub fn peek_byte(&mut self, addr: u16) -> Result<u8, CpuError> {
        Ok(self.mapper.read(addr)?)
    }

    pub fn peek_word(&mut self, addr: u16) -> Result<u16, CpuError> {
        let lo = self.peek_byte(addr)? as u16;
        let hi = self.peek_byte(addr.wrapping_add(1))? as u16;
        Ok(lo | (hi << 8))
    }

    #[inline]
    pub(crate) fn load(&mut self, addr: u16, access: Access) -> Result<u8, CpuError> {
        match access {
            Access::Instrumented => self.read_byte(addr),
            Access::Peek => self.peek_byte(addr),
        }
    }

    #[inline]
    pub(crate) fn load_word(&mut self, addr: u16, access: Access) -> Result<u16, CpuError> {
        match access {
            Access::Instrumented => self.read_word(addr),
            Access::Peek => self.peek_word(addr),
        }
    }

    // ---------------------------------------------------------------------
    // Stack
    // ---------------------------------------------------------------------

    pub fn push_byte(&mut self, value: u8) {
        let addr = self.state.stack_addr();
        self.write_byte(addr, value);
        self.state.sp = self.state.sp.wrapping_sub(1);
    }

    pub fn pull_byte(&mut self) -> Result<u8, CpuError> {
        self.state.sp = self.state.sp.wrapping_add(1);
        self.read_byte(self.state.stack_addr())
    }

    /// Push high byte, then low byte.
    pub fn push_address(&mut self, addr: u16) {
        let [lo, hi] = addr.to_le_bytes();
        self.push_byte(hi);
        self.push_byte(lo);
    }

    /// Pull low byte, then high byte.
    pub fn pull_address(&mut self) -> Result<u16, CpuError> {
        let lo = self.pull_byte()?;
        let hi = self.pull_byte()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Occupied stack bytes, oldest first (`$01 $80`).
    pub fn stack_string(&mut self) -> Result<String, CpuError> {
        trace::stack_string(self)
    }

    // ---------------------------------------------------------------------
    // Interrupts / reset
    // ---------------------------------------------------------------------

    /// Push PC and status (with the interrupt-context bit), then jump through the vector.
    pub fn interrupt(&mut self, kind: Interrupt) -> Result<(), CpuError> {
        log::debug!("{kind:?} from ${:04X}", self.state.pc);
        self.push_address(self.state.pc);
        let status = self.state.status | Status::INTERRUPT_CONTEXT;
        self.push_byte(status.bits());
        self.state.pc = self.read_word(kind.vector())?;
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), CpuError> {
        self.interrupt(Interrupt::Reset)
    }

    pub fn nmi(&mut self) -> Result<(), CpuError> {
        self.interrupt(Interrupt::Nmi)
    }

    /// Deliver a maskable interrupt. Returns false when Interrupt-disable blocked it.
    pub fn irq(&mut self) -> Result<bool, CpuError> {
        if self.state.flag(Status::IRQ_DISABLE) {
            return Ok(false);
        }
        self.interrupt(Interrupt::Irq)?;
        Ok(true)
    }

    /// Power cycle: clear mapper RAM, restore power-up registers, reload the RESET vector.
    pub fn hard_reset(&mut self) -> Result<(), CpuError> {
        self.mapper.clear_ram();
        self.state = CpuState::new();
        self.state.pc = self.peek_word(Interrupt::Reset.vector())?;
        self.ticks = 0;
        self.operand_span = None;
        self.routine_depth = None;
        self.history.clear();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Execute exactly one instruction.
    ///
    /// With `check_stuck`, an instruction that leaves PC where it started
    /// (`JMP *`, a taken branch to itself) is reported as `Stuck` after it ran.
    pub fn step(&mut self) -> Result<(), CpuError> {
        let pc = self.state.pc;
        let result = dispatch::step(self);
        self.operand_span = None;
        result?;
        self.ticks += 1;
        if self.config.check_stuck && self.state.pc == pc {
            log::warn!("PC stuck at ${pc:04X}");
            return Err(CpuError::Stuck(pc));
        }
        Ok(())
    }

    /// Step until halt, budget, stop opcode, routine return, or fault.
    pub fn run(&mut self) -> Result<RunOutcome, Fault> {
        let mut executed: u64 = 0;
        let outcome = loop {
            if self.routine_depth.is_some_and(|depth| depth < 0) {
                self.routine_depth = None;
                break RunOutcome::Returned;
            }
            if self.halt.is_halted() {
                self.halt.clear();
                break RunOutcome::Halted;
            }
            if let Some(limit) = self.config.instruction_limit {
                if executed >= limit {
                    if self.config.limit_is_error {
                        return Err(self.fault(CpuError::InstructionLimit(executed)));
                    }
                    break RunOutcome::LimitReached;
                }
            }
            if let Some(stop) = self.config.stop_opcode {
                match self.peek_byte(self.state.pc) {
                    Ok(opcode) if opcode == stop => break RunOutcome::Stopped,
                    Ok(_) => {}
                    Err(e) => return Err(self.fault(e)),
                }
            }
            if let Err(e) = self.step() {
                return Err(self.fault(e));
            }
            executed += 1;
        };
        log::info!("{outcome:?} after {executed} instructions at ${:04X}", self.state.pc);
        Ok(outcome)
    }

    /// Call the routine at `address` and run until its final RTS.
    ///
    /// The pushed return address resumes at the current PC afterwards.
    pub fn run_routine(&mut self, address: u16) -> Result<RunOutcome, Fault> {
        let resume = self.state.pc.wrapping_sub(1);
        self.push_address(resume);
        self.routine_depth = Some(0);
        self.state.pc = address;
        let result = self.run();
        self.routine_depth = None;
        result
    }

    pub(crate) fn enter_subroutine(&mut self) {
        if let Some(depth) = &mut self.routine_depth {
            *depth += 1;
        }
    }

    pub(crate) fn leave_subroutine(&mut self) {
        if let Some(depth) = &mut self.routine_depth {
            *depth -= 1;
        }
    }

    // ---------------------------------------------------------------------
    // Code/data log
    // ---------------------------------------------------------------------

    /// ROM coverage gathered while `CpuConfig::cdl` was on.
    #[inline]
    pub fn code_data_log(&self) -> &CodeDataLog {
        &self.cdl
    }

    pub fn clear_code_data_log(&mut self) {
        self.cdl.clear();
    }

    /// Bytes of the instruction being executed; reads inside it are not data.
    pub(crate) fn set_operand_span(&mut self, pc: u16, len: u8) {
        self.operand_span = Some((pc, len));
    }

    fn log_data(&mut self, addr: u16) -> Result<(), CpuError> {
        if let Some((pc, len)) = self.operand_span {
            if addr.wrapping_sub(pc) < len as u16 {
                return Ok(());
            }
        }
        let (offset, rom) = self.mapper.offset(addr)?;
        if rom {
            self.cdl.mark(offset, CdlFlags::DATA);
        }
        Ok(())
    }

    /// Mark the bytes of the instruction at PC as code and list it once per ROM offset.
    pub(crate) fn log_code(&mut self, instruction: Instruction) -> Result<(), CpuError> {
        let pc = self.state.pc;
        let mut bytes = Vec::with_capacity(instruction.len() as usize);
        for i in 0..instruction.len() as u16 {
            let addr = pc.wrapping_add(i);
            bytes.push(format!("{:02X}", self.peek_byte(addr)?));
            let (offset, rom) = self.mapper.offset(addr)?;
            if rom {
                self.cdl.mark(offset, CdlFlags::CODE);
            }
        }

        let (offset, rom) = self.mapper.offset(pc)?;
        if rom && !self.cdl.is_visited(offset) {
            let operand = instruction.mode().clean_asm(self)?;
            let text = format!("{} {operand}", instruction.mnemonic());
            let line = format!(
                "[${offset:06X}:${pc:04X}] {} ; {}",
                text.trim_end(),
                bytes.join(" ")
            );
            self.cdl.visit(offset, line);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------

    #[inline]
    pub(crate) fn tracing(&self) -> bool {
        self.config.trace || log::log_enabled!(log::Level::Trace)
    }

    pub(crate) fn record(&mut self, line: String) {
        log::trace!("{line}");
        if self.config.trace {
            self.history.push(line);
        }
    }

    fn fault(&mut self, error: CpuError) -> Fault {
        log::error!("{error}");
        let trace = self.history.lines();
        for line in &trace {
            log::error!("  {line}");
        }
        log::error!("  {}", self.registers());
        Fault { error, trace }
    }
}
