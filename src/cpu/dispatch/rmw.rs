/*!
rmw.rs - Read-modify-write: ASL / LSR / ROL / ROR / INC / DEC.

Memory forms read the operand, transform it and write the result back to
the same address (one READ, one WRITE as far as breakpoints can see).
The accumulator forms of the shifts and rotates transform A in place.
*/

use crate::cpu::addressing::AddressingMode;
use crate::cpu::core::{Access, Cpu};
use crate::cpu::execute;
use crate::cpu::state::CpuState;
use crate::cpu::table::RmwOp;
use crate::error::CpuError;
use crate::mapper::Mapper;

#[inline]
fn apply(state: &mut CpuState, op: RmwOp, v: u8) -> u8 {
    match op {
        RmwOp::Asl => execute::asl(state, v),
        RmwOp::Lsr => execute::lsr(state, v),
        RmwOp::Rol => execute::rol(state, v),
        RmwOp::Ror => execute::ror(state, v),
        RmwOp::Inc => execute::inc(state, v),
        RmwOp::Dec => execute::dec(state, v),
    }
}

pub(crate) fn execute<M: Mapper>(
    cpu: &mut Cpu<M>,
    op: RmwOp,
    mode: AddressingMode,
) -> Result<(), CpuError> {
    if mode == AddressingMode::Accumulator {
        let s = cpu.state_mut();
        let a = s.a;
        s.a = apply(s, op, a);
        s.advance_pc(mode.len() as u16);
        return Ok(());
    }

    let (address, len) = mode.resolve(cpu, Access::Instrumented)?;
    let value = cpu.read_byte(address)?;
    let result = apply(cpu.state_mut(), op, value);
    cpu.write_byte(address, result);
    cpu.state_mut().advance_pc(len as u16);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::breakpoints::Event;
    use crate::cpu::state::Status;
    use crate::mapper::Mapper;
    use crate::test_utils::flat_cpu;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn asl_accumulator() {
        let mut cpu = flat_cpu(&[0x0A]);
        cpu.state_mut().a = 0x81;
        cpu.step().unwrap();
        assert_eq!(cpu.state().a, 0x02);
        assert!(cpu.state().flag(Status::CARRY));
        assert_eq!(cpu.state().pc, 0x8001);
    }

    #[test]
    fn ror_accumulator_rotates_carry_in() {
        // SEC; ROR A
        let mut cpu = flat_cpu(&[0x38, 0x6A]);
        cpu.state_mut().a = 0x02;
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.state().a, 0x81);
        assert!(!cpu.state().flag(Status::CARRY));
        assert!(cpu.state().flag(Status::NEGATIVE));
    }

    #[test]
    fn inc_memory_wraps_to_zero() {
        let mut cpu = flat_cpu(&[0xEE, 0x00, 0x02]);
        cpu.mapper_mut().write(0x0200, 0xFF);
        cpu.step().unwrap();
        assert_eq!(cpu.peek_byte(0x0200).unwrap(), 0x00);
        assert!(cpu.state().flag(Status::ZERO));
        assert_eq!(cpu.state().pc, 0x8003);
    }

    #[test]
    fn dec_zero_page_x() {
        let mut cpu = flat_cpu(&[0xD6, 0x10]);
        cpu.state_mut().x = 2;
        cpu.step().unwrap();
        assert_eq!(cpu.peek_byte(0x0012).unwrap(), 0xFF);
        assert!(cpu.state().flag(Status::NEGATIVE));
    }

    #[test]
    fn memory_form_reads_then_writes_once() {
        let mut cpu = flat_cpu(&[0x46, 0x20]);
        cpu.mapper_mut().write(0x0020, 0x03);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        cpu.register_breakpoint(Event::READ | Event::WRITE, "zp", 0x0020, move |ctx| {
            log.borrow_mut().push((ctx.event, ctx.value));
        });
        cpu.step().unwrap();
        assert_eq!(*seen.borrow(), vec![(Event::READ, 0x03), (Event::WRITE, 0x01)]);
        assert!(cpu.state().flag(Status::CARRY));
    }
}
