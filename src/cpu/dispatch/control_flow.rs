/*!
control_flow.rs - JMP / JSR / RTS / RTI / BRK.

Behavior
========
- JMP abs / (ind): PC = resolved address.
- JSR: push the address of the JSR's last byte (opcode PC + 2), then jump.
- RTS: PC = pulled address + 1.
- RTI: pull status (framing bits stripped), then PC.
- BRK: push opcode PC + 2 and status with both framing bits, set
  Interrupt-disable, then PC = word at $FFFE.

JSR and RTS also move the routine depth `Cpu::run_routine` watches.
*/

use crate::cpu::addressing::AddressingMode;
use crate::cpu::core::{Access, Cpu, Interrupt};
use crate::cpu::state::Status;
use crate::cpu::table::JumpOp;
use crate::error::CpuError;
use crate::mapper::Mapper;

pub(crate) fn execute<M: Mapper>(
    cpu: &mut Cpu<M>,
    op: JumpOp,
    mode: AddressingMode,
) -> Result<(), CpuError> {
    let pc = cpu.state().pc;
    match op {
        JumpOp::Jmp => {
            let (target, _) = mode.resolve(cpu, Access::Instrumented)?;
            cpu.state_mut().pc = target;
        }
        JumpOp::Jsr => {
            let (target, _) = mode.resolve(cpu, Access::Instrumented)?;
            cpu.push_address(pc.wrapping_add(2));
            cpu.state_mut().pc = target;
            cpu.enter_subroutine();
        }
        JumpOp::Rts => {
            let ret = cpu.pull_address()?;
            cpu.state_mut().pc = ret.wrapping_add(1);
            cpu.leave_subroutine();
        }
        JumpOp::Rti => {
            let status = cpu.pull_byte()?;
            cpu.state_mut().status = Status::from_pulled(status);
            let ret = cpu.pull_address()?;
            cpu.state_mut().pc = ret;
        }
        JumpOp::Brk => {
            cpu.push_address(pc.wrapping_add(2));
            let status = cpu.state().status | Status::BREAK_PAIR;
            cpu.push_byte(status.bits());
            cpu.state_mut().set_flag(Status::IRQ_DISABLE, true);
            let target = cpu.read_word(Interrupt::Irq.vector())?;
            cpu.state_mut().pc = target;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cpu::state::Status;
    use crate::mapper::Mapper;
    use crate::mappers::FullRw;
    use crate::test_utils::flat_cpu;

    #[test]
    fn jsr_then_rts() {
        let mut mem = FullRw::with_program(0x8000, &[0x20, 0x00, 0x90]);
        mem.set_reset_vector(0x8000);
        mem.write(0x9000, 0x60);
        let mut cpu = crate::cpu::core::Cpu::new(mem).unwrap();
        let sp = cpu.state().sp;

        cpu.step().unwrap();
        assert_eq!(cpu.state().pc, 0x9000);
        assert_eq!(cpu.state().sp, sp.wrapping_sub(2));
        assert_eq!(cpu.peek_word(0x01FC).unwrap(), 0x8002);

        cpu.step().unwrap();
        assert_eq!(cpu.state().pc, 0x8003);
        assert_eq!(cpu.state().sp, sp);
    }

    #[test]
    fn jmp_absolute_and_indirect() {
        let mut cpu = flat_cpu(&[0x4C, 0x05, 0x80, 0x00, 0x00, 0x6C, 0x00, 0x03]);
        cpu.mapper_mut().write(0x0300, 0x34);
        cpu.mapper_mut().write(0x0301, 0x12);
        cpu.step().unwrap();
        assert_eq!(cpu.state().pc, 0x8005);
        cpu.step().unwrap();
        assert_eq!(cpu.state().pc, 0x1234);
    }

    #[test]
    fn brk_then_rti() {
        let mut mem = FullRw::with_program(0x8000, &[0x00, 0xFF, 0xEA]);
        mem.set_reset_vector(0x8000);
        mem.write(0xFFFE, 0x00);
        mem.write(0xFFFF, 0x90);
        mem.write(0x9000, 0x40);
        let mut cpu = crate::cpu::core::Cpu::new(mem).unwrap();
        cpu.state_mut().status = Status::CARRY;

        cpu.step().unwrap();
        assert_eq!(cpu.state().pc, 0x9000);
        assert!(cpu.state().flag(Status::IRQ_DISABLE));
        assert_eq!(cpu.peek_byte(0x01FB).unwrap(), 0x31);
        assert_eq!(cpu.peek_word(0x01FC).unwrap(), 0x8002);

        cpu.step().unwrap();
        assert_eq!(cpu.state().pc, 0x8002);
        assert_eq!(cpu.state().status, Status::CARRY);
        assert_eq!(cpu.state().sp, 0xFD);
    }
}
