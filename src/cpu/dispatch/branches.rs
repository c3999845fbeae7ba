/*!
branches.rs - Conditional relative branches (BPL/BMI/BVC/BVS/BCC/BCS/BNE/BEQ).

Each branch tests one status flag. Taken: PC = opcode PC + 2 + signed
offset. Not taken: PC = opcode PC + 2. Flags are never modified.
*/

use crate::cpu::addressing::AddressingMode;
use crate::cpu::core::{Access, Cpu};
use crate::cpu::table::BranchOp;
use crate::error::CpuError;
use crate::mapper::Mapper;

pub(crate) fn execute<M: Mapper>(cpu: &mut Cpu<M>, op: BranchOp) -> Result<(), CpuError> {
    let (target, len) = AddressingMode::Relative.resolve(cpu, Access::Instrumented)?;
    let s = cpu.state_mut();
    if s.flag(op.flag()) == op.when_set() {
        s.pc = target;
    } else {
        s.advance_pc(len as u16);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cpu::state::Status;
    use crate::test_utils::flat_cpu;

    #[test]
    fn bne_taken_backwards() {
        let mut cpu = flat_cpu(&[0xEA, 0xEA, 0xD0, 0xFC]);
        cpu.state_mut().pc = 0x8002;
        cpu.step().unwrap();
        assert_eq!(cpu.state().pc, 0x8000);
    }

    #[test]
    fn beq_not_taken_falls_through() {
        let mut cpu = flat_cpu(&[0xF0, 0x10]);
        cpu.state_mut().set_flag(Status::ZERO, false);
        cpu.step().unwrap();
        assert_eq!(cpu.state().pc, 0x8002);
    }

    #[test]
    fn every_branch_follows_its_flag() {
        let cases = [
            (0x10, Status::NEGATIVE, false),
            (0x30, Status::NEGATIVE, true),
            (0x50, Status::OVERFLOW, false),
            (0x70, Status::OVERFLOW, true),
            (0x90, Status::CARRY, false),
            (0xB0, Status::CARRY, true),
            (0xD0, Status::ZERO, false),
            (0xF0, Status::ZERO, true),
        ];
        for (opcode, flag, when_set) in cases {
            let mut cpu = flat_cpu(&[opcode, 0x04]);
            cpu.state_mut().set_flag(flag, when_set);
            let before = cpu.state().status;
            cpu.step().unwrap();
            assert_eq!(cpu.state().pc, 0x8006, "opcode {opcode:02X}");
            assert_eq!(cpu.state().status, before);

            let mut cpu = flat_cpu(&[opcode, 0x04]);
            cpu.state_mut().set_flag(flag, !when_set);
            cpu.step().unwrap();
            assert_eq!(cpu.state().pc, 0x8002, "opcode {opcode:02X}");
        }
    }
}
