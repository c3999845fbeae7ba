/*!
standard.rs - Instructions that resolve an operand and advance PC by its length.

Covers loads, stores, the ALU group, compares, register transfers,
increments of X/Y, the stack pushes/pulls and the flag set/clear group.
Memory operands are read once with an instrumented read; stores write once.
*/

use crate::cpu::addressing::AddressingMode;
use crate::cpu::core::{Access, Cpu};
use crate::cpu::execute;
use crate::cpu::state::Status;
use crate::cpu::table::StandardOp;
use crate::error::CpuError;
use crate::mapper::Mapper;

pub(crate) fn execute<M: Mapper>(
    cpu: &mut Cpu<M>,
    op: StandardOp,
    mode: AddressingMode,
) -> Result<(), CpuError> {
    let (address, len) = mode.resolve(cpu, Access::Instrumented)?;

    match op {
        // Loads / ALU: one operand read
        StandardOp::Lda
        | StandardOp::Ldx
        | StandardOp::Ldy
        | StandardOp::Adc
        | StandardOp::Sbc
        | StandardOp::And
        | StandardOp::Ora
        | StandardOp::Eor
        | StandardOp::Bit
        | StandardOp::Cmp
        | StandardOp::Cpx
        | StandardOp::Cpy => {
            let value = cpu.read_byte(address)?;
            let s = cpu.state_mut();
            let (a, x, y) = (s.a, s.x, s.y);
            match op {
                StandardOp::Lda => {
                    s.a = value;
                    s.set_zero_negative(value);
                }
                StandardOp::Ldx => {
                    s.x = value;
                    s.set_zero_negative(value);
                }
                StandardOp::Ldy => {
                    s.y = value;
                    s.set_zero_negative(value);
                }
                StandardOp::Adc => s.a = execute::twos_comp_add(s, a, value),
                StandardOp::Sbc => s.a = execute::twos_comp_subtract(s, a, value),
                StandardOp::And => execute::and(s, value),
                StandardOp::Ora => execute::ora(s, value),
                StandardOp::Eor => execute::eor(s, value),
                StandardOp::Bit => execute::bit(s, value),
                StandardOp::Cmp => execute::compare(s, a, value),
                StandardOp::Cpx => execute::compare(s, x, value),
                _ => execute::compare(s, y, value),
            }
        }

        // Stores
        StandardOp::Sta => cpu.write_byte(address, cpu.state().a),
        StandardOp::Stx => cpu.write_byte(address, cpu.state().x),
        StandardOp::Sty => cpu.write_byte(address, cpu.state().y),

        // Stack
        StandardOp::Pha => cpu.push_byte(cpu.state().a),
        StandardOp::Php => {
            let status = cpu.state().status | Status::BREAK_PAIR;
            cpu.push_byte(status.bits());
        }
        StandardOp::Pla => {
            let value = cpu.pull_byte()?;
            let s = cpu.state_mut();
            s.a = value;
            s.set_zero_negative(value);
        }
        StandardOp::Plp => {
            let value = cpu.pull_byte()?;
            cpu.state_mut().status = Status::from_pulled(value);
        }

        // Register-only
        _ => {
            let s = cpu.state_mut();
            match op {
                StandardOp::Tax => {
                    s.x = s.a;
                    s.set_zero_negative(s.x);
                }
                StandardOp::Tay => {
                    s.y = s.a;
                    s.set_zero_negative(s.y);
                }
                StandardOp::Txa => {
                    s.a = s.x;
                    s.set_zero_negative(s.a);
                }
                StandardOp::Tya => {
                    s.a = s.y;
                    s.set_zero_negative(s.a);
                }
                StandardOp::Tsx => {
                    s.x = s.sp;
                    s.set_zero_negative(s.x);
                }
                // TXS leaves the flags alone.
                StandardOp::Txs => s.sp = s.x,
                StandardOp::Inx => {
                    s.x = s.x.wrapping_add(1);
                    s.set_zero_negative(s.x);
                }
                StandardOp::Iny => {
                    s.y = s.y.wrapping_add(1);
                    s.set_zero_negative(s.y);
                }
                StandardOp::Dex => {
                    s.x = s.x.wrapping_sub(1);
                    s.set_zero_negative(s.x);
                }
                StandardOp::Dey => {
                    s.y = s.y.wrapping_sub(1);
                    s.set_zero_negative(s.y);
                }
                StandardOp::Clc => s.set_flag(Status::CARRY, false),
                StandardOp::Sec => s.set_flag(Status::CARRY, true),
                StandardOp::Cli => s.set_flag(Status::IRQ_DISABLE, false),
                StandardOp::Sei => s.set_flag(Status::IRQ_DISABLE, true),
                StandardOp::Cld => s.set_flag(Status::DECIMAL, false),
                StandardOp::Sed => s.set_flag(Status::DECIMAL, true),
                StandardOp::Clv => s.set_flag(Status::OVERFLOW, false),
                _ => {} // NOP
            }
        }
    }

    cpu.state_mut().advance_pc(len as u16);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cpu::state::Status;
    use crate::mapper::Mapper;
    use crate::test_utils::flat_cpu;

    #[test]
    fn lda_immediate() {
        let mut cpu = flat_cpu(&[0xA9, 0x01]);
        cpu.step().unwrap();
        let s = cpu.state();
        assert_eq!(s.a, 0x01);
        assert!(!s.flag(Status::ZERO));
        assert!(!s.flag(Status::NEGATIVE));
        assert_eq!(s.pc, 0x8002);
    }

    #[test]
    fn lda_sets_zero_and_negative() {
        let mut cpu = flat_cpu(&[0xA9, 0x00, 0xA9, 0x80]);
        cpu.step().unwrap();
        assert!(cpu.state().flag(Status::ZERO));
        cpu.step().unwrap();
        assert!(cpu.state().flag(Status::NEGATIVE));
        assert!(!cpu.state().flag(Status::ZERO));
    }

    #[test]
    fn sta_zero_page_x() {
        let mut cpu = flat_cpu(&[0x95, 0x03]);
        cpu.state_mut().a = 0x10;
        cpu.state_mut().x = 0x03;
        cpu.step().unwrap();
        assert_eq!(cpu.peek_byte(0x0006).unwrap(), 0x10);
        assert_eq!(cpu.state().pc, 0x8002);
    }

    #[test]
    fn stores_leave_flags_alone() {
        let mut cpu = flat_cpu(&[0x8E, 0x00, 0x02]);
        let before = cpu.state().status;
        cpu.step().unwrap();
        assert_eq!(cpu.state().status, before);
        assert_eq!(cpu.state().pc, 0x8003);
    }

    #[test]
    fn adc_then_sbc_restores_accumulator() {
        // CLC; ADC #$37; SEC; SBC #$37
        let mut cpu = flat_cpu(&[0x18, 0x69, 0x37, 0x38, 0xE9, 0x37]);
        cpu.state_mut().a = 0xD2;
        for _ in 0..4 {
            cpu.step().unwrap();
        }
        assert_eq!(cpu.state().a, 0xD2);
        assert_eq!(cpu.state().pc, 0x8006);
    }

    #[test]
    fn cmp_sets_carry_and_keeps_overflow() {
        let mut cpu = flat_cpu(&[0xC9, 0x10, 0xC9, 0x30]);
        cpu.state_mut().a = 0x20;
        cpu.state_mut().set_flag(Status::OVERFLOW, true);
        cpu.step().unwrap();
        assert!(cpu.state().flag(Status::CARRY));
        assert!(!cpu.state().flag(Status::ZERO));
        assert!(cpu.state().flag(Status::OVERFLOW));
        cpu.step().unwrap();
        assert!(!cpu.state().flag(Status::CARRY));
        assert!(cpu.state().flag(Status::NEGATIVE));
        assert!(cpu.state().flag(Status::OVERFLOW));
    }

    #[test]
    fn bit_copies_operand_bits() {
        let mut cpu = flat_cpu(&[0x24, 0x10]);
        cpu.mapper_mut().write(0x0010, 0xC0);
        cpu.state_mut().a = 0x01;
        cpu.step().unwrap();
        let s = cpu.state();
        assert!(s.flag(Status::ZERO));
        assert!(s.flag(Status::NEGATIVE));
        assert!(s.flag(Status::OVERFLOW));
    }

    #[test]
    fn ora_sets_flags() {
        let mut cpu = flat_cpu(&[0x09, 0x80]);
        cpu.step().unwrap();
        assert_eq!(cpu.state().a, 0x80);
        assert!(cpu.state().flag(Status::NEGATIVE));
    }

    #[test]
    fn php_plp_framing_bits() {
        // SEC; PHP; CLC; PLP
        let mut cpu = flat_cpu(&[0x38, 0x08, 0x18, 0x28]);
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.peek_byte(0x01FD).unwrap(), 0x35);
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.state().status, Status::CARRY | Status::IRQ_DISABLE);
        assert_eq!(cpu.state().sp, 0xFD);
    }

    #[test]
    fn pha_pla_round_trip() {
        // LDA #$80; PHA; LDA #$00; PLA
        let mut cpu = flat_cpu(&[0xA9, 0x80, 0x48, 0xA9, 0x00, 0x68]);
        for _ in 0..4 {
            cpu.step().unwrap();
        }
        assert_eq!(cpu.state().a, 0x80);
        assert!(cpu.state().flag(Status::NEGATIVE));
        assert_eq!(cpu.state().sp, 0xFD);
    }

    #[test]
    fn transfers_and_counters() {
        // LDX #$FF; INX; TXS; TSX; DEY
        let mut cpu = flat_cpu(&[0xA2, 0xFF, 0xE8, 0x9A, 0xBA, 0x88]);
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.state().x, 0);
        assert!(cpu.state().flag(Status::ZERO));
        cpu.step().unwrap();
        assert_eq!(cpu.state().sp, 0);
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.state().y, 0xFF);
        assert!(cpu.state().flag(Status::NEGATIVE));
    }

    #[test]
    fn flag_instructions() {
        // SED; SEI; CLI; CLD; CLV
        let mut cpu = flat_cpu(&[0xF8, 0x78, 0x58, 0xD8, 0xB8]);
        cpu.step().unwrap();
        assert!(cpu.state().flag(Status::DECIMAL));
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert!(!cpu.state().flag(Status::IRQ_DISABLE));
        cpu.step().unwrap();
        assert!(!cpu.state().flag(Status::DECIMAL));
        cpu.state_mut().set_flag(Status::OVERFLOW, true);
        cpu.step().unwrap();
        assert!(!cpu.state().flag(Status::OVERFLOW));
    }
}
