/*!
addressing.rs - 6502 addressing modes: effective address + operand rendering.

Overview
========
`AddressingMode` is a closed enum. For the instruction whose opcode sits at
the current PC, each mode computes:
- the effective address (`resolve`)
- the total instruction length in bytes (`len`)
- an assembly-style operand string (`asm` / `clean_asm`)

Rendering goes through `resolve`, so a trace line can never disagree with
what execution did.

Wraparound Rules
================
| Mode        | Effective address                         | Length |
|-------------|-------------------------------------------|--------|
| Implied/Acc | PC (unused)                               | 1      |
| Immediate   | PC+1                                      | 2      |
| Relative    | opcode PC + 2 + signed offset             | 2      |
| zp[,X/,Y]   | byte@PC+1 [+X/Y], truncated to 8 bits     | 2      |
| abs[,X/,Y]  | word@PC+1 [+X/Y], full 16-bit add         | 3      |
| (abs)       | word@(word@PC+1), no page-wrap quirk      | 3      |
| (zp,X)      | word@((byte@PC+1 + X) & 0xFF)             | 2      |
| (zp),Y      | word@(byte@PC+1) + Y, full 16-bit add     | 2      |

Word reads are plain `lo | hi << 8` of consecutive addresses, including
pointer reads that start at $FF.

Resolution never changes registers or memory. The operand and pointer
reads it performs go through the access path the caller picks: execution
uses instrumented reads (breakpoints see them), tracing uses peeks.
*/

use serde::{Deserialize, Serialize};

use crate::cpu::core::{Access, Cpu};
use crate::cpu::execute::branch_target;
use crate::error::CpuError;
use crate::mapper::Mapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    Relative,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
}

impl AddressingMode {
    /// Total instruction length (opcode + operand bytes).
    #[inline]
    pub const fn len(self) -> u8 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 3,
            _ => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            AddressingMode::Implied => "Implied",
            AddressingMode::Accumulator => "Accumulator",
            AddressingMode::Immediate => "Immediate",
            AddressingMode::Relative => "Relative",
            AddressingMode::ZeroPage => "ZeroPage",
            AddressingMode::ZeroPageX => "ZeroPage,X",
            AddressingMode::ZeroPageY => "ZeroPage,Y",
            AddressingMode::Absolute => "Absolute",
            AddressingMode::AbsoluteX => "Absolute,X",
            AddressingMode::AbsoluteY => "Absolute,Y",
            AddressingMode::Indirect => "Indirect",
            AddressingMode::IndexedIndirect => "(Indirect,X)",
            AddressingMode::IndirectIndexed => "(Indirect),Y",
        }
    }

    /// Effective address and length for the instruction at the current PC.
    pub fn resolve<M: Mapper>(
        self,
        cpu: &mut Cpu<M>,
        access: Access,
    ) -> Result<(u16, u8), CpuError> {
        let pc = cpu.state().pc;
        let operand = pc.wrapping_add(1);
        let x = cpu.state().x;
        let y = cpu.state().y;

        let address = match self {
            AddressingMode::Implied | AddressingMode::Accumulator => pc,
            AddressingMode::Immediate => operand,
            AddressingMode::Relative => branch_target(pc, cpu.load(operand, access)?),
            AddressingMode::ZeroPage => cpu.load(operand, access)? as u16,
            AddressingMode::ZeroPageX => cpu.load(operand, access)?.wrapping_add(x) as u16,
            AddressingMode::ZeroPageY => cpu.load(operand, access)?.wrapping_add(y) as u16,
            AddressingMode::Absolute => cpu.load_word(operand, access)?,
            AddressingMode::AbsoluteX => cpu.load_word(operand, access)?.wrapping_add(x as u16),
            AddressingMode::AbsoluteY => cpu.load_word(operand, access)?.wrapping_add(y as u16),
            AddressingMode::Indirect => {
                let pointer = cpu.load_word(operand, access)?;
                cpu.load_word(pointer, access)?
            }
            AddressingMode::IndexedIndirect => {
                let pointer = cpu.load(operand, access)?.wrapping_add(x);
                cpu.load_word(pointer as u16, access)?
            }
            AddressingMode::IndirectIndexed => {
                let pointer = cpu.load(operand, access)?;
                cpu.load_word(pointer as u16, access)?
                    .wrapping_add(y as u16)
            }
        };
        Ok((address, self.len()))
    }

    /// Operand text with the resolved address, e.g. `$10,X @ $0013`.
    pub fn asm<M: Mapper>(self, cpu: &mut Cpu<M>) -> Result<String, CpuError> {
        self.render(cpu, true)
    }

    /// Operand text as it would be written in source, e.g. `$10,X`.
    pub fn clean_asm<M: Mapper>(self, cpu: &mut Cpu<M>) -> Result<String, CpuError> {
        self.render(cpu, false)
    }

    fn render<M: Mapper>(self, cpu: &mut Cpu<M>, annotate: bool) -> Result<String, CpuError> {
        let (address, _) = self.resolve(cpu, Access::Peek)?;
        let operand = cpu.state().pc.wrapping_add(1);
        // Only the bytes the instruction owns; past them may be unmapped.
        let byte = match self.len() {
            1 => 0,
            _ => cpu.peek_byte(operand)?,
        };
        let word = match self.len() {
            3 => cpu.peek_word(operand)?,
            _ => byte as u16,
        };

        let (text, note) = match self {
            AddressingMode::Implied => (String::new(), None),
            AddressingMode::Accumulator => ("A".to_string(), None),
            AddressingMode::Immediate => (format!("#${byte:02X}"), None),
            AddressingMode::Relative => (
                format!("${address:04X}"),
                Some(format!("({})", byte as i8)),
            ),
            AddressingMode::ZeroPage => (
                format!("${byte:02X}"),
                Some(format!("= {:02X}", cpu.peek_byte(address)?)),
            ),
            AddressingMode::ZeroPageX => (format!("${byte:02X},X"), Some(format!("@ ${address:04X}"))),
            AddressingMode::ZeroPageY => (format!("${byte:02X},Y"), Some(format!("@ ${address:04X}"))),
            AddressingMode::Absolute => (format!("${word:04X}"), None),
            AddressingMode::AbsoluteX => (format!("${word:04X},X"), Some(format!("@ ${address:04X}"))),
            AddressingMode::AbsoluteY => (format!("${word:04X},Y"), Some(format!("@ ${address:04X}"))),
            AddressingMode::Indirect => (format!("(${word:04X})"), Some(format!("@ ${address:04X}"))),
            AddressingMode::IndexedIndirect => {
                (format!("(${byte:02X},X)"), Some(format!("@ ${address:04X}")))
            }
            AddressingMode::IndirectIndexed => {
                (format!("(${byte:02X}),Y"), Some(format!("@ ${address:04X}")))
            }
        };

        Ok(match note {
            Some(note) if annotate => format!("{text} {note}"),
            _ => text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::AddressingMode::{self, *};
    use crate::cpu::core::Access;
    use crate::mapper::Mapper;
    use crate::test_utils::flat_cpu;

    fn resolve_at(program: &[u8], x: u8, y: u8, mode: AddressingMode) -> (u16, u8) {
        let mut cpu = flat_cpu(program);
        cpu.state_mut().x = x;
        cpu.state_mut().y = y;
        mode.resolve(&mut cpu, Access::Instrumented).unwrap()
    }

    #[test]
    fn implied_and_immediate() {
        assert_eq!(resolve_at(&[0xEA], 0, 0, Implied), (0x8000, 1));
        assert_eq!(resolve_at(&[0x0A], 0, 0, Accumulator), (0x8000, 1));
        assert_eq!(resolve_at(&[0xA9, 0x01], 0, 0, Immediate), (0x8001, 2));
    }

    #[test]
    fn zero_page_index_wraps_within_page() {
        assert_eq!(resolve_at(&[0xA5, 0x44], 0, 0, ZeroPage), (0x0044, 2));
        assert_eq!(resolve_at(&[0xB5, 0xFF], 1, 0, ZeroPageX), (0x0000, 2));
        assert_eq!(resolve_at(&[0xB6, 0x80], 0, 0x85, ZeroPageY), (0x0005, 2));
    }

    #[test]
    fn absolute_index_uses_full_16_bit_add() {
        assert_eq!(resolve_at(&[0xAD, 0x34, 0x12], 0, 0, Absolute), (0x1234, 3));
        assert_eq!(resolve_at(&[0xBD, 0xFF, 0x12], 1, 0, AbsoluteX), (0x1300, 3));
        assert_eq!(resolve_at(&[0xB9, 0xFF, 0xFF], 0, 2, AbsoluteY), (0x0001, 3));
    }

    #[test]
    fn indirect_reads_pointer_without_page_quirk() {
        let mut cpu = flat_cpu(&[0x6C, 0xFF, 0x02]);
        cpu.mapper_mut().write(0x02FF, 0x34);
        cpu.mapper_mut().write(0x0300, 0x12);
        cpu.mapper_mut().write(0x0200, 0x99);
        assert_eq!(
            Indirect.resolve(&mut cpu, Access::Instrumented).unwrap(),
            (0x1234, 3)
        );
    }

    #[test]
    fn indexed_indirect_wraps_pointer_in_zero_page() {
        let mut cpu = flat_cpu(&[0xA1, 0xFE]);
        cpu.state_mut().x = 0x03;
        cpu.mapper_mut().write(0x0001, 0x00);
        cpu.mapper_mut().write(0x0002, 0x90);
        assert_eq!(
            IndexedIndirect.resolve(&mut cpu, Access::Instrumented).unwrap(),
            (0x9000, 2)
        );
    }

    #[test]
    fn pointer_at_ff_reads_next_page() {
        let mut cpu = flat_cpu(&[0xA1, 0xFF]);
        cpu.mapper_mut().write(0x00FF, 0x34);
        cpu.mapper_mut().write(0x0100, 0x12);
        assert_eq!(
            IndexedIndirect.resolve(&mut cpu, Access::Instrumented).unwrap(),
            (0x1234, 2)
        );
    }

    #[test]
    fn indirect_indexed_adds_y_across_pages() {
        let mut cpu = flat_cpu(&[0xB1, 0x10]);
        cpu.state_mut().y = 0x10;
        cpu.mapper_mut().write(0x0010, 0xF8);
        cpu.mapper_mut().write(0x0011, 0x7F);
        assert_eq!(
            IndirectIndexed.resolve(&mut cpu, Access::Instrumented).unwrap(),
            (0x8008, 2)
        );
    }

    #[test]
    fn relative_is_measured_from_opcode() {
        assert_eq!(resolve_at(&[0xD0, 0x05], 0, 0, Relative), (0x8007, 2));
        assert_eq!(resolve_at(&[0xD0, 0xFE], 0, 0, Relative), (0x8000, 2));
    }

    #[test]
    fn renders_operands() {
        let mut cpu = flat_cpu(&[0xB5, 0x10]);
        cpu.state_mut().x = 3;
        assert_eq!(ZeroPageX.asm(&mut cpu).unwrap(), "$10,X @ $0013");
        assert_eq!(ZeroPageX.clean_asm(&mut cpu).unwrap(), "$10,X");

        let mut cpu = flat_cpu(&[0xA9, 0x7F]);
        assert_eq!(Immediate.asm(&mut cpu).unwrap(), "#$7F");

        let mut cpu = flat_cpu(&[0xA5, 0x04]);
        cpu.mapper_mut().write(0x0004, 0xAB);
        assert_eq!(ZeroPage.asm(&mut cpu).unwrap(), "$04 = AB");

        let mut cpu = flat_cpu(&[0xF0, 0xFC]);
        assert_eq!(Relative.asm(&mut cpu).unwrap(), "$7FFE (-4)");
        assert_eq!(Relative.clean_asm(&mut cpu).unwrap(), "$7FFE");

        let mut cpu = flat_cpu(&[0x0A]);
        assert_eq!(Accumulator.asm(&mut cpu).unwrap(), "A");
        assert_eq!(Implied.asm(&mut cpu).unwrap(), "");
    }

    #[test]
    fn rendering_stays_inside_the_instruction() {
        use crate::cpu::core::Cpu;
        use crate::mappers::Mmc1;
        use crate::test_utils::tagged_prg;

        let mut cpu = Cpu::new(Mmc1::new(tagged_prg(2), true).unwrap()).unwrap();
        // PRG bank 7 of 2: the $8000 window is out of range from here on.
        for i in 0..5 {
            cpu.mapper_mut().write(0xE000, (7 >> i) & 1);
        }
        assert!(cpu.peek_byte(0x8000).is_err());

        cpu.mapper_mut().write(0x7FFE, 0xA9);
        cpu.mapper_mut().write(0x7FFF, 0x42);
        cpu.state_mut().pc = 0x7FFF;
        assert_eq!(Implied.asm(&mut cpu).unwrap(), "");
        assert_eq!(Accumulator.clean_asm(&mut cpu).unwrap(), "A");
        cpu.state_mut().pc = 0x7FFE;
        assert_eq!(Immediate.asm(&mut cpu).unwrap(), "#$42");
    }

    #[test]
    fn lengths() {
        assert_eq!(Implied.len(), 1);
        assert_eq!(IndirectIndexed.len(), 2);
        assert_eq!(Indirect.len(), 3);
    }
}
