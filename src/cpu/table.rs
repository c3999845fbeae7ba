/*!
table.rs - Opcode table: one immutable descriptor per implemented opcode.

Purpose
=======
`OPCODES` maps every byte value to `Option<Instruction>`. `None` marks a
byte with no instruction (undocumented opcodes); the dispatcher turns that
into `CpuError::UnimplementedOpcode`. The table is built at compile time and
never mutated.

Design
------
`Instruction` is a closed enum over the four behavioural shapes. Each
variant carries only what its shape needs:
- `Standard`: operation + addressing mode; PC advances by the mode length.
- `ReadModifyWrite`: transform + addressing mode (memory or accumulator).
- `Branch`: the flag it tests and the value that takes it; always Relative.
- `Jump`: control transfer that computes the next PC itself.

Coverage
--------
All 151 documented NMOS 6502 opcodes, including the accumulator forms of
ASL / LSR / ROL / ROR.
*/

use crate::cpu::addressing::AddressingMode::{self, *};
use crate::cpu::state::Status;

/// Operations executed by the standard shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardOp {
    Adc,
    And,
    Bit,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dex,
    Dey,
    Eor,
    Inx,
    Iny,
    Lda,
    Ldx,
    Ldy,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
}

/// Transforms applied by the read-modify-write shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RmwOp {
    Asl,
    Lsr,
    Rol,
    Ror,
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchOp {
    Bpl,
    Bmi,
    Bvc,
    Bvs,
    Bcc,
    Bcs,
    Bne,
    Beq,
}

impl BranchOp {
    /// The status flag the branch tests.
    pub const fn flag(self) -> Status {
        match self {
            BranchOp::Bpl | BranchOp::Bmi => Status::NEGATIVE,
            BranchOp::Bvc | BranchOp::Bvs => Status::OVERFLOW,
            BranchOp::Bcc | BranchOp::Bcs => Status::CARRY,
            BranchOp::Bne | BranchOp::Beq => Status::ZERO,
        }
    }

    /// Whether the branch is taken when the flag is set (or clear).
    pub const fn when_set(self) -> bool {
        matches!(
            self,
            BranchOp::Bmi | BranchOp::Bvs | BranchOp::Bcs | BranchOp::Beq
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JumpOp {
    Jmp,
    Jsr,
    Rts,
    Rti,
    Brk,
}

/// Opcode descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    Standard { op: StandardOp, mode: AddressingMode },
    ReadModifyWrite { op: RmwOp, mode: AddressingMode },
    Branch { op: BranchOp },
    Jump { op: JumpOp, mode: AddressingMode },
}

impl Instruction {
    pub const fn mode(self) -> AddressingMode {
        match self {
            Instruction::Standard { mode, .. }
            | Instruction::ReadModifyWrite { mode, .. }
            | Instruction::Jump { mode, .. } => mode,
            Instruction::Branch { .. } => Relative,
        }
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Instruction::Standard { op, .. } => match op {
                StandardOp::Adc => "ADC",
                StandardOp::And => "AND",
                StandardOp::Bit => "BIT",
                StandardOp::Clc => "CLC",
                StandardOp::Cld => "CLD",
                StandardOp::Cli => "CLI",
                StandardOp::Clv => "CLV",
                StandardOp::Cmp => "CMP",
                StandardOp::Cpx => "CPX",
                StandardOp::Cpy => "CPY",
                StandardOp::Dex => "DEX",
                StandardOp::Dey => "DEY",
                StandardOp::Eor => "EOR",
                StandardOp::Inx => "INX",
                StandardOp::Iny => "INY",
                StandardOp::Lda => "LDA",
                StandardOp::Ldx => "LDX",
                StandardOp::Ldy => "LDY",
                StandardOp::Nop => "NOP",
                StandardOp::Ora => "ORA",
                StandardOp::Pha => "PHA",
                StandardOp::Php => "PHP",
                StandardOp::Pla => "PLA",
                StandardOp::Plp => "PLP",
                StandardOp::Sbc => "SBC",
                StandardOp::Sec => "SEC",
                StandardOp::Sed => "SED",
                StandardOp::Sei => "SEI",
                StandardOp::Sta => "STA",
                StandardOp::Stx => "STX",
                StandardOp::Sty => "STY",
                StandardOp::Tax => "TAX",
                StandardOp::Tay => "TAY",
                StandardOp::Tsx => "TSX",
                StandardOp::Txa => "TXA",
                StandardOp::Txs => "TXS",
                StandardOp::Tya => "TYA",
            },
            Instruction::ReadModifyWrite { op, .. } => match op {
                RmwOp::Asl => "ASL",
                RmwOp::Lsr => "LSR",
                RmwOp::Rol => "ROL",
                RmwOp::Ror => "ROR",
                RmwOp::Inc => "INC",
                RmwOp::Dec => "DEC",
            },
            Instruction::Branch { op } => match op {
                BranchOp::Bpl => "BPL",
                BranchOp::Bmi => "BMI",
                BranchOp::Bvc => "BVC",
                BranchOp::Bvs => "BVS",
                BranchOp::Bcc => "BCC",
                BranchOp::Bcs => "BCS",
                BranchOp::Bne => "BNE",
                BranchOp::Beq => "BEQ",
            },
            Instruction::Jump { op, .. } => match op {
                JumpOp::Jmp => "JMP",
                JumpOp::Jsr => "JSR",
                JumpOp::Rts => "RTS",
                JumpOp::Rti => "RTI",
                JumpOp::Brk => "BRK",
            },
        }
    }

    #[inline]
    pub const fn len(self) -> u8 {
        self.mode().len()
    }
}

/// Descriptor for `opcode`, if one is implemented.
#[inline]
pub fn lookup(opcode: u8) -> Option<Instruction> {
    OPCODES[opcode as usize]
}

/// `$69 ADC Immediate` for every implemented opcode, in opcode order.
pub fn listing() -> Vec<String> {
    OPCODES
        .iter()
        .enumerate()
        .filter_map(|(op, entry)| {
            entry.map(|i| format!("${op:02X} {} {}", i.mnemonic(), i.mode().name()))
        })
        .collect()
}

// ------------------------------------------
// Table construction
// ------------------------------------------

const fn standard(op: StandardOp, mode: AddressingMode) -> Option<Instruction> {
    Some(Instruction::Standard { op, mode })
}

const fn rmw(op: RmwOp, mode: AddressingMode) -> Option<Instruction> {
    Some(Instruction::ReadModifyWrite { op, mode })
}

const fn br(op: BranchOp) -> Option<Instruction> {
    Some(Instruction::Branch { op })
}

const fn jump(op: JumpOp, mode: AddressingMode) -> Option<Instruction> {
    Some(Instruction::Jump { op, mode })
}

pub static OPCODES: [Option<Instruction>; 256] = {
    use BranchOp::*;
    use JumpOp::*;
    use StandardOp::*;

    let mut t: [Option<Instruction>; 256] = [None; 256];

    // Loads / stores
    t[0xA9] = standard(Lda, Immediate);
    t[0xA5] = standard(Lda, ZeroPage);
    t[0xB5] = standard(Lda, ZeroPageX);
    t[0xAD] = standard(Lda, Absolute);
    t[0xBD] = standard(Lda, AbsoluteX);
    t[0xB9] = standard(Lda, AbsoluteY);
    t[0xA1] = standard(Lda, IndexedIndirect);
    t[0xB1] = standard(Lda, IndirectIndexed);

    t[0xA2] = standard(Ldx, Immediate);
    t[0xA6] = standard(Ldx, ZeroPage);
    t[0xB6] = standard(Ldx, ZeroPageY);
    t[0xAE] = standard(Ldx, Absolute);
    t[0xBE] = standard(Ldx, AbsoluteY);

    t[0xA0] = standard(Ldy, Immediate);
    t[0xA4] = standard(Ldy, ZeroPage);
    t[0xB4] = standard(Ldy, ZeroPageX);
    t[0xAC] = standard(Ldy, Absolute);
    t[0xBC] = standard(Ldy, AbsoluteX);

    t[0x85] = standard(Sta, ZeroPage);
    t[0x95] = standard(Sta, ZeroPageX);
    t[0x8D] = standard(Sta, Absolute);
    t[0x9D] = standard(Sta, AbsoluteX);
    t[0x99] = standard(Sta, AbsoluteY);
    t[0x81] = standard(Sta, IndexedIndirect);
    t[0x91] = standard(Sta, IndirectIndexed);

    t[0x86] = standard(Stx, ZeroPage);
    t[0x96] = standard(Stx, ZeroPageY);
    t[0x8E] = standard(Stx, Absolute);

    t[0x84] = standard(Sty, ZeroPage);
    t[0x94] = standard(Sty, ZeroPageX);
    t[0x8C] = standard(Sty, Absolute);

    // Arithmetic / logic
    t[0x69] = standard(Adc, Immediate);
    t[0x65] = standard(Adc, ZeroPage);
    t[0x75] = standard(Adc, ZeroPageX);
    t[0x6D] = standard(Adc, Absolute);
    t[0x7D] = standard(Adc, AbsoluteX);
    t[0x79] = standard(Adc, AbsoluteY);
    t[0x61] = standard(Adc, IndexedIndirect);
    t[0x71] = standard(Adc, IndirectIndexed);

    t[0xE9] = standard(Sbc, Immediate);
    t[0xE5] = standard(Sbc, ZeroPage);
    t[0xF5] = standard(Sbc, ZeroPageX);
    t[0xED] = standard(Sbc, Absolute);
    t[0xFD] = standard(Sbc, AbsoluteX);
    t[0xF9] = standard(Sbc, AbsoluteY);
    t[0xE1] = standard(Sbc, IndexedIndirect);
    t[0xF1] = standard(Sbc, IndirectIndexed);

    t[0x29] = standard(And, Immediate);
    t[0x25] = standard(And, ZeroPage);
    t[0x35] = standard(And, ZeroPageX);
    t[0x2D] = standard(And, Absolute);
    t[0x3D] = standard(And, AbsoluteX);
    t[0x39] = standard(And, AbsoluteY);
    t[0x21] = standard(And, IndexedIndirect);
    t[0x31] = standard(And, IndirectIndexed);

    t[0x09] = standard(Ora, Immediate);
    t[0x05] = standard(Ora, ZeroPage);
    t[0x15] = standard(Ora, ZeroPageX);
    t[0x0D] = standard(Ora, Absolute);
    t[0x1D] = standard(Ora, AbsoluteX);
    t[0x19] = standard(Ora, AbsoluteY);
    t[0x01] = standard(Ora, IndexedIndirect);
    t[0x11] = standard(Ora, IndirectIndexed);

    t[0x49] = standard(Eor, Immediate);
    t[0x45] = standard(Eor, ZeroPage);
    t[0x55] = standard(Eor, ZeroPageX);
    t[0x4D] = standard(Eor, Absolute);
    t[0x5D] = standard(Eor, AbsoluteX);
    t[0x59] = standard(Eor, AbsoluteY);
    t[0x41] = standard(Eor, IndexedIndirect);
    t[0x51] = standard(Eor, IndirectIndexed);

    t[0x24] = standard(Bit, ZeroPage);
    t[0x2C] = standard(Bit, Absolute);

    // Compares
    t[0xC9] = standard(Cmp, Immediate);
    t[0xC5] = standard(Cmp, ZeroPage);
    t[0xD5] = standard(Cmp, ZeroPageX);
    t[0xCD] = standard(Cmp, Absolute);
    t[0xDD] = standard(Cmp, AbsoluteX);
    t[0xD9] = standard(Cmp, AbsoluteY);
    t[0xC1] = standard(Cmp, IndexedIndirect);
    t[0xD1] = standard(Cmp, IndirectIndexed);

    t[0xE0] = standard(Cpx, Immediate);
    t[0xE4] = standard(Cpx, ZeroPage);
    t[0xEC] = standard(Cpx, Absolute);

    t[0xC0] = standard(Cpy, Immediate);
    t[0xC4] = standard(Cpy, ZeroPage);
    t[0xCC] = standard(Cpy, Absolute);

    // Register increments / transfers
    t[0xE8] = standard(Inx, Implied);
    t[0xC8] = standard(Iny, Implied);
    t[0xCA] = standard(Dex, Implied);
    t[0x88] = standard(Dey, Implied);
    t[0xAA] = standard(Tax, Implied);
    t[0xA8] = standard(Tay, Implied);
    t[0x8A] = standard(Txa, Implied);
    t[0x98] = standard(Tya, Implied);
    t[0xBA] = standard(Tsx, Implied);
    t[0x9A] = standard(Txs, Implied);

    // Stack
    t[0x48] = standard(Pha, Implied);
    t[0x08] = standard(Php, Implied);
    t[0x68] = standard(Pla, Implied);
    t[0x28] = standard(Plp, Implied);

    // Flags
    t[0x18] = standard(Clc, Implied);
    t[0x38] = standard(Sec, Implied);
    t[0x58] = standard(Cli, Implied);
    t[0x78] = standard(Sei, Implied);
    t[0xB8] = standard(Clv, Implied);
    t[0xD8] = standard(Cld, Implied);
    t[0xF8] = standard(Sed, Implied);

    t[0xEA] = standard(Nop, Implied);

    // Read-modify-write
    t[0x0A] = rmw(RmwOp::Asl, Accumulator);
    t[0x06] = rmw(RmwOp::Asl, ZeroPage);
    t[0x16] = rmw(RmwOp::Asl, ZeroPageX);
    t[0x0E] = rmw(RmwOp::Asl, Absolute);
    t[0x1E] = rmw(RmwOp::Asl, AbsoluteX);

    t[0x4A] = rmw(RmwOp::Lsr, Accumulator);
    t[0x46] = rmw(RmwOp::Lsr, ZeroPage);
    t[0x56] = rmw(RmwOp::Lsr, ZeroPageX);
    t[0x4E] = rmw(RmwOp::Lsr, Absolute);
    t[0x5E] = rmw(RmwOp::Lsr, AbsoluteX);

    t[0x2A] = rmw(RmwOp::Rol, Accumulator);
    t[0x26] = rmw(RmwOp::Rol, ZeroPage);
    t[0x36] = rmw(RmwOp::Rol, ZeroPageX);
    t[0x2E] = rmw(RmwOp::Rol, Absolute);
    t[0x3E] = rmw(RmwOp::Rol, AbsoluteX);

    t[0x6A] = rmw(RmwOp::Ror, Accumulator);
    t[0x66] = rmw(RmwOp::Ror, ZeroPage);
    t[0x76] = rmw(RmwOp::Ror, ZeroPageX);
    t[0x6E] = rmw(RmwOp::Ror, Absolute);
    t[0x7E] = rmw(RmwOp::Ror, AbsoluteX);

    t[0xE6] = rmw(RmwOp::Inc, ZeroPage);
    t[0xF6] = rmw(RmwOp::Inc, ZeroPageX);
    t[0xEE] = rmw(RmwOp::Inc, Absolute);
    t[0xFE] = rmw(RmwOp::Inc, AbsoluteX);

    t[0xC6] = rmw(RmwOp::Dec, ZeroPage);
    t[0xD6] = rmw(RmwOp::Dec, ZeroPageX);
    t[0xCE] = rmw(RmwOp::Dec, Absolute);
    t[0xDE] = rmw(RmwOp::Dec, AbsoluteX);

    // Branches
    t[0x10] = br(Bpl);
    t[0x30] = br(Bmi);
    t[0x50] = br(Bvc);
    t[0x70] = br(Bvs);
    t[0x90] = br(Bcc);
    t[0xB0] = br(Bcs);
    t[0xD0] = br(Bne);
    t[0xF0] = br(Beq);

    // Control transfer
    t[0x4C] = jump(Jmp, Absolute);
    t[0x6C] = jump(Jmp, Indirect);
    t[0x20] = jump(Jsr, Absolute);
    t[0x60] = jump(Rts, Implied);
    t[0x40] = jump(Rti, Implied);
    t[0x00] = jump(Brk, Implied);

    t
};
