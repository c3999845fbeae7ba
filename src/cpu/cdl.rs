/*!
cdl.rs - Code/data log: which ROM bytes ran as instructions and which were read as data.

Keyed by the offset `Mapper::offset` reports, so bytes that appear under
several banks are tracked once per physical location. Only ROM offsets are
logged; RAM is never marked.

Outputs
=======
- `to_bytes` / `write_cdl`: one flag byte per offset from 0 to the highest
  logged offset, zero-padded where nothing was seen.
- `visited` / `write_visited`: one disassembly line per executed opcode
  offset, `[$offset:$PC] MNE operand ; bytes`, in offset order. The file form
  leaves a blank line after each RTS, RTI, BRK and JMP so routines read as
  blocks.
*/

use std::collections::BTreeMap;
use std::io::{self, Write};

use bitflags::bitflags;

bitflags! {
    /// Per-offset usage bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CdlFlags: u8 {
        const CODE = 0x01;
        const DATA = 0x02;
    }
}

#[derive(Debug, Clone, Default)]
pub struct CodeDataLog {
    flags: BTreeMap<u32, CdlFlags>,
    visited: BTreeMap<u32, String>,
}

impl CodeDataLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn mark(&mut self, offset: u32, flags: CdlFlags) {
        *self.flags.entry(offset).or_default() |= flags;
    }

    /// Flags seen at `offset`; empty when it was never touched.
    pub fn flags(&self, offset: u32) -> CdlFlags {
        self.flags.get(&offset).copied().unwrap_or_default()
    }

    pub fn is_visited(&self, offset: u32) -> bool {
        self.visited.contains_key(&offset)
    }

    /// Keep the first line seen for `offset`.
    pub fn visit(&mut self, offset: u32, line: String) {
        self.visited.entry(offset).or_insert(line);
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.visited.is_empty()
    }

    pub fn clear(&mut self) {
        self.flags.clear();
        self.visited.clear();
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let Some((&last, _)) = self.flags.last_key_value() else {
            return Vec::new();
        };
        let mut out = vec![0; last as usize + 1];
        for (&offset, flags) in &self.flags {
            out[offset as usize] = flags.bits();
        }
        out
    }

    pub fn visited(&self) -> impl Iterator<Item = &str> {
        self.visited.values().map(String::as_str)
    }

    pub fn write_cdl<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())?;
        writer.flush()
    }

    pub fn write_visited<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for line in self.visited() {
            writeln!(writer, "{line}")?;
            let mnemonic = line.split(' ').nth(1).unwrap_or_default();
            if matches!(mnemonic, "RTS" | "RTI" | "BRK" | "JMP") {
                writeln!(writer)?;
            }
        }
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::config::CpuConfig;
    use crate::test_utils::flat_cpu;

    #[test]
    fn marks_accumulate_and_pad() {
        let mut log = CodeDataLog::new();
        assert!(log.to_bytes().is_empty());
        log.mark(3, CdlFlags::CODE);
        log.mark(3, CdlFlags::DATA);
        log.mark(1, CdlFlags::DATA);
        assert_eq!(log.flags(3), CdlFlags::CODE | CdlFlags::DATA);
        assert_eq!(log.flags(2), CdlFlags::empty());
        assert_eq!(log.to_bytes(), vec![0x00, 0x02, 0x00, 0x03]);
    }

    #[test]
    fn first_visit_wins() {
        let mut log = CodeDataLog::new();
        log.visit(0x10, "first".into());
        log.visit(0x10, "second".into());
        assert_eq!(log.visited().collect::<Vec<_>>(), vec!["first"]);
    }

    #[test]
    fn visited_file_separates_routines() {
        let mut log = CodeDataLog::new();
        log.visit(2, "[$000002:$8002] RTS ; 60".into());
        log.visit(0, "[$000000:$8000] INX ; E8".into());
        log.visit(3, "[$000003:$8003] NOP ; EA".into());
        let mut out = Vec::new();
        log.write_visited(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[$000000:$8000] INX ; E8\n[$000002:$8002] RTS ; 60\n\n[$000003:$8003] NOP ; EA\n"
        );
    }

    fn logging_cpu(program: &[u8]) -> crate::cpu::core::Cpu<crate::mappers::FullRw> {
        let mut cpu = flat_cpu(program);
        cpu.set_config(CpuConfig {
            cdl: true,
            ..CpuConfig::default()
        });
        cpu
    }

    #[test]
    fn execution_marks_code_and_operand_data() {
        // LDA $9000; NOP; JMP $8003
        let mut cpu = logging_cpu(&[0xAD, 0x00, 0x90, 0xEA, 0x4C, 0x03, 0x80]);
        for _ in 0..4 {
            cpu.step().unwrap();
        }
        let log = cpu.code_data_log();
        for offset in 0x8000..0x8007 {
            assert_eq!(log.flags(offset), CdlFlags::CODE, "${offset:04X}");
        }
        assert_eq!(log.flags(0x9000), CdlFlags::DATA);
        assert_eq!(
            log.visited().collect::<Vec<_>>(),
            vec![
                "[$008000:$8000] LDA $9000 ; AD 00 90",
                "[$008003:$8003] NOP ; EA",
                "[$008004:$8004] JMP $8003 ; 4C 03 80",
            ]
        );
    }

    #[test]
    fn pointer_reads_count_as_data() {
        // JMP ($9000)
        let mut cpu = logging_cpu(&[0x6C, 0x00, 0x90]);
        cpu.write_byte(0x9000, 0x00);
        cpu.write_byte(0x9001, 0x80);
        cpu.step().unwrap();
        let log = cpu.code_data_log();
        assert_eq!(log.flags(0x9000), CdlFlags::DATA);
        assert_eq!(log.flags(0x9001), CdlFlags::DATA);
        assert_eq!(log.flags(0x8001), CdlFlags::CODE);
    }

    #[test]
    fn disabled_by_default() {
        let mut cpu = flat_cpu(&[0xAD, 0x00, 0x90]);
        cpu.step().unwrap();
        assert!(cpu.code_data_log().is_empty());
    }

    #[test]
    fn ram_is_not_logged() {
        use crate::cpu::core::Cpu;
        use crate::mappers::Mmc1;
        use crate::test_utils::tagged_prg;

        let mut prg = tagged_prg(2);
        // $C000: LDA $0010; LDA $8005
        prg[0x4000..0x4005].copy_from_slice(&[0xA5, 0x10, 0xAD, 0x05, 0x80]);
        prg[0x7FFC] = 0x00;
        prg[0x7FFD] = 0xC0;
        let mut cpu = Cpu::new(Mmc1::new(prg, false).unwrap()).unwrap();
        cpu.set_config(CpuConfig {
            cdl: true,
            ..CpuConfig::default()
        });
        cpu.step().unwrap();
        cpu.step().unwrap();

        let log = cpu.code_data_log();
        assert_eq!(log.flags(0x4000), CdlFlags::CODE);
        assert_eq!(log.flags(0x0005), CdlFlags::DATA);
        assert_eq!(log.flags(0x0010), CdlFlags::empty());
        assert_eq!(log.visited().count(), 2);
    }
}
