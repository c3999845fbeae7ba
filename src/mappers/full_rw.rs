//! Flat 64 KiB read/write memory.
//!
//! No banking and no mirroring: every address is backed by its own byte and
//! every byte is writable. Used to run CPU test images that expect to own the
//! whole address space (vectors and self-modifying code included).

use serde::{Deserialize, Serialize};

use crate::error::MapperError;
use crate::mapper::Mapper;

pub const FULL_RW_SIZE: usize = 0x1_0000;

#[derive(Clone, PartialEq, Eq)]
pub struct FullRw {
    memory: Box<[u8]>,
}

impl core::fmt::Debug for FullRw {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FullRw").field("len", &self.memory.len()).finish()
    }
}

/// FullRw snapshot: the whole address space.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullRwState {
    pub memory: Vec<u8>,
}

impl FullRw {
    /// Wrap a complete 64 KiB image.
    pub fn new(image: Vec<u8>) -> Result<Self, MapperError> {
        if image.len() != FULL_RW_SIZE {
            return Err(MapperError::RomSize(image.len()));
        }
        Ok(Self {
            memory: image.into_boxed_slice(),
        })
    }

    /// Zeroed memory with `program` placed at `base`.
    ///
    /// Bytes that would run past $FFFF are dropped.
    pub fn with_program(base: u16, program: &[u8]) -> Self {
        let mut memory = vec![0u8; FULL_RW_SIZE].into_boxed_slice();
        let start = base as usize;
        let end = (start + program.len()).min(FULL_RW_SIZE);
        memory[start..end].copy_from_slice(&program[..end - start]);
        Self { memory }
    }

    /// Point the reset vector at `addr`.
    pub fn set_reset_vector(&mut self, addr: u16) {
        let [lo, hi] = addr.to_le_bytes();
        self.memory[0xFFFC] = lo;
        self.memory[0xFFFD] = hi;
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.memory
    }
}

impl Mapper for FullRw {
    type State = FullRwState;

    fn name(&self) -> &'static str {
        "FullRW"
    }

    fn read(&mut self, addr: u16) -> Result<u8, MapperError> {
        Ok(self.memory[addr as usize])
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    fn offset(&self, addr: u16) -> Result<(u32, bool), MapperError> {
        Ok((addr as u32, true))
    }

    fn state(&self) -> FullRwState {
        FullRwState {
            memory: self.memory.to_vec(),
        }
    }

    fn set_state(&mut self, state: &FullRwState) -> Result<(), MapperError> {
        if state.memory.len() != FULL_RW_SIZE {
            return Err(MapperError::StateRamSize {
                expected: FULL_RW_SIZE,
                found: state.memory.len(),
            });
        }
        self.memory.copy_from_slice(&state.memory);
        Ok(())
    }

    /// The whole space is the loaded image; there is no separate volatile RAM to clear.
    fn clear_ram(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_address_is_writable() {
        let mut m = FullRw::with_program(0x8000, &[0xA9, 0x01]);
        assert_eq!(m.read(0x8001).unwrap(), 0x01);
        m.write(0xFFFF, 0x33);
        m.write(0x0800, 0x44);
        assert_eq!(m.read(0xFFFF).unwrap(), 0x33);
        // No work-RAM mirroring.
        assert_eq!(m.read(0x0000).unwrap(), 0x00);
        assert_eq!(m.read(0x0800).unwrap(), 0x44);
    }

    #[test]
    fn image_must_fill_the_address_space() {
        assert_eq!(
            FullRw::new(vec![0; 0x8000]).unwrap_err(),
            MapperError::RomSize(0x8000)
        );
        assert!(FullRw::new(vec![0; FULL_RW_SIZE]).is_ok());
    }

    #[test]
    fn program_past_end_is_truncated() {
        let m = FullRw::with_program(0xFFFE, &[1, 2, 3]);
        assert_eq!(&m.as_slice()[0xFFFE..], &[1, 2]);
    }

    #[test]
    fn reset_vector_is_little_endian() {
        let mut m = FullRw::with_program(0, &[]);
        m.set_reset_vector(0x0400);
        assert_eq!(m.read(0xFFFC).unwrap(), 0x00);
        assert_eq!(m.read(0xFFFD).unwrap(), 0x04);
    }

    #[test]
    fn snapshot_restores_memory() {
        let mut m = FullRw::with_program(0x0200, &[9]);
        let snap = m.state();
        m.write(0x0200, 0);
        assert_eq!(snap.memory[0x0200], 9);
        m.set_state(&snap).unwrap();
        assert_eq!(m.read(0x0200).unwrap(), 9);
    }
}
