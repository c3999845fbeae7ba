/*!
Work RAM: the 2 KiB console RAM with mirrored access.

CPU address map for work RAM:
- $0000-$07FF: 2 KiB RAM
- $0800-$1FFF: Mirrors of $0000-$07FF (mask with & 0x07FF)

Owned by the mappers, which decode the whole CPU address space and forward
the low window here.
*/

/// Size of the work RAM (in bytes).
pub const WORK_RAM_SIZE: usize = 0x0800;

/// Work RAM with mirrored access helpers.
///
/// Addresses in the range $0000-$1FFF are mirrored every 2 KiB.
#[derive(Clone, PartialEq, Eq)]
pub struct Ram {
    data: [u8; WORK_RAM_SIZE],
}

impl Default for Ram {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Ram {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let used = self.data.iter().filter(|&&b| b != 0).count();
        f.debug_struct("Ram").field("nonzero_bytes", &used).finish()
    }
}

impl Ram {
    /// Create a new RAM instance initialized to 0.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0; WORK_RAM_SIZE],
        }
    }

    /// Clear RAM contents to 0.
    #[inline]
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.data[Self::mirror_index(addr)]
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) {
        self.data[Self::mirror_index(addr)] = value;
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Overwrite the whole RAM from a snapshot slice.
    ///
    /// Returns the slice length on mismatch so callers can report it.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), usize> {
        if bytes.len() != WORK_RAM_SIZE {
            return Err(bytes.len());
        }
        self.data.copy_from_slice(bytes);
        Ok(())
    }

    /// Physical index for a CPU address using 2 KiB mirroring.
    #[inline]
    pub fn mirror_index(addr: u16) -> usize {
        (addr as usize) & (WORK_RAM_SIZE - 1)
    }
}
