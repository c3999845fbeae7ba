//! Run-loop configuration and the cooperative halt signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default number of trace lines kept for fault reports.
pub const DEFAULT_HISTORY_LEN: usize = 100;

/// Diagnostics and stop conditions for `Cpu::run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuConfig {
    /// Fail when a step leaves the PC where it started.
    pub check_stuck: bool,
    /// Record a formatted line per instruction into the history buffer.
    pub trace: bool,
    pub history_len: usize,
    pub instruction_limit: Option<u64>,
    /// Treat reaching `instruction_limit` as a fault instead of a clean stop.
    pub limit_is_error: bool,
    /// Opcode that ends a run cleanly instead of executing.
    pub stop_opcode: Option<u8>,
    /// Log ROM code/data usage and the visited instructions.
    pub cdl: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            check_stuck: false,
            trace: false,
            history_len: DEFAULT_HISTORY_LEN,
            instruction_limit: None,
            limit_is_error: false,
            stop_opcode: None,
            cdl: false,
        }
    }
}

/// Shareable halt flag, checked between instructions.
///
/// Clones share the flag, so one can live in a signal handler or another
/// thread while the CPU owns the other.
#[derive(Debug, Clone, Default)]
pub struct HaltHandle(Arc<AtomicBool>);

impl HaltHandle {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn halt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
