/*!
Instrumentation registry: named callbacks keyed by address and event kind.

Every CPU-initiated read, write and opcode fetch is offered to the registry:
reads and fetches before the instruction uses the value, writes once the
byte has landed. Entries at the accessed address whose event
mask intersects the event fire synchronously, in registration order. A
callback observes the access and the register state; it cannot change the
access, but it can ask the run loop to stop at the next instruction
boundary.

Registering an entry under a name that already exists at the same address
replaces that entry in place; other entries keep their order.
*/

use core::fmt;
use std::collections::BTreeMap;

use bitflags::bitflags;

use crate::cpu::state::CpuState;

bitflags! {
    /// Access kinds a breakpoint can watch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Event: u8 {
        const READ = 0b001;
        const WRITE = 0b010;
        const EXECUTE = 0b100;
    }
}

impl fmt::Display for Event {
    /// `READ|WRITE`, `EXECUTE`, ... in bit order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

/// What a callback gets to see.
#[derive(Debug, Clone)]
pub struct BreakContext {
    pub event: Event,
    pub address: u16,
    /// Byte read or written; the opcode for EXECUTE.
    pub value: u8,
    pub registers: CpuState,
    halt: bool,
}

impl BreakContext {
    /// Stop the run loop before the next instruction.
    #[inline]
    pub fn request_halt(&mut self) {
        self.halt = true;
    }

    #[inline]
    pub fn halt_requested(&self) -> bool {
        self.halt
    }
}

pub type Callback = Box<dyn FnMut(&mut BreakContext)>;

struct Entry {
    name: String,
    events: Event,
    callback: Callback,
}

/// Address-keyed breakpoint table.
#[derive(Default)]
pub struct Breakpoints {
    entries: BTreeMap<u16, Vec<Entry>>,
}

impl fmt::Debug for Breakpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Breakpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `callback` under `name` at `address`, replacing a same-named entry there.
    pub fn register<F>(&mut self, events: Event, name: impl Into<String>, address: u16, callback: F)
    where
        F: FnMut(&mut BreakContext) + 'static,
    {
        let name = name.into();
        let slot = self.entries.entry(address).or_default();
        let entry = Entry {
            name,
            events,
            callback: Box::new(callback),
        };
        match slot.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => {
                log::debug!(
                    "Replacing breakpoint {:?} at ${address:04X} ({events})",
                    entry.name
                );
                *existing = entry;
            }
            None => {
                log::debug!(
                    "Registering breakpoint {:?} at ${address:04X} ({events})",
                    entry.name
                );
                slot.push(entry);
            }
        }
    }

    /// Remove the named entry at `address`. Returns whether one existed.
    pub fn remove(&mut self, address: u16, name: &str) -> bool {
        let Some(slot) = self.entries.get_mut(&address) else {
            return false;
        };
        let before = slot.len();
        slot.retain(|e| e.name != name);
        let removed = slot.len() != before;
        if slot.is_empty() {
            self.entries.remove(&address);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(address, name, events)` for every entry, by address then registration order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &str, Event)> + '_ {
        self.entries.iter().flat_map(|(&addr, slot)| {
            slot.iter()
                .map(move |e| (addr, e.name.as_str(), e.events))
        })
    }

    /// Fire every matching entry. Returns true when any callback requested a halt.
    pub fn fire(&mut self, event: Event, address: u16, value: u8, registers: &CpuState) -> bool {
        let Some(slot) = self.entries.get_mut(&address) else {
            return false;
        };
        let mut ctx = BreakContext {
            event,
            address,
            value,
            registers: *registers,
            halt: false,
        };
        for entry in slot.iter_mut().filter(|e| e.events.intersects(event)) {
            log::trace!("Breakpoint {:?} hit: {event} ${address:04X}", entry.name);
            (entry.callback)(&mut ctx);
        }
        ctx.halt
    }
}
