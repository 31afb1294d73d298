//! RegQueue — time-stamped register write queue with deterministic
//! replay.
//!
//! No teacher crate implements a deferred write queue (the teacher's
//! register writes in `emu-amiga2/src/bus.rs` apply immediately); this is
//! built fresh against `spec.md` §4.5 and the §9 design note ("ordered
//! multimap or small sorted buffer, not a `map<cycle, value>` that
//! discards duplicates across regIds"), in the same plain-struct idiom
//! the teacher uses elsewhere.

use crate::error::ConfigError;

/// Who issued a register write. Pointer-register writes are dropped
/// differently depending on the source (`spec.md` §4.5/§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteSource {
    Cpu,
    Copper,
}

#[derive(Debug, Clone, Copy)]
struct PendingWrite {
    stamp: u64,
    reg_id: u16,
    value: u16,
    source: WriteSource,
}

/// A small sorted buffer of pending register changes. At most one entry
/// per `(stamp, regId)` — a later write for the same cycle and register
/// overwrites the earlier one, but distinct regIds at the same stamp are
/// both kept (this is the property a plain `map<cycle, value>` would
/// lose).
pub struct RegQueue {
    pending: Vec<PendingWrite>,
    capacity: usize,
}

impl RegQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a write stamped for `clock + delay`. Returns an error
    /// (never silently dropping the write) if the queue has saturated.
    pub fn push(
        &mut self,
        clock: u64,
        delay: u64,
        reg_id: u16,
        value: u16,
        source: WriteSource,
    ) -> Result<(), ConfigError> {
        let stamp = clock + delay;
        if let Some(existing) = self
            .pending
            .iter_mut()
            .find(|w| w.stamp == stamp && w.reg_id == reg_id)
        {
            existing.value = value;
            existing.source = source;
            return Ok(());
        }
        if self.pending.len() >= self.capacity {
            return Err(ConfigError::RegQueueSaturated);
        }
        let idx = self.pending.partition_point(|w| w.stamp <= stamp);
        self.pending.insert(idx, PendingWrite {
            stamp,
            reg_id,
            value,
            source,
        });
        Ok(())
    }

    /// The cycle at which the next pending write should be serviced, or
    /// `None` if the queue is empty.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        self.pending.first().map(|w| w.stamp)
    }

    /// Drain every entry whose stamp is `<= clock`, in stamp order,
    /// returning `(regId, value, source)` triples for dispatch to the
    /// register-setter function for each id.
    pub fn drain_due(&mut self, clock: u64) -> Vec<(u16, u16, WriteSource)> {
        let split = self.pending.partition_point(|w| w.stamp <= clock);
        self.pending
            .drain(0..split)
            .map(|w| (w.reg_id, w.value, w.source))
            .collect()
    }
}
