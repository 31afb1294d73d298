//! Scheduler — slot-arbitrated priority queue and bus ownership vector.
//!
//! Grounded on `commodore-agnus-ocs/src/agnus.rs`'s `CckBusPlan`/
//! `current_slot` bus-arbitration shape and `emu-amiga2/src/agnus/
//! dma.rs`'s `allocate_slot` dispatch, generalized to the full named-slot
//! priority queue `spec.md` §4.2 describes.

use crate::error::Error;

/// A DMA cycle at which no event is scheduled.
pub const NEVER: u64 = u64::MAX;

/// Named event slots, declared in dispatch-priority order: when two slots
/// trigger on the same cycle, the earlier-declared slot is serviced
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum SlotId {
    Ras,
    CiaA,
    CiaB,
    Secondary,
    Keyboard,
    Vbl,
    Irq,
    Bitplane,
    Das,
    Coprocessor,
    Blitter,
    RegisterChange,
}

impl SlotId {
    pub const COUNT: usize = 12;

    const ALL: [SlotId; Self::COUNT] = [
        SlotId::Ras,
        SlotId::CiaA,
        SlotId::CiaB,
        SlotId::Secondary,
        SlotId::Keyboard,
        SlotId::Vbl,
        SlotId::Irq,
        SlotId::Bitplane,
        SlotId::Das,
        SlotId::Coprocessor,
        SlotId::Blitter,
        SlotId::RegisterChange,
    ];
}

/// Which agent currently owns the shared memory bus for a given column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOwner {
    None,
    Disk,
    Audio,
    Bitplane,
    Sprite,
    Copper,
    Blitter,
    Cpu,
    Refresh,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    trigger: u64,
    event: u32,
    payload: u64,
}

impl Slot {
    const INACTIVE: Self = Self {
        trigger: NEVER,
        event: 0,
        payload: 0,
    };
}

pub struct Scheduler {
    slots: [Slot; SlotId::COUNT],
    /// Bus owner per horizontal position, cleared every HSYNC. Allocation
    /// is the sole writer.
    pub bus_owner: Vec<BusOwner>,
    /// Master-cycle clock, advanced by `execute_until`.
    pub clock: u64,
    /// Consecutive DMA cycles in which the blitter wanted the bus and
    /// didn't get it. Two in a row asserts `blitter_slowdown`.
    contested_run: u8,
    pub blitter_slowdown: bool,
}

impl Scheduler {
    #[must_use]
    pub fn new(hpos_cnt: u16) -> Self {
        Self {
            slots: [Slot::INACTIVE; SlotId::COUNT],
            bus_owner: vec![BusOwner::None; hpos_cnt as usize],
            clock: 0,
            contested_run: 0,
            blitter_slowdown: false,
        }
    }

    pub fn schedule_abs(&mut self, slot: SlotId, cycle: u64, event: u32, payload: u64) {
        self.slots[slot as usize] = Slot {
            trigger: cycle,
            event,
            payload,
        };
    }

    pub fn schedule_rel(&mut self, slot: SlotId, delta: u64, event: u32, payload: u64) {
        let cycle = self.clock + delta;
        self.schedule_abs(slot, cycle, event, payload);
    }

    pub fn reschedule_abs(&mut self, slot: SlotId, cycle: u64) {
        self.slots[slot as usize].trigger = cycle;
    }

    pub fn cancel(&mut self, slot: SlotId) {
        self.slots[slot as usize].trigger = NEVER;
    }

    #[must_use]
    pub fn trigger_of(&self, slot: SlotId) -> u64 {
        self.slots[slot as usize].trigger
    }

    /// The next cycle at which any slot is due, or `NEVER` if nothing is
    /// pending.
    #[must_use]
    pub fn next_trigger(&self) -> u64 {
        self.slots.iter().map(|s| s.trigger).min().unwrap_or(NEVER)
    }

    fn earliest_due_slot(&self, target_clock: u64) -> Option<SlotId> {
        SlotId::ALL
            .into_iter()
            .filter(|s| self.slots[*s as usize].trigger <= target_clock)
            .min_by_key(|s| self.slots[*s as usize].trigger)
    }

    /// Drain every slot whose trigger cycle is `<= target_clock`, in
    /// slot-priority order, dispatching each to `handler`. Then advance
    /// the clock to `target_clock`.
    ///
    /// `handler` may itself reschedule slots (including the one just
    /// serviced) via the `&mut Scheduler` it is given.
    pub fn execute_until<F>(&mut self, target_clock: u64, mut handler: F) -> Result<(), Error>
    where
        F: FnMut(&mut Scheduler, SlotId, u32, u64) -> Result<(), Error>,
    {
        if target_clock < self.clock {
            return Err(Error::SchedulerInvariant(format!(
                "executeUntil target {target_clock} precedes clock {}",
                self.clock
            )));
        }
        while let Some(slot) = self.earliest_due_slot(target_clock) {
            let Slot {
                event, payload, ..
            } = self.slots[slot as usize];
            self.slots[slot as usize].trigger = NEVER;
            handler(self, slot, event, payload)?;
        }
        self.clock = target_clock;
        Ok(())
    }

    #[must_use]
    pub fn bus_is_free(&self, h: u16) -> bool {
        self.bus_owner[h as usize] == BusOwner::None
    }

    /// The only writer of `bus_owner`. Returns `false` without mutating
    /// state if the column is already owned.
    pub fn allocate_bus(&mut self, h: u16, owner: BusOwner) -> bool {
        if !self.bus_is_free(h) {
            return false;
        }
        self.bus_owner[h as usize] = owner;
        true
    }

    /// Clear the bus-owner vector. Called once per HSYNC (step 11 of the
    /// handler contract).
    pub fn clear_bus_owners(&mut self) {
        for owner in &mut self.bus_owner {
            *owner = BusOwner::None;
        }
    }

    /// Record whether the blitter was granted the bus on a contested
    /// cycle. Two consecutive misses assert `blitter_slowdown`.
    pub fn note_blitter_contention(&mut self, granted: bool) {
        if granted {
            self.contested_run = 0;
            self.blitter_slowdown = false;
        } else {
            self.contested_run = self.contested_run.saturating_add(1);
            if self.contested_run >= 2 {
                self.blitter_slowdown = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_allocation_is_first_come_first_served() {
        let mut sched = Scheduler::new(228);
        assert!(sched.allocate_bus(10, BusOwner::Bitplane));
        assert!(!sched.allocate_bus(10, BusOwner::Cpu));
        assert_eq!(sched.bus_owner[10], BusOwner::Bitplane);
    }

    #[test]
    fn clear_bus_owners_resets_every_column() {
        let mut sched = Scheduler::new(228);
        sched.allocate_bus(5, BusOwner::Disk);
        sched.clear_bus_owners();
        assert!(sched.bus_owner.iter().all(|o| *o == BusOwner::None));
    }

    #[test]
    fn execute_until_drains_due_slots_in_priority_order() {
        let mut sched = Scheduler::new(228);
        sched.schedule_abs(SlotId::Bitplane, 100, 1, 0);
        sched.schedule_abs(SlotId::Ras, 100, 2, 0);
        let mut order = Vec::new();
        sched
            .execute_until(100, |_s, slot, _ev, _payload| {
                order.push(slot);
                Ok(())
            })
            .unwrap();
        assert_eq!(order, vec![SlotId::Ras, SlotId::Bitplane]);
        assert_eq!(sched.clock, 100);
    }

    #[test]
    fn execute_until_rejects_targets_before_clock() {
        let mut sched = Scheduler::new(228);
        sched.clock = 50;
        let err = sched.execute_until(10, |_, _, _, _| Ok(())).unwrap_err();
        assert!(matches!(err, Error::SchedulerInvariant(_)));
    }

    #[test]
    fn blitter_slowdown_asserts_after_two_contested_cycles() {
        let mut sched = Scheduler::new(228);
        sched.note_blitter_contention(false);
        assert!(!sched.blitter_slowdown);
        sched.note_blitter_contention(false);
        assert!(sched.blitter_slowdown);
    }

    #[test]
    fn blitter_slowdown_clears_once_bus_is_granted() {
        let mut sched = Scheduler::new(228);
        sched.note_blitter_contention(false);
        sched.note_blitter_contention(false);
        assert!(sched.blitter_slowdown);
        sched.note_blitter_contention(true);
        assert!(!sched.blitter_slowdown);
    }
}
