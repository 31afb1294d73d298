//! CoprocessorInterface — the narrow allocate/deny contract the two
//! coprocessing units (the display-list processor, a.k.a. "copper", and
//! the block transfer engine, a.k.a. "blitter") are kept behind.
//!
//! Per `spec.md` §9's design note, any further state (program counter,
//! fetch phase) belongs to the coprocessor, not the scheduler. Grounded
//! on `commodore-agnus-ocs/src/copper.rs`'s `State`/`execute`/
//! `check_wait` state machine and `commodore-agnus-ocs/src/agnus.rs`'s
//! `PaulaReturnProgressPolicy`/`tick_blitter_scheduler` blitter idiom.

/// The narrow contract a coprocessing unit presents to the scheduler:
/// "do you want the bus this cycle, and what do you do with it".
pub trait Coprocessor {
    /// True if this agent would use the bus on this cycle, independent
    /// of whether it is actually granted (the scheduler still applies
    /// its own denial rules, e.g. `h = 0xE0`).
    fn wants_bus(&self, v: u16, h: u16) -> bool;

    /// Consume a bus grant. `read_mem` fetches a word from the address
    /// the coprocessor itself tracks. Returns the transferred word for
    /// `busValue[h]`-style downstream debugging, or `None` if the grant
    /// produced a register write with no readback value.
    fn execute(&mut self, v: u16, h: u16, read_mem: &mut dyn FnMut(u32) -> u16) -> Option<u16>;
}

/// Copper (display-list processor) state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopperState {
    Idle,
    FetchIr1,
    FetchIr2,
    /// Waiting for the beam to reach `(vp, hp)` masked by `(ve, he)`.
    WaitBeam { vp: u8, hp: u8, ve: u8, he: u8 },
}

#[derive(Debug, Clone, Copy)]
pub struct Copper {
    pub state: CopperState,
    pub pc: u32,
    pub ir1: u16,
    pub ir2: u16,
    pub cop1lc: u32,
    pub cop2lc: u32,
    /// The last register write the copper produced, for the register
    /// poke dispatch table to pick up.
    pub last_move: Option<(u16, u16)>,
}

impl Copper {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: CopperState::Idle,
            pc: 0,
            ir1: 0,
            ir2: 0,
            cop1lc: 0,
            cop2lc: 0,
            last_move: None,
        }
    }

    pub fn restart_cop1(&mut self) {
        self.pc = self.cop1lc;
        self.state = CopperState::FetchIr1;
    }

    pub fn restart_cop2(&mut self) {
        self.pc = self.cop2lc;
        self.state = CopperState::FetchIr1;
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, CopperState::Idle)
    }

    fn check_wait(&self, vp: u8, hp: u8, ve: u8, he: u8, v: u16, h: u16) -> bool {
        // Real hardware compares one combined 15-bit value per side, not
        // V and H independently: a beam whose V already clears the WAIT's
        // V but whose H hasn't yet reached the WAIT's H must still fire,
        // since the V excess dominates the combined compare.
        let mask_v = ve & 0x7F;
        let mask_h = (he >> 1) & 0x7F;
        let wait_h = (hp >> 1) & 0x7F;
        let cur_v = (v & 0xFF) as u8;
        let cur_h = (h >> 1) as u8 & 0x7F;

        let cmp_cur = (u16::from(cur_v & mask_v) << 7) | u16::from(cur_h & mask_h);
        let cmp_wait = (u16::from(vp & mask_v) << 7) | u16::from(wait_h & mask_h);
        let result = cmp_cur >= cmp_wait;

        // V7 partial fix: on real hardware V7 (bit 7 of the vertical beam
        // counter) is always compared, even though it has no mask bit.
        // We only block the false-early case here, matching the
        // teacher's own documented compromise.
        if result && (vp & 0x80 != 0) && (cur_v & 0x80 == 0) {
            return false;
        }
        result
    }
}

impl Default for Copper {
    fn default() -> Self {
        Self::new()
    }
}

impl Coprocessor for Copper {
    fn wants_bus(&self, v: u16, h: u16) -> bool {
        match self.state {
            CopperState::Idle => false,
            CopperState::WaitBeam { vp, hp, ve, he } => self.check_wait(vp, hp, ve, he, v, h),
            _ => true,
        }
    }

    fn execute(&mut self, v: u16, h: u16, read_mem: &mut dyn FnMut(u32) -> u16) -> Option<u16> {
        match self.state {
            CopperState::Idle => None,
            CopperState::FetchIr1 => {
                self.ir1 = read_mem(self.pc);
                self.pc = self.pc.wrapping_add(2);
                self.state = CopperState::FetchIr2;
                Some(self.ir1)
            }
            CopperState::FetchIr2 => {
                self.ir2 = read_mem(self.pc);
                self.pc = self.pc.wrapping_add(2);
                self.state = CopperState::FetchIr1;
                self.dispatch(v, h);
                Some(self.ir2)
            }
            CopperState::WaitBeam { vp, hp, ve, he } => {
                if self.check_wait(vp, hp, ve, he, v, h) {
                    self.state = CopperState::FetchIr1;
                }
                None
            }
        }
    }
}

impl Copper {
    fn dispatch(&mut self, v: u16, h: u16) {
        if self.ir1 & 1 == 0 {
            // MOVE: register address is bits 1-8 of IR1, doubled.
            let reg = (self.ir1 & 0x1FE) as u16;
            self.last_move = Some((reg, self.ir2));
            return;
        }
        if self.ir2 & 1 == 0 {
            // WAIT.
            let vp = (self.ir1 >> 8) as u8;
            let hp = (self.ir1 & 0xFE) as u8;
            let ve = (self.ir2 >> 8) as u8;
            let he = (self.ir2 & 0xFE) as u8;
            if ve == 0xFF && he == 0xFE {
                // $FFFF/$FFFE end-of-list marker.
                self.state = CopperState::Idle;
                return;
            }
            self.state = CopperState::WaitBeam { vp, hp, ve, he };
        } else {
            // SKIP: if the wait condition embedded in IR1/IR2 already
            // holds, skip the following instruction pair by fetching and
            // discarding it (modelled here as simply staying in
            // FetchIr1, letting the caller re-fetch; the engine applies
            // the skip by advancing `pc` an extra instruction when this
            // returns true).
            let vp = (self.ir1 >> 8) as u8;
            let hp = (self.ir1 & 0xFE) as u8;
            let ve = (self.ir2 >> 8) as u8;
            let he = (self.ir2 & 0xFE) as u8;
            if self.check_wait(vp, hp, ve, he, v, h) {
                self.pc = self.pc.wrapping_add(4);
            }
        }
    }
}

/// Blitter bus-grant stub. The real pixel/word data path is out of
/// scope (`spec.md` §1); only the scheduling contract (priority
/// negotiation, slowdown assertion) is modelled.
#[derive(Debug, Clone, Copy)]
pub struct Blitter {
    pub dma_pending: bool,
    /// "priority" flag from `spec.md` §4.4: claims the bus over a
    /// contested CPU cycle when set.
    pub priority: bool,
}

impl Blitter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dma_pending: false,
            priority: false,
        }
    }
}

impl Default for Blitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Coprocessor for Blitter {
    fn wants_bus(&self, _v: u16, _h: u16) -> bool {
        self.dma_pending
    }

    fn execute(&mut self, _v: u16, _h: u16, read_mem: &mut dyn FnMut(u32) -> u16) -> Option<u16> {
        if !self.dma_pending {
            return None;
        }
        Some(read_mem(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_instruction_produces_register_write() {
        let mut copper = Copper::new();
        copper.restart_cop1();
        let mut mem = vec![0x0096u16, 0x8200u16];
        let mut i = 0usize;
        let mut read = |_addr: u32| {
            let v = mem[i];
            i += 1;
            v
        };
        copper.execute(0, 0, &mut read);
        copper.execute(0, 0, &mut read);
        assert_eq!(copper.last_move, Some((0x0096, 0x8200)));
        let _ = &mut mem;
    }

    #[test]
    fn wait_blocks_bus_request_until_beam_matches() {
        let mut copper = Copper::new();
        copper.state = CopperState::WaitBeam {
            vp: 100,
            hp: 0,
            ve: 0xFF,
            he: 0,
        };
        assert!(!copper.wants_bus(50, 0));
        assert!(copper.wants_bus(100, 0));
    }

    #[test]
    fn idle_copper_never_wants_the_bus() {
        let copper = Copper::new();
        assert!(!copper.wants_bus(0, 0));
    }
}
