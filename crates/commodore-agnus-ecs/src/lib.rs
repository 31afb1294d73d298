//! Commodore Super Agnus (ECS) — the OCS Agnus core plus the genuine ECS
//! DDF transition table.
//!
//! The crate composes over `commodore_agnus_ocs::Agnus` the way the
//! teacher's `commodore-agnus-ecs::AgnusEcs` does (`Deref`/`DerefMut`
//! wrapper, `BEAMCON0`/`DIWHIGH` latches kept as-is), but unlike the
//! teacher's thin pass-through, the HSYNC path here runs its own DDF
//! window computation instead of delegating to
//! `Agnus::predict_ddf_ocs`. `spec.md` §4.3 names this as a genuine
//! per-revision divergence: ECS gates 18 classification combinations by
//! `ddfState` where OCS only has 9, because on ECS a window that is
//! still open (`ddfState == On`) is not re-armed from a fresh DDFSTRT
//! match until DDFSTOP is reached — see `DESIGN.md` for the Open
//! Question resolution this table encodes.

use std::ops::{Deref, DerefMut};

pub use commodore_agnus_ocs::{
    Agnus as InnerAgnusOcs, Beam, BeamClock, BeamEvent, Blitter, BplEvent, BusOwner,
    ChipsetRevision, ConfigError, Coprocessor, Copper, DasEvent, DdfState, DisplayWindow, Error,
    RegQueue, Registers, Scheduler, Sequencer, SlotId, VideoStandard, WriteSource, custom_regs,
};

/// The five standard-window shapes a (strt, stop) classification can
/// collapse to, plus the `ddfState` it leaves behind for the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdfIntervalEcs {
    Empty,
    StrtStop,
    StrtD8,
    D18Stop,
    D18D8,
}

/// Commodore Super Agnus (ECS): OCS Agnus core plus ECS-only extension
/// registers and the real ECS DDF transition table.
pub struct AgnusEcs {
    inner: InnerAgnusOcs,
    beamcon0: u16,
    diwhigh: u16,
}

impl AgnusEcs {
    #[must_use]
    pub fn new(video: VideoStandard) -> Self {
        Self {
            inner: InnerAgnusOcs::new(video, ChipsetRevision::Ecs),
            beamcon0: 0,
            diwhigh: 0,
        }
    }

    /// Wrap an existing OCS Agnus core, starting ECS extension registers
    /// from reset state.
    #[must_use]
    pub fn from_ocs(inner: InnerAgnusOcs) -> Self {
        Self {
            inner,
            beamcon0: 0,
            diwhigh: 0,
        }
    }

    #[must_use]
    pub const fn as_inner(&self) -> &InnerAgnusOcs {
        &self.inner
    }

    pub const fn as_inner_mut(&mut self) -> &mut InnerAgnusOcs {
        &mut self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> InnerAgnusOcs {
        self.inner
    }

    #[must_use]
    pub const fn beamcon0(&self) -> u16 {
        self.beamcon0
    }

    pub fn write_beamcon0(&mut self, val: u16) {
        self.beamcon0 = val;
    }

    #[must_use]
    pub const fn diwhigh(&self) -> u16 {
        self.diwhigh
    }

    pub fn write_diwhigh(&mut self, val: u16) {
        self.diwhigh = val;
    }

    pub fn poke(&mut self, reg_id: u16, value: u16, source: WriteSource) -> Result<(), ConfigError> {
        self.inner.poke(reg_id, value, source)
    }

    /// Same shape as `Agnus::tick`, except the HSYNC tail runs
    /// `on_hsync_ecs` in place of `Agnus::on_hsync`.
    pub fn tick(&mut self) -> Result<BeamEvent, Error> {
        for (reg_id, value, _source) in self.inner.regqueue.drain_due(self.inner.beam.clock) {
            self.inner.apply_register_write(reg_id, value);
        }

        let event = self.inner.beam.advance();
        if matches!(event, BeamEvent::Hsync | BeamEvent::HsyncVsync) {
            self.inner.scheduler.clear_bus_owners();
            self.on_hsync_ecs();
        }
        Ok(event)
    }

    /// The ECS HSYNC tail: identical DIW/ddfVFlop recompute and
    /// sequencer rebuild as `Agnus::on_hsync`, but the DDF window itself
    /// is produced by `compute_ddf_window_ecs` rather than
    /// `predict_ddf_ocs`.
    fn on_hsync_ecs(&mut self) {
        let v = self.inner.beam.pos.v;
        self.inner.window.hsync_recompute_diw(v);
        let last_raster_line = v + 1 >= self.inner.beam.num_lines;
        self.inner.window.hsync_recompute_ddf_v_flop(last_raster_line);

        let hpos_max = self.inner.beam.hpos_max();
        self.inner
            .window
            .latch_ddf_reached(self.inner.regs.ddfstrt, self.inner.regs.ddfstop, hpos_max);
        compute_ddf_window_ecs(&mut self.inner.window, self.inner.regs.bplcon1);

        self.inner.sequencer.rebuild_bitplane_events(
            self.inner.regs.hires(),
            self.inner.regs.bpu(),
            self.inner.window.ddf_strt_lores,
            self.inner.window.ddf_stop_lores,
        );
        self.inner
            .sequencer
            .rebuild_das_events(self.inner.regs.dmacon & 0x3F);
        if self.inner.regs.dmacon & custom_regs::DMAF_COPEN != 0 && self.inner.copper.is_idle() {
            self.inner.copper.restart_cop1();
        }
    }
}

/// `spec.md` §4.3: the ECS DDF transition table gates the nine
/// small/medium/large (strt, stop) classifications by whether the
/// window was still open (`ddfState == On`) coming into this line.
///
/// When closed (`Off`), a fresh DDFSTRT match opens the window exactly
/// as OCS does; a window whose stop column is unreached this line
/// (`StrtD8`/`D18D8`) is left `On` going into the next line instead of
/// snapping shut, since real ECS hardware does not re-arm DDFSTRT
/// matching until DDFSTOP is actually hit. When already `On`, this
/// line's DDFSTRT match (if any) is ignored per that same invariant —
/// only the stop column decides whether the window closes this line.
fn compute_ddf_window_ecs(win: &mut DisplayWindow, bplcon1: u16) {
    let classify = |reached: i32| -> usize {
        if reached < 0 {
            2
        } else if reached < 0x18 {
            0
        } else {
            1
        }
    };
    let stop = classify(win.ddf_stop_reached);

    let (interval, next_state) = if win.ddf_state == DdfState::On {
        match stop {
            0 => (DdfIntervalEcs::Empty, DdfState::Off),
            1 => (DdfIntervalEcs::D18Stop, DdfState::Off),
            _ => (DdfIntervalEcs::D18D8, DdfState::On),
        }
    } else {
        let strt = classify(win.ddf_strt_reached);
        const TABLE: [DdfIntervalEcs; 9] = [
            DdfIntervalEcs::Empty,
            DdfIntervalEcs::D18Stop,
            DdfIntervalEcs::D18D8,
            DdfIntervalEcs::Empty,
            DdfIntervalEcs::StrtStop,
            DdfIntervalEcs::StrtD8,
            DdfIntervalEcs::Empty,
            DdfIntervalEcs::Empty,
            DdfIntervalEcs::Empty,
        ];
        let next = match TABLE[3 * strt + stop] {
            DdfIntervalEcs::StrtD8 | DdfIntervalEcs::D18D8 => DdfState::On,
            _ => DdfState::Off,
        };
        (TABLE[3 * strt + stop], next)
    };

    match interval {
        DdfIntervalEcs::Empty => {
            win.ddf_strt_lores = 0;
            win.ddf_stop_lores = 0;
            win.ddf_strt_hires = 0;
            win.ddf_stop_hires = 0;
        }
        DdfIntervalEcs::StrtStop => {
            win.apply_standard_window(win.ddf_strt_reached as u16, win.ddf_stop_reached as u16, bplcon1);
        }
        DdfIntervalEcs::StrtD8 => {
            win.apply_standard_window(win.ddf_strt_reached as u16, 0xD8, bplcon1);
        }
        DdfIntervalEcs::D18Stop => {
            win.apply_standard_window(0x18, win.ddf_stop_reached as u16, bplcon1);
        }
        DdfIntervalEcs::D18D8 => win.apply_standard_window(0x18, 0xD8, bplcon1),
    }
    win.ddf_state = next_state;
}

impl Default for AgnusEcs {
    fn default() -> Self {
        Self::new(VideoStandard::Pal)
    }
}

impl Deref for AgnusEcs {
    type Target = InnerAgnusOcs;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AgnusEcs {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_left_open_on_unreached_stop_stays_on_into_next_line() {
        let mut win = DisplayWindow::new();
        win.latch_ddf_reached(0x38, 0xF0, 227);
        compute_ddf_window_ecs(&mut win, 0);
        assert_eq!(win.ddf_state, DdfState::On);
        assert_ne!(win.ddf_stop_lores, 0);
    }

    #[test]
    fn open_window_ignores_a_fresh_strt_match_until_stop_is_reached() {
        let mut win = DisplayWindow::new();
        win.ddf_state = DdfState::On;
        // A small/medium DDFSTRT match on this line must not matter: only
        // the stop column is consulted while the window is already open.
        win.latch_ddf_reached(0x40, 0xF0, 227);
        compute_ddf_window_ecs(&mut win, 0);
        assert_eq!(win.ddf_state, DdfState::On);
        assert_eq!(win.ddf_strt_lores, 0x18);
    }

    #[test]
    fn open_window_closes_to_an_empty_window_when_stop_is_small() {
        let mut win = DisplayWindow::new();
        win.ddf_state = DdfState::On;
        win.latch_ddf_reached(-1, 0x10, 227);
        compute_ddf_window_ecs(&mut win, 0);
        assert_eq!(win.ddf_state, DdfState::Off);
        assert_eq!(win.ddf_stop_lores, 0);
    }

    #[test]
    fn open_window_closes_to_d18_stop_when_stop_is_medium() {
        let mut win = DisplayWindow::new();
        win.ddf_state = DdfState::On;
        win.latch_ddf_reached(-1, 0xB0, 227);
        compute_ddf_window_ecs(&mut win, 0);
        assert_eq!(win.ddf_state, DdfState::Off);
        assert_ne!(win.ddf_stop_lores, 0);
    }

    #[test]
    fn closed_window_with_both_reached_closes_again_within_the_line() {
        let mut win = DisplayWindow::new();
        win.latch_ddf_reached(0x38, 0xD0, 227);
        compute_ddf_window_ecs(&mut win, 0);
        assert_eq!(win.ddf_state, DdfState::Off);
    }

    #[test]
    fn ecs_agnus_ticks_through_a_full_line() {
        let mut agnus = AgnusEcs::new(VideoStandard::Pal);
        agnus.inner.regs.ddfstrt = 0x38;
        agnus.inner.regs.ddfstop = 0xD0;
        agnus.inner.regs.bplcon0 = 1 << 12;
        for _ in 0..u32::from(agnus.inner.beam.hpos_cnt()) {
            agnus.tick().unwrap();
        }
        assert_ne!(agnus.inner.window.ddf_stop_lores, 0);
    }
}
