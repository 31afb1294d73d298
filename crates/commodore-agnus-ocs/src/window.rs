//! DisplayWindow — DIW and DDF horizontal/vertical flip-flops and window
//! computation (OCS revision).
//!
//! Grounded on `original_source/Emulator/Agnus/Agnus.cpp`'s
//! `computeDDFWindowOCS`/`computeStandardDDFWindow` and the HSYNC
//! handler's DIW recompute steps (5-7 of `spec.md` §4.1).

/// DDF state flip-flop. While `On`, no new DDFSTRT match fires until line
/// end (`spec.md` §3 invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdfState {
    Off,
    On,
}

/// The five standard-window shapes a (strt, stop) classification can
/// collapse to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdfInterval {
    Empty,
    StrtStop,
    StrtD8,
    D18Stop,
    D18D8,
}

#[derive(Debug, Clone, Copy)]
pub struct DisplayWindow {
    pub diw_v_flop: bool,
    pub diw_h_flop: bool,
    diw_h_flop_on: i32,
    diw_h_flop_off: i32,

    pub ddf_v_flop: bool,
    pub ddf_state: DdfState,
    /// -1 means "not reached this line" (mirrors the original's sentinel).
    pub ddf_strt_reached: i32,
    pub ddf_stop_reached: i32,

    pub ddf_strt_lores: u16,
    pub ddf_stop_lores: u16,
    pub ddf_strt_hires: u16,
    pub ddf_stop_hires: u16,

    /// OCS-only "early access line" tracker for the small-DDFSTRT
    /// scan-line effect (§4.3).
    ocs_early_access_line: i32,

    pub diw_vstrt: u16,
    pub diw_vstop: u16,
    pub diw_hstrt: u16,
    pub diw_hstop: u16,
}

impl DisplayWindow {
    #[must_use]
    pub fn new() -> Self {
        Self {
            diw_v_flop: false,
            diw_h_flop: false,
            diw_h_flop_on: -1,
            diw_h_flop_off: -1,
            ddf_v_flop: false,
            ddf_state: DdfState::Off,
            ddf_strt_reached: -1,
            ddf_stop_reached: -1,
            ddf_strt_lores: 0,
            ddf_stop_lores: 0,
            ddf_strt_hires: 0,
            ddf_stop_hires: 0,
            ocs_early_access_line: -1,
            diw_vstrt: 0,
            diw_vstop: 0,
            diw_hstrt: 0,
            diw_hstop: 0,
        }
    }

    /// HSYNC handler steps 5-6: recompute `diwVFlop` against the new `v`,
    /// latch `diwHFlop` from the pending columns, re-arm from DIWSTRT/STOP.
    pub fn hsync_recompute_diw(&mut self, v: u16) {
        if v == self.diw_vstrt && !self.diw_v_flop {
            self.diw_v_flop = true;
        }
        if v == self.diw_vstop && self.diw_v_flop {
            self.diw_v_flop = false;
        }
        self.diw_h_flop = if self.diw_h_flop_off != -1 {
            false
        } else if self.diw_h_flop_on != -1 {
            true
        } else {
            self.diw_h_flop
        };
        self.diw_h_flop_on = i32::from(self.diw_hstrt);
        self.diw_h_flop_off = i32::from(self.diw_hstop);
    }

    /// HSYNC handler step 7: `ddfVFlop = !lastRasterLine && diwVFlop`.
    pub fn hsync_recompute_ddf_v_flop(&mut self, last_raster_line: bool) {
        self.ddf_v_flop = !last_raster_line && self.diw_v_flop;
    }

    /// Re-latch `ddfStrtReached`/`ddfStopReached` from the raw DDFSTRT/
    /// DDFSTOP register values for the upcoming line, then recompute the
    /// window (OCS revision).
    pub fn predict_ddf_ocs(&mut self, ddfstrt: u16, ddfstop: u16, bplcon1: u16, hpos_max: u16, line: u16) {
        self.latch_ddf_reached(ddfstrt, ddfstop, hpos_max);
        self.compute_ddf_window_ocs(bplcon1, line);
    }

    /// Re-latch `ddfStrtReached`/`ddfStopReached` only, without running
    /// either revision's transition table. Shared by the OCS computation
    /// above and the ECS crate's own table.
    pub fn latch_ddf_reached(&mut self, ddfstrt: u16, ddfstop: u16, hpos_max: u16) {
        self.ddf_strt_reached = if ddfstrt < hpos_max + 1 {
            i32::from(ddfstrt)
        } else {
            -1
        };
        self.ddf_stop_reached = if ddfstop < hpos_max + 1 {
            i32::from(ddfstop)
        } else {
            -1
        };
    }

    fn compute_ddf_window_ocs(&mut self, bplcon1: u16, line: u16) {
        // 0 = small (< 0x18), 1 = medium (valid), 2 = large (unreached).
        let classify = |reached: i32| -> usize {
            if reached < 0 {
                2
            } else if reached < 0x18 {
                0
            } else {
                1
            }
        };
        let strt = classify(self.ddf_strt_reached);
        let stop = classify(self.ddf_stop_reached);

        if self.ddf_strt_reached >= 0 && self.ddf_strt_reached < 0x18 {
            if self.ocs_early_access_line == i32::from(line) {
                self.apply_standard_window(
                    self.ddf_strt_reached as u16,
                    self.ddf_stop_reached as u16,
                    bplcon1,
                );
            } else {
                self.ddf_strt_lores = 0;
                self.ddf_stop_lores = 0;
                self.ddf_strt_hires = 0;
                self.ddf_stop_hires = 0;
                self.ocs_early_access_line = i32::from(line) + 1;
            }
            return;
        }

        const TABLE: [DdfInterval; 9] = [
            DdfInterval::Empty,
            DdfInterval::D18Stop,
            DdfInterval::D18D8,
            DdfInterval::Empty,
            DdfInterval::StrtStop,
            DdfInterval::StrtD8,
            DdfInterval::Empty,
            DdfInterval::Empty,
            DdfInterval::Empty,
        ];
        match TABLE[3 * strt + stop] {
            DdfInterval::Empty => {
                self.ddf_strt_lores = 0;
                self.ddf_stop_lores = 0;
                self.ddf_strt_hires = 0;
                self.ddf_stop_hires = 0;
            }
            DdfInterval::StrtStop => self.apply_standard_window(
                self.ddf_strt_reached as u16,
                self.ddf_stop_reached as u16,
                bplcon1,
            ),
            DdfInterval::StrtD8 => {
                self.apply_standard_window(self.ddf_strt_reached as u16, 0xD8, bplcon1);
            }
            DdfInterval::D18Stop => {
                self.apply_standard_window(0x18, self.ddf_stop_reached as u16, bplcon1);
            }
            DdfInterval::D18D8 => self.apply_standard_window(0x18, 0xD8, bplcon1),
        }
    }

    /// `spec.md` §4.3's standard-window computation: BPLCON1 scroll
    /// offset, fetch-unit alignment, fetch-unit count, end clamp. Public
    /// so the ECS crate's own transition table can reuse it verbatim.
    pub fn apply_standard_window(&mut self, strt: u16, stop: u16, bplcon1: u16) {
        let lores_strt = strt.wrapping_sub((bplcon1 & 0xF) >> 1);
        let hires_strt = strt.wrapping_sub((bplcon1 & 0x7) >> 1);

        let lores_shift = (8 - (lores_strt & 0b111)) & 0b111;
        let hires_shift = (4 - (hires_strt & 0b11)) & 0b11;

        self.ddf_strt_lores = lores_strt.wrapping_add(lores_shift);
        self.ddf_strt_hires = hires_strt.wrapping_add(hires_shift);

        let fetch_units = (i32::from(stop) - i32::from(strt) + 15) >> 3;
        let span = 8 * fetch_units.max(0) as u16;
        self.ddf_stop_lores = (self.ddf_strt_lores + span).min(0xE0);
        self.ddf_stop_hires = (self.ddf_strt_hires + span).min(0xE0);
    }
}

impl Default for DisplayWindow {
    fn default() -> Self {
        Self::new()
    }
}
