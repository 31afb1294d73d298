//! Sequencer — precomputed per-scanline bitplane/DAS event tables and
//! their jump-table compaction.
//!
//! Grounded on `original_source/Emulator/Agnus/Agnus.cpp`'s
//! `switchBplDmaOn`/`updateDasDma`/`updateJumpTable` and
//! `commodore-agnus-ocs::LOWRES_DDF_TO_PLANE` for the lores fetch-to-
//! plane interleaving order.

/// A bitplane-slot event. Lores repeats every 8 cycles, hires every 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BplEvent {
    None,
    /// Fetch for lores bitplane 1..6 (index 0-based: `L(0)` = plane 1).
    Lores(u8),
    /// Fetch for hires bitplane 1..4.
    Hires(u8),
    /// Pinned terminal event at `HPOS_MAX`.
    Eol,
}

/// A disk/audio/sprite/refresh slot event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DasEvent {
    None,
    Refresh,
    Disk(u8),
    Audio(u8),
    /// Sprite `n`, either its position/control slot (`pair = 0`) or its
    /// data slot (`pair = 1`) — two slots per sprite as `spec.md` §3
    /// describes.
    Sprite(u8, u8),
    Sdma,
}

/// Lores bitplane fetch order within each 8-cycle fetch unit, indexed by
/// `h % 8`. `None` entries are non-fetch cycles within the unit. Carried
/// unchanged from the teacher's `commodore-agnus-ocs::LOWRES_DDF_TO_PLANE`
/// (itself Minimig-derived).
pub const LOWRES_DDF_TO_PLANE: [Option<u8>; 8] =
    [None, Some(3), Some(5), Some(1), None, Some(2), Some(4), Some(0)];

/// Hires bitplane fetch order within each 4-cycle fetch unit.
pub const HIRES_DDF_TO_PLANE: [Option<u8>; 4] = [Some(3), Some(1), Some(2), Some(0)];

pub struct Sequencer {
    hpos_max: usize,
    /// `bplDMA[hires][bpu][h]`: the ideal event for every (resolution,
    /// active-plane-count, column) combination.
    bpl_dma: Vec<[Vec<BplEvent>; 7]>,
    /// `dasDMA[dmaconLow6][h]`.
    das_dma: Vec<Vec<DasEvent>>,
    pub bpl_event: Vec<BplEvent>,
    pub das_event: Vec<DasEvent>,
    pub next_bpl_event: Vec<u16>,
    pub next_das_event: Vec<u16>,
}

impl Sequencer {
    #[must_use]
    pub fn new(hpos_cnt: u16) -> Self {
        let hpos_max = (hpos_cnt - 1) as usize;
        let n = hpos_cnt as usize;

        let mut bpl_dma: Vec<[Vec<BplEvent>; 7]> = Vec::with_capacity(2);
        for hires in 0..2 {
            let mut per_bpu: [Vec<BplEvent>; 7] = Default::default();
            for (bpu, slot) in per_bpu.iter_mut().enumerate() {
                *slot = Self::build_ideal_line(n, hpos_max, hires == 1, bpu as u8);
            }
            bpl_dma.push(per_bpu);
        }

        let mut das_dma: Vec<Vec<DasEvent>> = Vec::with_capacity(64);
        for dmacon_low6 in 0..64u16 {
            das_dma.push(Self::build_das_line(n, dmacon_low6));
        }

        Self {
            hpos_max,
            bpl_dma,
            das_dma,
            bpl_event: vec![BplEvent::None; n],
            das_event: vec![DasEvent::None; n],
            next_bpl_event: vec![hpos_max as u16; n],
            next_das_event: vec![hpos_max as u16; n],
        }
    }

    fn build_ideal_line(n: usize, hpos_max: usize, hires: bool, bpu: u8) -> Vec<BplEvent> {
        let mut line = vec![BplEvent::None; n];
        if bpu > 0 {
            if hires {
                for (h, slot) in line.iter_mut().enumerate().take(hpos_max) {
                    if let Some(plane) = HIRES_DDF_TO_PLANE[h % 4] {
                        if plane < bpu {
                            *slot = BplEvent::Hires(plane);
                        }
                    }
                }
            } else {
                for (h, slot) in line.iter_mut().enumerate().take(hpos_max) {
                    if let Some(plane) = LOWRES_DDF_TO_PLANE[h % 8] {
                        if plane < bpu {
                            *slot = BplEvent::Lores(plane);
                        }
                    }
                }
            }
        }
        line[hpos_max] = BplEvent::Eol;
        line
    }

    fn build_das_line(n: usize, dmacon_low6: u16) -> Vec<DasEvent> {
        let mut line = vec![DasEvent::None; n];
        let disk_en = dmacon_low6 & 0b01_0000 != 0;
        let aud = [
            dmacon_low6 & 0b00_0001 != 0,
            dmacon_low6 & 0b00_0010 != 0,
            dmacon_low6 & 0b00_0100 != 0,
            dmacon_low6 & 0b00_1000 != 0,
        ];
        let spr_en = dmacon_low6 & 0b10_0000 != 0;

        if n > 1 {
            line[1] = DasEvent::Refresh;
        }
        if disk_en {
            for (i, h) in [0x04usize, 0x05, 0x06].into_iter().enumerate() {
                if h < n {
                    line[h] = DasEvent::Disk(i as u8);
                }
            }
        }
        for (ch, enabled) in aud.into_iter().enumerate() {
            if enabled {
                let h = 0x07 + ch;
                if h < n {
                    line[h] = DasEvent::Audio(ch as u8);
                }
            }
        }
        if spr_en {
            for sprite in 0..8u8 {
                let base = 0x0B + (sprite as usize) * 2;
                if base < n {
                    line[base] = DasEvent::Sprite(sprite, 0);
                }
                if base + 1 < n {
                    line[base + 1] = DasEvent::Sprite(sprite, 1);
                }
            }
        }
        if 0xDF < n {
            line[0xDF] = DasEvent::Sdma;
        }
        line
    }

    /// Rebuild `bplEvent`/`nextBplEvent` for the window `[strt, stop)`,
    /// per `spec.md` §4.3: clear outside the window, copy the ideal line
    /// inside it, rebuild the jump table in reverse, keep the terminal
    /// `BPL_EOL` invariant.
    pub fn rebuild_bitplane_events(&mut self, hires: bool, bpu: u8, strt: u16, stop: u16) {
        let ideal = &self.bpl_dma[usize::from(hires)][bpu as usize];
        for (h, slot) in self.bpl_event.iter_mut().enumerate() {
            *slot = if h >= strt as usize && h < stop as usize {
                ideal[h]
            } else {
                BplEvent::None
            };
        }
        self.bpl_event[self.hpos_max] = BplEvent::Eol;
        rebuild_jump_table_bpl(&self.bpl_event, &mut self.next_bpl_event);
    }

    /// Rebuild `dasEvent`/`nextDasEvent` from the DMACON-gated lookup.
    pub fn rebuild_das_events(&mut self, dmacon_low6: u16) {
        self.das_event = self.das_dma[dmacon_low6 as usize].clone();
        rebuild_jump_table_das(&self.das_event, &mut self.next_das_event);
    }
}

fn rebuild_jump_table_bpl(events: &[BplEvent], jump: &mut [u16]) {
    let end = (events.len() - 1) as u16;
    let mut next = end;
    for h in (0..events.len()).rev() {
        jump[h] = next;
        if events[h] != BplEvent::None {
            next = h as u16;
        }
    }
}

fn rebuild_jump_table_das(events: &[DasEvent], jump: &mut [u16]) {
    let end = (events.len() - 1) as u16;
    let mut next = end;
    for h in (0..events.len()).rev() {
        jump[h] = next;
        if events[h] != DasEvent::None {
            next = h as u16;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eol_is_pinned_at_hpos_max_after_rebuild() {
        let mut seq = Sequencer::new(228);
        seq.rebuild_bitplane_events(false, 1, 0x38, 0xD0);
        assert_eq!(seq.bpl_event[seq.hpos_max], BplEvent::Eol);
    }

    #[test]
    fn jump_table_points_to_smallest_subsequent_active_h() {
        let mut seq = Sequencer::new(228);
        seq.rebuild_bitplane_events(false, 1, 0x38, 0x40);
        for h in 0..seq.bpl_event.len() {
            let expected = ((h as u16)..(seq.hpos_max as u16 + 1))
                .find(|&hh| seq.bpl_event[hh as usize] != BplEvent::None)
                .unwrap_or(seq.hpos_max as u16);
            assert_eq!(seq.next_bpl_event[h], expected, "mismatch at h={h}");
        }
    }

    #[test]
    fn one_bitplane_lores_fetches_every_eighth_column_in_window() {
        let mut seq = Sequencer::new(228);
        seq.rebuild_bitplane_events(false, 1, 0x38, 0xD8);
        for h in 0x38..0xD8usize {
            let fetch = matches!(seq.bpl_event[h], BplEvent::Lores(_));
            assert_eq!(fetch, h % 8 == 7, "h={h:#x}");
        }
    }

    #[test]
    fn refresh_is_always_at_h1_when_dma_enabled() {
        let mut seq = Sequencer::new(228);
        seq.rebuild_das_events(0b11_1111);
        assert_eq!(seq.das_event[1], DasEvent::Refresh);
    }

    #[test]
    fn sdma_strobe_is_at_0xdf() {
        let mut seq = Sequencer::new(228);
        seq.rebuild_das_events(0);
        assert_eq!(seq.das_event[0xDF], DasEvent::Sdma);
    }
}
