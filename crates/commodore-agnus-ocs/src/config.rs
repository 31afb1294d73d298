//! Video-standard selection.
//!
//! Follows the teacher's `AmigaConfig`/`Region` enum pattern
//! (`emu-amiga2/src/config.rs`), pared down to the single knob this
//! core's cycle arithmetic actually depends on.

/// PAL or NTSC video timing. Fixes `HPOS_CNT` and the nominal long-frame
/// line count for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoStandard {
    Pal,
    Ntsc,
}

impl VideoStandard {
    /// DMA cycles per rasterline. Fixed for the session: see the Open
    /// Question resolution in `DESIGN.md` for why this is not varied
    /// per line.
    #[must_use]
    pub const fn hpos_cnt(self) -> u16 {
        match self {
            VideoStandard::Pal => 227,
            VideoStandard::Ntsc => 228,
        }
    }

    /// The last valid horizontal position in a rasterline.
    #[must_use]
    pub const fn hpos_max(self) -> u16 {
        self.hpos_cnt() - 1
    }

    /// Short-frame (even field) rasterline count.
    #[must_use]
    pub const fn short_frame_lines(self) -> u16 {
        match self {
            VideoStandard::Pal => 312,
            VideoStandard::Ntsc => 262,
        }
    }

    /// Long-frame (odd field) rasterline count: one more than short.
    #[must_use]
    pub const fn long_frame_lines(self) -> u16 {
        self.short_frame_lines() + 1
    }
}

/// The active chipset revision, selecting which Agnus/Denise table
/// (OCS or ECS) is wired in by the integration crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipsetRevision {
    Ocs,
    Ecs,
}
