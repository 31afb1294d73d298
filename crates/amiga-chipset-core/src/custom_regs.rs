//! Pointer-register offsets not already owned by `commodore-agnus-ocs`
//! (`DSKPTH/L`, `BPL1..6PTH/L`) or `commodore-denise-ocs` (none): audio
//! and sprite DMA pointers, at their real hardware offsets (see
//! `DESIGN.md`).

pub const AUD0LCH: u16 = 0x0A0;
pub const AUD0LCL: u16 = 0x0A2;
pub const AUD1LCH: u16 = 0x0B0;
pub const AUD1LCL: u16 = 0x0B2;
pub const AUD2LCH: u16 = 0x0C0;
pub const AUD2LCL: u16 = 0x0C2;
pub const AUD3LCH: u16 = 0x0D0;
pub const AUD3LCL: u16 = 0x0D2;

pub const SPR0PTH: u16 = 0x120;
pub const SPR0PTL: u16 = 0x122;

/// Stride between one sprite's PTH and the next sprite's PTH.
pub const SPR_PTR_STRIDE: u16 = 4;
