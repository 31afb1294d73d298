//! Narrow external-collaborator traits.
//!
//! Deliberately small, mirroring `emu_core::Bus`'s minimalism rather than
//! a full per-system bus implementation (`machine-amiga`'s `AmigaBus`):
//! the CPU here calls *into* the core (`sync(cycles)`), so this core
//! cannot reuse `emu_core::Cpu::tick(&mut self, bus: &mut B)`'s
//! core-drives-the-CPU shape and instead defines its own collaborator
//! surface.

/// Chip RAM, aware of the current bus owner so a caller can attribute a
/// contested access correctly.
pub trait ChipRam {
    fn peek_chip16(&mut self, addr: u32) -> u16;
    fn poke_chip16(&mut self, addr: u32, value: u16);
}

/// Interrupt levels an external sink can be asked to raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptSource {
    Vbl,
    Copper,
    Blitter,
    Audio(u8),
    Disk,
    Sprite,
}

pub trait InterruptSink {
    fn raise(&mut self, level: u8, source: InterruptSource);
}

/// A `ChipRam`/`InterruptSink` pair that does nothing, for driving the
/// engine in isolation (tests, the `scenarios.rs` suite) without wiring a
/// real memory map.
#[derive(Debug, Default)]
pub struct NullChipRam {
    pub backing: Vec<u16>,
}

impl NullChipRam {
    #[must_use]
    pub fn with_size(words: usize) -> Self {
        Self {
            backing: vec![0; words],
        }
    }
}

impl ChipRam for NullChipRam {
    fn peek_chip16(&mut self, addr: u32) -> u16 {
        self.backing
            .get((addr / 2) as usize)
            .copied()
            .unwrap_or(0)
    }

    fn poke_chip16(&mut self, addr: u32, value: u16) {
        if let Some(slot) = self.backing.get_mut((addr / 2) as usize) {
            *slot = value;
        }
    }
}

#[derive(Debug, Default)]
pub struct NullInterruptSink {
    pub raised: Vec<(u8, InterruptSource)>,
}

impl InterruptSink for NullInterruptSink {
    fn raise(&mut self, level: u8, source: InterruptSource) {
        self.raised.push((level, source));
    }
}
