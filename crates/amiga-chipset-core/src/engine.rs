//! The top-level orchestrator: wires `BeamClock` → `Scheduler` →
//! `Sequencer` → `DisplayWindow` → `ShiftEngine` → `PriorityMixer` →
//! `Colorizer`, owns the state machine, the full register poke dispatch
//! table, and the inspection snapshot API.
//!
//! Per-cycle dispatch is keyed off the current DMA-cycle slot owner
//! (VBlank/copper/bitplane-modulo), scaled down to this core's Agnus+Denise
//! scope — no CPU or CIA ticking here, those remain external collaborators.

use commodore_agnus_ecs::AgnusEcs;
use commodore_agnus_ocs::{
    Agnus as AgnusOcsCore, BeamEvent, BplEvent, BusOwner, ChipsetRevision, Coprocessor,
    DasEvent, RegQueue, VideoStandard, WriteSource, beam::DMA_CYCLE, custom_regs as agnus_regs,
};
use commodore_denise_ecs::DeniseEcs;
use commodore_denise_ocs::{Collisions, Denise as DeniseOcsCore, HPIXELS, custom_regs as denise_regs};

use emu_core::{Observable, Value};

use crate::Snapshot;
use crate::custom_regs as ptr_regs;
use crate::error::Error;
use crate::external::{ChipRam, InterruptSink};
use crate::state::{EngineState, StateMachine};

/// Either chipset revision's Agnus core. `AgnusEcs` overrides `tick` to
/// run the real ECS DDF table but otherwise derefs to the same OCS
/// surface (`beam`, `scheduler`, `sequencer`, `regs`, `copper`,
/// `blitter`), so most of `Engine`'s dispatch needs no per-revision
/// branch beyond this enum's own methods.
pub enum AgnusRevision {
    Ocs(AgnusOcsCore),
    Ecs(AgnusEcs),
}

impl AgnusRevision {
    fn tick(&mut self) -> Result<BeamEvent, commodore_agnus_ocs::Error> {
        match self {
            Self::Ocs(a) => a.tick(),
            Self::Ecs(a) => a.tick(),
        }
    }

    fn apply_register_write(&mut self, reg: u16, value: u16) {
        match self {
            Self::Ocs(a) => a.apply_register_write(reg, value),
            Self::Ecs(a) => a.apply_register_write(reg, value),
        }
    }

    const fn v(&self) -> u16 {
        match self {
            Self::Ocs(a) => a.beam.pos.v,
            Self::Ecs(a) => a.as_inner().beam.pos.v,
        }
    }

    const fn h(&self) -> u16 {
        match self {
            Self::Ocs(a) => a.beam.pos.h,
            Self::Ecs(a) => a.as_inner().beam.pos.h,
        }
    }

    const fn clock(&self) -> u64 {
        match self {
            Self::Ocs(a) => a.beam.clock,
            Self::Ecs(a) => a.as_inner().beam.clock,
        }
    }

    const fn lof(&self) -> bool {
        match self {
            Self::Ocs(a) => a.beam.lof,
            Self::Ecs(a) => a.as_inner().beam.lof,
        }
    }

    const fn interlace(&self) -> bool {
        match self {
            Self::Ocs(a) => a.beam.interlace,
            Self::Ecs(a) => a.as_inner().beam.interlace,
        }
    }

    fn bpl_event(&self, h: u16) -> BplEvent {
        match self {
            Self::Ocs(a) => a.sequencer.bpl_event[usize::from(h)],
            Self::Ecs(a) => a.as_inner().sequencer.bpl_event[usize::from(h)],
        }
    }

    fn das_event(&self, h: u16) -> DasEvent {
        match self {
            Self::Ocs(a) => a.sequencer.das_event[usize::from(h)],
            Self::Ecs(a) => a.as_inner().sequencer.das_event[usize::from(h)],
        }
    }

    fn dmacon(&self) -> u16 {
        match self {
            Self::Ocs(a) => a.regs.dmacon,
            Self::Ecs(a) => a.as_inner().regs.dmacon,
        }
    }

    fn allocate_bus(&mut self, h: u16, owner: BusOwner) -> bool {
        match self {
            Self::Ocs(a) => a.scheduler.allocate_bus(h, owner),
            Self::Ecs(a) => a.as_inner_mut().scheduler.allocate_bus(h, owner),
        }
    }

    fn bus_is_free(&self, h: u16) -> bool {
        match self {
            Self::Ocs(a) => a.scheduler.bus_is_free(h),
            Self::Ecs(a) => a.as_inner().scheduler.bus_is_free(h),
        }
    }

    const fn hpos_max(&self) -> u16 {
        match self {
            Self::Ocs(a) => a.beam.hpos_max(),
            Self::Ecs(a) => a.as_inner().beam.hpos_max(),
        }
    }

    /// The bus owner recorded for column `h` of the current line, or
    /// `BusOwner::None` if `h` is out of range (e.g. just after a
    /// `clear_bus_owners()` at HSYNC).
    fn bus_owner_at(&self, h: u16) -> BusOwner {
        let owners = match self {
            Self::Ocs(a) => &a.scheduler.bus_owner,
            Self::Ecs(a) => &a.as_inner().scheduler.bus_owner,
        };
        owners.get(usize::from(h)).copied().unwrap_or(BusOwner::None)
    }

    fn note_blitter_contention(&mut self, granted: bool) {
        match self {
            Self::Ocs(a) => a.scheduler.note_blitter_contention(granted),
            Self::Ecs(a) => a.as_inner_mut().scheduler.note_blitter_contention(granted),
        }
    }

    fn copper_wants_bus(&self) -> bool {
        let (v, h) = (self.v(), self.h());
        match self {
            Self::Ocs(a) => a.copper.wants_bus(v, h),
            Self::Ecs(a) => a.as_inner().copper.wants_bus(v, h),
        }
    }

    fn copper_execute(&mut self, ram: &mut dyn ChipRam) -> Option<(u16, u16)> {
        let (v, h) = (self.v(), self.h());
        let copper = match self {
            Self::Ocs(a) => &mut a.copper,
            Self::Ecs(a) => &mut a.as_inner_mut().copper,
        };
        copper.execute(v, h, &mut |addr| ram.peek_chip16(addr));
        copper.last_move.take()
    }

    fn blitter_wants_bus(&self) -> bool {
        let (v, h) = (self.v(), self.h());
        match self {
            Self::Ocs(a) => a.blitter.wants_bus(v, h),
            Self::Ecs(a) => a.as_inner().blitter.wants_bus(v, h),
        }
    }

    fn blitter_priority(&self) -> bool {
        match self {
            Self::Ocs(a) => a.blitter.priority,
            Self::Ecs(a) => a.as_inner().blitter.priority,
        }
    }

    fn blitter_execute(&mut self, ram: &mut dyn ChipRam) {
        let (v, h) = (self.v(), self.h());
        let blitter = match self {
            Self::Ocs(a) => &mut a.blitter,
            Self::Ecs(a) => &mut a.as_inner_mut().blitter,
        };
        let _ = blitter.execute(v, h, &mut |addr| ram.peek_chip16(addr));
    }
}

/// Either chipset revision's Denise core. No behavioural divergence is
/// spec'd between OCS and ECS Denise, so every call below simply forwards
/// through `Deref`/`DerefMut` for the `Ecs` arm.
pub enum DeniseRevision {
    Ocs(DeniseOcsCore),
    Ecs(DeniseEcs),
}

impl DeniseRevision {
    fn poke(&mut self, reg: u16, value: u16) {
        match self {
            Self::Ocs(d) => d.poke(reg, value),
            Self::Ecs(d) => d.poke(reg, value),
        }
    }

    fn begin_line(&mut self) {
        match self {
            Self::Ocs(d) => d.begin_line(),
            Self::Ecs(d) => d.begin_line(),
        }
    }

    fn shift_column(&mut self, x: usize) {
        match self {
            Self::Ocs(d) => d.shift_column(x),
            Self::Ecs(d) => d.shift_column(x),
        }
    }

    fn resolve_playfield(&mut self) {
        match self {
            Self::Ocs(d) => d.resolve_playfield(),
            Self::Ecs(d) => d.resolve_playfield(),
        }
    }

    fn resolve_sprites(&mut self) -> Collisions {
        match self {
            Self::Ocs(d) => d.resolve_sprites(),
            Self::Ecs(d) => d.resolve_sprites(),
        }
    }

    fn render_pixel(&mut self, x: usize) -> u32 {
        match self {
            Self::Ocs(d) => d.render_pixel(x),
            Self::Ecs(d) => d.render_pixel(x),
        }
    }
}

/// Pack a line's `Collisions` into CLXDAT's bit layout: bit 0 is the
/// always-set reserved bit, bits 1-4 are the four sprite-pair/playfield
/// hits, bits 5-10 are the six distinct sprite-pair/sprite-pair hits
/// (the 4x4 grid is symmetric, so only the `x < y` half is read out),
/// and bit 11 is the playfield/playfield hit.
fn encode_clxdat(c: &Collisions) -> u16 {
    let mut bits: u16 = 0;
    for pair in 0..4u16 {
        if u16::from(c.sprite_playfield) & (1u16 << pair) != 0 {
            bits |= 1u16 << (1 + pair);
        }
    }
    let mut slot = 0u16;
    for x in 0..4u16 {
        for y in (x + 1)..4u16 {
            if c.sprite_sprite & (1u16 << (x * 4 + y)) != 0 {
                bits |= 1u16 << (5 + slot);
            }
            slot += 1;
        }
    }
    if c.playfield_playfield {
        bits |= 1u16 << 11;
    }
    bits
}

/// `spec.md` §4.7's `pixel position = dmaCycle·4 + 6` offset between a
/// column's DMA fetch and its RGBA landing in the stable frame buffer.
const FRAME_PIPELINE_DELAY: usize = 6;

fn set_ptr_high(ptr: &mut u32, value: u16) {
    *ptr = (u32::from(value) << 16) | (*ptr & 0xFFFF);
}

fn set_ptr_low(ptr: &mut u32, value: u16) {
    *ptr = (*ptr & 0xFFFF_0000) | u32::from(value);
}

/// Per-register write delay, in DMA cycles. Registers without an explicit
/// row here (`CLXCON`, the copper pointer regs) inherit a conservative
/// one-cycle delay.
fn delay_dma_cycles(reg: u16, source: WriteSource) -> u64 {
    use agnus_regs::{BPLCON0, BPLCON1, DDFSTOP, DDFSTRT, DIWSTOP, DIWSTRT, DMACON};

    let is_pointer = matches!(reg, agnus_regs::DSKPTH | agnus_regs::DSKPTL)
        || (agnus_regs::BPL1PTH..=agnus_regs::BPL6PTL).contains(&reg)
        || (ptr_regs::SPR0PTH..=(ptr_regs::SPR0PTH + 8 * ptr_regs::SPR_PTR_STRIDE - 2)).contains(&reg)
        || matches!(
            reg,
            ptr_regs::AUD0LCH
                | ptr_regs::AUD0LCL
                | ptr_regs::AUD1LCH
                | ptr_regs::AUD1LCL
                | ptr_regs::AUD2LCH
                | ptr_regs::AUD2LCL
                | ptr_regs::AUD3LCH
                | ptr_regs::AUD3LCL
        );

    match reg {
        DMACON => {
            if source == WriteSource::Cpu {
                1
            } else {
                2
            }
        }
        DIWSTRT | DIWSTOP => 4,
        DDFSTRT | DDFSTOP => 2,
        BPLCON0 => 4,
        BPLCON1 => 1,
        denise_regs::BPLCON2 => 4,
        _ if is_pointer => {
            if source == WriteSource::Cpu {
                1
            } else {
                2
            }
        }
        _ if (denise_regs::BPL1DAT..=denise_regs::BPL6DAT).contains(&reg) => 0,
        _ if (denise_regs::SPR0POS..=0x17E).contains(&reg) => 0,
        _ if (denise_regs::COLOR00..=0x1BE).contains(&reg) => 0,
        _ => 1,
    }
}

/// The DMA agent that a pointer register's reads feed, for the
/// pointer-write-drop rule: a write to a pointer register is dropped if the
/// bus at `h - 1` was owned by that register's DMA agent — the hardware
/// register was already consumed one cycle before the write could stick.
fn pointer_agent(reg: u16) -> Option<BusOwner> {
    use agnus_regs::{BPL1PTH, BPL6PTL, DSKPTH, DSKPTL};

    if reg == DSKPTH || reg == DSKPTL {
        return Some(BusOwner::Disk);
    }
    if (BPL1PTH..=BPL6PTL).contains(&reg) {
        return Some(BusOwner::Bitplane);
    }
    if (ptr_regs::SPR0PTH..=(ptr_regs::SPR0PTH + 8 * ptr_regs::SPR_PTR_STRIDE - 2)).contains(&reg) {
        return Some(BusOwner::Sprite);
    }
    if matches!(
        reg,
        ptr_regs::AUD0LCH
            | ptr_regs::AUD0LCL
            | ptr_regs::AUD1LCH
            | ptr_regs::AUD1LCL
            | ptr_regs::AUD2LCH
            | ptr_regs::AUD2LCL
            | ptr_regs::AUD3LCH
            | ptr_regs::AUD3LCL
    ) {
        return Some(BusOwner::Audio);
    }
    None
}

pub struct Engine {
    agnus: AgnusRevision,
    denise: DeniseRevision,
    regqueue: RegQueue,
    state: StateMachine,
    bplpt: [u32; 6],
    sprpt: [u32; 8],
    frames: [Vec<u32>; 2],
    active_frame: usize,
    width: usize,
    height: usize,
    stable_long_frame: bool,
    stable_interlace: bool,
    /// CLXDAT accumulator: OR'd with each line's collision bits until a
    /// read clears it, matching the real register's read-and-clear
    /// behaviour.
    clxdat: u16,
}

impl Engine {
    #[must_use]
    pub fn new(revision: ChipsetRevision, standard: VideoStandard) -> Self {
        let agnus = match revision {
            ChipsetRevision::Ocs => AgnusRevision::Ocs(AgnusOcsCore::new(standard, revision)),
            ChipsetRevision::Ecs => AgnusRevision::Ecs(AgnusEcs::new(standard)),
        };
        let denise = match revision {
            ChipsetRevision::Ocs => DeniseRevision::Ocs(DeniseOcsCore::new()),
            ChipsetRevision::Ecs => DeniseRevision::Ecs(DeniseEcs::new()),
        };
        let width = HPIXELS;
        let height = usize::from(standard.long_frame_lines());
        Self {
            agnus,
            denise,
            regqueue: RegQueue::new(256),
            state: StateMachine::new(),
            bplpt: [0; 6],
            sprpt: [0; 8],
            frames: [vec![0; width * height], vec![0; width * height]],
            active_frame: 0,
            width,
            height,
            stable_long_frame: true,
            stable_interlace: false,
            clxdat: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state.current()
    }

    pub fn request_transition(&mut self, to: EngineState) -> Result<(), Error> {
        self.state.request_transition(to)
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// The stable, fully-rendered frame buffer (the one VSYNC just
    /// flipped away from the write side).
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        &self.frames[1 - self.active_frame]
    }

    #[must_use]
    pub const fn long_frame(&self) -> bool {
        self.stable_long_frame
    }

    #[must_use]
    pub const fn interlace(&self) -> bool {
        self.stable_interlace
    }

    /// Which agent owns the bus at column `h` of the current line,
    /// exposed for downstream debuggers and tests.
    #[must_use]
    pub fn bus_owner(&self, h: u16) -> BusOwner {
        self.agnus.bus_owner_at(h)
    }

    /// The current bitplane DMA pointer for `plane` (0-based).
    #[must_use]
    pub const fn bitplane_pointer(&self, plane: usize) -> u32 {
        self.bplpt[plane]
    }

    /// Peek the CLXDAT accumulator without clearing it (bit 0, the
    /// always-set reserved bit, is included).
    #[must_use]
    pub const fn clxdat(&self) -> u16 {
        self.clxdat | 1
    }

    /// Read CLXDAT and clear the accumulator, matching the real
    /// register's read-and-clear behaviour.
    pub fn take_clxdat(&mut self) -> u16 {
        let value = self.clxdat();
        self.clxdat = 0;
        value
    }

    /// A short critical-section copy of beam/state.
    #[must_use]
    pub fn inspect(&self) -> Snapshot {
        Snapshot {
            v: self.agnus.v(),
            h: self.agnus.h(),
            clock: self.agnus.clock(),
            state: self.state.current(),
            long_frame: self.stable_long_frame,
            interlace: self.stable_interlace,
        }
    }

    /// Queue a register write through the deferred-write path. Returns a
    /// typed configuration error rather than silently dropping the write
    /// if the queue has saturated. A pointer-register write is silently
    /// dropped instead of queued when the bus at `h - 1` was just owned by
    /// that register's own DMA agent (the pointer-write-drop rule).
    pub fn poke(&mut self, reg: u16, value: u16, source: WriteSource) -> Result<(), Error> {
        if let Some(agent) = pointer_agent(reg) {
            let h = self.agnus.h();
            let prev_h = if h == 0 { self.agnus.hpos_max() } else { h - 1 };
            if self.agnus.bus_owner_at(prev_h) == agent {
                return Ok(());
            }
        }
        let delay = delay_dma_cycles(reg, source) * DMA_CYCLE;
        self.regqueue
            .push(self.agnus.clock(), delay, reg, value, source)
            .map_err(Error::from)
    }

    fn apply_resolved_write(&mut self, reg: u16, value: u16) {
        use agnus_regs::{
            BPL1PTH, BPL6PTL, BPLCON0, BPLCON1, COP1LCH, COP1LCL, COP2LCH, COP2LCL, COPJMP1,
            COPJMP2, DDFSTOP, DDFSTRT, DIWSTOP, DIWSTRT, DMACON, DSKPTH, DSKPTL,
        };

        match reg {
            DMACON | DDFSTRT | DDFSTOP | DIWSTRT | DIWSTOP | BPLCON0 | BPLCON1 | COP1LCH
            | COP1LCL | COP2LCH | COP2LCL | COPJMP1 | COPJMP2 => {
                self.agnus.apply_register_write(reg, value);
                if reg == BPLCON0 || reg == BPLCON1 {
                    self.denise.poke(reg, value);
                }
            }
            denise_regs::BPLCON2 | denise_regs::CLXCON => self.denise.poke(reg, value),
            BPL1PTH..=BPL6PTL => {
                let offset = reg - BPL1PTH;
                let plane = usize::from(offset / 4);
                if offset % 4 == 0 {
                    set_ptr_high(&mut self.bplpt[plane], value);
                } else {
                    set_ptr_low(&mut self.bplpt[plane], value);
                }
            }
            _ if (ptr_regs::SPR0PTH..=(ptr_regs::SPR0PTH + 8 * ptr_regs::SPR_PTR_STRIDE - 2))
                .contains(&reg) =>
            {
                let offset = reg - ptr_regs::SPR0PTH;
                let n = usize::from(offset / ptr_regs::SPR_PTR_STRIDE);
                if offset % ptr_regs::SPR_PTR_STRIDE == 0 {
                    set_ptr_high(&mut self.sprpt[n], value);
                } else {
                    set_ptr_low(&mut self.sprpt[n], value);
                }
            }
            _ if (denise_regs::BPL1DAT..=denise_regs::BPL6DAT).contains(&reg)
                || (denise_regs::SPR0POS..=0x17E).contains(&reg)
                || (denise_regs::COLOR00..=0x1BE).contains(&reg) =>
            {
                self.denise.poke(reg, value);
            }
            DSKPTH | DSKPTL => {}
            _ => {}
        }
    }

    fn bpl_dat_reg(plane: usize) -> u16 {
        [
            denise_regs::BPL1DAT,
            denise_regs::BPL2DAT,
            denise_regs::BPL3DAT,
            denise_regs::BPL4DAT,
            denise_regs::BPL5DAT,
            denise_regs::BPL6DAT,
        ][plane]
    }

    fn spr_regs(n: usize) -> (u16, u16, u16, u16) {
        let base = denise_regs::SPR0POS + (n as u16) * denise_regs::SPRITE_STRIDE;
        (base, base + 2, base + 4, base + 6)
    }

    /// Advance exactly one DMA cycle: drain due register writes, service
    /// bitplane/DAS/coprocessor bus arbitration for the current column, shift four
    /// pixels into the video pipeline, then advance the beam. On HSYNC,
    /// resolve and render the completed line; on VSYNC, flip the frame
    /// buffers.
    pub fn tick_dma_cycle(
        &mut self,
        ram: &mut impl ChipRam,
        _irq: &mut impl InterruptSink,
    ) -> Result<(), Error> {
        if self.state.current() != EngineState::Running {
            return Ok(());
        }

        let clock = self.agnus.clock();
        for (reg_id, value, _source) in self.regqueue.drain_due(clock) {
            self.apply_resolved_write(reg_id, value);
        }

        let v = self.agnus.v();
        let h = self.agnus.h();

        if let BplEvent::Lores(plane) | BplEvent::Hires(plane) = self.agnus.bpl_event(h) {
            if self.agnus.allocate_bus(h, BusOwner::Bitplane) {
                let plane = usize::from(plane);
                let word = ram.peek_chip16(self.bplpt[plane]);
                self.bplpt[plane] = self.bplpt[plane].wrapping_add(2);
                self.denise.poke(Self::bpl_dat_reg(plane), word);
            }
        }

        match self.agnus.das_event(h) {
            DasEvent::Refresh => {
                self.agnus.allocate_bus(h, BusOwner::Refresh);
            }
            DasEvent::Disk(_) => {
                self.agnus.allocate_bus(h, BusOwner::Disk);
            }
            DasEvent::Audio(_) => {
                self.agnus.allocate_bus(h, BusOwner::Audio);
            }
            DasEvent::Sprite(n, subslot) => {
                if self.agnus.allocate_bus(h, BusOwner::Sprite) {
                    let n = usize::from(n);
                    let (pos_reg, ctl_reg, data_reg, datb_reg) = Self::spr_regs(n);
                    if subslot == 0 {
                        let pos = ram.peek_chip16(self.sprpt[n]);
                        self.sprpt[n] = self.sprpt[n].wrapping_add(2);
                        let ctl = ram.peek_chip16(self.sprpt[n]);
                        self.sprpt[n] = self.sprpt[n].wrapping_add(2);
                        self.denise.poke(pos_reg, pos);
                        self.denise.poke(ctl_reg, ctl);
                    } else {
                        let data = ram.peek_chip16(self.sprpt[n]);
                        self.sprpt[n] = self.sprpt[n].wrapping_add(2);
                        let datb = ram.peek_chip16(self.sprpt[n]);
                        self.sprpt[n] = self.sprpt[n].wrapping_add(2);
                        self.denise.poke(data_reg, data);
                        self.denise.poke(datb_reg, datb);
                    }
                }
            }
            DasEvent::Sdma | DasEvent::None => {}
        }

        if h != 0xE0
            && self.agnus.dmacon() & agnus_regs::DMAF_COPEN != 0
            && self.agnus.copper_wants_bus()
            && self.agnus.bus_is_free(h)
            && self.agnus.allocate_bus(h, BusOwner::Copper)
        {
            if let Some((reg, value)) = self.agnus.copper_execute(ram) {
                self.apply_resolved_write(reg, value);
            }
        }

        if self.agnus.dmacon() & agnus_regs::DMAF_BLTEN != 0 && self.agnus.blitter_wants_bus() {
            let free = self.agnus.bus_is_free(h);
            let granted = free && self.agnus.blitter_priority();
            self.agnus.note_blitter_contention(granted);
            if granted && self.agnus.allocate_bus(h, BusOwner::Blitter) {
                self.agnus.blitter_execute(ram);
            }
        }

        let base_x = usize::from(h) * 4;
        for offset in 0..4 {
            self.denise.shift_column(base_x + offset);
        }

        let event = match self.agnus.tick() {
            Ok(event) => event,
            Err(e) => {
                // A scheduler invariant violation is fatal — the core
                // aborts and the engine is flagged HALTED rather than left
                // running with stale beam/bus state.
                self.state.force_halt();
                return Err(e.into());
            }
        };
        if matches!(event, BeamEvent::Hsync | BeamEvent::HsyncVsync) {
            self.finalize_line(v);
            self.denise.begin_line();
            if matches!(event, BeamEvent::HsyncVsync) {
                self.flip_frame_buffers();
            }
        }

        Ok(())
    }

    fn finalize_line(&mut self, v: u16) {
        self.denise.resolve_playfield();
        let collisions = self.denise.resolve_sprites();
        self.clxdat |= encode_clxdat(&collisions);
        let row = usize::from(v);
        if row >= self.height {
            return;
        }
        let start = row * self.width;
        // `spec.md` §4.7: the colorizer's output lands six pixels past its
        // own dmaCycle*4 column in the stable frame buffer (colour-pipeline
        // latency between fetch and RGBA output). The last `FRAME_PIPELINE_DELAY`
        // columns of a line would carry into the next line on real hardware;
        // this core does not model that carry-over, so they are dropped.
        for x in 0..self.width {
            let rgba = self.denise.render_pixel(x);
            let target = x + FRAME_PIPELINE_DELAY;
            if target < self.width {
                self.frames[self.active_frame][start + target] = rgba;
            }
        }
    }

    fn flip_frame_buffers(&mut self) {
        self.stable_long_frame = self.agnus.lof();
        self.stable_interlace = self.agnus.interlace();
        self.active_frame = 1 - self.active_frame;
    }
}

/// Query paths for [`Engine::query`], matching `emu_core::Observable`'s
/// dot-path convention. Queries never mutate state.
const QUERY_PATHS: &[&str] = &[
    "v",
    "h",
    "clock",
    "state",
    "long_frame",
    "interlace",
    "clxdat",
];

impl Observable for Engine {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "v" => Some(Value::U16(self.agnus.v())),
            "h" => Some(Value::U16(self.agnus.h())),
            "clock" => Some(Value::U64(self.agnus.clock())),
            "state" => Some(Value::String(format!("{:?}", self.state.current()))),
            "long_frame" => Some(Value::Bool(self.stable_long_frame)),
            "interlace" => Some(Value::Bool(self.stable_interlace)),
            "clxdat" => Some(Value::U16(self.clxdat())),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
