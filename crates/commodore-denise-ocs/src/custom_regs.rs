//! Amiga custom chip register offsets relevant to Denise.
//!
//! Mirrors `commodore-agnus-ocs::custom_regs`'s layout and naming for the
//! subset of $DFF000-$DFF1FF this crate's register-poke surface cares
//! about.

pub const BPLCON0: u16 = 0x100;
pub const BPLCON1: u16 = 0x102;
pub const BPLCON2: u16 = 0x104;

pub const BPL1DAT: u16 = 0x110;
pub const BPL2DAT: u16 = 0x112;
pub const BPL3DAT: u16 = 0x114;
pub const BPL4DAT: u16 = 0x116;
pub const BPL5DAT: u16 = 0x118;
pub const BPL6DAT: u16 = 0x11A;

pub const SPR0POS: u16 = 0x140;
pub const SPR0CTL: u16 = 0x142;
pub const SPR0DATA: u16 = 0x144;
pub const SPR0DATB: u16 = 0x146;
pub const SPR1POS: u16 = 0x148;
pub const SPR1CTL: u16 = 0x14A;
pub const SPR1DATA: u16 = 0x14C;
pub const SPR1DATB: u16 = 0x14E;
pub const SPR2POS: u16 = 0x150;
pub const SPR2CTL: u16 = 0x152;
pub const SPR2DATA: u16 = 0x154;
pub const SPR2DATB: u16 = 0x156;
pub const SPR3POS: u16 = 0x158;
pub const SPR3CTL: u16 = 0x15A;
pub const SPR3DATA: u16 = 0x15C;
pub const SPR3DATB: u16 = 0x15E;
pub const SPR4POS: u16 = 0x160;
pub const SPR4CTL: u16 = 0x162;
pub const SPR4DATA: u16 = 0x164;
pub const SPR4DATB: u16 = 0x166;
pub const SPR5POS: u16 = 0x168;
pub const SPR5CTL: u16 = 0x16A;
pub const SPR5DATA: u16 = 0x16C;
pub const SPR5DATB: u16 = 0x16E;
pub const SPR6POS: u16 = 0x170;
pub const SPR6CTL: u16 = 0x172;
pub const SPR6DATA: u16 = 0x174;
pub const SPR6DATB: u16 = 0x176;
pub const SPR7POS: u16 = 0x178;
pub const SPR7CTL: u16 = 0x17A;
pub const SPR7DATA: u16 = 0x17C;
pub const SPR7DATB: u16 = 0x17E;

pub const COLOR00: u16 = 0x180;

pub const CLXCON: u16 = 0x098;
pub const CLXDAT: u16 = 0x00E;

/// BPLCON0 bits this crate cares about (the `bpu`/`hires` bits live in
/// `commodore-agnus-ocs::Registers` instead).
pub const BPLCON0F_HAM: u16 = 1 << 11;
pub const BPLCON0F_DBPLF: u16 = 1 << 10;

/// The per-sprite register block stride, so `SPR0POS + n * 8` reaches
/// sprite `n`'s POS register.
pub const SPRITE_STRIDE: u16 = 8;
