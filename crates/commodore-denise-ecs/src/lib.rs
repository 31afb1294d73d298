//! Thin Commodore Super Denise (ECS) wrapper crate.
//!
//! `spec.md` names no ECS-specific Denise divergence (unlike Agnus's DDF
//! flip-flop), so this crate reuses `commodore-denise-ocs::Denise`
//! wholesale, following the teacher's own `commodore-denise-ecs`
//! pass-through shape.

use std::ops::{Deref, DerefMut};

pub use commodore_denise_ocs::Denise as InnerDenise;

/// Thin ECS wrapper that currently reuses the OCS Denise implementation.
pub struct DeniseEcs {
    inner: InnerDenise,
}

impl DeniseEcs {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: InnerDenise::new(),
        }
    }

    /// Wrap an existing OCS Denise core for behavior-identical OCS/ECS
    /// constructor routing during the early ECS bring-up phase.
    #[must_use]
    pub fn from_ocs(inner: InnerDenise) -> Self {
        Self { inner }
    }

    #[must_use]
    pub const fn as_inner(&self) -> &InnerDenise {
        &self.inner
    }

    #[must_use]
    pub fn as_inner_mut(&mut self) -> &mut InnerDenise {
        &mut self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> InnerDenise {
        self.inner
    }
}

impl Default for DeniseEcs {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for DeniseEcs {
    type Target = InnerDenise;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for DeniseEcs {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl From<DeniseEcs> for InnerDenise {
    fn from(denise: DeniseEcs) -> Self {
        denise.into_inner()
    }
}
