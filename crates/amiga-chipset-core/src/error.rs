//! Top-level error type.
//!
//! Mirrors `commodore-agnus-ocs::error`'s plain-enum, manual-`Display`
//! style; adds `InvalidTransition` for the state machine (§5) and wraps
//! the component crates' own `Error`/`ConfigError`.

use std::fmt;

pub use commodore_agnus_ocs::ConfigError;

use crate::state::EngineState;

#[derive(Debug)]
pub enum Error {
    /// A scheduler invariant was violated in either chip. Fatal: the
    /// engine transitions to `Halted`.
    SchedulerInvariant(String),
    /// A non-fatal configuration error. State is left unchanged.
    Config(ConfigError),
    /// A caller requested an illegal `EngineState` edge (§5's legal-edge
    /// table). State is left unchanged.
    InvalidTransition { from: EngineState, to: EngineState },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SchedulerInvariant(msg) => write!(f, "scheduler invariant violated: {msg}"),
            Error::Config(e) => write!(f, "{e}"),
            Error::InvalidTransition { from, to } => {
                write!(f, "invalid engine state transition: {from:?} -> {to:?}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<commodore_agnus_ocs::Error> for Error {
    fn from(e: commodore_agnus_ocs::Error) -> Self {
        match e {
            commodore_agnus_ocs::Error::SchedulerInvariant(msg) => Error::SchedulerInvariant(msg),
            commodore_agnus_ocs::Error::Config(c) => Error::Config(c),
        }
    }
}
