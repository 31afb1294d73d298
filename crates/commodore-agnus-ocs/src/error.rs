//! Error and configuration-error types.
//!
//! No external error-handling crate is used anywhere in this workspace;
//! errors are plain enums with manual `Display`/`Error` impls.

use std::fmt;

/// A fatal or reportable condition raised by the core.
#[derive(Debug)]
pub enum Error {
    /// A scheduler invariant was violated (event in the past, wrong slot
    /// type at dispatch). Fatal: the caller should transition to `Halted`.
    SchedulerInvariant(String),
    /// A non-fatal configuration error. State is left unchanged.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SchedulerInvariant(msg) => write!(f, "scheduler invariant violated: {msg}"),
            Error::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

/// A caller-facing configuration mistake. No emulator state is changed
/// when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// An unrecognised chipset revision was requested.
    UnknownRevision,
    /// A brightness/contrast/saturation value fell outside its valid range.
    AdjustmentOutOfRange,
    /// The deferred register-change queue is full; the write was rejected
    /// rather than silently dropped.
    RegQueueSaturated,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownRevision => write!(f, "unknown chipset revision"),
            ConfigError::AdjustmentOutOfRange => {
                write!(f, "color adjustment value out of range")
            }
            ConfigError::RegQueueSaturated => write!(f, "register change queue saturated"),
        }
    }
}

impl std::error::Error for ConfigError {}
