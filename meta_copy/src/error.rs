//! Error types for meta copy objects
//!
//! Object-creation failures are fatal for the object being built and are
//! propagated to the caller of the session/factory entry points. Unsupported
//! format pairs are not errors: the resolver signals them with
//! `vk::Format::UNDEFINED`.

use ash::vk;
use std::fmt;

use crate::device::ObjectKind;

/// Result type for meta copy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Meta copy errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A Vulkan object could not be created
    ObjectCreation {
        /// Component that requested the object (e.g. "AttachmentSession")
        owner: &'static str,
        /// Kind of object that failed
        kind: ObjectKind,
        /// Result code returned by the device
        result: vk::Result,
    },

    /// Destination format has no known aspect (e.g. `UNDEFINED`)
    UnsupportedFormat(vk::Format),

    /// Sample count is not exactly one valid sample bit
    InvalidSampleCount(vk::SampleCountFlags),

    /// Shader blob rejected before module creation
    InvalidShader(String),

    /// Configuration rejected by `Config::validate`
    InvalidConfig(String),

    /// A lock guarding shared state was poisoned by a panicking thread
    LockPoisoned(&'static str),
}

impl Error {
    /// Kind of the object that failed to be created, if any
    pub fn object_kind(&self) -> Option<ObjectKind> {
        match self {
            Error::ObjectCreation { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ObjectCreation { owner, kind, result } => {
                write!(f, "{}: failed to create {} ({:?})", owner, kind, result)
            }
            Error::UnsupportedFormat(format) => write!(f, "Unsupported format: {:?}", format),
            Error::InvalidSampleCount(samples) => write!(f, "Invalid sample count: {:?}", samples),
            Error::InvalidShader(msg) => write!(f, "Invalid shader: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::LockPoisoned(what) => write!(f, "Lock poisoned: {}", what),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
