//! Error taxonomy for device resources and the frame lifecycle.
//!
//! Every failure the runtime can detect locally maps to one [`Error`]
//! variant carrying a human-readable diagnostic. Nothing is recovered
//! automatically; the application decides whether a failure is fatal.

use thiserror::Error;

/// Convenience alias used by every fallible operation in the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by shader, program, texture and lifecycle operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A shader stage could not be compiled (bad or unreadable source).
    #[error("Shader compile error in {label}: {log}")]
    Compile {
        /// Path or label of the shader source.
        label: String,
        /// Compiler diagnostic log.
        log: String,
    },

    /// The device linker rejected a program.
    #[error("Program link error: {0}")]
    Link(String),

    /// A declared vertex attribute is absent from the linked program.
    #[error("Could not find attribute named \"{name}\" in shader program")]
    AttributeResolution {
        /// The attribute name that failed to resolve.
        name: String,
    },

    /// An image asset could not be read or parsed.
    #[error("Unable to load image {path}: {reason}")]
    Decode {
        /// Path or label of the image source.
        path: String,
        /// Underlying reader/decoder diagnostic.
        reason: String,
    },

    /// Acquiring the window, context, function pointers or UI backend failed.
    #[error("Device initialization failed during {stage}: {reason}")]
    DeviceInit {
        /// The setup step that failed.
        stage: &'static str,
        /// Platform diagnostic.
        reason: String,
    },

    /// An attribute descriptor violates its own invariants.
    #[error("Invalid attribute \"{name}\": {reason}")]
    InvalidAttribute {
        /// The attribute name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl Error {
    pub(crate) fn device_init(stage: &'static str) -> impl FnOnce(String) -> Self {
        move |reason| Self::DeviceInit { stage, reason }
    }
}
