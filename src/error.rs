//! Error kinds surfaced by the crate.

use std::result;

/// Crate-wide result type.
pub type Result<T> = result::Result<T, Error>;

/// The reason an operation on a display or drawable could not proceed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, thiserror::Error)]
pub enum OperationError {
    /// The drawable's device already carries a pixel format.
    #[error("pixel format already set on drawable")]
    PixelFormatAlreadySet,

    /// A required capability is not advertised by the display.
    #[error("not supported: {0}")]
    NotSupported(&'static str),

    /// The driver reported zero pixel formats matching the display format.
    #[error("no pixel format matches the display format")]
    NoMatchingPixelFormat,
}

/// Errors returned by command sets, displays, and render contexts.
#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    /// An entry point resolved to null and was subsequently invoked.
    #[error("unsupported: {command}")]
    Unsupported {
        /// The entry point name, e.g. `glGetStringi`.
        command: &'static str,
    },

    /// A GL call left a non-zero error code behind.
    #[error("{command} raised GL error 0x{code:x}")]
    Subsystem {
        /// The entry point that was dispatched.
        command: &'static str,

        /// The first error code drained after the call.
        code: u32,

        /// Any further error codes drained after the first.
        pending: Vec<u32>,
    },

    /// A platform API call failed.
    #[error("{api} failed with OS error {code}")]
    Platform {
        /// The platform API name, e.g. `wglMakeCurrent`.
        api: &'static str,

        /// The OS error code reported for the failure.
        code: u32,
    },

    /// The caller passed an argument that cannot be used.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation cannot be performed in the current state.
    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl Error {
    /// Shorthand for [`Error::Platform`].
    pub fn platform(api: &'static str, code: u32) -> Self {
        Error::Platform { api, code }
    }

    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// Shorthand for `Error::Operation(OperationError::NotSupported(what))`.
    pub fn not_supported(what: &'static str) -> Self {
        Error::Operation(OperationError::NotSupported(what))
    }

    /// Returns the entry point or platform API name the error refers to.
    pub fn command(&self) -> Option<&'static str> {
        match *self {
            Error::Unsupported { command } => Some(command),
            Error::Subsystem { command, .. } => Some(command),
            Error::Platform { api, .. } => Some(api),
            _ => None,
        }
    }

    /// Returns `true` for [`Error::Unsupported`].
    pub fn is_unsupported(&self) -> bool {
        matches!(*self, Error::Unsupported { .. })
    }

    /// Returns `true` for [`Error::Subsystem`].
    pub fn is_subsystem(&self) -> bool {
        matches!(*self, Error::Subsystem { .. })
    }

    /// Returns `true` for [`Error::Platform`].
    pub fn is_platform(&self) -> bool {
        matches!(*self, Error::Platform { .. })
    }

    /// Returns `true` for [`Error::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(*self, Error::InvalidArgument(_))
    }

    /// Returns `true` for any [`Error::Operation`].
    pub fn is_operation(&self) -> bool {
        matches!(*self, Error::Operation(_))
    }

    /// Returns `true` when a required capability is missing.
    pub fn is_not_supported(&self) -> bool {
        matches!(*self, Error::Operation(OperationError::NotSupported(_)))
    }
}
