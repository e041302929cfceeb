//! Error types for the logic circuit definition toolchain.
//!
//! [`LogsimError`] covers the fatal conditions of a parsing session. Problems
//! found *inside* a definition file are never fatal: they are recorded as
//! [`Diagnostic`](crate::dsl::Diagnostic)s and counted. The registry status
//! enums ([`DeviceError`], [`ConnectError`], [`MonitorError`]) are returned by
//! the circuit registries and mapped to user-facing messages by the parser.

use thiserror::Error;

/// Result type alias using [`LogsimError`].
pub type Result<T> = std::result::Result<T, LogsimError>;

/// Fatal errors of a parsing session.
#[derive(Error, Debug)]
pub enum LogsimError {
    // ============ Source Errors ============
    /// The definition file does not exist or is not a regular file
    #[error("Definition file '{path}' not found")]
    SourceNotFound { path: String },

    /// The definition file exists but could not be read as text
    #[error("Failed to read definition file '{path}': {source}")]
    SourceRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ============ Output Errors ============
    /// Error writing diagnostics
    #[error("Failed to write diagnostics: {0}")]
    Io(#[from] std::io::Error),
}

impl LogsimError {
    /// Create a source-not-found error
    pub fn source_not_found(path: impl Into<String>) -> Self {
        Self::SourceNotFound { path: path.into() }
    }
}

/// Rejections from [`Devices::make_device`](crate::circuit::Devices::make_device).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// A device with this name already exists
    #[error("device name already declared")]
    NameAlreadyUsed,

    /// The qualifier is missing or out of range for the device kind
    #[error("invalid qualifier for device kind")]
    InvalidQualifier,
}

/// Rejections from [`Network::connect`](crate::circuit::Network::connect).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectError {
    /// The input pin already has a driver
    #[error("input already connected")]
    InputAlreadyConnected,

    /// One of the devices does not exist
    #[error("device does not exist")]
    DeviceAbsent,

    /// The input pin is not declared on the input device
    #[error("input pin does not exist on device")]
    InputPinAbsent,

    /// The output pin is not an output of the output device
    #[error("output pin does not exist on device")]
    OutputPinAbsent,
}

/// Rejections from [`Monitors::add_monitor`](crate::circuit::Monitors::add_monitor).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorError {
    /// The device or pin is not an output
    #[error("pin is not an output")]
    PinNotAnOutput,

    /// The output is already being monitored
    #[error("output already monitored")]
    AlreadyMonitored,
}
