use crate::driver::DriverError;
use thiserror::Error;

/// Errors surfaced by every session, discovery and codec operation.
#[derive(Debug, Error)]
pub enum CameraError {
    /// An underlying driver call failed (not found, I/O, permission, disconnect).
    #[error("{operation} failed: {source}")]
    DriverIo {
        operation: &'static str,
        #[source]
        source: DriverError,
    },

    /// A generic value could not be coerced to the widget's required type.
    #[error("type mismatch for widget '{widget}': expected {expected}, got {found}")]
    TypeMismatch {
        widget: String,
        expected: &'static str,
        found: String,
    },

    /// The tree contains, or a write targets, a widget kind with no conversion.
    #[error("unsupported widget kind '{kind}' for widget '{widget}'")]
    UnsupportedWidgetKind { widget: String, kind: String },

    /// One candidate failed to resolve or bind during a multi-device listing.
    #[error("camera {model} on port {port} failed to open: {reason}")]
    DiscoveryPartialFailure {
        model: String,
        port: String,
        reason: String,
    },

    #[error("no cameras detected")]
    NoDevices,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("scheduler error: {0}")]
    Scheduler(String),
}

impl CameraError {
    /// Wraps a driver failure with the name of the call that produced it.
    pub fn driver(operation: &'static str, source: DriverError) -> Self {
        Self::DriverIo { operation, source }
    }

    pub fn type_mismatch(
        widget: impl Into<String>,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            widget: widget.into(),
            expected,
            found: found.into(),
        }
    }

    pub fn unsupported_kind(widget: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnsupportedWidgetKind {
            widget: widget.into(),
            kind: kind.into(),
        }
    }

    /// True for errors that came straight from the driver subsystem.
    pub fn is_driver_error(&self) -> bool {
        matches!(self, Self::DriverIo { .. })
    }
}

/// Result type for camera operations.
pub type Result<T> = std::result::Result<T, CameraError>;
