//! Boundary with the device driver subsystem.
//!
//! The wire protocol, transport and vendor command sets live behind the
//! [`Driver`] and [`DeviceHandle`] traits. Everything above this module only
//! sees the native value types defined here: the [`Widget`] tree, the
//! [`CameraFile`] buffer, [`CameraEvent`]s and [`DriverError`]s.

pub mod event;
pub mod file;
pub mod widget;

pub use event::CameraEvent;
pub use file::{CameraFile, CameraFilePath};
pub use widget::{Widget, WidgetKind, WidgetValue};

use crate::catalog::{AbilityDescriptor, PortDescriptor};
use std::time::Duration;

/// Classification of a driver status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    Generic,
    Io,
    NotSupported,
    BadParameters,
    ModelNotFound,
    UnknownPort,
    FileNotFound,
    DirectoryNotFound,
    CameraBusy,
    PermissionDenied,
    Disconnected,
}

/// A failed driver call, with the human-readable status the driver reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    pub kind: DriverErrorKind,
    pub message: String,
}

impl DriverError {
    pub fn new(kind: DriverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::Io, message)
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::NotSupported, message)
    }

    pub fn bad_parameters(message: impl Into<String>) -> Self {
        Self::new(DriverErrorKind::BadParameters, message)
    }

    pub fn model_not_found(model: &str) -> Self {
        Self::new(
            DriverErrorKind::ModelNotFound,
            format!("Unknown model: {model}"),
        )
    }

    pub fn unknown_port(path: &str) -> Self {
        Self::new(
            DriverErrorKind::UnknownPort,
            format!(
                "The port '{path}' can not be found. Make sure the spelling is correct \
                 (i.e. with prefix 'serial:' or 'usb:')."
            ),
        )
    }

    pub fn file_not_found(path: &str) -> Self {
        Self::new(
            DriverErrorKind::FileNotFound,
            format!("File not found: {path}"),
        )
    }

    pub fn camera_busy() -> Self {
        Self::new(DriverErrorKind::CameraBusy, "I/O in progress")
    }
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DriverError {}

/// What a capture trigger should produce on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Image,
    Movie,
    Sound,
}

/// One entry reported by device autodetection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedCamera {
    pub model: String,
    pub port: String,
}

impl DetectedCamera {
    pub fn new(model: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            port: port.into(),
        }
    }
}

/// Enumeration and binding entry points of the driver subsystem.
pub trait Driver {
    /// The per-device handle produced by [`Driver::bind`].
    type Handle: DeviceHandle;

    /// List all currently reachable devices as (model, port) pairs.
    fn autodetect(&self) -> Result<Vec<DetectedCamera>, DriverError>;

    /// Scan installed camera drivers. Expensive; called once per context.
    fn load_abilities(&self) -> Result<Vec<AbilityDescriptor>, DriverError>;

    /// Scan installed port drivers. Expensive; called once per context.
    fn load_ports(&self) -> Result<Vec<PortDescriptor>, DriverError>;

    /// Bind a device handle to exactly one (ability, port) pair.
    fn bind(
        &self,
        ability: &AbilityDescriptor,
        port: &PortDescriptor,
    ) -> Result<Self::Handle, DriverError>;
}

/// I/O against one bound device. Every call may block; none is cancellable.
pub trait DeviceHandle {
    /// Abilities the handle was bound with.
    fn abilities(&self) -> Result<AbilityDescriptor, DriverError>;

    /// Fetch the full widget tree (root is a window).
    fn config_tree(&mut self) -> Result<Widget, DriverError>;

    /// Fetch a single named widget, detached from the tree.
    fn single_widget(&mut self, name: &str) -> Result<Widget, DriverError>;

    /// Commit one changed widget back to the device.
    fn commit_widget(&mut self, name: &str, widget: &Widget) -> Result<(), DriverError>;

    /// Trigger a capture. `target` is the requested path; the returned path
    /// is where the device actually stored the file.
    fn capture(
        &mut self,
        kind: CaptureKind,
        target: &CameraFilePath,
    ) -> Result<CameraFilePath, DriverError>;

    /// Capture a preview frame straight into `file`. No device file is created.
    fn capture_preview(&mut self, file: &mut CameraFile) -> Result<(), DriverError>;

    /// Download a device-side file into `file`.
    fn fetch_file(&mut self, path: &CameraFilePath, file: &mut CameraFile)
        -> Result<(), DriverError>;

    /// Delete a device-side file.
    fn delete_file(&mut self, path: &CameraFilePath) -> Result<(), DriverError>;

    /// Wait up to `timeout` for the next event.
    fn poll_event(&mut self, timeout: Duration) -> Result<CameraEvent, DriverError>;
}
