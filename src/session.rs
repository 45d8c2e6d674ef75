//! One open camera.
//!
//! A [`CameraSession`] exclusively owns a bound device handle together with
//! the capture buffer reused by every capture on it. Every device operation
//! takes `&mut self`, and capture artifacts borrow the buffer, so one session
//! never has two operations in flight.

use crate::capabilities::{self, CapabilityRecord};
use crate::capture::{self, CaptureArtifact};
use crate::catalog::AbilityDescriptor;
use crate::config::TetherConfig;
use crate::driver::{CameraFile, DeviceHandle};
use crate::errors::{CameraError, Result};
use crate::events;
use crate::settings::{self, ConfigNode, GenericValue};
use uuid::Uuid;

pub struct CameraSession<H: DeviceHandle> {
    id: Uuid,
    model: String,
    port: String,
    handle: H,
    config: TetherConfig,
    buffer: Option<CameraFile>,
}

impl<H: DeviceHandle> CameraSession<H> {
    pub fn new(
        handle: H,
        model: impl Into<String>,
        port: impl Into<String>,
        config: TetherConfig,
    ) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            model: model.into(),
            port: port.into(),
            handle,
            config,
            buffer: None,
        };
        log::info!(
            "Session {} opened for {} on {}",
            session.id,
            session.model,
            session.port
        );
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn config(&self) -> &TetherConfig {
        &self.config
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Full configuration tree, converted.
    pub fn config_tree(&mut self) -> Result<ConfigNode> {
        log::debug!("Session {}: reading configuration tree", self.id);
        settings::fetch_config_tree(&mut self.handle)
    }

    /// Write one configuration leaf.
    pub fn set_config_value(&mut self, name: &str, value: impl Into<GenericValue>) -> Result<()> {
        let value = value.into();
        log::debug!("Session {}: setting '{}' to {:?}", self.id, name, value);
        settings::set_config_value(&mut self.handle, name, value)
    }

    /// Write one configuration leaf from a JSON value.
    pub fn set_config_value_json(&mut self, name: &str, value: serde_json::Value) -> Result<()> {
        let value = GenericValue::from_json(name, value)?;
        self.set_config_value(name, value)
    }

    pub fn capture_preview(&mut self) -> Result<CaptureArtifact<'_>> {
        let file = self.buffer.get_or_insert_with(CameraFile::new);
        capture::capture_preview(&mut self.handle, file)
    }

    /// Capture a still image. The device-side temporary file is gone by the
    /// time this returns.
    pub fn capture_image(&mut self) -> Result<CaptureArtifact<'_>> {
        let file = self.buffer.get_or_insert_with(CameraFile::new);
        capture::capture_image(&mut self.handle, file, &self.config.capture)
    }

    /// Drain pending device events; true if any arrived.
    pub fn consume_events(&mut self) -> Result<bool> {
        events::consume_events(&mut self.handle, &self.config.events)
    }

    pub fn supported_ops(&self) -> Result<CapabilityRecord> {
        capabilities::supported_ops(&self.handle)
    }

    pub fn abilities(&self) -> Result<AbilityDescriptor> {
        self.handle
            .abilities()
            .map_err(|e| CameraError::driver("get abilities", e))
    }

    /// Release the device.
    pub fn close(self) {
        drop(self);
    }
}

impl<H: DeviceHandle> Drop for CameraSession<H> {
    fn drop(&mut self) {
        log::info!(
            "Session {} closed ({} on {})",
            self.id,
            self.model,
            self.port
        );
    }
}

impl<H: DeviceHandle> std::fmt::Debug for CameraSession<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("id", &self.id)
            .field("model", &self.model)
            .field("port", &self.port)
            .field("buffer_allocated", &self.buffer.is_some())
            .finish()
    }
}
