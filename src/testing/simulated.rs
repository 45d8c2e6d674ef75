//! In-memory driver subsystem
//!
//! [`SimulatedDriver`] and [`SimulatedCamera`] implement the driver traits on
//! top of shared state, so a test can hand a camera to a session and still
//! observe what the session did to it through a probe.

use super::synthetic_data::{sample_abilities, sample_config_tree, synthetic_jpeg, usb_port};
use crate::catalog::{AbilityDescriptor, PortDescriptor};
use crate::driver::{
    CameraEvent, CameraFile, CameraFilePath, CaptureKind, DetectedCamera, DeviceHandle, Driver,
    DriverError, Widget, WidgetValue,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Device calls a simulated camera can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    ConfigTree,
    SingleWidget,
    Commit,
    Capture,
    Preview,
    Fetch,
    Delete,
    Poll,
}

#[derive(Debug)]
struct CameraState {
    abilities: AbilityDescriptor,
    tree: Widget,
    preview: (Vec<u8>, String),
    capture_result: (Vec<u8>, String),
    capture_path: Option<CameraFilePath>,
    storage: Vec<(CameraFilePath, Vec<u8>, String)>,
    events: VecDeque<CameraEvent>,
    endless_events: bool,
    failures: HashSet<FailPoint>,
    polls: usize,
    fetches: usize,
    deleted: Vec<CameraFilePath>,
    commits: Vec<String>,
}

/// A simulated device handle. Clones share the same device.
#[derive(Debug, Clone)]
pub struct SimulatedCamera {
    state: Arc<Mutex<CameraState>>,
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCamera {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CameraState {
                abilities: sample_abilities(super::synthetic_data::SAMPLE_MODEL),
                tree: sample_config_tree(),
                preview: (synthetic_jpeg(512), "image/jpeg".to_string()),
                capture_result: (synthetic_jpeg(4096), "image/jpeg".to_string()),
                capture_path: None,
                storage: Vec::new(),
                events: VecDeque::new(),
                endless_events: false,
                failures: HashSet::new(),
                polls: 0,
                fetches: 0,
                deleted: Vec::new(),
                commits: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CameraState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_abilities(self, abilities: AbilityDescriptor) -> Self {
        self.lock().abilities = abilities;
        self
    }

    pub fn with_tree(self, tree: Widget) -> Self {
        self.lock().tree = tree;
        self
    }

    pub fn with_preview(self, data: &[u8], mime_type: &str) -> Self {
        self.lock().preview = (data.to_vec(), mime_type.to_string());
        self
    }

    /// Bytes and MIME type of the file a still capture produces.
    pub fn with_capture_result(self, data: &[u8], mime_type: &str) -> Self {
        self.lock().capture_result = (data.to_vec(), mime_type.to_string());
        self
    }

    /// Store captures here instead of at the requested path.
    pub fn with_capture_path(self, path: CameraFilePath) -> Self {
        self.lock().capture_path = Some(path);
        self
    }

    pub fn with_events<I: IntoIterator<Item = CameraEvent>>(self, events: I) -> Self {
        self.lock().events.extend(events);
        self
    }

    /// Never report Timeout; every poll yields an unknown event.
    pub fn with_endless_events(self) -> Self {
        self.lock().endless_events = true;
        self
    }

    pub fn with_failure(self, point: FailPoint) -> Self {
        self.lock().failures.insert(point);
        self
    }

    pub fn probe(&self) -> CameraProbe {
        CameraProbe {
            camera: self.clone(),
        }
    }

    fn check(&self, point: FailPoint) -> Result<(), DriverError> {
        if self.lock().failures.contains(&point) {
            return Err(DriverError::io(format!("Simulated failure at {:?}", point)));
        }
        Ok(())
    }
}

impl DeviceHandle for SimulatedCamera {
    fn abilities(&self) -> Result<AbilityDescriptor, DriverError> {
        Ok(self.lock().abilities.clone())
    }

    fn config_tree(&mut self) -> Result<Widget, DriverError> {
        self.check(FailPoint::ConfigTree)?;
        Ok(self.lock().tree.clone())
    }

    fn single_widget(&mut self, name: &str) -> Result<Widget, DriverError> {
        self.check(FailPoint::SingleWidget)?;
        self.lock()
            .tree
            .find(name)
            .cloned()
            .ok_or_else(|| no_such_widget(name))
    }

    fn commit_widget(&mut self, name: &str, widget: &Widget) -> Result<(), DriverError> {
        self.check(FailPoint::Commit)?;
        let mut state = self.lock();
        let target = state
            .tree
            .find_mut(name)
            .ok_or_else(|| no_such_widget(name))?;
        if target.readonly() {
            return Err(DriverError::new(
                crate::driver::DriverErrorKind::PermissionDenied,
                format!("Widget '{name}' is read-only"),
            ));
        }
        let value = widget.value().clone();
        target.set_value(value)?;
        state.commits.push(name.to_string());
        Ok(())
    }

    fn capture(
        &mut self,
        kind: CaptureKind,
        target: &CameraFilePath,
    ) -> Result<CameraFilePath, DriverError> {
        self.check(FailPoint::Capture)?;
        if kind != CaptureKind::Image {
            return Err(DriverError::not_supported(format!(
                "Capture of {:?} not supported",
                kind
            )));
        }
        let mut state = self.lock();
        let path = state.capture_path.clone().unwrap_or_else(|| target.clone());
        let (data, mime) = state.capture_result.clone();
        state.storage.push((path.clone(), data, mime));
        Ok(path)
    }

    fn capture_preview(&mut self, file: &mut CameraFile) -> Result<(), DriverError> {
        self.check(FailPoint::Preview)?;
        let state = self.lock();
        file.set_data(&state.preview.0);
        file.set_mime_type(state.preview.1.clone());
        Ok(())
    }

    fn fetch_file(
        &mut self,
        path: &CameraFilePath,
        file: &mut CameraFile,
    ) -> Result<(), DriverError> {
        self.lock().fetches += 1;
        self.check(FailPoint::Fetch)?;
        let state = self.lock();
        let (_, data, mime) = state
            .storage
            .iter()
            .find(|(p, _, _)| p == path)
            .ok_or_else(|| DriverError::file_not_found(&path.to_string()))?;
        file.set_data(data);
        file.set_mime_type(mime.clone());
        Ok(())
    }

    fn delete_file(&mut self, path: &CameraFilePath) -> Result<(), DriverError> {
        self.lock().deleted.push(path.clone());
        self.check(FailPoint::Delete)?;
        self.lock().storage.retain(|(p, _, _)| p != path);
        Ok(())
    }

    fn poll_event(&mut self, _timeout: Duration) -> Result<CameraEvent, DriverError> {
        self.lock().polls += 1;
        self.check(FailPoint::Poll)?;
        let mut state = self.lock();
        if state.endless_events {
            return Ok(CameraEvent::Unknown("PTP Property 0xd1a5 changed".to_string()));
        }
        Ok(state.events.pop_front().unwrap_or(CameraEvent::Timeout))
    }
}

fn no_such_widget(name: &str) -> DriverError {
    DriverError::bad_parameters(format!("Bad parameters: no widget named '{name}'"))
}

/// Read-side view of a [`SimulatedCamera`] for assertions.
#[derive(Debug, Clone)]
pub struct CameraProbe {
    camera: SimulatedCamera,
}

impl CameraProbe {
    /// Every delete call, in order, including failed ones.
    pub fn deleted_files(&self) -> Vec<CameraFilePath> {
        self.camera.lock().deleted.clone()
    }

    /// Files still present in device storage.
    pub fn stored_files(&self) -> Vec<CameraFilePath> {
        self.camera.lock().storage.iter().map(|(p, _, _)| p.clone()).collect()
    }

    pub fn commits(&self) -> Vec<String> {
        self.camera.lock().commits.clone()
    }

    pub fn polls(&self) -> usize {
        self.camera.lock().polls
    }

    pub fn fetches(&self) -> usize {
        self.camera.lock().fetches
    }

    pub fn widget_value(&self, name: &str) -> Option<WidgetValue> {
        self.camera.lock().tree.find(name).map(|w| w.value().clone())
    }

    pub fn push_event(&self, event: CameraEvent) {
        self.camera.lock().events.push_back(event);
    }

    pub fn fail_at(&self, point: FailPoint) {
        self.camera.lock().failures.insert(point);
    }

    pub fn clear_failures(&self) {
        self.camera.lock().failures.clear();
    }
}

#[derive(Debug, Default)]
struct DriverState {
    detected: Vec<DetectedCamera>,
    abilities: Vec<AbilityDescriptor>,
    ports: Vec<PortDescriptor>,
    cameras: HashMap<String, SimulatedCamera>,
    failing_binds: HashSet<String>,
    fail_autodetect: bool,
    fail_next_ability_load: bool,
    ability_loads: usize,
    port_loads: usize,
    binds: Vec<String>,
}

/// A simulated driver subsystem with its own catalogs and attached cameras.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDriver {
    state: Arc<Mutex<DriverState>>,
}

impl SimulatedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DriverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_ability(self, ability: AbilityDescriptor) -> Self {
        self.lock().abilities.push(ability);
        self
    }

    pub fn with_port(self, port: PortDescriptor) -> Self {
        self.lock().ports.push(port);
        self
    }

    /// Attach a camera: it is detected, and its model and port are catalogued.
    pub fn with_camera(self, model: &str, port: &str, camera: SimulatedCamera) -> Self {
        {
            let mut state = self.lock();
            if !state.abilities.iter().any(|a| a.model == model) {
                state.abilities.push(sample_abilities(model));
            }
            if !state.ports.iter().any(|p| p.path == port) {
                state.ports.push(usb_port(port));
            }
            state.detected.push(DetectedCamera::new(model, port));
            state.cameras.insert(port.to_string(), camera);
        }
        self
    }

    /// Report a detection entry without cataloguing its model or port.
    pub fn with_detected(self, model: &str, port: &str) -> Self {
        self.lock().detected.push(DetectedCamera::new(model, port));
        self
    }

    pub fn with_failing_bind(self, port: &str) -> Self {
        self.lock().failing_binds.insert(port.to_string());
        self
    }

    pub fn probe(&self) -> DriverProbe {
        DriverProbe {
            driver: self.clone(),
        }
    }
}

impl Driver for SimulatedDriver {
    type Handle = SimulatedCamera;

    fn autodetect(&self) -> Result<Vec<DetectedCamera>, DriverError> {
        let state = self.lock();
        if state.fail_autodetect {
            return Err(DriverError::io("Simulated autodetect failure"));
        }
        Ok(state.detected.clone())
    }

    fn load_abilities(&self) -> Result<Vec<AbilityDescriptor>, DriverError> {
        let mut state = self.lock();
        state.ability_loads += 1;
        if std::mem::take(&mut state.fail_next_ability_load) {
            return Err(DriverError::io("Simulated driver scan failure"));
        }
        Ok(state.abilities.clone())
    }

    fn load_ports(&self) -> Result<Vec<PortDescriptor>, DriverError> {
        let mut state = self.lock();
        state.port_loads += 1;
        Ok(state.ports.clone())
    }

    fn bind(
        &self,
        ability: &AbilityDescriptor,
        port: &PortDescriptor,
    ) -> Result<SimulatedCamera, DriverError> {
        let mut state = self.lock();
        state.binds.push(port.path.clone());
        if state.failing_binds.contains(&port.path) {
            return Err(DriverError::io(format!(
                "Could not claim the USB device at {}",
                port.path
            )));
        }
        let camera = state
            .cameras
            .entry(port.path.clone())
            .or_insert_with(|| SimulatedCamera::new().with_abilities(ability.clone()))
            .clone();
        Ok(camera)
    }
}

/// Read-side view of a [`SimulatedDriver`].
#[derive(Debug, Clone)]
pub struct DriverProbe {
    driver: SimulatedDriver,
}

impl DriverProbe {
    pub fn ability_loads(&self) -> usize {
        self.driver.lock().ability_loads
    }

    pub fn port_loads(&self) -> usize {
        self.driver.lock().port_loads
    }

    /// Port paths of every bind attempt, in order.
    pub fn binds(&self) -> Vec<String> {
        self.driver.lock().binds.clone()
    }

    pub fn fail_next_ability_load(&self) {
        self.driver.lock().fail_next_ability_load = true;
    }

    pub fn fail_autodetect(&self, fail: bool) {
        self.driver.lock().fail_autodetect = fail;
    }
}
