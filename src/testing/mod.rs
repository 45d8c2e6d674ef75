//! Testing utilities for tethercam
//!
//! Provides an in-memory driver subsystem and sample camera data so the
//! session layer can be exercised offline.

pub mod simulated;
pub mod synthetic_data;

pub use simulated::{CameraProbe, DriverProbe, FailPoint, SimulatedCamera, SimulatedDriver};
pub use synthetic_data::{
    sample_abilities, sample_config_tree, synthetic_jpeg, usb_port, SAMPLE_MODEL,
};
