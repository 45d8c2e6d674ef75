//! tethercam: session layer for tethered camera control
//!
//! This crate sits between a host application and a camera driver subsystem.
//! It discovers attached cameras, exposes their live configuration as a
//! serializable tree, drives preview and still capture with guaranteed
//! cleanup of device-side temporary files, and drains device events.
//!
//! # Features
//! - Discovery that tolerates individual devices failing to open
//! - Configuration tree conversion to and from generic values
//! - Preview and still capture into a reusable per-session buffer
//! - Event draining and capability queries
//! - FIFO operation scheduling for async hosts
//!
//! # Usage
//! ```rust,ignore
//! use tethercam::{list_available_cameras, DriverContext};
//!
//! let ctx = DriverContext::new(my_driver);
//! let report = list_available_cameras(&ctx)?;
//! for mut session in report.sessions {
//!     let tree = session.config_tree()?;
//!     let image = session.capture_image()?;
//! }
//! ```
pub mod capabilities;
pub mod capture;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod driver;
pub mod errors;
pub mod events;
pub mod scheduler;
pub mod session;
pub mod settings;

// Testing utilities - simulated driver for offline testing
pub mod testing;

// Re-exports for convenience
pub use capabilities::CapabilityRecord;
pub use capture::CaptureArtifact;
pub use catalog::{AbilityDescriptor, DriverContext, Operations, PortDescriptor, PortType};
pub use config::TetherConfig;
pub use discovery::{list_available_cameras, open_camera, open_first_available, DiscoveryReport};
pub use driver::{DeviceHandle, Driver, DriverError, DriverErrorKind};
pub use errors::{CameraError, Result};
pub use scheduler::SessionScheduler;
pub use session::CameraSession;
pub use settings::{ConfigNode, GenericValue, NodeKind};

/// Initialize logging for tethercam
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "tethercam=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_crate_info() {
        let info = get_info();
        assert_eq!(info.name, "tethercam");
        assert!(!info.version.is_empty());
        assert!(!info.description.is_empty());
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }
}
