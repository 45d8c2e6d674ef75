//! Abilities and port catalogs, and the shared driver context that owns them.
//!
//! Both catalogs come from expensive driver scans. The set of installed
//! drivers does not change while the process runs, so each catalog is loaded
//! at most once per [`DriverContext`] and shared read-only afterwards.
//!
//! Initialization discipline: each catalog sits behind a mutex. The first
//! caller performs the load while holding it; concurrent callers block on the
//! mutex and then see the cached catalog. A failed load caches nothing, so the
//! next caller retries.

use crate::config::TetherConfig;
use crate::driver::{Driver, DriverError};
use crate::errors::{CameraError, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

/// Operation bitset a camera model supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Operations(pub u32);

impl Operations {
    pub const NONE: Self = Self(0);
    pub const CAPTURE_IMAGE: Self = Self(1 << 0);
    pub const CAPTURE_VIDEO: Self = Self(1 << 1);
    pub const CAPTURE_AUDIO: Self = Self(1 << 2);
    pub const CAPTURE_PREVIEW: Self = Self(1 << 3);
    pub const CONFIG: Self = Self(1 << 4);
    pub const TRIGGER_CAPTURE: Self = Self(1 << 5);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for Operations {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Capability descriptor for one camera model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDescriptor {
    pub model: String,
    /// Camera driver library that handles this model.
    pub driver: String,
    pub operations: Operations,
}

impl AbilityDescriptor {
    pub fn new(
        model: impl Into<String>,
        driver: impl Into<String>,
        operations: Operations,
    ) -> Self {
        Self {
            model: model.into(),
            driver: driver.into(),
            operations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortType {
    Usb,
    Serial,
    Ptpip,
    Disk,
    Other,
}

/// Connection metadata for one port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescriptor {
    /// Port path as reported by autodetection, e.g. `usb:001,004`.
    pub path: String,
    pub name: String,
    pub port_type: PortType,
}

impl PortDescriptor {
    pub fn new(path: impl Into<String>, name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            port_type,
        }
    }
}

/// Model name → ability descriptor.
#[derive(Debug, Clone, Default)]
pub struct AbilitiesCatalog {
    entries: Vec<AbilityDescriptor>,
}

impl AbilitiesCatalog {
    pub fn new(entries: Vec<AbilityDescriptor>) -> Self {
        Self { entries }
    }

    pub fn lookup_model(&self, model: &str) -> Result<&AbilityDescriptor> {
        self.entries
            .iter()
            .find(|a| a.model == model)
            .ok_or_else(|| {
                CameraError::driver("lookup abilities", DriverError::model_not_found(model))
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Port path → port descriptor.
#[derive(Debug, Clone, Default)]
pub struct PortCatalog {
    entries: Vec<PortDescriptor>,
}

impl PortCatalog {
    pub fn new(entries: Vec<PortDescriptor>) -> Self {
        Self { entries }
    }

    pub fn lookup_path(&self, path: &str) -> Result<&PortDescriptor> {
        self.entries
            .iter()
            .find(|p| p.path == path)
            .ok_or_else(|| CameraError::driver("lookup port", DriverError::unknown_port(path)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Driver plus the lazily built catalogs, shared by discovery and sessions.
pub struct DriverContext<D: Driver> {
    driver: D,
    config: TetherConfig,
    abilities: Mutex<Option<Arc<AbilitiesCatalog>>>,
    ports: Mutex<Option<Arc<PortCatalog>>>,
}

impl<D: Driver> DriverContext<D> {
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, TetherConfig::default())
    }

    pub fn with_config(driver: D, config: TetherConfig) -> Self {
        Self {
            driver,
            config,
            abilities: Mutex::new(None),
            ports: Mutex::new(None),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &TetherConfig {
        &self.config
    }

    /// Load the abilities catalog on first use; later calls return the cache.
    pub fn ensure_abilities_loaded(&self) -> Result<Arc<AbilitiesCatalog>> {
        let mut slot = self.abilities.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(catalog) = slot.as_ref() {
            return Ok(Arc::clone(catalog));
        }

        log::info!("Loading camera abilities catalog");
        let entries = self
            .driver
            .load_abilities()
            .map_err(|e| CameraError::driver("load abilities", e))?;
        let catalog = Arc::new(AbilitiesCatalog::new(entries));
        log::info!("Abilities catalog loaded: {} models", catalog.len());

        *slot = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// Load the port catalog on first use; later calls return the cache.
    pub fn ensure_ports_loaded(&self) -> Result<Arc<PortCatalog>> {
        let mut slot = self.ports.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(catalog) = slot.as_ref() {
            return Ok(Arc::clone(catalog));
        }

        log::info!("Loading port catalog");
        let entries = self
            .driver
            .load_ports()
            .map_err(|e| CameraError::driver("load ports", e))?;
        let catalog = Arc::new(PortCatalog::new(entries));
        log::info!("Port catalog loaded: {} ports", catalog.len());

        *slot = Some(Arc::clone(&catalog));
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimulatedDriver;
    use std::thread;

    fn canon() -> AbilityDescriptor {
        AbilityDescriptor::new(
            "Canon EOS 5D Mark III",
            "ptp2",
            Operations::CAPTURE_IMAGE | Operations::CONFIG,
        )
    }

    #[test]
    fn test_operations_contains() {
        let ops = Operations::CAPTURE_IMAGE | Operations::CAPTURE_PREVIEW;
        assert!(ops.contains(Operations::CAPTURE_IMAGE));
        assert!(ops.contains(Operations::CAPTURE_PREVIEW));
        assert!(!ops.contains(Operations::CONFIG));
        assert!(ops.contains(Operations::NONE));
    }

    #[test]
    fn test_lookup_model_and_port() {
        let abilities = AbilitiesCatalog::new(vec![canon()]);
        assert_eq!(
            abilities.lookup_model("Canon EOS 5D Mark III").unwrap().driver,
            "ptp2"
        );
        assert!(abilities.lookup_model("Nikon D750").is_err());

        let ports = PortCatalog::new(vec![PortDescriptor::new(
            "usb:001,004",
            "Universal Serial Bus",
            PortType::Usb,
        )]);
        assert_eq!(
            ports.lookup_path("usb:001,004").unwrap().port_type,
            PortType::Usb
        );
        let err = ports.lookup_path("usb:002,001").unwrap_err();
        assert!(err.to_string().contains("usb:002,001"));
    }

    #[test]
    fn test_catalogs_load_once() {
        let driver = SimulatedDriver::new().with_ability(canon());
        let probe = driver.probe();
        let ctx = DriverContext::new(driver);

        let first = ctx.ensure_abilities_loaded().unwrap();
        let second = ctx.ensure_abilities_loaded().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        ctx.ensure_ports_loaded().unwrap();
        ctx.ensure_ports_loaded().unwrap();

        assert_eq!(probe.ability_loads(), 1);
        assert_eq!(probe.port_loads(), 1);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let driver = SimulatedDriver::new().with_ability(canon());
        let probe = driver.probe();
        probe.fail_next_ability_load();
        let ctx = DriverContext::new(driver);

        assert!(ctx.ensure_abilities_loaded().is_err());
        let catalog = ctx.ensure_abilities_loaded().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(probe.ability_loads(), 2);
    }

    #[test]
    fn test_concurrent_first_load_happens_once() {
        let driver = SimulatedDriver::new().with_ability(canon());
        let probe = driver.probe();
        let ctx = Arc::new(DriverContext::new(driver));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                thread::spawn(move || ctx.ensure_abilities_loaded().map(|c| c.len()))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 1);
        }
        assert_eq!(probe.ability_loads(), 1);
    }
}
