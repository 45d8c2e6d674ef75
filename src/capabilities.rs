use crate::catalog::Operations;
use crate::driver::DeviceHandle;
use crate::errors::{CameraError, Result};
use serde::{Deserialize, Serialize};

/// Which operation classes a bound device supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityRecord {
    pub capture_image: bool,
    pub capture_video: bool,
    pub capture_audio: bool,
    pub capture_preview: bool,
    pub config: bool,
    pub trigger_capture: bool,
}

impl CapabilityRecord {
    pub fn from_operations(ops: Operations) -> Self {
        Self {
            capture_image: ops.contains(Operations::CAPTURE_IMAGE),
            capture_video: ops.contains(Operations::CAPTURE_VIDEO),
            capture_audio: ops.contains(Operations::CAPTURE_AUDIO),
            capture_preview: ops.contains(Operations::CAPTURE_PREVIEW),
            config: ops.contains(Operations::CONFIG),
            trigger_capture: ops.contains(Operations::TRIGGER_CAPTURE),
        }
    }
}

impl From<Operations> for CapabilityRecord {
    fn from(ops: Operations) -> Self {
        Self::from_operations(ops)
    }
}

/// Query the handle's abilities once and map them.
pub fn supported_ops<H: DeviceHandle>(handle: &H) -> Result<CapabilityRecord> {
    let abilities = handle
        .abilities()
        .map_err(|e| CameraError::driver("get abilities", e))?;
    Ok(CapabilityRecord::from_operations(abilities.operations))
}
