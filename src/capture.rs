//! Preview and still-image capture flows.
//!
//! Both flows write into the session's reusable [`CameraFile`]. The still
//! flow additionally creates a temporary file on the device, which is owned
//! by a [`TempCameraFile`] guard from the moment the trigger returns until it
//! is deleted. Deletion happens before the result is handed back, whether the
//! download succeeded or not.

use crate::config::CaptureConfig;
use crate::driver::{CameraFile, CameraFilePath, CaptureKind, DeviceHandle};
use crate::errors::{CameraError, Result};
use serde::Serialize;
use std::borrow::Cow;

/// Bytes of a preview frame or still image, with MIME type and filename.
///
/// Artifacts returned by a session borrow its capture buffer, so the next
/// capture cannot start until this value is dropped or converted with
/// [`CaptureArtifact::into_owned`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureArtifact<'a> {
    data: Cow<'a, [u8]>,
    mime_type: String,
    filename: Option<String>,
}

impl<'a> CaptureArtifact<'a> {
    fn from_file(file: &'a CameraFile, with_name: bool) -> Self {
        Self {
            data: Cow::Borrowed(file.data()),
            mime_type: file.mime_type().to_string(),
            filename: with_name.then(|| file.name().to_string()),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Present for still images, absent for preview frames.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Copy the bytes out of the session buffer.
    pub fn into_owned(self) -> CaptureArtifact<'static> {
        CaptureArtifact {
            data: Cow::Owned(self.data.into_owned()),
            mime_type: self.mime_type,
            filename: self.filename,
        }
    }
}

/// A device-side file that must be deleted once the capture is done with it.
///
/// Call [`TempCameraFile::release`] on every normal path; dropping an
/// unreleased guard (unwinding) still issues the delete.
pub struct TempCameraFile<'h, H: DeviceHandle> {
    handle: &'h mut H,
    path: CameraFilePath,
    released: bool,
}

impl<'h, H: DeviceHandle> TempCameraFile<'h, H> {
    pub fn new(handle: &'h mut H, path: CameraFilePath) -> Self {
        Self {
            handle,
            path,
            released: false,
        }
    }

    pub fn path(&self) -> &CameraFilePath {
        &self.path
    }

    /// Download the file into `file`.
    pub fn fetch_into(&mut self, file: &mut CameraFile) -> Result<()> {
        self.handle
            .fetch_file(&self.path, file)
            .map_err(|e| CameraError::driver("get file", e))
    }

    /// Delete the device-side file.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        log::debug!("Deleting temporary camera file {}", self.path);
        self.handle
            .delete_file(&self.path)
            .map_err(|e| CameraError::driver("delete file", e))
    }
}

impl<H: DeviceHandle> Drop for TempCameraFile<'_, H> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.handle.delete_file(&self.path) {
            log::warn!(
                "Failed to delete temporary camera file {}: {}",
                self.path,
                e
            );
        }
    }
}

/// Single round trip: the device writes a frame straight into `file`.
pub fn capture_preview<'f, H: DeviceHandle>(
    handle: &mut H,
    file: &'f mut CameraFile,
) -> Result<CaptureArtifact<'f>> {
    file.reset();
    handle
        .capture_preview(file)
        .map_err(|e| CameraError::driver("capture preview", e))?;

    log::debug!(
        "Captured preview frame: {} bytes ({})",
        file.data().len(),
        file.mime_type()
    );
    Ok(CaptureArtifact::from_file(file, false))
}

/// Trigger, download, delete, name.
///
/// The temporary file is deleted exactly once whenever the trigger succeeded.
/// A download error wins over a delete error; a delete error after a good
/// download is logged and the image is still returned.
pub fn capture_image<'f, H: DeviceHandle>(
    handle: &mut H,
    file: &'f mut CameraFile,
    config: &CaptureConfig,
) -> Result<CaptureArtifact<'f>> {
    let target = config.temp_path();
    let path = handle
        .capture(CaptureKind::Image, &target)
        .map_err(|e| CameraError::driver("capture", e))?;
    let mut temp = TempCameraFile::new(handle, path);
    log::debug!("Camera stored capture at {}", temp.path());

    file.reset();
    let fetched = temp.fetch_into(file);
    let released = temp.release();

    match (fetched, released) {
        (Err(fetch_err), Err(delete_err)) => {
            log::warn!(
                "Temporary camera file not deleted after failed download: {}",
                delete_err
            );
            return Err(fetch_err);
        }
        (Err(fetch_err), Ok(())) => return Err(fetch_err),
        (Ok(()), Err(delete_err)) => {
            log::warn!("Temporary camera file not deleted: {}", delete_err);
        }
        (Ok(()), Ok(())) => {}
    }

    file.set_name(config.base_filename.clone());
    file.adjust_name_for_mime_type();

    log::info!(
        "Captured image {}: {} bytes ({})",
        file.name(),
        file.data().len(),
        file.mime_type()
    );
    Ok(CaptureArtifact::from_file(file, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TetherConfig;
    use crate::testing::SimulatedCamera;

    #[test]
    fn test_preview_has_no_filename() {
        let mut camera = SimulatedCamera::new().with_preview(b"\xff\xd8preview", "image/jpeg");
        let mut file = CameraFile::new();
        let artifact = capture_preview(&mut camera, &mut file).unwrap();
        assert_eq!(artifact.data(), b"\xff\xd8preview");
        assert_eq!(artifact.mime_type(), "image/jpeg");
        assert!(artifact.filename().is_none());
    }

    #[test]
    fn test_image_is_named_from_mime_type() {
        let mut camera =
            SimulatedCamera::new().with_capture_result(b"raw bytes", "image/x-canon-cr2");
        let probe = camera.probe();
        let mut file = CameraFile::new();
        let config = TetherConfig::default().capture;

        let artifact = capture_image(&mut camera, &mut file, &config).unwrap();
        assert_eq!(artifact.filename(), Some("image.cr2"));
        assert_eq!(artifact.data(), b"raw bytes");
        assert_eq!(
            probe.deleted_files(),
            vec![CameraFilePath::new("/", "web-gphoto2")]
        );
    }

    #[test]
    fn test_guard_deletes_on_drop() {
        let mut camera = SimulatedCamera::new();
        let probe = camera.probe();
        {
            let temp = TempCameraFile::new(&mut camera, CameraFilePath::new("/", "orphan"));
            assert_eq!(temp.path(), &CameraFilePath::new("/", "orphan"));
        }
        assert_eq!(probe.deleted_files(), vec![CameraFilePath::new("/", "orphan")]);
    }

    #[test]
    fn test_release_then_drop_deletes_once() {
        let mut camera = SimulatedCamera::new();
        let probe = camera.probe();
        let temp = TempCameraFile::new(&mut camera, CameraFilePath::new("/", "once"));
        temp.release().unwrap();
        assert_eq!(probe.deleted_files().len(), 1);
    }

    #[test]
    fn test_into_owned_detaches_from_buffer() {
        let mut camera = SimulatedCamera::new().with_preview(b"frame-1", "image/jpeg");
        let mut file = CameraFile::new();
        let owned = capture_preview(&mut camera, &mut file).unwrap().into_owned();
        file.set_data(b"overwritten");
        assert_eq!(owned.data(), b"frame-1");
    }
}
