use super::CameraFilePath;

/// Result of one event poll.
///
/// Payloads are carried for logging only; nothing above the driver
/// interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraEvent {
    /// Nothing arrived within the wait; the queue is empty.
    Timeout,
    Unknown(String),
    FileAdded(CameraFilePath),
    FolderAdded(CameraFilePath),
    FileChanged(CameraFilePath),
    CaptureComplete,
}

impl CameraEvent {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CameraEvent::Timeout)
    }
}
