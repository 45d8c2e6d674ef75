//! Device file paths and the reusable download buffer.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Known MIME types and the file suffix the driver subsystem assigns them.
    static ref MIME_SUFFIXES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("image/jpeg", "jpg");
        m.insert("image/png", "png");
        m.insert("image/tiff", "tif");
        m.insert("image/bmp", "bmp");
        m.insert("image/gif", "gif");
        m.insert("image/x-portable-pixmap", "ppm");
        m.insert("image/x-portable-graymap", "pgm");
        m.insert("image/x-canon-cr2", "cr2");
        m.insert("image/x-canon-cr3", "cr3");
        m.insert("image/x-canon-crw", "crw");
        m.insert("image/x-nikon-nef", "nef");
        m.insert("image/x-sony-arw", "arw");
        m.insert("image/x-fuji-raf", "raf");
        m.insert("image/x-panasonic-raw", "raw");
        m.insert("image/x-adobe-dng", "dng");
        m.insert("image/x-olympus-orf", "orf");
        m.insert("image/x-pentax-pef", "pef");
        m.insert("video/mp4", "mp4");
        m.insert("video/quicktime", "mov");
        m.insert("video/x-msvideo", "avi");
        m.insert("audio/wav", "wav");
        m
    };
}

/// Location of a file in the device's internal storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CameraFilePath {
    pub folder: String,
    pub name: String,
}

impl CameraFilePath {
    pub fn new(folder: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for CameraFilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.folder.ends_with('/') {
            write!(f, "{}{}", self.folder, self.name)
        } else {
            write!(f, "{}/{}", self.folder, self.name)
        }
    }
}

/// Download buffer filled by the driver on preview or file fetch.
///
/// A session allocates one on first capture and reuses it; `set_data`
/// keeps the allocation so repeated captures of similar size do not
/// reallocate.
#[derive(Debug, Clone, Default)]
pub struct CameraFile {
    data: Vec<u8>,
    mime_type: String,
    name: String,
}

impl CameraFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_data(&mut self, data: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(data);
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn set_mime_type(&mut self, mime_type: impl Into<String>) {
        self.mime_type = mime_type.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replace whatever follows the last '.' in the name with the suffix
    /// for the current MIME type. Unknown MIME types leave the name as is.
    pub fn adjust_name_for_mime_type(&mut self) {
        let Some(suffix) = MIME_SUFFIXES.get(self.mime_type.as_str()) else {
            log::debug!(
                "No suffix known for MIME type '{}', keeping name '{}'",
                self.mime_type,
                self.name
            );
            return;
        };

        let stem = match self.name.rfind('.') {
            Some(dot) => &self.name[..dot],
            None => self.name.as_str(),
        };
        self.name = format!("{stem}.{suffix}");
    }

    /// Forget the previous contents but keep the allocation.
    pub fn reset(&mut self) {
        self.data.clear();
        self.mime_type.clear();
        self.name.clear();
    }
}
