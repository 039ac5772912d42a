//! Photo artifacts - references to captured images on disk

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// MIME type of every artifact the camera backends produce
pub const JPEG_MIME: &str = "image/jpeg";

/// Raw result of a camera capture call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFile {
    pub path: PathBuf,
}

/// A captured photo waiting for a decision.
///
/// Only the path is held; the bytes stay on disk until the upload reads them.
#[derive(Debug, PartialEq, Eq)]
pub struct PhotoArtifact {
    path: PathBuf,
    mime_type: &'static str,
    captured_at: DateTime<Utc>,
}

impl PhotoArtifact {
    /// Wrap a JPEG written by a camera backend
    pub fn jpeg(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mime_type: JPEG_MIME,
            captured_at: Utc::now(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

impl From<PhotoFile> for PhotoArtifact {
    fn from(file: PhotoFile) -> Self {
        Self::jpeg(file.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_is_jpeg() {
        let artifact = PhotoArtifact::jpeg("/tmp/kalori/photo.jpg");
        assert_eq!(artifact.mime_type(), "image/jpeg");
        assert_eq!(artifact.path(), Path::new("/tmp/kalori/photo.jpg"));
    }

    #[test]
    fn test_artifact_from_photo_file() {
        let file = PhotoFile {
            path: PathBuf::from("/tmp/kalori/a.jpg"),
        };
        let artifact = PhotoArtifact::from(file);
        assert_eq!(artifact.path(), Path::new("/tmp/kalori/a.jpg"));
        assert!(artifact.captured_at() <= Utc::now());
    }
}
