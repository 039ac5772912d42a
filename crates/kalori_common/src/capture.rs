//! Capture session - turns the live camera into photo artifacts

use thiserror::Error;
use tracing::debug;

use crate::artifact::PhotoArtifact;
use crate::camera::Camera;

/// Capture failures. Logged by the session driver, never shown as an alert.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Camera unavailable: {0}")]
    Unavailable(String),

    #[error("Camera device error: {0}")]
    Device(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wraps a camera capability and produces artifacts on demand
pub struct CaptureSession<C> {
    camera: C,
}

impl<C: Camera> CaptureSession<C> {
    pub fn new(camera: C) -> Self {
        Self { camera }
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// Take one photo.
    ///
    /// Refuses to touch the device when it is inactive or has not resolved yet.
    pub async fn capture(&self) -> Result<PhotoArtifact, CaptureError> {
        if !self.camera.is_active() {
            return Err(CaptureError::Unavailable("camera is not active".to_string()));
        }
        if !self.camera.is_ready().await {
            return Err(CaptureError::Unavailable(
                "camera device has not resolved".to_string(),
            ));
        }

        let file = self.camera.take_photo().await?;
        debug!(path = %file.path.display(), "Photo captured");
        Ok(PhotoArtifact::from(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{FakeCamera, PermissionStatus};
    use std::path::Path;

    #[tokio::test]
    async fn test_capture_returns_artifact() {
        let session = CaptureSession::new(FakeCamera::new(PermissionStatus::Granted));

        let artifact = session.capture().await.unwrap();
        assert_eq!(artifact.path(), Path::new("fake-photo-1.jpg"));
        assert_eq!(session.camera().capture_count(), 1);
    }

    #[tokio::test]
    async fn test_capture_fails_when_inactive() {
        let session =
            CaptureSession::new(FakeCamera::new(PermissionStatus::Granted).inactive());

        let err = session.capture().await.unwrap_err();
        assert!(matches!(err, CaptureError::Unavailable(_)));
        assert_eq!(session.camera().capture_count(), 0);
    }

    #[tokio::test]
    async fn test_capture_fails_before_device_resolves() {
        let session =
            CaptureSession::new(FakeCamera::new(PermissionStatus::Granted).ready_after(5));

        let err = session.capture().await.unwrap_err();
        assert!(err.to_string().contains("has not resolved"));
        assert_eq!(session.camera().capture_count(), 0);
    }

    #[tokio::test]
    async fn test_capture_propagates_device_error() {
        let camera = FakeCamera::new(PermissionStatus::Granted)
            .with_captures(vec![Err("shutter jammed".to_string())]);
        let session = CaptureSession::new(camera);

        let err = session.capture().await.unwrap_err();
        assert!(matches!(err, CaptureError::Device(ref msg) if msg == "shutter jammed"));
    }
}
