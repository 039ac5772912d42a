//! Camera capabilities
//!
//! The hardware side is kept behind the `Camera` trait so the session machine
//! can be driven by a V4L2 device, a still image on disk, or a scripted fake.
//!
//! - `V4l2Camera` grabs a single frame through `ffmpeg -f video4linux2`
//! - `FileCamera` copies a still image into the capture directory
//! - `FakeCamera` returns pre-configured captures for tests

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::artifact::PhotoFile;
use crate::capture::CaptureError;
use crate::config::{CameraConfig, CameraSource, ConfigError};

/// Answer to a camera permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::Granted => "granted",
            PermissionStatus::Denied => "denied",
        }
    }
}

// ============================================================================
// Camera Trait
// ============================================================================

/// Camera capability consumed by the capture session
#[async_trait]
pub trait Camera: Send + Sync {
    /// Ask for access to the device. Called once per process by `PermissionGate`.
    async fn request_permission(&self) -> PermissionStatus;

    /// Whether the underlying device has resolved and can take photos
    async fn is_ready(&self) -> bool;

    /// Liveness flag of the preview stream
    fn is_active(&self) -> bool;

    /// Write one photo to transient storage and return its location
    async fn take_photo(&self) -> Result<PhotoFile, CaptureError>;
}

/// Unique output path for a new capture
fn capture_target(capture_dir: &Path) -> PathBuf {
    capture_dir.join(format!("kalori-{}.jpg", uuid::Uuid::new_v4()))
}

// ============================================================================
// V4L2 Camera (Production)
// ============================================================================

/// Video4Linux device captured through ffmpeg
pub struct V4l2Camera {
    device: PathBuf,
    ffmpeg: String,
    capture_dir: PathBuf,
}

impl V4l2Camera {
    pub fn new(device: impl Into<PathBuf>, capture_dir: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            ffmpeg: "ffmpeg".to_string(),
            capture_dir: capture_dir.into(),
        }
    }

    /// Use a specific ffmpeg binary
    pub fn with_ffmpeg(mut self, ffmpeg: impl Into<String>) -> Self {
        self.ffmpeg = ffmpeg.into();
        self
    }

    pub fn device(&self) -> &Path {
        &self.device
    }
}

#[async_trait]
impl Camera for V4l2Camera {
    async fn request_permission(&self) -> PermissionStatus {
        // Access to a V4L2 node is plain read permission on the device file
        match tokio::fs::OpenOptions::new().read(true).open(&self.device).await {
            Ok(_) => PermissionStatus::Granted,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                warn!(device = %self.device.display(), "Camera access denied");
                PermissionStatus::Denied
            }
            // A missing node is a readiness problem, not a permission one
            Err(_) => PermissionStatus::Granted,
        }
    }

    async fn is_ready(&self) -> bool {
        tokio::fs::metadata(&self.device).await.is_ok()
    }

    fn is_active(&self) -> bool {
        true
    }

    async fn take_photo(&self) -> Result<PhotoFile, CaptureError> {
        tokio::fs::create_dir_all(&self.capture_dir).await?;
        let path = capture_target(&self.capture_dir);

        let output = Command::new(&self.ffmpeg)
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-f")
            .arg("video4linux2")
            .arg("-i")
            .arg(&self.device)
            .arg("-frames:v")
            .arg("1")
            .arg("-y")
            .arg(&path)
            .output()
            .await
            .map_err(|e| CaptureError::Device(format!("failed to run {}: {}", self.ffmpeg, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::Device(format!(
                "{} exited with {}: {}",
                self.ffmpeg,
                output.status,
                stderr.trim()
            )));
        }

        debug!(device = %self.device.display(), path = %path.display(), "Frame grabbed");
        Ok(PhotoFile { path })
    }
}

// ============================================================================
// File Camera
// ============================================================================

/// Still image source, for machines without a camera
pub struct FileCamera {
    source: PathBuf,
    capture_dir: PathBuf,
}

impl FileCamera {
    pub fn new(source: impl Into<PathBuf>, capture_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            capture_dir: capture_dir.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[async_trait]
impl Camera for FileCamera {
    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn is_ready(&self) -> bool {
        tokio::fs::metadata(&self.source)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    fn is_active(&self) -> bool {
        true
    }

    async fn take_photo(&self) -> Result<PhotoFile, CaptureError> {
        tokio::fs::create_dir_all(&self.capture_dir).await?;
        let path = capture_target(&self.capture_dir);
        tokio::fs::copy(&self.source, &path).await?;
        Ok(PhotoFile { path })
    }
}

// ============================================================================
// Configured Camera
// ============================================================================

/// Camera selected by the `[camera]` config section
pub enum ConfiguredCamera {
    V4l2(V4l2Camera),
    File(FileCamera),
}

impl ConfiguredCamera {
    pub fn from_config(config: &CameraConfig) -> Result<Self, ConfigError> {
        let capture_dir = config.effective_capture_dir();
        match config.source {
            CameraSource::V4l2 => Ok(ConfiguredCamera::V4l2(
                V4l2Camera::new(&config.device, capture_dir).with_ffmpeg(&config.ffmpeg),
            )),
            CameraSource::File => {
                let photo = config.photo.as_ref().ok_or(ConfigError::MissingPhoto)?;
                Ok(ConfiguredCamera::File(FileCamera::new(photo, capture_dir)))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ConfiguredCamera::V4l2(camera) => format!("v4l2 {}", camera.device().display()),
            ConfiguredCamera::File(camera) => format!("file {}", camera.source().display()),
        }
    }
}

#[async_trait]
impl Camera for ConfiguredCamera {
    async fn request_permission(&self) -> PermissionStatus {
        match self {
            ConfiguredCamera::V4l2(camera) => camera.request_permission().await,
            ConfiguredCamera::File(camera) => camera.request_permission().await,
        }
    }

    async fn is_ready(&self) -> bool {
        match self {
            ConfiguredCamera::V4l2(camera) => camera.is_ready().await,
            ConfiguredCamera::File(camera) => camera.is_ready().await,
        }
    }

    fn is_active(&self) -> bool {
        match self {
            ConfiguredCamera::V4l2(camera) => camera.is_active(),
            ConfiguredCamera::File(camera) => camera.is_active(),
        }
    }

    async fn take_photo(&self) -> Result<PhotoFile, CaptureError> {
        match self {
            ConfiguredCamera::V4l2(camera) => camera.take_photo().await,
            ConfiguredCamera::File(camera) => camera.take_photo().await,
        }
    }
}

// ============================================================================
// Fake Camera (Testing)
// ============================================================================

/// Scripted camera for tests.
///
/// Captures are popped from the script in order; once it runs out every
/// capture succeeds with `fake-photo-N.jpg`.
pub struct FakeCamera {
    permission: PermissionStatus,
    active: bool,
    ready_after: usize,
    captures: Mutex<Vec<Result<PathBuf, String>>>,
    permission_requests: Mutex<usize>,
    readiness_polls: Mutex<usize>,
    capture_calls: Mutex<usize>,
}

impl FakeCamera {
    pub fn new(permission: PermissionStatus) -> Self {
        Self {
            permission,
            active: true,
            ready_after: 0,
            captures: Mutex::new(Vec::new()),
            permission_requests: Mutex::new(0),
            readiness_polls: Mutex::new(0),
            capture_calls: Mutex::new(0),
        }
    }

    /// Report "not ready" for the first `polls` readiness checks
    pub fn ready_after(mut self, polls: usize) -> Self {
        self.ready_after = polls;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Script capture results (`Err` carries the device error message)
    pub fn with_captures(self, captures: Vec<Result<PathBuf, String>>) -> Self {
        *self.captures.lock().unwrap() = captures;
        self
    }

    pub fn permission_requests(&self) -> usize {
        *self.permission_requests.lock().unwrap()
    }

    pub fn readiness_polls(&self) -> usize {
        *self.readiness_polls.lock().unwrap()
    }

    pub fn capture_count(&self) -> usize {
        *self.capture_calls.lock().unwrap()
    }
}

#[async_trait]
impl Camera for FakeCamera {
    async fn request_permission(&self) -> PermissionStatus {
        *self.permission_requests.lock().unwrap() += 1;
        self.permission
    }

    async fn is_ready(&self) -> bool {
        let mut polls = self.readiness_polls.lock().unwrap();
        *polls += 1;
        *polls > self.ready_after
    }

    fn is_active(&self) -> bool {
        self.active
    }

    async fn take_photo(&self) -> Result<PhotoFile, CaptureError> {
        let n = {
            let mut calls = self.capture_calls.lock().unwrap();
            *calls += 1;
            *calls
        };

        let mut captures = self.captures.lock().unwrap();
        if captures.is_empty() {
            return Ok(PhotoFile {
                path: PathBuf::from(format!("fake-photo-{}.jpg", n)),
            });
        }

        match captures.remove(0) {
            Ok(path) => Ok(PhotoFile { path }),
            Err(message) => Err(CaptureError::Device(message)),
        }
    }
}
