//! Shared library for the Kalori food photo analyzer.
//!
//! Holds the capture → preview → upload session machine, the camera
//! capabilities it drives, the analysis service client and configuration.
//! The `kalori` binary only adds the terminal surface on top.

pub mod artifact;
pub mod camera;
pub mod capture;
pub mod config;
pub mod orchestrator;
pub mod permission;
pub mod presenter;
pub mod preview;
pub mod session;
pub mod upload;

pub use artifact::{PhotoArtifact, PhotoFile, JPEG_MIME};
pub use camera::{Camera, ConfiguredCamera, FakeCamera, FileCamera, PermissionStatus, V4l2Camera};
pub use capture::{CaptureError, CaptureSession};
pub use config::{CameraSource, ConfigError, KaloriConfig};
pub use orchestrator::{Orchestrator, ScriptedSurface, SessionError, Surface, UserAction};
pub use permission::PermissionGate;
pub use presenter::{present, Alert};
pub use preview::PreviewState;
pub use session::{transition, BlockReason, Effect, Event, SessionState, Step, View};
pub use upload::{AnalysisResult, FakeUploader, HttpUploadClient, UploadError, UploadOutcome, Uploader};

/// Version of the shared library, reported in the HTTP user agent
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
