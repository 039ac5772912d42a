//! Session state machine
//!
//! Lifecycle of one capture-to-result cycle, repeated for as long as the
//! program runs:
//! 1. Blocked - waiting on permission and camera readiness
//! 2. Capturing - live camera, capture control enabled
//! 3. Previewing - one photo held, retake or use
//! 4. Uploading - the photo is with the analysis service, loading shown
//! 5. ShowingResult - alert on screen, then straight back to Capturing
//!
//! `transition` is pure: it takes the current state by value and returns the
//! next one plus the effect the driver must perform. The artifact moves
//! through the states; at most one exists at any time.

use std::fmt;
use tracing::debug;

use crate::artifact::PhotoArtifact;
use crate::camera::PermissionStatus;
use crate::preview::PreviewState;
use crate::upload::UploadOutcome;

// ============================================================================
// States
// ============================================================================

/// Why the capture UI is not usable yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Device not resolved yet ("Loading camera...")
    AwaitingCamera,
    /// Access refused; terminal for the session
    PermissionDenied,
}

impl BlockReason {
    pub fn message(&self) -> &'static str {
        match self {
            BlockReason::AwaitingCamera => "Loading camera...",
            BlockReason::PermissionDenied => "No camera permission",
        }
    }
}

#[derive(Debug)]
pub enum SessionState {
    Blocked(BlockReason),
    Capturing,
    Previewing(PreviewState),
    Uploading(PhotoArtifact),
    ShowingResult,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Blocked(BlockReason::AwaitingCamera)
    }
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Blocked(BlockReason::AwaitingCamera) => "blocked(awaiting_camera)",
            SessionState::Blocked(BlockReason::PermissionDenied) => "blocked(permission_denied)",
            SessionState::Capturing => "capturing",
            SessionState::Previewing(_) => "previewing",
            SessionState::Uploading(_) => "uploading",
            SessionState::ShowingResult => "showing_result",
        }
    }

    /// The artifact held by this state, if any
    pub fn artifact(&self) -> Option<&PhotoArtifact> {
        match self {
            SessionState::Previewing(preview) => Some(preview.artifact()),
            SessionState::Uploading(artifact) => Some(artifact),
            _ => None,
        }
    }

    /// A denied session never leaves the blocked state
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Blocked(BlockReason::PermissionDenied))
    }

    /// Screen to show for this state
    pub fn view(&self) -> View<'_> {
        match self {
            SessionState::Blocked(reason) => View::Blocked(*reason),
            SessionState::Capturing | SessionState::ShowingResult => View::Camera,
            SessionState::Previewing(preview) => View::Preview(preview.artifact()),
            SessionState::Uploading(_) => View::Loading,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the surface should display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    Blocked(BlockReason),
    Camera,
    Preview(&'a PhotoArtifact),
    /// Modal progress indicator, the only sign of an upload in flight
    Loading,
}

impl View<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            View::Blocked(_) => "blocked",
            View::Camera => "camera",
            View::Preview(_) => "preview",
            View::Loading => "loading",
        }
    }
}

// ============================================================================
// Events and Effects
// ============================================================================

#[derive(Debug)]
pub enum Event {
    /// Result of the startup permission and device checks
    Readiness {
        permission: PermissionStatus,
        camera_ready: bool,
    },
    CaptureRequested,
    CaptureSucceeded(PhotoArtifact),
    CaptureFailed,
    Retake,
    Confirm,
    UploadFinished(UploadOutcome),
    ResultDismissed,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Readiness { .. } => "readiness",
            Event::CaptureRequested => "capture_requested",
            Event::CaptureSucceeded(_) => "capture_succeeded",
            Event::CaptureFailed => "capture_failed",
            Event::Retake => "retake",
            Event::Confirm => "confirm",
            Event::UploadFinished(_) => "upload_finished",
            Event::ResultDismissed => "result_dismissed",
        }
    }
}

/// Work the driver performs after a transition
#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    /// Take a photo with the capture session
    Capture,
    /// Upload the artifact now held by `Uploading`
    Upload,
    /// Show the outcome to the user
    Present(UploadOutcome),
    /// Event not valid in the current state; nothing changed
    Ignored,
}

#[derive(Debug)]
pub struct Step {
    pub state: SessionState,
    pub effect: Effect,
}

impl Step {
    fn to(state: SessionState) -> Self {
        Self {
            state,
            effect: Effect::None,
        }
    }

    fn with(state: SessionState, effect: Effect) -> Self {
        Self { state, effect }
    }
}

// ============================================================================
// Transition
// ============================================================================

pub fn transition(state: SessionState, event: Event) -> Step {
    use SessionState::*;

    match (state, event) {
        (
            Blocked(BlockReason::AwaitingCamera),
            Event::Readiness {
                permission,
                camera_ready,
            },
        ) => match (permission, camera_ready) {
            (PermissionStatus::Denied, _) => Step::to(Blocked(BlockReason::PermissionDenied)),
            (PermissionStatus::Granted, true) => Step::to(Capturing),
            (PermissionStatus::Granted, false) => Step::to(Blocked(BlockReason::AwaitingCamera)),
        },

        (Capturing, Event::CaptureRequested) => Step::with(Capturing, Effect::Capture),
        (Capturing, Event::CaptureSucceeded(artifact)) => {
            Step::to(Previewing(PreviewState::new(artifact)))
        }
        (Capturing, Event::CaptureFailed) => Step::to(Capturing),

        (Previewing(preview), Event::Retake) => {
            preview.discard();
            Step::to(Capturing)
        }
        (Previewing(preview), Event::Confirm) => {
            Step::with(Uploading(preview.accept()), Effect::Upload)
        }

        // The artifact is dropped here, whatever the outcome
        (Uploading(_), Event::UploadFinished(outcome)) => {
            Step::with(ShowingResult, Effect::Present(outcome))
        }

        (ShowingResult, Event::ResultDismissed) => Step::to(Capturing),

        (state, event) => {
            debug!(state = state.name(), event = event.name(), "Event ignored");
            Step::with(state, Effect::Ignored)
        }
    }
}
