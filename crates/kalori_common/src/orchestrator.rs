//! Session orchestrator - drives the state machine against real capabilities
//!
//! The orchestrator owns the session state, the capture session and the
//! uploader, and talks to the user through a `Surface`. Capture and upload are
//! awaited inline, so no user action is read while either is in flight.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::camera::Camera;
use crate::capture::CaptureSession;
use crate::permission::PermissionGate;
use crate::presenter::{present, Alert};
use crate::session::{transition, BlockReason, Effect, Event, SessionState, Step, View};
use crate::upload::{UploadOutcome, Uploader};

/// Default pause between camera readiness checks
const READINESS_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No camera permission")]
    PermissionDenied,
}

/// Controls offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Capture,
    Retake,
    Confirm,
    Quit,
}

// ============================================================================
// Surface Trait
// ============================================================================

/// The user-facing side of a session
#[async_trait]
pub trait Surface: Send {
    /// Show a view. `View::Loading` stays up until the next render.
    async fn render(&mut self, view: View<'_>);

    /// Wait for the next user action. `None` ends the session.
    async fn next_action(&mut self) -> Option<UserAction>;

    /// Show a modal alert
    async fn alert(&mut self, alert: &Alert);
}

// ============================================================================
// Orchestrator
// ============================================================================

pub struct Orchestrator<C, U> {
    gate: PermissionGate,
    capture: CaptureSession<C>,
    uploader: U,
    state: SessionState,
    readiness_interval: Duration,
}

impl<C: Camera, U: Uploader> Orchestrator<C, U> {
    pub fn new(camera: C, uploader: U) -> Self {
        Self {
            gate: PermissionGate::new(),
            capture: CaptureSession::new(camera),
            uploader,
            state: SessionState::default(),
            readiness_interval: READINESS_INTERVAL,
        }
    }

    pub fn with_readiness_interval(mut self, interval: Duration) -> Self {
        self.readiness_interval = interval;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn camera(&self) -> &C {
        self.capture.camera()
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// Run the capture loop until the user quits or input ends
    pub async fn run<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<(), SessionError> {
        if self.resolve_readiness(surface).await? {
            loop {
                surface.render(self.state.view()).await;
                let Some(action) = surface.next_action().await else {
                    break;
                };
                if action == UserAction::Quit {
                    break;
                }
                self.handle(action, surface).await;
            }
        }

        info!("Session ended");
        Ok(())
    }

    /// Ask for permission once, then hold the blocked view until the camera resolves.
    ///
    /// Input is still read while waiting: `Quit` gives up and returns `Ok(false)`,
    /// other actions are dropped. Once input ends the wait continues on its own.
    pub async fn resolve_readiness<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<bool, SessionError> {
        let permission = self.gate.request_access(self.capture.camera()).await;
        let mut input_open = true;

        loop {
            let camera_ready = permission.is_granted() && self.capture.camera().is_ready().await;
            self.dispatch(Event::Readiness {
                permission,
                camera_ready,
            });

            match &self.state {
                SessionState::Capturing => return Ok(true),
                SessionState::Blocked(BlockReason::PermissionDenied) => {
                    surface.render(self.state.view()).await;
                    return Err(SessionError::PermissionDenied);
                }
                _ => {
                    surface.render(self.state.view()).await;
                    if !input_open {
                        tokio::time::sleep(self.readiness_interval).await;
                        continue;
                    }
                    tokio::select! {
                        _ = tokio::time::sleep(self.readiness_interval) => {}
                        action = surface.next_action() => match action {
                            Some(UserAction::Quit) => {
                                info!("Quit while waiting for the camera");
                                return Ok(false);
                            }
                            Some(other) => debug!(action = ?other, "Ignored while camera is loading"),
                            None => input_open = false,
                        },
                    }
                }
            }
        }
    }

    /// Apply one user action and run every effect it triggers
    pub async fn handle<S: Surface + ?Sized>(&mut self, action: UserAction, surface: &mut S) {
        let event = match action {
            UserAction::Capture => Event::CaptureRequested,
            UserAction::Retake => Event::Retake,
            UserAction::Confirm => Event::Confirm,
            UserAction::Quit => return,
        };

        let mut effect = self.dispatch(event);
        loop {
            effect = match effect {
                Effect::None | Effect::Ignored => break,
                Effect::Capture => match self.capture.capture().await {
                    Ok(artifact) => self.dispatch(Event::CaptureSucceeded(artifact)),
                    Err(e) => {
                        error!(error = %e, "Failed to take photo");
                        self.dispatch(Event::CaptureFailed)
                    }
                },
                Effect::Upload => {
                    surface.render(View::Loading).await;
                    let outcome = match &self.state {
                        SessionState::Uploading(artifact) => self.uploader.upload(artifact).await,
                        other => {
                            warn!(state = other.name(), "Upload effect without an artifact");
                            break;
                        }
                    };
                    self.dispatch(Event::UploadFinished(outcome))
                }
                Effect::Present(outcome) => {
                    log_outcome(&outcome);
                    surface.alert(&present(&outcome)).await;
                    self.dispatch(Event::ResultDismissed)
                }
            };
        }
    }

    fn dispatch(&mut self, event: Event) -> Effect {
        let from = self.state.name();
        let event_name = event.name();
        let Step { state, effect } = transition(std::mem::take(&mut self.state), event);
        debug!(from, to = state.name(), event = event_name, "Session transition");
        self.state = state;
        effect
    }
}

fn log_outcome(outcome: &UploadOutcome) {
    match outcome {
        UploadOutcome::Success(result) => info!(
            food = %result.food_name,
            calories = %result.calorie_text(),
            "Analysis complete"
        ),
        UploadOutcome::Failure(e) => error!(kind = e.kind(), error = %e, "Upload failed"),
    }
}

// ============================================================================
// Scripted Surface (Testing)
// ============================================================================

/// Surface that replays scripted actions and records what it was shown
#[derive(Debug, Default)]
pub struct ScriptedSurface {
    actions: VecDeque<UserAction>,
    views: Vec<String>,
    alerts: Vec<Alert>,
}

impl ScriptedSurface {
    pub fn new(actions: Vec<UserAction>) -> Self {
        Self {
            actions: actions.into(),
            ..Default::default()
        }
    }

    /// Names of every rendered view, in order
    pub fn views(&self) -> &[String] {
        &self.views
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }
}

#[async_trait]
impl Surface for ScriptedSurface {
    async fn render(&mut self, view: View<'_>) {
        self.views.push(view.name().to_string());
    }

    async fn next_action(&mut self) -> Option<UserAction> {
        self.actions.pop_front()
    }

    async fn alert(&mut self, alert: &Alert) {
        self.alerts.push(alert.clone());
    }
}
