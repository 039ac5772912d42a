//! Permission gate - camera access is requested exactly once per process

use tokio::sync::OnceCell;
use tracing::info;

use crate::camera::{Camera, PermissionStatus};

/// Caches the first permission answer so the platform prompt fires only once
#[derive(Debug, Default)]
pub struct PermissionGate {
    status: OnceCell<PermissionStatus>,
}

impl PermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request camera access, or return the cached answer.
    ///
    /// There is no retry: a denial stays a denial for the life of the gate.
    pub async fn request_access<C: Camera + ?Sized>(&self, camera: &C) -> PermissionStatus {
        *self
            .status
            .get_or_init(|| async {
                let status = camera.request_permission().await;
                info!(status = status.as_str(), "Camera permission resolved");
                status
            })
            .await
    }

    /// Answer of the earlier request, if one was made
    pub fn status(&self) -> Option<PermissionStatus> {
        self.status.get().copied()
    }
}
