//! Preview state - the pending photo and the retake/use decision

use tracing::debug;

use crate::artifact::PhotoArtifact;

/// Exclusive holder of a freshly captured artifact.
///
/// Both decisions consume the preview, so the artifact can only go one way.
#[derive(Debug)]
pub struct PreviewState {
    artifact: PhotoArtifact,
}

impl PreviewState {
    pub fn new(artifact: PhotoArtifact) -> Self {
        Self { artifact }
    }

    pub fn artifact(&self) -> &PhotoArtifact {
        &self.artifact
    }

    /// Retake: drop the reference. The file itself is left to the platform.
    pub fn discard(self) {
        debug!(path = %self.artifact.path().display(), "Photo discarded");
    }

    /// Use the photo: hand the artifact over to the upload step
    pub fn accept(self) -> PhotoArtifact {
        debug!(path = %self.artifact.path().display(), "Photo accepted");
        self.artifact
    }
}
