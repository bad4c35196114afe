//! Build service boundary
//!
//! The pipelines talk to the remote build service only through
//! [`BuildService`], so they can be driven by [`crate::app::CloudBuildClient`]
//! in production and by in-memory doubles in tests.

use async_trait::async_trait;

use crate::app::models::{BuildMode, BuildRecord, Platform};
use crate::app::signing::SigningMaterial;
use crate::auth::Session;
use crate::errors::Result;

/// Everything sent when submitting a build job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub platform: Platform,
    pub mode: BuildMode,
    pub signing: SigningMaterial,
}

/// Artifact body arriving in chunks
#[async_trait]
pub trait ArtifactStream: Send {
    /// Total size, once the response has announced it
    fn total_bytes(&self) -> Option<u64>;

    /// Next chunk of the body, `None` at the end
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Operations offered by the remote build service
#[async_trait]
pub trait BuildService: Send + Sync {
    /// Submit a build job
    async fn submit_build(
        &self,
        session: &Session,
        app_id: &str,
        request: BuildRequest,
    ) -> Result<BuildRecord>;

    /// Build history, most recent first
    async fn list_builds(&self, session: &Session, app_id: &str) -> Result<Vec<BuildRecord>>;

    /// A single build; `with_output` also asks for the build log
    async fn get_build(
        &self,
        session: &Session,
        app_id: &str,
        build_id: &str,
        with_output: bool,
    ) -> Result<BuildRecord>;

    /// Start streaming the artifact at `url`
    async fn open_artifact(&self, session: &Session, url: &str)
        -> Result<Box<dyn ArtifactStream>>;
}
