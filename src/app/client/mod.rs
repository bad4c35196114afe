//! HTTP client for the remote build service
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: request sending and error decoding
//! - `download`: artifact streaming to disk

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::app::models::{BuildEnvelope, BuildList, BuildRecord};
use crate::app::service::{ArtifactStream, BuildRequest, BuildService};
use crate::auth::Session;
use crate::errors::{RemoteError, Result};

pub mod config;
pub mod download;
pub mod http;

pub use config::ClientConfig;
pub use download::{stream_to_file, ResponseStream};

use http::HttpHandler;

/// [`BuildService`] backed by the build service's HTTP API
#[derive(Debug, Clone)]
pub struct CloudBuildClient {
    http_handler: HttpHandler,
    config: ClientConfig,
}

impl CloudBuildClient {
    /// Creates a client for the service at `config.base_url`
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = config.build_http_client()?;
        tracing::debug!("Created build service client for {}", config.base_url);
        Ok(Self {
            http_handler: HttpHandler::new(client),
            config,
        })
    }

    /// `apps/<app_id>/builds`
    fn builds_url(&self, app_id: &str) -> Result<Url> {
        Ok(self.config.endpoint(&format!("apps/{}/builds", app_id))?)
    }

    /// `apps/<app_id>/builds/<id>`, optionally asking for the build output
    fn build_url(&self, app_id: &str, build_id: &str, with_output: bool) -> Result<Url> {
        let mut url = self
            .config
            .endpoint(&format!("apps/{}/builds/{}", app_id, build_id))?;
        if with_output {
            url.query_pairs_mut().append_pair("fields", "output");
        }
        Ok(url)
    }
}

/// Multipart body for a build submission
fn build_form(request: BuildRequest) -> Result<Form> {
    let mut form = Form::new()
        .text("platform", request.platform.as_str())
        .text("build_mode", request.mode.as_str());

    for (name, value) in request.signing.fields {
        form = form.text(name, value);
    }

    for file in request.signing.files {
        let part = Part::bytes(file.contents)
            .file_name(file.file_name)
            .mime_str("application/octet-stream")?;
        form = form.part(file.field, part);
    }

    Ok(form)
}

#[async_trait]
impl BuildService for CloudBuildClient {
    async fn submit_build(
        &self,
        session: &Session,
        app_id: &str,
        request: BuildRequest,
    ) -> Result<BuildRecord> {
        let url = self.builds_url(app_id)?;
        tracing::info!(
            "Submitting {} {} build for app {}",
            request.platform,
            request.mode,
            app_id
        );

        let form = build_form(request)?;
        let response = http::send(http::authorize(
            self.http_handler.client().post(url.as_str()).multipart(form),
            session,
        ))
        .await?;

        http::read_json(response).await
    }

    async fn list_builds(&self, session: &Session, app_id: &str) -> Result<Vec<BuildRecord>> {
        let url = self.builds_url(app_id)?;
        let list: BuildList = self.http_handler.get_json(&url, session).await?;
        tracing::debug!("Service returned {} builds", list.data.len());
        Ok(list.data)
    }

    async fn get_build(
        &self,
        session: &Session,
        app_id: &str,
        build_id: &str,
        with_output: bool,
    ) -> Result<BuildRecord> {
        let url = self.build_url(app_id, build_id, with_output)?;
        let envelope: BuildEnvelope = self.http_handler.get_json(&url, session).await?;
        Ok(envelope.data)
    }

    async fn open_artifact(
        &self,
        session: &Session,
        url: &str,
    ) -> Result<Box<dyn ArtifactStream>> {
        let url = Url::parse(url).map_err(|e| RemoteError::Malformed {
            reason: format!("invalid artifact URL '{}': {}", url, e),
        })?;

        // Artifacts may live on a different host; only send the token home
        let mut request = self
            .http_handler
            .client()
            .get(url.as_str())
            .timeout(self.config.download_timeout);
        if url.origin() == self.config.base_url.origin() {
            request = http::authorize(request, session);
        }

        let response = http::send(request).await?;
        Ok(Box::new(ResponseStream::new(response)))
    }
}
