//! In-memory collaborators for driving the package pipelines

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use cloudpack::app::{
    ArtifactStream, BuildMode, BuildRecord, BuildRequest, BuildService, BuildStatus, Platform,
    Prompter,
};
use cloudpack::auth::{LoginHint, Session, SessionSource};
use cloudpack::errors::{AuthError, RemoteError, Result};

pub fn build(id: &str, status: BuildStatus, platform: Platform) -> BuildRecord {
    BuildRecord {
        id: id.to_string(),
        status,
        platform,
        mode: BuildMode::Release,
        created: Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap(),
        completed: None,
        name: Some("Weather".to_string()),
        url: None,
        output: None,
    }
}

pub fn finished(id: &str, platform: Platform) -> BuildRecord {
    BuildRecord {
        completed: Some(Utc.with_ymd_and_hms(2024, 5, 2, 9, 41, 0).unwrap()),
        url: Some(format!("https://cdn.example.com/artifacts/{}", id)),
        ..build(id, BuildStatus::Success, platform)
    }
}

/// Build service double recording every call
#[derive(Default)]
pub struct FakeService {
    pub builds: Vec<BuildRecord>,
    pub artifact: Vec<u8>,
    pub chunk_size: usize,
    pub calls: Mutex<Vec<String>>,
    pub submitted: Mutex<Vec<BuildRequest>>,
}

impl FakeService {
    pub fn with_builds(builds: Vec<BuildRecord>) -> Self {
        Self {
            builds,
            chunk_size: 4,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BuildService for FakeService {
    async fn submit_build(
        &self,
        _session: &Session,
        app_id: &str,
        request: BuildRequest,
    ) -> Result<BuildRecord> {
        self.record(format!("submit {}", app_id));
        let record = BuildRecord {
            mode: request.mode,
            ..build("100", BuildStatus::Queued, request.platform)
        };
        self.submitted.lock().unwrap().push(request);
        Ok(record)
    }

    async fn list_builds(&self, _session: &Session, app_id: &str) -> Result<Vec<BuildRecord>> {
        self.record(format!("list {}", app_id));
        Ok(self.builds.clone())
    }

    async fn get_build(
        &self,
        _session: &Session,
        app_id: &str,
        build_id: &str,
        with_output: bool,
    ) -> Result<BuildRecord> {
        self.record(format!("get {} {} output={}", app_id, build_id, with_output));
        self.builds
            .iter()
            .find(|b| b.id == build_id)
            .cloned()
            .ok_or_else(|| {
                RemoteError::Status {
                    status: 404,
                    message: format!("Build {} not found", build_id),
                }
                .into()
            })
    }

    async fn open_artifact(
        &self,
        _session: &Session,
        url: &str,
    ) -> Result<Box<dyn ArtifactStream>> {
        self.record(format!("open {}", url));
        Ok(Box::new(ChunkStream {
            chunks: self
                .artifact
                .chunks(self.chunk_size.max(1))
                .map(<[u8]>::to_vec)
                .collect(),
            total: self.artifact.len() as u64,
        }))
    }
}

pub struct ChunkStream {
    chunks: Vec<Vec<u8>>,
    total: u64,
}

#[async_trait]
impl ArtifactStream for ChunkStream {
    fn total_bytes(&self) -> Option<u64> {
        Some(self.total)
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.chunks.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.chunks.remove(0)))
        }
    }
}

/// Session source with an optional stored session
pub struct FakeSessions {
    pub stored: Option<Session>,
    pub reject: bool,
    pub retrievals: AtomicUsize,
    pub logins: AtomicUsize,
}

impl FakeSessions {
    pub fn logged_in() -> Self {
        Self {
            stored: Some(Session::new("token-abc", Some("dev@example.com".to_string()))),
            reject: false,
            retrievals: AtomicUsize::new(0),
            logins: AtomicUsize::new(0),
        }
    }

    pub fn logged_out() -> Self {
        Self {
            stored: None,
            ..Self::logged_in()
        }
    }

    pub fn touched(&self) -> bool {
        self.retrievals.load(Ordering::SeqCst) + self.logins.load(Ordering::SeqCst) > 0
    }
}

#[async_trait]
impl SessionSource for FakeSessions {
    async fn retrieve_session(&self) -> Result<Option<Session>> {
        self.retrievals.fetch_add(1, Ordering::SeqCst);
        Ok(self.stored.clone())
    }

    async fn login(&self, hint: &LoginHint, _prompter: &mut dyn Prompter) -> Result<Session> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(AuthError::LoginRejected { status: 401 }.into());
        }
        Ok(Session::new("fresh-token", hint.email.clone()))
    }
}
