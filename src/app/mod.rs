//! Core application logic for cloudpack
//!
//! This module contains the build service client, data models, signing
//! credential collection and the build orchestration pipelines.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cloudpack::app::{
//!     list_builds, render_build_list, ClientConfig, CloudBuildClient, PackageContext,
//!     RenderOptions, TerminalPrompter,
//! };
//! use cloudpack::auth::{FileSessionStore, LoginHint};
//!
//! # async fn example() -> cloudpack::Result<()> {
//! let config = ClientConfig::default();
//! let service = CloudBuildClient::new(config.clone())?;
//! let sessions = FileSessionStore::new(FileSessionStore::default_path()?, &config)?;
//! let ctx = PackageContext {
//!     app_id: "a1b2c3",
//!     service: &service,
//!     sessions: &sessions,
//!     login_hint: LoginHint::from_env(),
//! };
//!
//! let session = ctx.session(&mut TerminalPrompter).await?;
//! let builds = list_builds(&ctx, &session, 25).await?;
//! print!("{}", render_build_list(&builds, RenderOptions::detect()));
//! # Ok(())
//! # }
//! ```

pub mod builds;
pub mod client;
pub mod models;
pub mod project;
pub mod prompt;
pub mod service;
pub mod signing;

// Re-export main public API
pub use builds::{
    artifact_filename, build_info, download_build, list_builds, render_build_detail,
    render_build_list, report_submission, resolve_build_id, run_build, select_columns,
    submit_build, BuildPlan, Column, PackageContext, RenderOptions,
};
pub use client::{ClientConfig, CloudBuildClient};
pub use models::{
    determine_file_extension, BuildMode, BuildRecord, BuildStatus, Platform, ProjectRef,
};
pub use project::load_project;
pub use prompt::{Prompter, ScriptedPrompter, TerminalPrompter};
pub use service::{ArtifactStream, BuildRequest, BuildService};
pub use signing::{collect_credentials, SigningBundle, SigningFlags, SigningMaterial};
