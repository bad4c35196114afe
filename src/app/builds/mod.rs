//! Remote build orchestration
//!
//! - `submit`: validate, authenticate, collect signing input, submit
//! - `listing`: build history and single-build detail, rendered for the terminal
//! - `retrieve`: artifact download for finished builds
//!
//! Every remote call within one operation is awaited in sequence; nothing is
//! fanned out or retried.

pub mod listing;
pub mod retrieve;
pub mod submit;

use crate::app::prompt::Prompter;
use crate::app::service::BuildService;
use crate::auth::{LoginHint, Session, SessionManager, SessionSource};
use crate::errors::Result;

pub use listing::{
    build_info, list_builds, render_build_detail, render_build_list, resolve_build_id,
    select_columns, Column, RenderOptions,
};
pub use retrieve::{artifact_filename, download_build};
pub use submit::{report_submission, run_build, submit_build, BuildPlan};

/// Collaborators shared by the `package` operations
pub struct PackageContext<'a> {
    /// Remote app the operations act on
    pub app_id: &'a str,
    pub service: &'a dyn BuildService,
    pub sessions: &'a dyn SessionSource,
    pub login_hint: LoginHint,
}

impl<'a> PackageContext<'a> {
    /// Session for this invocation, logging in if nothing is stored
    pub async fn session(&self, prompter: &mut dyn Prompter) -> Result<Session> {
        SessionManager::new(self.sessions)
            .acquire(&self.login_hint, prompter)
            .await
    }
}
