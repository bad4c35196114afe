//! Build submission pipeline
//!
//! `ValidatePlatform -> AcquireSession -> CollectCredentials -> Submit`, each
//! stage producing the typed input of the next. A failing stage ends the
//! pipeline; nothing is re-entered. Signing input is collected only after a
//! session exists and is submitted only once complete.

use tracing::{debug, info};

use crate::app::builds::PackageContext;
use crate::app::models::{BuildMode, BuildRecord, Platform};
use crate::app::prompt::Prompter;
use crate::app::service::BuildRequest;
use crate::app::signing::{collect_credentials, requires_credentials, SigningBundle, SigningFlags};
use crate::auth::Session;
use crate::errors::Result;

/// Output of platform validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildPlan {
    pub platform: Platform,
    pub mode: BuildMode,
}

impl BuildPlan {
    /// Validate the platform token; performs no I/O
    pub fn parse(platform: &str, release: bool) -> Result<Self> {
        Ok(Self {
            platform: platform.parse()?,
            mode: BuildMode::from_release_flag(release),
        })
    }

    pub fn requires_credentials(&self) -> bool {
        requires_credentials(self.platform, self.mode)
    }
}

/// Plan plus the session it will be submitted under
struct Authenticated {
    plan: BuildPlan,
    session: Session,
}

/// Authenticated plan with a complete signing bundle
struct Signed {
    plan: BuildPlan,
    session: Session,
    bundle: SigningBundle,
}

async fn acquire_session(
    ctx: &PackageContext<'_>,
    plan: BuildPlan,
    prompter: &mut dyn Prompter,
) -> Result<Authenticated> {
    let session = ctx.session(prompter).await?;
    Ok(Authenticated { plan, session })
}

fn collect_signing(
    stage: Authenticated,
    flags: &SigningFlags,
    prompter: &mut dyn Prompter,
) -> Result<Signed> {
    let bundle = if stage.plan.requires_credentials() {
        collect_credentials(stage.plan.platform, stage.plan.mode, flags, prompter)?
    } else {
        debug!("{} {} build needs no signing input", stage.plan.platform, stage.plan.mode);
        SigningBundle::Unsigned
    };

    Ok(Signed {
        plan: stage.plan,
        session: stage.session,
        bundle,
    })
}

async fn submit(ctx: &PackageContext<'_>, stage: Signed) -> Result<BuildRecord> {
    let signing = stage.bundle.open().await?;
    let request = BuildRequest {
        platform: stage.plan.platform,
        mode: stage.plan.mode,
        signing,
    };

    let record = ctx
        .service
        .submit_build(&stage.session, ctx.app_id, request)
        .await?;
    info!("Build {} submitted ({})", record.id, record.status);
    Ok(record)
}

/// Run an already validated plan through the remaining stages
pub async fn run_build(
    ctx: &PackageContext<'_>,
    plan: BuildPlan,
    flags: &SigningFlags,
    prompter: &mut dyn Prompter,
) -> Result<BuildRecord> {
    let authenticated = acquire_session(ctx, plan, prompter).await?;
    let signed = collect_signing(authenticated, flags, prompter)?;
    submit(ctx, signed).await
}

/// Full pipeline from the raw platform token
pub async fn submit_build(
    ctx: &PackageContext<'_>,
    platform: &str,
    release: bool,
    flags: &SigningFlags,
    prompter: &mut dyn Prompter,
) -> Result<BuildRecord> {
    let plan = BuildPlan::parse(platform, release)?;
    run_build(ctx, plan, flags, prompter).await
}

/// Report printed after a successful submission
pub fn report_submission(record: &BuildRecord) -> String {
    format!(
        "Build {} submitted: {} {} build is {}.\nCheck on it with 'cloudpack package info {}'.",
        record.id, record.platform, record.mode, record.status, record.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::BuildStatus;
    use crate::errors::{AppError, ValidationError};
    use chrono::Utc;

    #[test]
    fn test_plan_parse() {
        let plan = BuildPlan::parse("ios", false).unwrap();
        assert_eq!(plan.platform, Platform::Ios);
        assert_eq!(plan.mode, BuildMode::Debug);
        assert!(plan.requires_credentials());

        let plan = BuildPlan::parse("android", false).unwrap();
        assert!(!plan.requires_credentials());

        let plan = BuildPlan::parse("android", true).unwrap();
        assert!(plan.requires_credentials());
    }

    #[test]
    fn test_plan_rejects_unknown_platform() {
        assert!(matches!(
            BuildPlan::parse("windows", true),
            Err(AppError::Validation(ValidationError::InvalidPlatform { .. }))
        ));
    }

    #[test]
    fn test_report_mentions_id_and_status() {
        let record = BuildRecord {
            id: "17".to_string(),
            status: BuildStatus::Queued,
            platform: Platform::Android,
            mode: BuildMode::Release,
            created: Utc::now(),
            completed: None,
            name: None,
            url: None,
            output: None,
        };
        let report = report_submission(&record);
        assert!(report.contains("Build 17 submitted"));
        assert!(report.contains("QUEUED"));
        assert!(report.contains("package info 17"));
    }
}
