//! Task implementations and the default task table

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::app::{
    build_info, download_build, list_builds, load_project, render_build_detail,
    render_build_list, report_submission, run_build, BuildPlan, CloudBuildClient,
    PackageContext, Prompter, RenderOptions, SigningFlags, TerminalPrompter,
};
use crate::auth::{FileSessionStore, LoginHint, SessionSource};
use crate::cli::args::{parse_task_args, LoginArgs, LogoutArgs, PackageAction, PackageArgs};
use crate::cli::progress::DownloadProgress;
use crate::cli::registry::{Task, TaskContext, TaskDescriptor, TaskRegistry};
use crate::config::AppConfig;
use crate::errors::{FilesystemError, Result, UsageError};

/// Registry holding `package` (alias `pack`), `login` and `logout`
pub fn default_registry() -> std::result::Result<TaskRegistry, UsageError> {
    let mut registry = TaskRegistry::new();
    registry.register(TaskDescriptor {
        name: "package",
        aliases: &["pack"],
        usage: "build|list|info|download",
        help_line: "Build, list and download app packages on the build service",
        factory: package_task,
    })?;
    registry.register(TaskDescriptor {
        name: "login",
        aliases: &[],
        usage: "[email]",
        help_line: "Log in to the build service",
        factory: login_task,
    })?;
    registry.register(TaskDescriptor {
        name: "logout",
        aliases: &[],
        usage: "",
        help_line: "Forget the stored session",
        factory: logout_task,
    })?;
    Ok(registry)
}

fn package_task() -> Box<dyn Task> {
    Box::new(PackageTask)
}

fn login_task() -> Box<dyn Task> {
    Box::new(LoginTask)
}

fn logout_task() -> Box<dyn Task> {
    Box::new(LogoutTask)
}

/// A validated `package` invocation
#[derive(Debug, Clone)]
pub enum PackageCommand {
    Build { plan: BuildPlan, flags: SigningFlags },
    List,
    Info { build_id: Option<String> },
    Download { build_id: Option<String> },
}

impl PackageCommand {
    /// Check subcommand and platform; performs no I/O
    pub fn from_args(args: PackageArgs) -> Result<Self> {
        let command = match args.action.ok_or(UsageError::MissingSubcommand)? {
            PackageAction::Build(build) => {
                let platform = build
                    .platform
                    .as_deref()
                    .ok_or(UsageError::MissingPlatform)?;
                PackageCommand::Build {
                    plan: BuildPlan::parse(platform, build.release)?,
                    flags: build.signing_flags(),
                }
            }
            PackageAction::List => PackageCommand::List,
            PackageAction::Info { build_id } => PackageCommand::Info { build_id },
            PackageAction::Download { build_id } => PackageCommand::Download { build_id },
        };
        Ok(command)
    }
}

/// Presentation settings for `package`
#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub list_limit: usize,
    /// Downloads are written here
    pub dest_dir: PathBuf,
    pub render: RenderOptions,
    pub show_progress: bool,
}

fn output_error(source: std::io::Error) -> FilesystemError {
    FilesystemError::Output(source)
}

/// Run a validated `package` command against the given collaborators
pub async fn execute_package(
    command: PackageCommand,
    ctx: &PackageContext<'_>,
    options: &PackageOptions,
    prompter: &mut dyn Prompter,
    out: &mut (dyn Write + Send),
) -> Result<()> {
    match command {
        PackageCommand::Build { plan, flags } => {
            let record = run_build(ctx, plan, &flags, prompter).await?;
            writeln!(out, "{}", report_submission(&record)).map_err(output_error)?;
        }
        PackageCommand::List => {
            let session = ctx.session(prompter).await?;
            let builds = list_builds(ctx, &session, options.list_limit).await?;
            write!(out, "{}", render_build_list(&builds, options.render)).map_err(output_error)?;
        }
        PackageCommand::Info { build_id } => {
            let session = ctx.session(prompter).await?;
            let build = build_info(ctx, &session, build_id.as_deref()).await?;
            write!(out, "{}", render_build_detail(&build, options.render.color))
                .map_err(output_error)?;
        }
        PackageCommand::Download { build_id } => {
            let session = ctx.session(prompter).await?;
            let mut progress = DownloadProgress::new(options.show_progress);
            let path = download_build(
                ctx,
                &session,
                build_id.as_deref(),
                &options.dest_dir,
                &mut |received, total| progress.update(received, total),
            )
            .await?;
            progress.finish();

            writeln!(out, "Wrote: {}", path.display()).map_err(output_error)?;
            writeln!(out, "Done!").map_err(output_error)?;
        }
    }
    Ok(())
}

fn session_store(config: &AppConfig) -> Result<FileSessionStore> {
    let client_config = config.to_runtime_config()?;
    FileSessionStore::new(config.session_path()?, &client_config)
}

/// `package build|list|info|download`
pub struct PackageTask;

#[async_trait]
impl Task for PackageTask {
    async fn run(&self, ctx: TaskContext) -> Result<()> {
        let args: PackageArgs = parse_task_args("package", &ctx.args)?;
        let command = PackageCommand::from_args(args)?;

        let project = load_project(&ctx.working_dir).await?;
        let client_config = ctx.config.to_runtime_config()?;
        let service = CloudBuildClient::new(client_config.clone())?;
        let sessions = FileSessionStore::new(ctx.config.session_path()?, &client_config)?;

        let package_ctx = PackageContext {
            app_id: &project.app_id,
            service: &service,
            sessions: &sessions,
            login_hint: LoginHint::from_env(),
        };
        let options = PackageOptions {
            list_limit: ctx.config.package.list_limit,
            dest_dir: ctx.working_dir.clone(),
            render: RenderOptions::detect(),
            show_progress: !ctx.quiet && atty::is(atty::Stream::Stderr),
        };

        execute_package(
            command,
            &package_ctx,
            &options,
            &mut TerminalPrompter,
            &mut std::io::stdout(),
        )
        .await
    }
}

/// `login [email]`
pub struct LoginTask;

#[async_trait]
impl Task for LoginTask {
    async fn run(&self, ctx: TaskContext) -> Result<()> {
        let args: LoginArgs = parse_task_args("login", &ctx.args)?;
        let store = session_store(&ctx.config)?;
        let hint = LoginHint::from_env().with_email(args.email());

        let session = store.login(&hint, &mut TerminalPrompter).await?;
        match session.email() {
            Some(email) => println!("Logged in as {}.", email),
            None => println!("Logged in."),
        }
        debug!("Session saved to {}", store.path().display());
        Ok(())
    }
}

/// `logout`
pub struct LogoutTask;

#[async_trait]
impl Task for LogoutTask {
    async fn run(&self, ctx: TaskContext) -> Result<()> {
        let _: LogoutArgs = parse_task_args("logout", &ctx.args)?;
        let store = session_store(&ctx.config)?;

        if store.clear().await? {
            println!("Logged out.");
        } else {
            println!("Not logged in.");
        }
        Ok(())
    }
}
