//! Command-line argument parsing for cloudpack
//!
//! The top-level parser only separates global options from the task token;
//! each task parses its remaining arguments with its own clap parser so the
//! registry stays the single source of task names.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};

use crate::app::SigningFlags;
use crate::errors::UsageError;

/// cloudpack - package hybrid mobile apps on a remote build service
#[derive(Parser, Debug)]
#[command(
    name = "cloudpack",
    version,
    about = "Submit, track and download remote mobile app builds",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Task to run (package, login, logout)
    #[arg(value_name = "TASK")]
    pub task: Option<String>,

    /// Arguments passed to the task
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Global arguments available to all tasks
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long)]
    pub very_verbose: bool,

    /// Quiet mode - only report errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the appropriate log level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

/// Arguments for the `package` task
#[derive(Parser, Debug)]
#[command(name = "package", about = "Build and download app packages")]
pub struct PackageArgs {
    #[command(subcommand)]
    pub action: Option<PackageAction>,
}

/// `package` subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PackageAction {
    /// Submit a build to the build service
    Build(BuildArgs),

    /// Show your latest builds
    List,

    /// Show details and output of a build (default: most recent)
    Info {
        #[arg(value_name = "BUILD_ID")]
        build_id: Option<String>,
    },

    /// Download a finished build (default: most recent)
    Download {
        #[arg(value_name = "BUILD_ID")]
        build_id: Option<String>,
    },
}

/// Arguments for `package build`
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildArgs {
    /// Target platform: android or ios
    #[arg(value_name = "PLATFORM")]
    pub platform: Option<String>,

    /// Build in release mode
    #[arg(long)]
    pub release: bool,

    /// Android keystore file
    #[arg(short = 's', long, value_name = "FILE")]
    pub keystore: Option<String>,

    /// Keystore password (android) or certificate password (ios)
    #[arg(short = 'p', long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Android key alias
    #[arg(short = 'k', long, value_name = "ALIAS")]
    pub key_alias: Option<String>,

    /// Android key password
    #[arg(short = 'w', long, value_name = "PASSWORD")]
    pub key_password: Option<String>,

    /// iOS signing certificate (.p12)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub cert: Option<String>,

    /// iOS provisioning profile
    #[arg(short = 'r', long, value_name = "FILE")]
    pub provisioning_profile: Option<String>,
}

impl BuildArgs {
    /// Prompt pre-fill values
    pub fn signing_flags(&self) -> SigningFlags {
        SigningFlags {
            keystore: self.keystore.clone(),
            password: self.password.clone(),
            key_alias: self.key_alias.clone(),
            key_password: self.key_password.clone(),
            cert: self.cert.clone(),
            provisioning_profile: self.provisioning_profile.clone(),
        }
    }
}

/// Arguments for the `login` task
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "login", about = "Log in to the build service")]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    #[arg(value_name = "EMAIL")]
    pub email: Option<String>,

    /// Account email, as an option
    #[arg(long = "email", value_name = "EMAIL", conflicts_with = "email")]
    pub email_option: Option<String>,
}

impl LoginArgs {
    /// Email given either way, if any
    pub fn email(&self) -> Option<String> {
        self.email.clone().or_else(|| self.email_option.clone())
    }
}

/// Arguments for the `logout` task
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "logout", about = "Forget the stored session")]
pub struct LogoutArgs {}

/// Parse a task's own arguments
///
/// `--help` and `--version` print and exit like any clap parser; every other
/// parse failure becomes a [`UsageError`].
pub fn parse_task_args<T: Parser>(task: &str, args: &[String]) -> Result<T, UsageError> {
    let argv = std::iter::once(task.to_string()).chain(args.iter().cloned());
    T::try_parse_from(argv).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        _ => UsageError::InvalidArguments(e.to_string().trim_end().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_log_level() {
        let quiet = Cli::parse_from(["cloudpack", "-q", "package"]);
        let verbose = Cli::parse_from(["cloudpack", "-v", "package"]);
        let very_verbose = Cli::parse_from(["cloudpack", "--very-verbose", "package"]);
        let default = Cli::parse_from(["cloudpack", "package"]);

        assert_eq!(quiet.log_level(), tracing::Level::ERROR);
        assert_eq!(verbose.log_level(), tracing::Level::INFO);
        assert_eq!(very_verbose.log_level(), tracing::Level::DEBUG);
        assert_eq!(default.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_task_arguments_pass_through() {
        let cli = Cli::parse_from(["cloudpack", "package", "build", "ios", "-p", "secret", "--release"]);
        assert_eq!(cli.task.as_deref(), Some("package"));
        assert_eq!(cli.args, args(&["build", "ios", "-p", "secret", "--release"]));
    }

    #[test]
    fn test_no_task() {
        let cli = Cli::parse_from(["cloudpack"]);
        assert!(cli.task.is_none());
        assert!(cli.args.is_empty());
    }

    #[test]
    fn test_package_build_flags() {
        let parsed: PackageArgs = parse_task_args(
            "package",
            &args(&[
                "build", "android", "--release", "-s", "~/release.jks", "-p", "pw", "-k", "upload",
                "-w", "keypw",
            ]),
        )
        .unwrap();

        let Some(PackageAction::Build(build)) = parsed.action else {
            panic!("expected build subcommand");
        };
        assert_eq!(build.platform.as_deref(), Some("android"));
        assert!(build.release);

        let flags = build.signing_flags();
        assert_eq!(flags.keystore.as_deref(), Some("~/release.jks"));
        assert_eq!(flags.password.as_deref(), Some("pw"));
        assert_eq!(flags.key_alias.as_deref(), Some("upload"));
        assert_eq!(flags.key_password.as_deref(), Some("keypw"));
        assert!(flags.cert.is_none());
    }

    #[test]
    fn test_package_ios_flags() {
        let parsed: PackageArgs = parse_task_args(
            "package",
            &args(&["build", "ios", "-c", "dist.p12", "-r", "app.mobileprovision"]),
        )
        .unwrap();

        let Some(PackageAction::Build(build)) = parsed.action else {
            panic!("expected build subcommand");
        };
        assert!(!build.release);
        assert_eq!(build.cert.as_deref(), Some("dist.p12"));
        assert_eq!(build.provisioning_profile.as_deref(), Some("app.mobileprovision"));
    }

    #[test]
    fn test_package_without_subcommand() {
        let parsed: PackageArgs = parse_task_args("package", &[]).unwrap();
        assert!(parsed.action.is_none());
    }

    #[test]
    fn test_package_info_optional_id() {
        let parsed: PackageArgs = parse_task_args("package", &args(&["info"])).unwrap();
        assert_eq!(parsed.action, Some(PackageAction::Info { build_id: None }));

        let parsed: PackageArgs = parse_task_args("package", &args(&["download", "42"])).unwrap();
        assert_eq!(
            parsed.action,
            Some(PackageAction::Download {
                build_id: Some("42".to_string())
            })
        );
    }

    #[test]
    fn test_unknown_subcommand_is_usage_error() {
        let result: Result<PackageArgs, _> = parse_task_args("package", &args(&["publish"]));
        assert!(matches!(result, Err(UsageError::InvalidArguments(_))));
    }

    #[test]
    fn test_login_email_argument() {
        let parsed: LoginArgs = parse_task_args("login", &args(&["dev@example.com"])).unwrap();
        assert_eq!(parsed.email().as_deref(), Some("dev@example.com"));

        let parsed: LoginArgs =
            parse_task_args("login", &args(&["--email", "ops@example.com"])).unwrap();
        assert_eq!(parsed.email().as_deref(), Some("ops@example.com"));

        let parsed: LoginArgs = parse_task_args("login", &[]).unwrap();
        assert!(parsed.email().is_none());

        let result: Result<LoginArgs, _> =
            parse_task_args("login", &args(&["a@example.com", "--email", "b@example.com"]));
        assert!(result.is_err());
    }
}
