//! Error types for cloudpack
//!
//! Each concern gets its own error enum so that failures carry enough context
//! to be reported directly to the user. Everything converges on [`AppError`],
//! which `main` turns into a single message on stderr and exit status 1.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Missing or unknown task, subcommand or argument
#[derive(Error, Debug)]
pub enum UsageError {
    /// No task name was given on the command line
    #[error("No task specified")]
    NoTask,

    /// The task token matched neither a name nor an alias
    #[error("Unknown task '{token}'")]
    UnknownTask { token: String },

    /// A task name or alias collides with one already registered
    #[error("Task name or alias '{name}' is already registered")]
    DuplicateTask { name: String },

    /// `package` was invoked without a subcommand
    #[error("Specify a subcommand (build, list, info, or download).")]
    MissingSubcommand,

    /// `package build` was invoked without a platform
    #[error("Specify a valid platform (android or ios).")]
    MissingPlatform,

    /// Argument parsing failed
    #[error("{0}")]
    InvalidArguments(String),
}

/// Bad platform/mode values or missing project information
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Platform token is not exactly `android` or `ios`
    #[error("Invalid platform '{platform}', please choose either 'android' or 'ios'.")]
    InvalidPlatform { platform: String },

    /// Project file does not exist in the working directory
    #[error("No project file found at {path}. Run this command from your app's root directory")]
    ProjectNotFound { path: PathBuf },

    /// Project file could not be parsed
    #[error("Invalid project file {path}: {reason}")]
    InvalidProject { path: PathBuf, reason: String },

    /// Project has no app id yet
    #[error("Missing app_id in project file. Upload your app before packaging it")]
    MissingAppId,

    /// The app has no builds to resolve a default build id from
    #[error("No builds found for this app yet")]
    NoBuilds,
}

/// Login failures and session storage problems
#[derive(Error, Debug)]
pub enum AuthError {
    /// Service rejected the supplied email/password
    #[error("Login rejected by the build service (HTTP {status}). Check your email and password")]
    LoginRejected { status: u16 },

    /// No email was supplied or entered
    #[error("An email address is required to log in")]
    MissingEmail,

    /// No password was supplied or entered
    #[error("A password is required to log in")]
    MissingPassword,

    /// Reading from the terminal failed
    #[error("Failed to read login input")]
    Prompt(#[source] io::Error),

    /// Session file could not be read or written
    #[error("Failed to access session file {path}")]
    SessionStorage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Session file exists but does not hold a session
    #[error("Session file {path} is corrupted. Run 'cloudpack logout' and log in again")]
    CorruptSession { path: PathBuf },
}

/// Incomplete signing bundle
#[derive(Error, Debug)]
pub enum CredentialInputError {
    /// A required field is still empty after prompting
    #[error("Missing required signing field: {field}")]
    MissingField { field: &'static str },

    /// Reading from the terminal failed
    #[error("Failed to read signing input")]
    Prompt(#[source] io::Error),

    /// `~` was used but the home directory is unknown
    #[error("Cannot expand '~' in {path}: home directory is unknown")]
    HomeDirectoryUnavailable { path: String },
}

/// Transport failures
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Request could not be sent or its body not received
    #[error("Request to the build service failed")]
    Request(#[from] reqwest::Error),

    /// Artifact stream broke after the output file was created
    #[error("Download interrupted. A partial file may remain at {path}")]
    Interrupted {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },
}

/// Non-success responses from the build service
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Service answered with an error status; message is the service's own
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Service answered 2xx but the body did not match the expected shape
    #[error("Malformed response from the build service: {reason}")]
    Malformed { reason: String },
}

/// Download attempted on a build that has no artifact yet
#[derive(Error, Debug)]
#[error("Cannot download! Build {id} did not finish (status: {status})")]
pub struct BuildNotFinishedError {
    pub id: String,
    pub status: String,
}

/// Local file read/write failures
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// A signing file could not be read
    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The artifact file could not be created
    #[error("Failed to create {path}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the artifact failed part way
    #[error("Failed writing {path}. A partial file may remain")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Standard output is closed or broken
    #[error("Failed to write output")]
    Output(#[source] io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicit configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::config::AppConfig`]
    #[error("Invalid configuration file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A configuration value failed validation
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// No per-user configuration directory on this system
    #[error("Could not determine user config directory")]
    NoConfigDir,
}

/// Conditions that upstream validation should make unreachable
#[derive(Error, Debug)]
pub enum InternalError {
    #[error("Unknown platform: {platform}")]
    UnknownPlatform { platform: String },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    CredentialInput(#[from] CredentialInputError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    BuildNotFinished(#[from] BuildNotFinishedError),

    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::Network(NetworkError::Request(error))
    }
}

impl AppError {
    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Usage(_) => "usage",
            AppError::Validation(_) => "validation",
            AppError::Auth(_) => "authentication",
            AppError::CredentialInput(_) => "credentials",
            AppError::Network(_) => "network",
            AppError::Remote(_) => "remote",
            AppError::BuildNotFinished(_) => "build",
            AppError::Filesystem(_) => "filesystem",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }

    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Full message including the chain of underlying causes
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let cause_text = cause.to_string();
            if !message.contains(&cause_text) {
                message.push_str(": ");
                message.push_str(&cause_text);
            }
            source = cause.source();
        }
        message
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Authentication result type alias
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
