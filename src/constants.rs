//! Application constants for cloudpack
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Overrides `service.base_url`
    pub const API_URL: &str = "CLOUDPACK_API_URL";

    /// Email used for non-interactive login
    pub const EMAIL: &str = "CLOUDPACK_EMAIL";

    /// Password used for non-interactive login
    pub const PASSWORD: &str = "CLOUDPACK_PASSWORD";
}

/// Files read or written by the CLI
pub mod files {
    /// Project reference in the working directory
    pub const PROJECT_FILE: &str = "cloudpack.project.json";

    /// Project-local configuration file
    pub const LOCAL_CONFIG_FILE: &str = "cloudpack.toml";

    /// Directory under the user config dir
    pub const CONFIG_DIR_NAME: &str = "cloudpack";

    /// Configuration file name inside [`CONFIG_DIR_NAME`]
    pub const CONFIG_FILE_NAME: &str = "config.toml";

    /// Session file name inside [`CONFIG_DIR_NAME`]
    pub const SESSION_FILE_NAME: &str = "session.json";

    /// File permissions for the session file (Unix only) - owner read/write only
    #[cfg(unix)]
    pub const SESSION_FILE_PERMISSIONS: u32 = 0o600;
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default build service root
    pub const DEFAULT_BASE_URL: &str = "https://apps.cloudpack.dev/api/v1/";

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("cloudpack/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout for API calls
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Whole-transfer timeout for artifact downloads
    pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);
}

/// Build listing and rendering
pub mod listing {
    /// Default number of builds shown by `package list`
    pub const DEFAULT_LIMIT: usize = 25;

    /// Width used when the terminal size cannot be determined
    pub const FALLBACK_TERMINAL_WIDTH: u16 = 80;

    /// Widths above this show the `created` column
    pub const CREATED_COLUMN_MIN_WIDTH: u16 = 100;

    /// Widths above this also show the `completed` column
    pub const COMPLETED_COLUMN_MIN_WIDTH: u16 = 125;
}

/// Artifact download display
pub mod download {
    /// Progress bar template, mirrors `Downloading... [bar] percent eta`
    pub const PROGRESS_TEMPLATE: &str = "Downloading... [{bar:30}]  {percent}%  {eta}";

    /// Characters for filled, current and empty bar segments
    pub const PROGRESS_CHARS: &str = "= ";
}
