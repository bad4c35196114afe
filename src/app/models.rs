//! Data models for builds, platforms and projects
//!
//! Wire values from the build service are mapped onto closed enumerations
//! here, so the rest of the crate never compares discriminant strings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{InternalError, ValidationError};

/// Target platform of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Wire/CLI token for this platform
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ValidationError;

    /// Case-sensitive: only `android` and `ios` are accepted
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            other => Err(ValidationError::InvalidPlatform {
                platform: other.to_string(),
            }),
        }
    }
}

/// Signing mode of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// `--release` selects release, everything else is a debug build
    pub fn from_release_flag(release: bool) -> Self {
        if release {
            BuildMode::Release
        } else {
            BuildMode::Debug
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Debug => "debug",
            BuildMode::Release => "release",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a remote build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildStatus {
    #[serde(alias = "queued")]
    Queued,
    #[serde(alias = "building")]
    Building,
    #[serde(alias = "success")]
    Success,
    #[serde(alias = "failed")]
    Failed,
}

impl BuildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::Queued => "QUEUED",
            BuildStatus::Building => "BUILDING",
            BuildStatus::Success => "SUCCESS",
            BuildStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A build as reported by the build service
///
/// Submission responses carry only the first five fields; `output` is only
/// present when explicitly requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
    #[serde(deserialize_with = "deserialize_build_id")]
    pub id: String,
    pub status: BuildStatus,
    pub platform: Platform,
    pub mode: BuildMode,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub completed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

impl BuildRecord {
    /// Whether an artifact can be downloaded for this build
    pub fn is_downloadable(&self) -> bool {
        self.status == BuildStatus::Success && self.url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// The service sends ids as numbers or strings depending on the endpoint
fn deserialize_build_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// `{data: [...]}` envelope used by the list endpoint
#[derive(Debug, Deserialize)]
pub struct BuildList {
    pub data: Vec<BuildRecord>,
}

/// `{data: {...}}` envelope used by the single-build endpoint
#[derive(Debug, Deserialize)]
pub struct BuildEnvelope {
    pub data: BuildRecord,
}

/// Project reference from the project file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub name: String,
}

/// Artifact file extension for a platform token
///
/// Only `android` and `ios` have artifacts. Other values cannot reach this
/// point through the CLI, but are still refused.
pub fn determine_file_extension(platform: &str) -> Result<&'static str, InternalError> {
    match platform {
        "android" => Ok("apk"),
        "ios" => Ok("ipa"),
        other => Err(InternalError::UnknownPlatform {
            platform: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parsing_is_case_sensitive() {
        assert_eq!("android".parse::<Platform>().unwrap(), Platform::Android);
        assert_eq!("ios".parse::<Platform>().unwrap(), Platform::Ios);

        for bad in ["Android", "IOS", "windows", "", " ios"] {
            assert!(matches!(
                bad.parse::<Platform>(),
                Err(ValidationError::InvalidPlatform { .. })
            ));
        }
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(determine_file_extension("android").unwrap(), "apk");
        assert_eq!(determine_file_extension("ios").unwrap(), "ipa");
        assert!(matches!(
            determine_file_extension("blackberry"),
            Err(InternalError::UnknownPlatform { .. })
        ));
    }

    #[test]
    fn test_build_record_from_service_json() {
        let json = r#"{
            "id": 42,
            "status": "SUCCESS",
            "platform": "android",
            "mode": "release",
            "created": "2024-03-01T10:00:00Z",
            "completed": "2024-03-01T10:05:00Z",
            "name": "MyApp",
            "url": "https://cdn.example.com/42.apk"
        }"#;

        let record: BuildRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.status, BuildStatus::Success);
        assert_eq!(record.platform, Platform::Android);
        assert_eq!(record.mode, BuildMode::Release);
        assert!(record.completed.is_some());
        assert!(record.output.is_none());
        assert!(record.is_downloadable());
    }

    #[test]
    fn test_submission_response_has_no_optional_fields() {
        let json = r#"{"id":"b-9","status":"queued","platform":"ios","mode":"debug","created":"2024-03-01T10:00:00Z"}"#;
        let record: BuildRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "b-9");
        assert_eq!(record.status, BuildStatus::Queued);
        assert!(!record.is_downloadable());
    }

    #[test]
    fn test_success_without_url_is_not_downloadable() {
        let json = r#"{"id":1,"status":"SUCCESS","platform":"ios","mode":"debug","created":"2024-03-01T10:00:00Z","url":""}"#;
        let record: BuildRecord = serde_json::from_str(json).unwrap();
        assert!(!record.is_downloadable());
    }

    #[test]
    fn test_build_mode_from_flag() {
        assert_eq!(BuildMode::from_release_flag(true), BuildMode::Release);
        assert_eq!(BuildMode::from_release_flag(false), BuildMode::Debug);
    }
}
