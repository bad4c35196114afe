//! Artifact retrieval for finished builds

use std::path::{Path, PathBuf};

use tracing::info;

use crate::app::builds::{resolve_build_id, PackageContext};
use crate::app::client::stream_to_file;
use crate::app::models::{determine_file_extension, BuildRecord};
use crate::auth::Session;
use crate::errors::{BuildNotFinishedError, Result};

/// `<build name>.<apk|ipa>`, falling back to the build id when unnamed
pub fn artifact_filename(build: &BuildRecord) -> Result<String> {
    let extension = determine_file_extension(build.platform.as_str())?;
    let stem = build
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(&build.id);

    // The name comes from the service; keep the file in the target directory
    let stem: String = stem
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();

    Ok(format!("{}.{}", stem, extension))
}

/// Download a finished build's artifact into `dest_dir`
///
/// Without `build_id` the most recent build is used. Nothing is written
/// unless the build succeeded and has an artifact URL.
pub async fn download_build(
    ctx: &PackageContext<'_>,
    session: &Session,
    build_id: Option<&str>,
    dest_dir: &Path,
    on_progress: &mut (dyn FnMut(u64, u64) + Send),
) -> Result<PathBuf> {
    let id = resolve_build_id(ctx, session, build_id).await?;
    let build = ctx.service.get_build(session, ctx.app_id, &id, false).await?;

    let url = match build.url.as_deref() {
        Some(url) if build.is_downloadable() => url,
        _ => {
            return Err(BuildNotFinishedError {
                id: build.id.clone(),
                status: build.status.to_string(),
            }
            .into())
        }
    };

    let destination = dest_dir.join(artifact_filename(&build)?);
    info!("Downloading build {} to {}", build.id, destination.display());

    let mut stream = ctx.service.open_artifact(session, url).await?;
    stream_to_file(stream.as_mut(), &destination, on_progress).await?;

    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{BuildMode, BuildStatus, Platform};
    use chrono::Utc;

    fn record(platform: Platform, name: Option<&str>) -> BuildRecord {
        BuildRecord {
            id: "42".to_string(),
            status: BuildStatus::Success,
            platform,
            mode: BuildMode::Release,
            created: Utc::now(),
            completed: None,
            name: name.map(str::to_string),
            url: Some("https://cdn.example.com/42".to_string()),
            output: None,
        }
    }

    #[test]
    fn test_filename_per_platform() {
        assert_eq!(
            artifact_filename(&record(Platform::Android, Some("Weather"))).unwrap(),
            "Weather.apk"
        );
        assert_eq!(
            artifact_filename(&record(Platform::Ios, Some("Weather"))).unwrap(),
            "Weather.ipa"
        );
    }

    #[test]
    fn test_filename_falls_back_to_id() {
        assert_eq!(
            artifact_filename(&record(Platform::Android, None)).unwrap(),
            "42.apk"
        );
        assert_eq!(
            artifact_filename(&record(Platform::Android, Some("  "))).unwrap(),
            "42.apk"
        );
    }

    #[test]
    fn test_filename_strips_separators() {
        assert_eq!(
            artifact_filename(&record(Platform::Ios, Some("../evil/app"))).unwrap(),
            ".._evil_app.ipa"
        );
    }
}
