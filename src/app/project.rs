//! Project reference loading
//!
//! The project file is written by the upload workflow; this crate only reads
//! it to learn which remote app the build commands act on.

use std::path::Path;

use tracing::debug;

use crate::app::models::ProjectRef;
use crate::constants::files;
use crate::errors::{FilesystemError, Result, ValidationError};

/// Load the project reference from `dir`, requiring a non-empty app id
pub async fn load_project(dir: &Path) -> Result<ProjectRef> {
    let path = dir.join(files::PROJECT_FILE);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ValidationError::ProjectNotFound { path }.into());
        }
        Err(source) => return Err(FilesystemError::Read { path, source }.into()),
    };

    let project: ProjectRef =
        serde_json::from_str(&content).map_err(|e| ValidationError::InvalidProject {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    if project.app_id.trim().is_empty() {
        return Err(ValidationError::MissingAppId.into());
    }

    debug!("Loaded project '{}' ({})", project.name, project.app_id);
    Ok(project)
}
