//! Artifact streaming
//!
//! Writes an [`ArtifactStream`] to disk chunk by chunk, reporting progress
//! once the total size is known. A failure part way leaves whatever was
//! already written; the returned error says so.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::app::service::ArtifactStream;
use crate::errors::{AppError, FilesystemError, NetworkError, Result};

/// [`ArtifactStream`] over a live HTTP response
pub struct ResponseStream {
    response: reqwest::Response,
    total: Option<u64>,
}

impl ResponseStream {
    pub fn new(response: reqwest::Response) -> Self {
        let total = response.content_length();
        Self { response, total }
    }
}

#[async_trait]
impl ArtifactStream for ResponseStream {
    fn total_bytes(&self) -> Option<u64> {
        self.total
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let chunk = self.response.chunk().await?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }
}

/// Copy `stream` into a new file at `destination`
///
/// `on_progress(received, total)` is called after each chunk once the total
/// is known; `received` never decreases. Returns the bytes written.
pub async fn stream_to_file(
    stream: &mut dyn ArtifactStream,
    destination: &Path,
    on_progress: &mut (dyn FnMut(u64, u64) + Send),
) -> Result<u64> {
    let mut file = File::create(destination)
        .await
        .map_err(|source| FilesystemError::Create {
            path: destination.to_path_buf(),
            source,
        })?;

    let write_error = |source| FilesystemError::Write {
        path: destination.to_path_buf(),
        source,
    };

    let mut received: u64 = 0;
    loop {
        let chunk = match stream.next_chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(AppError::Network(NetworkError::Request(source))) => {
                // Keep what was written so far
                let _ = file.flush().await;
                return Err(NetworkError::Interrupted {
                    path: destination.to_path_buf(),
                    source,
                }
                .into());
            }
            Err(other) => {
                let _ = file.flush().await;
                return Err(other);
            }
        };

        file.write_all(&chunk).await.map_err(write_error)?;
        received += chunk.len() as u64;

        if let Some(total) = stream.total_bytes() {
            on_progress(received, total);
        }
    }

    file.flush().await.map_err(write_error)?;
    tracing::info!("Wrote {} bytes to {}", received, destination.display());
    Ok(received)
}
