//! Download progress display
//!
//! The bar is created on the first callback that carries a known total, so
//! nothing is drawn when the artifact response has no content length.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::constants::download;

/// Progress bar fed by `(bytes_received, bytes_total)` callbacks
#[derive(Debug, Default)]
pub struct DownloadProgress {
    bar: Option<ProgressBar>,
    enabled: bool,
    last_position: u64,
}

impl DownloadProgress {
    /// `enabled = false` records positions without drawing anything
    pub fn new(enabled: bool) -> Self {
        Self {
            bar: None,
            enabled,
            last_position: 0,
        }
    }

    /// Record one progress callback
    pub fn update(&mut self, received: u64, total: u64) {
        if self.enabled && self.bar.is_none() {
            self.bar = Some(Self::create_bar(total));
        }
        self.last_position = received;
        if let Some(bar) = &self.bar {
            bar.set_position(received);
        }
    }

    /// Bytes reported by the latest callback
    pub fn position(&self) -> u64 {
        self.last_position
    }

    /// Clear the bar from the terminal
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn create_bar(total: u64) -> ProgressBar {
        let bar = ProgressBar::new(total);
        match ProgressStyle::default_bar().template(download::PROGRESS_TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars(download::PROGRESS_CHARS)),
            Err(e) => debug!("Progress bar template error: {}", e),
        }
        bar
    }
}

impl Drop for DownloadProgress {
    fn drop(&mut self) {
        // Leave the terminal clean on error paths too
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_progress_tracks_position() {
        let mut progress = DownloadProgress::new(false);
        progress.update(10, 100);
        progress.update(60, 100);
        assert_eq!(progress.position(), 60);
        assert!(progress.bar.is_none());
        progress.finish();
    }

    #[test]
    fn test_enabled_progress_creates_bar_once() {
        let mut progress = DownloadProgress::new(true);
        progress.update(1, 4);
        let bar = progress.bar.clone().unwrap();
        progress.update(4, 4);
        assert_eq!(bar.position(), 4);
        assert_eq!(bar.length(), Some(4));
        progress.finish();
        assert!(progress.bar.is_none());
    }

    #[test]
    fn test_template_is_valid() {
        assert!(ProgressStyle::default_bar()
            .template(download::PROGRESS_TEMPLATE)
            .is_ok());
    }
}
