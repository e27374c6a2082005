use crate::constants::*;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    // Rasterization
    pub render_scale: f32,

    // Flip animation
    pub flip_duration_ms: u64,
    pub frame_interval_ms: u64,
    pub slice_count: u32,
    pub max_elevation: f32,

    // Auto-play
    pub autoplay_interval_ms: u64,

    // Bookmark persistence (platform data dir when unset)
    pub bookmark_dir: Option<PathBuf>,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            render_scale: DEFAULT_RENDER_SCALE,
            flip_duration_ms: DEFAULT_FLIP_DURATION_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            slice_count: DEFAULT_SLICE_COUNT,
            max_elevation: DEFAULT_MAX_ELEVATION,
            autoplay_interval_ms: DEFAULT_AUTOPLAY_INTERVAL_MS,
            bookmark_dir: None,
        }
    }
}

impl ViewerOptions {
    /// Load options from JSON file
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options: Self = serde_json::from_slice(&bytes)
            .map_err(|e| ViewerError::Config(format!("Failed to parse config: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Like `load`, but a missing file yields the defaults
    pub async fn load_or_default(path: impl AsRef<std::path::Path>) -> Result<Self> {
        match tokio::fs::try_exists(path.as_ref()).await? {
            true => Self::load(path).await,
            false => Ok(Self::default()),
        }
    }

    /// Platform config location, e.g. `~/.config/flipbook/options.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("flipbook").join("options.json"))
    }

    /// Save options to JSON file
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ViewerError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if !(self.render_scale.is_finite() && self.render_scale > 0.0) {
            return Err(ViewerError::Config(
                "Render scale must be a positive number".to_string(),
            ));
        }
        if self.flip_duration_ms == 0 {
            return Err(ViewerError::Config(
                "Flip duration must be greater than zero".to_string(),
            ));
        }
        if self.frame_interval_ms == 0 || self.frame_interval_ms > self.flip_duration_ms {
            return Err(ViewerError::Config(format!(
                "Frame interval must be between 1 and {} ms",
                self.flip_duration_ms
            )));
        }
        if self.slice_count == 0 {
            return Err(ViewerError::Config(
                "Slice count must be at least 1".to_string(),
            ));
        }
        if self.max_elevation < 0.0 {
            return Err(ViewerError::Config(
                "Max elevation cannot be negative".to_string(),
            ));
        }
        if self.autoplay_interval_ms == 0 {
            return Err(ViewerError::Config(
                "Auto-play interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn flip_duration(&self) -> Duration {
        Duration::from_millis(self.flip_duration_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn autoplay_interval(&self) -> Duration {
        Duration::from_millis(self.autoplay_interval_ms)
    }

    /// Directory holding per-document bookmark files
    pub fn resolved_bookmark_dir(&self) -> PathBuf {
        self.bookmark_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("flipbook")
                .join("bookmarks")
        })
    }
}
