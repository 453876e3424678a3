//! Application settings
//!
//! Settings live in a JSON file. A missing, unreadable, or invalid file is
//! never fatal: the problem is logged and defaults are used.

use doc_builder::BuilderConfig;
use layout_engine::LayoutConfig;
use page::PageConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use text_engine::{EstimatingShaper, ShaperConfig, TextRunCache};

/// Everything the driver can be configured with
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Width documents are laid out at
    pub viewport_width: f32,
    /// Markup events handed to the page per chunk
    pub chunk_size: usize,
    pub builder: BuilderConfig,
    pub layout: LayoutConfig,
    pub shaper: ShaperConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            chunk_size: 64,
            builder: BuilderConfig::default(),
            layout: LayoutConfig::default(),
            shaper: ShaperConfig::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read settings file {:?}, using defaults: {}", path, e);
                return Self::default();
            }
        };
        let mut settings = match serde_json::from_str::<AppSettings>(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to parse settings file, using defaults: {}", e);
                return Self::default();
            }
        };

        if let Err(e) = settings.shaper.validate() {
            tracing::warn!("Invalid shaper settings, using defaults: {}", e);
            settings.shaper = ShaperConfig::default();
        }
        if !(settings.viewport_width.is_finite() && settings.viewport_width > 0.0) {
            tracing::warn!(
                "Invalid viewport width {}, using the default",
                settings.viewport_width
            );
            settings.viewport_width = Self::default().viewport_width;
        }
        settings.chunk_size = settings.chunk_size.max(1);
        settings
    }

    pub fn page_config(&self) -> PageConfig {
        PageConfig::default()
            .with_builder(self.builder.clone())
            .with_layout(self.layout.clone())
    }

    /// A word cache measuring with the configured shaper
    pub fn text_run_cache(&self) -> TextRunCache {
        TextRunCache::new(Box::new(EstimatingShaper::new(self.shaper.clone())))
    }
}
