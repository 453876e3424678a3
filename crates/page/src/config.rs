//! Page configuration

use doc_builder::BuilderConfig;
use layout_engine::LayoutConfig;
use serde::{Deserialize, Serialize};

/// Settings handed to every document a page loads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub builder: BuilderConfig,
    pub layout: LayoutConfig,
}

impl PageConfig {
    pub fn with_builder(mut self, builder: BuilderConfig) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }
}
