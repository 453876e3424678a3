//! Builder configuration

use serde::{Deserialize, Serialize};
use text_engine::Color;

/// Spacing and control metrics applied to the boxes the builder creates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Foreground colour of link text
    pub link_color: Color,
    /// Gap between the root block's children
    pub root_spacing: f32,
    /// Gap between the items of ul/ol/dl
    pub list_spacing: f32,
    /// Gap between a list marker and the item body
    pub list_marker_gap: f32,
    /// Gap between children of list item bodies and dd blocks
    pub list_body_spacing: f32,
    /// Leading indent of dd blocks
    pub definition_indent: f32,
    /// Gap between table columns
    pub table_spacing: f32,
    /// Gap between children of a table cell
    pub cell_spacing: f32,
    pub text_field_width: f32,
    pub control_height: f32,
    pub checkbox_size: f32,
    /// Horizontal padding on each side of a button label
    pub button_padding: f32,
    /// Room for the drop-down arrow of a choice control
    pub select_arrow_width: f32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            link_color: Color::LINK,
            root_spacing: 10.0,
            list_spacing: 0.0,
            list_marker_gap: 5.0,
            list_body_spacing: 10.0,
            definition_indent: 32.0,
            table_spacing: 10.0,
            cell_spacing: 10.0,
            text_field_width: 150.0,
            control_height: 24.0,
            checkbox_size: 16.0,
            button_padding: 12.0,
            select_arrow_width: 24.0,
        }
    }
}

impl BuilderConfig {
    pub fn with_link_color(mut self, color: Color) -> Self {
        self.link_color = color;
        self
    }
}
