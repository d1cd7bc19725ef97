//! Ordered image-filter composition state.

use serde::{Deserialize, Serialize};
use serde_json::json;


/// Name of the materialized brightness-adjustment filter.
pub const BRIGHTNESS_FILTER: &str = "brightness_adjust";
/// Name of the materialized contrast-adjustment filter.
pub const CONTRAST_FILTER: &str = "contrast_adjust";

/// An opaque filter descriptor handed to the engine's compositing hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub name: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl FilterDescriptor {
    pub fn new(name: &str) -> Self {
        FilterDescriptor {
            name: name.to_string(),
            parameters: serde_json::Value::Null,
        }
    }

    pub fn with_parameters(name: &str, parameters: serde_json::Value) -> Self {
        FilterDescriptor {
            name: name.to_string(),
            parameters,
        }
    }
}

/// Ordered user filters plus the two scalar adjustments. Pure storage: the
/// player decides when a change is pushed to the engine.
#[derive(Debug, Clone)]
pub struct FilterStack {
    filters: Vec<FilterDescriptor>,
    brightness: f32,
    contrast: f32,
}

impl FilterStack {
    pub fn new() -> Self {
        FilterStack {
            filters: Vec::new(),
            brightness: 0.0,
            contrast: 1.0,
        }
    }

    pub fn append(&mut self, filter: FilterDescriptor) {
        self.filters.push(filter);
    }

    /// Drops every user filter. Brightness and contrast persist.
    pub fn clear_all(&mut self) {
        self.filters.clear();
    }

    pub fn set_brightness(&mut self, value: f32) {
        self.brightness = value.clamp(-1.0, 1.0);
    }

    pub fn set_contrast(&mut self, value: f32) {
        self.contrast = value.clamp(0.0, 4.0);
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn user_filters(&self) -> &[FilterDescriptor] {
        &self.filters
    }

    /// The full pipeline: user filters in insertion order, then the
    /// brightness and contrast adjustments, in that fixed order. Read-only;
    /// the stored state never changes here.
    pub fn materialize(&self) -> Vec<FilterDescriptor> {
        let mut pipeline = self.filters.clone();
        pipeline.push(FilterDescriptor::with_parameters(
            BRIGHTNESS_FILTER,
            json!({ "value": self.brightness }),
        ));
        pipeline.push(FilterDescriptor::with_parameters(
            CONTRAST_FILTER,
            json!({ "value": self.contrast }),
        ));
        pipeline
    }
}

impl Default for FilterStack {
    fn default() -> Self {
        Self::new()
    }
}
