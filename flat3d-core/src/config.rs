/// Scene configuration loaded from JSON
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::projection::CameraOptions;
use crate::viewport::ViewportOptions;

/// Camera and viewport settings. Missing fields take their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraOptions,
    pub viewport: ViewportOptions,
}

impl SceneConfig {
    pub fn from_json(text: &str) -> Result<Self, RenderError> {
        serde_json::from_str(text).map_err(|e| RenderError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, RenderError> {
        serde_json::to_string_pretty(self).map_err(|e| RenderError::Config(e.to_string()))
    }
}
