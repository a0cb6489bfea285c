use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::pipeline::PoseOptions;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub model: ModelConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: String,
    #[serde(flatten)]
    pub options: PoseOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub key_wait_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "models/pose_landmark_full.onnx".to_string(),
            options: PoseOptions::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Pose Estimation".to_string(),
            key_wait_ms: 1,
        }
    }
}

impl AppConfig {
    pub const PATH: &'static str = "config.json";

    /// Reads `path`, falling back to defaults when the file is missing or
    /// unparsable. The result is written back so new fields show up in the file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            match serde_json::from_str::<AppConfig>(&content) {
                Ok(c) => {
                    info!(path = %path.display(), "loaded configuration");
                    c
                }
                Err(e) => {
                    warn!(path = %path.display(), "error parsing config: {e}. Loading defaults.");
                    Self::default()
                }
            }
        } else {
            info!(path = %path.display(), "configuration file not found, creating default");
            Self::default()
        };

        config.model.options.validate()?;
        config.save_to(path)?;
        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pose-crosshair-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let c = AppConfig::default();
        assert_eq!(c.camera.index, 0);
        assert_eq!(c.window.title, "Pose Estimation");
        assert_eq!(c.window.key_wait_ms, 1);
        assert_eq!(c.model.options, PoseOptions::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let c: AppConfig =
            serde_json::from_str(r#"{ "model": { "min_tracking_confidence": 0.8 } }"#).unwrap();
        assert_eq!(c.model.options.min_tracking_confidence, 0.8);
        assert_eq!(c.model.options.min_detection_confidence, 0.5);
        assert!(!c.model.options.static_image_mode);
        assert_eq!(c.model.path, "models/pose_landmark_full.onnx");
        assert_eq!(c.window.title, "Pose Estimation");
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let path = temp_path("missing");
        let _ = fs::remove_file(&path);

        let c = AppConfig::load_from(&path).unwrap();
        assert_eq!(c, AppConfig::default());
        assert!(path.exists());

        let reloaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(reloaded, c);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_garbage_file_loads_defaults() {
        let path = temp_path("garbage");
        fs::write(&path, "not json").unwrap();
        let c = AppConfig::load_from(&path).unwrap();
        assert_eq!(c, AppConfig::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let path = temp_path("range");
        fs::write(&path, r#"{ "model": { "min_detection_confidence": 2.0 } }"#).unwrap();
        assert!(AppConfig::load_from(&path).is_err());
        let _ = fs::remove_file(&path);
    }
}
