use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use greetcard_core::{FontFamily, SessionOptions, TemplateCatalog};
use greetcard_render::CanvasSurface;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid editor config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Editor settings, read from a JSON file. Missing keys take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas: CanvasSettings,
    pub storage: StorageSettings,
    pub text: TextSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub default_edge: f64,
    pub gutter: f64,
    pub export_pixel_ratio: f64,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            default_edge: 350.0,
            gutter: 32.0,
            export_pixel_ratio: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub bucket: String,
    pub content_type: String,
    /// Prepended to every uploaded file name.
    pub path_prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            bucket: "birthday-app".to_string(),
            content_type: "image/png".to_string(),
            path_prefix: String::new(),
        }
    }
}

impl StorageSettings {
    pub fn object_path(&self, file_name: &str) -> String {
        format!("{}{}", self.path_prefix, file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    pub default_font: FontFamily,
    pub placeholder: String,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            default_font: FontFamily::Arial,
            placeholder: "Your text".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn surface(&self) -> CanvasSurface {
        CanvasSurface::new(
            self.canvas.default_edge,
            self.canvas.gutter,
            self.canvas.export_pixel_ratio,
        )
    }

    /// Options for a new editor session on a surface of `canvas_edge`.
    pub fn session_options(&self, canvas_edge: f64) -> SessionOptions {
        SessionOptions {
            canvas_edge,
            default_font: self.text.default_font,
            text_placeholder: self.text.placeholder.clone(),
            catalog: TemplateCatalog::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = EditorConfig::from_json(
            r#"{ "canvas": { "default_edge": 400 }, "text": { "default_font": "Courier New" } }"#,
        )
        .unwrap();
        assert!((config.canvas.default_edge - 400.0).abs() < 1e-10);
        assert!((config.canvas.export_pixel_ratio - 2.0).abs() < 1e-10);
        assert_eq!(config.text.default_font, FontFamily::CourierNew);
        assert_eq!(config.storage.bucket, "birthday-app");
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = EditorConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_save_and_load() {
        let mut config = EditorConfig::default();
        config.storage.path_prefix = "cards/".to_string();
        let path = std::env::temp_dir().join(format!("greetcard-config-{}.json", std::process::id()));
        config.save(&path).unwrap();
        let loaded = EditorConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
        assert_eq!(loaded.storage.object_path("a.png"), "cards/a.png");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EditorConfig::load("/nonexistent/greetcard.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
