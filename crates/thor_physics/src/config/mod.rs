//! Configuration system
//!
//! Query tuning lives in [`QuerySettings`]; any serde type can be loaded from
//! or saved to TOML or RON through the [`Config`] trait, the format picked by
//! file extension.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

use crate::physics::collision_layers::LayerMask;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, format)
    }

    /// Parse configuration text in the given format
    fn parse(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Pick the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Tuning for the overlap/sweep query layer and the reference backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Layers whose geometry blocks an object ("what obstructs me")
    pub obstruction_layers: Vec<String>,

    /// Layers whose geometry counts as touching ("what is touching me")
    pub contact_layers: Vec<String>,

    /// Node name marking a non-physical bounding-box collider
    pub bounding_box_marker: String,

    /// Whether `UseGlobal` queries report trigger colliders
    pub queries_hit_triggers: bool,

    /// Iteration budget for conservative-advancement sweeps
    pub sweep_max_iterations: u32,

    /// Separation at which a sweep reports contact
    pub contact_tolerance: f32,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            obstruction_layers: [
                "Agent",
                "SimObjVisible",
                "Procedural1",
                "Procedural2",
                "Procedural3",
                "Procedural0",
            ]
            .map(String::from)
            .to_vec(),
            contact_layers: ["SimObjVisible", "Agent"].map(String::from).to_vec(),
            bounding_box_marker: "BoundingBox".to_string(),
            queries_hit_triggers: true,
            sweep_max_iterations: 128,
            contact_tolerance: 1.0e-4,
        }
    }
}

impl Config for QuerySettings {}

impl QuerySettings {
    /// Resolved mask for obstruction checks
    pub fn obstruction_mask(&self) -> LayerMask {
        LayerMask::from_names(self.obstruction_layers.as_slice())
    }

    /// Resolved mask for contact enumeration
    pub fn contact_mask(&self) -> LayerMask {
        LayerMask::from_names(self.contact_layers.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_masks() {
        let settings = QuerySettings::default();
        assert_eq!(settings.obstruction_mask(), LayerMask::OBSTRUCTION);
        assert_eq!(settings.contact_mask(), LayerMask::CONTACT);
    }

    #[test]
    fn test_toml_partial_override() {
        let text = r#"
            contact_layers = ["Agent"]
            queries_hit_triggers = false
        "#;
        let settings = QuerySettings::parse(text, ConfigFormat::Toml).unwrap();
        assert_eq!(settings.contact_mask(), LayerMask::AGENT);
        assert!(!settings.queries_hit_triggers);
        assert_eq!(settings.bounding_box_marker, "BoundingBox");
    }

    #[test]
    fn test_ron_parse() {
        let text = r#"(bounding_box_marker: "Extents", sweep_max_iterations: 16)"#;
        let settings = QuerySettings::parse(text, ConfigFormat::Ron).unwrap();
        assert_eq!(settings.bounding_box_marker, "Extents");
        assert_eq!(settings.sweep_max_iterations, 16);
        assert_eq!(settings.obstruction_mask(), LayerMask::OBSTRUCTION);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = QuerySettings::load_from_file("settings.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
