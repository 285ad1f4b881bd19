//! Viewer configuration: view size, animation constants and field tunables.
//!
//! The default view is 1232x2000. Field tunables start from the
//! environment (see [`FieldConfig::from_env`]); an optional YAML file
//! overrides any subset of the values.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use flow_field::{FieldConfig, OverlayKind};
use projection::View;

/// Root configuration, optionally loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Raster size every layer is drawn at.
    pub view: View,

    /// Milliseconds between animation frames.
    pub frame_rate_ms: u64,

    /// Share of the previous particle frame kept by each fade.
    pub fade_alpha: f32,

    /// Overlay id (`tcspd`), or none.
    pub overlay: Option<String>,

    /// Interpolation, scheduler and particle tunables.
    pub field: FieldConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            view: View::default(),
            frame_rate_ms: 40,
            fade_alpha: 0.97,
            overlay: None,
            field: FieldConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Environment defaults, overridden by `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = Self {
            field: FieldConfig::from_env(),
            ..Self::default()
        };
        Self::load_over(base, path)
    }

    /// Layer the YAML file at `path`, if any, over `base` and validate.
    pub fn load_over(base: Self, path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            base.validate()
                .context("Invalid configuration from environment")?;
            return Ok(base);
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let config = Self::from_yaml_str_over(base, &content)
            .with_context(|| format!("Failed to parse viewer config: {:?}", path))?;
        tracing::info!(path = ?path, "Loaded viewer config");
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::from_yaml_str_over(Self::default(), content)
    }

    /// Values present in `content` replace those in `base`; the rest are kept.
    pub fn from_yaml_str_over(base: Self, content: &str) -> Result<Self> {
        let patch: Value = serde_yaml::from_str(content)?;
        let mut merged = serde_yaml::to_value(&base)?;
        if !patch.is_null() {
            merge_yaml(&mut merged, patch);
        }
        let config: Self = serde_yaml::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.view.width == 0 || self.view.height == 0 {
            bail!("view must be non-empty, got {}x{}", self.view.width, self.view.height);
        }
        if self.frame_rate_ms == 0 {
            bail!("frame_rate_ms must be positive");
        }
        if !(0.0..=1.0).contains(&self.fade_alpha) {
            bail!("fade_alpha must be within [0, 1], got {}", self.fade_alpha);
        }
        if let Some(id) = self.overlay.as_deref() {
            if OverlayKind::from_id(id).is_none() {
                bail!("unknown overlay '{}'", id);
            }
        }
        self.field.validate().map_err(anyhow::Error::msg)
    }

    /// The configured overlay kind, if any.
    pub fn overlay_kind(&self) -> Option<OverlayKind> {
        self.overlay.as_deref().and_then(OverlayKind::from_id)
    }
}

fn merge_yaml(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Mapping(base), Value::Mapping(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge_yaml(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, patch) => *slot = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.view, View::new(1232, 2000));
        assert_eq!(config.frame_rate_ms, 40);
        assert!(config.overlay_kind().is_none());
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let config = ViewerConfig::from_yaml_str(
            "view:\n  width: 400\n  height: 600\noverlay: tcspd\nfield:\n  idw_neighbors: 3\n",
        )
        .unwrap();
        assert_eq!(config.view, View::new(400, 600));
        assert_eq!(config.overlay_kind(), Some(OverlayKind::TIDAL_CURRENT_SPEED));
        assert_eq!(config.field.idw_neighbors, 3);
        assert_eq!(config.field.max_particle_age, 30);
        assert_eq!(config.frame_rate_ms, 40);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ViewerConfig::from_yaml_str("overlay: wind\n").is_err());
        assert!(ViewerConfig::from_yaml_str("frame_rate_ms: 0\n").is_err());
        assert!(ViewerConfig::from_yaml_str("fade_alpha: 1.5\n").is_err());
        assert!(ViewerConfig::from_yaml_str("field:\n  idw_neighbors: 0\n").is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ViewerConfig::load(Some(Path::new("/nonexistent/viewer.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_yaml_layers_over_base() {
        let mut base = ViewerConfig::default();
        base.field.penalty_multiplier = 20.0;
        base.field.max_task_time_ms = 40;

        let config =
            ViewerConfig::from_yaml_str_over(base, "field:\n  max_task_time_ms: 60\n").unwrap();
        assert_eq!(config.field.max_task_time_ms, 60);
        assert_eq!(config.field.penalty_multiplier, 20.0);
        assert_eq!(config.frame_rate_ms, 40);
    }

    #[test]
    fn test_empty_yaml_keeps_base() {
        let mut base = ViewerConfig::default();
        base.field.idw_neighbors = 7;
        let config = ViewerConfig::from_yaml_str_over(base, "").unwrap();
        assert_eq!(config.field.idw_neighbors, 7);
    }

    #[test]
    fn test_invalid_base_rejected_without_file() {
        let mut base = ViewerConfig::default();
        base.field.penalty_step_px = 0.0;
        let err = ViewerConfig::load_over(base, None).unwrap_err();
        assert!(format!("{:#}", err).contains("penalty_step_px"));
    }

    #[test]
    fn test_invalid_base_rejected_under_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.yaml");
        std::fs::write(&path, "frame_rate_ms: 20\n").unwrap();

        let mut base = ViewerConfig::default();
        base.field.penalty_step_px = 0.0;
        assert!(ViewerConfig::load_over(base.clone(), Some(&path)).is_err());

        base.field.penalty_step_px = 4.0;
        let config = ViewerConfig::load_over(base, Some(&path)).unwrap();
        assert_eq!(config.frame_rate_ms, 20);
        assert_eq!(config.field.penalty_step_px, 4.0);
    }

    // The only test in this crate that touches the process environment.
    #[test]
    fn test_environment_is_validated_and_layered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.yaml");
        std::fs::write(&path, "frame_rate_ms: 20\n").unwrap();

        std::env::set_var("PENALTY_STEP_PX", "0");
        let without_file = ViewerConfig::load(None);
        let with_file = ViewerConfig::load(Some(&path));
        std::env::set_var("PENALTY_STEP_PX", "6");
        let layered = ViewerConfig::load(Some(&path));
        std::env::remove_var("PENALTY_STEP_PX");

        assert!(without_file.is_err());
        assert!(with_file.is_err());
        let layered = layered.unwrap();
        assert_eq!(layered.field.penalty_step_px, 6.0);
        assert_eq!(layered.frame_rate_ms, 20);
    }
}
