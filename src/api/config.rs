use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::transform::CapConfig;

fn default_duration_ms() -> u64 {
    750
}

fn default_true() -> bool {
    true
}

/// Per-chart animated transition settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionConfig {
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default)]
    pub name: Option<String>,
}

impl TransitionConfig {
    #[must_use]
    pub fn new(duration_ms: u64, delay_ms: u64) -> Self {
        Self {
            duration_ms,
            delay_ms,
            name: None,
        }
    }

    #[must_use]
    pub fn immediate() -> Self {
        Self::new(0, 0)
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self::new(default_duration_ms(), 0)
    }
}

/// Axis-sharing flags of a composite chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeConfig {
    #[serde(default)]
    pub share_colors: bool,
    #[serde(default = "default_true")]
    pub share_title: bool,
    #[serde(default)]
    pub align_y_axes: bool,
    #[serde(default)]
    pub use_right_axis_grid_lines: bool,
    #[serde(default)]
    pub y_axis_padding: f64,
}

impl CompositeConfig {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.y_axis_padding.is_finite() || self.y_axis_padding < 0.0 {
            return Err(ChartError::InvalidData(
                "composite y-axis padding must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            share_colors: false,
            share_title: true,
            align_y_axes: false,
            use_right_axis_grid_lines: false,
            y_axis_padding: 0.0,
        }
    }
}

/// Option bag applied through `Chart::apply_options`.
///
/// Unset fields leave the chart's current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub transition: Option<TransitionConfig>,
    pub elastic_x: Option<bool>,
    pub elastic_y: Option<bool>,
    pub use_right_y_axis: Option<bool>,
    pub render_title: Option<bool>,
    pub y_axis_padding: Option<f64>,
    pub colors: Option<Vec<String>>,
    pub cap: Option<CapConfig>,
}

impl ChartOptions {
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let options: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse chart options: {e}")))?;
        if let Some(padding) = options.y_axis_padding {
            if !padding.is_finite() {
                return Err(ChartError::InvalidData(
                    "y-axis padding must be finite".to_owned(),
                ));
            }
        }
        if let Some(cap) = &options.cap {
            cap.validated_cap()?;
        }
        Ok(options)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize chart options: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_defaults_match_library_defaults() {
        let config: TransitionConfig = serde_json::from_str("{}").expect("json");
        assert_eq!(config, TransitionConfig::new(750, 0));
    }

    #[test]
    fn composite_config_defaults_share_title_only() {
        let config: CompositeConfig = serde_json::from_str("{}").expect("json");
        assert!(config.share_title);
        assert!(!config.share_colors);
        assert!(!config.align_y_axes);
    }

    #[test]
    fn options_reject_negative_cap() {
        let err = ChartOptions::from_json_str(r#"{"cap": {"cap": -2}}"#).expect_err("negative cap");
        assert_eq!(err, ChartError::InvalidCapCount { cap: -2 });
    }

    #[test]
    fn options_round_trip_through_json() {
        let options = ChartOptions {
            elastic_y: Some(true),
            colors: Some(vec!["#1f77b4".to_owned()]),
            ..ChartOptions::default()
        };
        let json = options.to_json_pretty().expect("serialize");
        assert_eq!(ChartOptions::from_json_str(&json).expect("parse"), options);
    }

    #[test]
    fn negative_padding_is_rejected() {
        let config = CompositeConfig {
            y_axis_padding: -1.0,
            ..CompositeConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
