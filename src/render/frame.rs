use serde::{Deserialize, Serialize};

use crate::core::{Geometry, PlotRecord};
use crate::error::{ChartError, ChartResult};
use crate::render::TransitionPlan;

/// Whether a frame is a first draw or a value-only update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderPhase {
    Render,
    Redraw,
}

/// Vertical axis a series (or the grid) is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisSide {
    #[default]
    Left,
    Right,
}

/// Everything the rendering collaborator needs for one chart draw pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub chart: String,
    pub phase: RenderPhase,
    pub geometry: Geometry,
    pub records: Vec<PlotRecord>,
    pub x_domain: (f64, f64),
    pub y_domain: (f64, f64),
    pub y_axis: AxisSide,
    /// Right-hand domain, only set by composite charts with right-axis children.
    pub right_y_domain: Option<(f64, f64)>,
    pub grid_lines: AxisSide,
    pub titles: Vec<String>,
    pub colors: Vec<String>,
    pub transition: TransitionPlan,
}

impl RenderFrame {
    #[must_use]
    pub fn new(chart: impl Into<String>, phase: RenderPhase, geometry: Geometry) -> Self {
        Self {
            chart: chart.into(),
            phase,
            geometry,
            records: Vec::new(),
            x_domain: (0.0, 1.0),
            y_domain: (0.0, 1.0),
            y_axis: AxisSide::Left,
            right_y_domain: None,
            grid_lines: AxisSide::Left,
            titles: Vec::new(),
            colors: Vec::new(),
            transition: TransitionPlan::Immediate,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.geometry.validate()?;
        validate_domain("x", self.x_domain)?;
        validate_domain("y", self.y_domain)?;
        if let Some(domain) = self.right_y_domain {
            validate_domain("right y", domain)?;
        }
        if let Some(record) = self.records.iter().find(|r| !r.plot_value.is_finite()) {
            return Err(ChartError::InvalidData(format!(
                "record `{}` has a non-finite plot value",
                record.key
            )));
        }
        if !self.titles.is_empty() && self.titles.len() != self.records.len() {
            return Err(ChartError::InvalidData(format!(
                "title count {} does not match record count {}",
                self.titles.len(),
                self.records.len()
            )));
        }
        Ok(())
    }
}

fn validate_domain(axis: &str, (start, end): (f64, f64)) -> ChartResult<()> {
    if !start.is_finite() || !end.is_finite() || start > end {
        return Err(ChartError::InvalidData(format!(
            "{axis} domain must be finite and ordered: [{start}, {end}]"
        )));
    }
    Ok(())
}
