use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::error::{ChartError, ChartResult};

/// Comparable domain key of a grouped record (bucket boundary, category, ...).
///
/// Numeric keys order before text keys; ranges never mix the two.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Number(OrderedFloat<f64>),
    Text(String),
}

impl Key {
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::Number(OrderedFloat(value))
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(value.0),
            Self::Text(_) => None,
        }
    }

    /// Returns `true` when both keys live in the same ordinal space.
    #[must_use]
    pub fn is_comparable_with(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Number(_), Self::Number(_)) | (Self::Text(_), Self::Text(_))
        )
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value.0),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<f64> for Key {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::number(f64::from(value))
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Raw `{key, value}` aggregate yielded by a grouped source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: Key,
    pub value: Value,
}

impl Record {
    #[must_use]
    pub fn new(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Cumulative offsets of one stack layer at one key.
///
/// `y1 = y0 + raw`, so a negative `raw` gives `y1 < y0`. Renderers must not
/// assume `y0 <= y1`; use [`StackSegment::low`] and [`StackSegment::high`]
/// for the drawn span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSegment {
    pub layer: String,
    pub raw: f64,
    pub y0: f64,
    pub y1: f64,
    pub hidden: bool,
}

impl StackSegment {
    #[must_use]
    pub fn low(&self) -> f64 {
        self.y0.min(self.y1)
    }

    #[must_use]
    pub fn high(&self) -> f64 {
        self.y0.max(self.y1)
    }
}

/// Record as it leaves the transform chain, ready to plot.
///
/// `value` is a shallow copy of the source payload; `plot_value` is the
/// derived number computed by the chart's value accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRecord {
    pub key: Key,
    pub value: Value,
    pub plot_value: f64,
    #[serde(default)]
    pub stack: SmallVec<[StackSegment; 4]>,
    /// Set on records produced by a stage rather than read from the source.
    #[serde(default)]
    pub synthetic: bool,
}

impl PlotRecord {
    #[must_use]
    pub fn new(key: Key, value: Value, plot_value: f64) -> Self {
        Self {
            key,
            value,
            plot_value,
            stack: SmallVec::new(),
            synthetic: false,
        }
    }

    /// Lowest y this record occupies once plotted.
    #[must_use]
    pub fn y_low(&self) -> f64 {
        if self.stack.is_empty() {
            return self.plot_value;
        }
        self.stack
            .iter()
            .map(StackSegment::low)
            .fold(f64::INFINITY, f64::min)
    }

    /// Highest y this record occupies once plotted.
    #[must_use]
    pub fn y_high(&self) -> f64 {
        if self.stack.is_empty() {
            return self.plot_value;
        }
        self.stack
            .iter()
            .map(StackSegment::high)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Plot-area margins in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    #[must_use]
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::new(10.0, 50.0, 30.0, 30.0)
    }
}

/// Outer size and margins of a chart's drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
}

impl Geometry {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margins: Margins::default(),
        }
    }

    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn effective_width(self) -> f64 {
        self.width - self.margins.left - self.margins.right
    }

    #[must_use]
    pub fn effective_height(self) -> f64 {
        self.height - self.margins.top - self.margins.bottom
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.effective_width().is_finite()
            || !self.effective_height().is_finite()
            || self.effective_width() <= 0.0
            || self.effective_height() <= 0.0
        {
            return Err(ChartError::InvalidData(format!(
                "plot area must be positive: width={}, height={}",
                self.effective_width(),
                self.effective_height()
            )));
        }
        Ok(self)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(200.0, 200.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_keys_order_before_text_keys() {
        let mut keys = vec![Key::text("b"), Key::number(3.0), Key::text("a"), Key::number(-1.0)];
        keys.sort();
        assert_eq!(
            keys,
            vec![Key::number(-1.0), Key::number(3.0), Key::text("a"), Key::text("b")]
        );
    }

    #[test]
    fn negative_segment_reports_ordered_bounds() {
        let segment = StackSegment {
            layer: "dip".to_owned(),
            raw: -3.0,
            y0: 2.0,
            y1: -1.0,
            hidden: false,
        };
        assert_eq!((segment.low(), segment.high()), (-1.0, 2.0));
    }

    #[test]
    fn stacked_record_survives_json() {
        let mut record = PlotRecord::new(Key::text("a"), Value::from(2.0), 2.0);
        record.stack.push(StackSegment {
            layer: "base".to_owned(),
            raw: 2.0,
            y0: 0.0,
            y1: 2.0,
            hidden: true,
        });
        let json = serde_json::to_string(&record).expect("serialize");
        let back: PlotRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, record);
        assert_eq!(back.stack.len(), 1);
    }

    #[test]
    fn stacked_record_extent_spans_all_segments() {
        let mut record = PlotRecord::new(Key::number(1.0), Value::from(2.0), 2.0);
        record.stack.push(StackSegment {
            layer: "a".to_owned(),
            raw: 2.0,
            y0: 0.0,
            y1: 2.0,
            hidden: false,
        });
        record.stack.push(StackSegment {
            layer: "b".to_owned(),
            raw: 3.0,
            y0: 2.0,
            y1: 5.0,
            hidden: false,
        });
        assert_eq!(record.y_low(), 0.0);
        assert_eq!(record.y_high(), 5.0);
    }

    #[test]
    fn geometry_rejects_collapsed_plot_area() {
        let geometry = Geometry::new(60.0, 200.0).with_margins(Margins::new(0.0, 30.0, 0.0, 30.0));
        assert!(geometry.validate().is_err());
    }
}
