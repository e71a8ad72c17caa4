use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Continuous scale whose domain/range endpoints the coordination layer
/// computes and pushes down; tick generation lives with the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        validate_endpoints("domain", domain_start, domain_end)?;
        Ok(Self {
            domain_start,
            domain_end,
            range_start: 0.0,
            range_end: 1.0,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    pub fn set_domain(&mut self, start: f64, end: f64) -> ChartResult<()> {
        validate_endpoints("domain", start, end)?;
        self.domain_start = start;
        self.domain_end = end;
        Ok(())
    }

    pub fn set_range(&mut self, start: f64, end: f64) -> ChartResult<()> {
        validate_endpoints("range", start, end)?;
        self.range_start = start;
        self.range_end = end;
        Ok(())
    }
}

impl Default for LinearScale {
    fn default() -> Self {
        Self {
            domain_start: 0.0,
            domain_end: 1.0,
            range_start: 0.0,
            range_end: 1.0,
        }
    }
}

fn validate_endpoints(what: &str, start: f64, end: f64) -> ChartResult<()> {
    if !start.is_finite() || !end.is_finite() || start == end {
        return Err(ChartError::InvalidData(format!(
            "scale {what} must be finite and non-zero: [{start}, {end}]"
        )));
    }
    Ok(())
}
