use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::core::{Key, PlotRecord};
use crate::error::{ChartError, ChartResult};

use super::DataStage;

fn default_others_label() -> String {
    "Others".to_owned()
}

/// What happens to records ranked below the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OthersPolicy {
    /// Collapse the tail into one synthetic record holding the summed value.
    #[default]
    Aggregate,
    /// Drop the tail entirely.
    Drop,
}

/// "Top N plus others" configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapConfig {
    /// `None` disables capping.
    #[serde(default)]
    pub cap: Option<i64>,
    #[serde(default = "default_others_label")]
    pub others_label: String,
    #[serde(default)]
    pub others: OthersPolicy,
}

impl CapConfig {
    #[must_use]
    pub fn new(cap: i64) -> Self {
        Self {
            cap: Some(cap),
            others_label: default_others_label(),
            others: OthersPolicy::Aggregate,
        }
    }

    #[must_use]
    pub fn with_others_label(mut self, label: impl Into<String>) -> Self {
        self.others_label = label.into();
        self
    }

    #[must_use]
    pub fn with_others_policy(mut self, policy: OthersPolicy) -> Self {
        self.others = policy;
        self
    }

    /// Rejects negative caps; returns the usable count when capping is enabled.
    pub fn validated_cap(&self) -> ChartResult<Option<usize>> {
        match self.cap {
            None => Ok(None),
            Some(cap) if cap < 0 => Err(ChartError::InvalidCapCount { cap }),
            Some(cap) => usize::try_from(cap)
                .map(Some)
                .map_err(|_| ChartError::InvalidCapCount { cap }),
        }
    }
}

impl Default for CapConfig {
    fn default() -> Self {
        Self {
            cap: None,
            others_label: default_others_label(),
            others: OthersPolicy::Aggregate,
        }
    }
}

/// Keeps the `cap` largest records and folds the rest into an "others" bucket.
pub struct CapperStage {
    inner: Box<dyn DataStage>,
    cap: usize,
    others_label: Key,
    others: OthersPolicy,
}

impl CapperStage {
    pub fn new(inner: Box<dyn DataStage>, config: &CapConfig) -> ChartResult<Self> {
        let Some(cap) = config.validated_cap()? else {
            return Err(ChartError::InvalidData(
                "capper stage requires a cap count".to_owned(),
            ));
        };
        Ok(Self {
            inner,
            cap,
            others_label: Key::text(config.others_label.clone()),
            others: config.others,
        })
    }
}

impl DataStage for CapperStage {
    fn data(&self) -> ChartResult<Vec<PlotRecord>> {
        let mut records = self.inner.data()?;
        if self.cap >= records.len() {
            return Ok(records);
        }

        // `sort_by` is stable, so equal values keep their incoming order.
        records.sort_by(|lhs, rhs| rhs.plot_value.total_cmp(&lhs.plot_value));
        let rest = records.split_off(self.cap);
        trace!(kept = records.len(), folded = rest.len(), "capper stage applied");

        if self.others == OthersPolicy::Aggregate {
            let sum: f64 = rest.iter().map(|record| record.plot_value).sum();
            let mut others = PlotRecord::new(self.others_label.clone(), Value::from(sum), sum);
            others.synthetic = true;
            records.push(others);
        }
        Ok(records)
    }
}
