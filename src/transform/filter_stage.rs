use tracing::trace;

use crate::core::{FilterSet, PlotRecord};
use crate::error::ChartResult;

use super::DataStage;

/// Drops records whose key is rejected by the chart's active filters.
pub struct FilterStage {
    inner: Box<dyn DataStage>,
    filters: FilterSet,
}

impl FilterStage {
    #[must_use]
    pub fn new(inner: Box<dyn DataStage>, filters: FilterSet) -> Self {
        Self { inner, filters }
    }
}

impl DataStage for FilterStage {
    fn data(&self) -> ChartResult<Vec<PlotRecord>> {
        let mut records = self.inner.data()?;
        if self.filters.is_empty() {
            return Ok(records);
        }
        let before = records.len();
        records.retain(|record| self.filters.accepts(&record.key));
        trace!(before, after = records.len(), "filter stage applied");
        Ok(records)
    }
}
