use crate::core::{OrderingAccessor, PlotRecord};
use crate::error::ChartResult;

use super::DataStage;

/// Re-sorts records ascending by a caller-supplied ordering key (stable).
pub struct SortStage {
    inner: Box<dyn DataStage>,
    ordering: OrderingAccessor,
}

impl SortStage {
    #[must_use]
    pub fn new(inner: Box<dyn DataStage>, ordering: OrderingAccessor) -> Self {
        Self { inner, ordering }
    }
}

impl DataStage for SortStage {
    fn data(&self) -> ChartResult<Vec<PlotRecord>> {
        let records = self.inner.data()?;
        let mut keyed = Vec::with_capacity(records.len());
        for record in records {
            let order = (self.ordering)(&record)?;
            keyed.push((order, record));
        }
        keyed.sort_by(|lhs, rhs| lhs.0.total_cmp(&rhs.0));
        Ok(keyed.into_iter().map(|(_, record)| record).collect())
    }
}
