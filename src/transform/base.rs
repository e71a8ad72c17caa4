use tracing::trace;

use crate::core::{PlotRecord, SourceHandle, ValueAccessor};
use crate::error::ChartResult;

use super::DataStage;

/// Head of every chain: reads the grouped source in its own order and
/// derives `plot_value` through the value accessor.
pub struct BaseStage {
    source: SourceHandle,
    value_accessor: ValueAccessor,
}

impl BaseStage {
    #[must_use]
    pub fn new(source: SourceHandle, value_accessor: ValueAccessor) -> Self {
        Self {
            source,
            value_accessor,
        }
    }
}

impl DataStage for BaseStage {
    fn data(&self) -> ChartResult<Vec<PlotRecord>> {
        let records = self.source.all();
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let plot_value = (self.value_accessor)(&record.value)?;
            out.push(PlotRecord::new(record.key, record.value, plot_value));
        }
        trace!(count = out.len(), "base stage read");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::core::{GroupedSource, Key, Record, StaticGroup, field_value, number_value};
    use crate::error::ChartError;

    #[test]
    fn preserves_source_order_and_derives_plot_value() {
        let source = Rc::new(StaticGroup::new(vec![
            Record::new(3, json!({"total": 9})),
            Record::new(1, json!({"total": 4})),
        ]));
        let stage = BaseStage::new(source, field_value("total"));
        let data = stage.data().expect("data");
        assert_eq!(data[0].key, Key::number(3.0));
        assert_eq!(data[0].plot_value, 9.0);
        assert_eq!(data[1].key, Key::number(1.0));
        assert_eq!(data[1].value, json!({"total": 4}));
    }

    #[test]
    fn derived_fields_never_touch_the_source() {
        let source = Rc::new(StaticGroup::new(vec![Record::new("a", 2.0)]));
        let stage = BaseStage::new(source.clone(), number_value());
        let mut data = stage.data().expect("data");
        data[0].plot_value = 100.0;
        data[0].value = json!(100.0);
        assert_eq!(source.all()[0].value, json!(2.0));
    }

    #[test]
    fn accessor_error_propagates_unchanged() {
        let source = Rc::new(StaticGroup::new(vec![Record::new("a", "oops")]));
        let stage = BaseStage::new(source, number_value());
        let err = stage.data().expect_err("non-numeric payload");
        assert!(matches!(err, ChartError::Accessor(_)));
    }
}
