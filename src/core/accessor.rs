use std::rc::Rc;

use serde_json::Value;

use crate::core::types::PlotRecord;
use crate::error::{ChartError, ChartResult};

/// Caller-supplied mapping from a record payload to the number that gets plotted.
///
/// Errors are returned to the caller untouched; stages never retry or swallow them.
pub type ValueAccessor = Rc<dyn Fn(&Value) -> ChartResult<f64>>;

/// Caller-supplied sort key for [`crate::transform::SortStage`].
pub type OrderingAccessor = Rc<dyn Fn(&PlotRecord) -> ChartResult<f64>>;

/// Reads the payload itself as a number.
#[must_use]
pub fn number_value() -> ValueAccessor {
    Rc::new(|value: &Value| {
        value
            .as_f64()
            .ok_or_else(|| ChartError::Accessor(format!("value is not numeric: {value}")))
    })
}

/// Reads a numeric field of an object payload, e.g. `{"total": 3, "count": 1}`.
#[must_use]
pub fn field_value(field: impl Into<String>) -> ValueAccessor {
    let field = field.into();
    Rc::new(move |value: &Value| {
        value
            .get(&field)
            .and_then(Value::as_f64)
            .ok_or_else(|| ChartError::Accessor(format!("field `{field}` is missing or not numeric")))
    })
}

#[must_use]
pub fn value_accessor(accessor: impl Fn(&Value) -> ChartResult<f64> + 'static) -> ValueAccessor {
    Rc::new(accessor)
}

#[must_use]
pub fn ordering_accessor(
    accessor: impl Fn(&PlotRecord) -> ChartResult<f64> + 'static,
) -> OrderingAccessor {
    Rc::new(accessor)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn number_value_reads_scalars() {
        assert_eq!(number_value()(&json!(4.5)).expect("numeric"), 4.5);
        let err = number_value()(&json!("x")).expect_err("text is not numeric");
        assert!(matches!(err, ChartError::Accessor(_)));
    }

    #[test]
    fn field_value_reads_object_members() {
        let accessor = field_value("total");
        assert_eq!(accessor(&json!({"total": 7, "count": 2})).expect("field"), 7.0);
        assert!(accessor(&json!({"count": 2})).is_err());
    }
}
