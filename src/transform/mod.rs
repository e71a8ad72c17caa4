//! Data transform chain.
//!
//! Every stage exposes the same [`DataStage::data`] contract and wraps the
//! stage before it, so plain, filtered, capped and stacked sequences are
//! built by composition:
//!
//! `BaseStage -> FilterStage -> [SortStage] -> [CapperStage] -> [StackStage]`

mod base;
mod capper;
mod filter_stage;
mod sort;
mod stack;

pub use base::BaseStage;
pub use capper::{CapConfig, CapperStage, OthersPolicy};
pub use filter_stage::FilterStage;
pub use sort::SortStage;
pub use stack::{StackDomain, StackLayer, StackStage};

use tracing::debug;

use crate::core::{
    FilterSet, OrderingAccessor, PlotRecord, SourceHandle, ValueAccessor, number_value,
};
use crate::error::{ChartError, ChartResult};

/// Produces the ordered record sequence a chart plots.
pub trait DataStage {
    fn data(&self) -> ChartResult<Vec<PlotRecord>>;
}

#[derive(Debug, Clone)]
struct StackSettings {
    base_name: String,
    base_hidden: bool,
    layers: Vec<StackLayer>,
    domain: StackDomain,
}

/// Ordered pipeline owned by one chart.
///
/// Holds the chart's source and stage configuration and composes a fresh
/// stage stack on every pull, so configuration changes apply immediately.
pub struct DataTransformChain {
    source: Option<SourceHandle>,
    value_accessor: ValueAccessor,
    filters: FilterSet,
    ordering: Option<OrderingAccessor>,
    cap: Option<CapConfig>,
    stack: Option<StackSettings>,
}

impl DataTransformChain {
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            value_accessor: number_value(),
            filters: FilterSet::new(),
            ordering: None,
            cap: None,
            stack: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: SourceHandle) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_value_accessor(mut self, accessor: ValueAccessor) -> Self {
        self.value_accessor = accessor;
        self
    }

    #[must_use]
    pub fn source(&self) -> Option<&SourceHandle> {
        self.source.as_ref()
    }

    pub fn set_source(&mut self, source: SourceHandle) {
        self.source = Some(source);
    }

    #[must_use]
    pub fn value_accessor(&self) -> &ValueAccessor {
        &self.value_accessor
    }

    pub fn set_value_accessor(&mut self, accessor: ValueAccessor) {
        self.value_accessor = accessor;
    }

    /// Shared handle to the filters the filter stage applies.
    #[must_use]
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn set_ordering(&mut self, ordering: Option<OrderingAccessor>) {
        self.ordering = ordering;
    }

    #[must_use]
    pub fn cap(&self) -> Option<&CapConfig> {
        self.cap.as_ref()
    }

    /// Enables (or with `cap: None`, disables) the capper stage.
    pub fn set_cap(&mut self, config: CapConfig) -> ChartResult<()> {
        if config.validated_cap()?.is_none() {
            self.cap = None;
            return Ok(());
        }
        self.cap = Some(config);
        Ok(())
    }

    pub fn clear_cap(&mut self) {
        self.cap = None;
    }

    /// Names the chart's own group when it acts as stack layer 0.
    pub fn set_base_layer_name(&mut self, name: impl Into<String>) {
        self.stack_settings().base_name = name.into();
    }

    /// Adds a stack layer on top of the existing ones.
    pub fn stack(&mut self, layer: StackLayer) {
        debug!(layer = %layer.name, "stack layer added");
        self.stack_settings().layers.push(layer);
    }

    pub fn set_stack_domain(&mut self, domain: StackDomain) {
        self.stack_settings().domain = domain;
    }

    #[must_use]
    pub fn is_stacked(&self) -> bool {
        self.stack.is_some()
    }

    /// Layer names with their hidden flag, layer 0 first.
    #[must_use]
    pub fn stack_layers(&self) -> Vec<(String, bool)> {
        let Some(stack) = &self.stack else {
            return Vec::new();
        };
        std::iter::once((stack.base_name.clone(), stack.base_hidden))
            .chain(stack.layers.iter().map(|layer| (layer.name.clone(), layer.hidden)))
            .collect()
    }

    /// Marks a layer hidden/visible. Returns `false` for unknown names.
    pub fn set_layer_hidden(&mut self, name: &str, hidden: bool) -> bool {
        let Some(stack) = &mut self.stack else {
            return false;
        };
        if stack.base_name == name {
            stack.base_hidden = hidden;
            return true;
        }
        match stack.layers.iter_mut().find(|layer| layer.name == name) {
            Some(layer) => {
                layer.hidden = hidden;
                true
            }
            None => false,
        }
    }

    /// Composes the stage stack for the current configuration.
    pub fn build(&self) -> ChartResult<Box<dyn DataStage>> {
        let source = self.source.clone().ok_or_else(|| ChartError::MissingAttribute {
            chart: "data chain".to_owned(),
            attribute: "group",
        })?;

        let mut head: Box<dyn DataStage> =
            Box::new(BaseStage::new(source, self.value_accessor.clone()));
        head = Box::new(FilterStage::new(head, self.filters.clone()));
        if let Some(ordering) = &self.ordering {
            head = Box::new(SortStage::new(head, ordering.clone()));
        }
        if let Some(cap) = &self.cap {
            head = Box::new(CapperStage::new(head, cap)?);
        }
        if let Some(stack) = &self.stack {
            head = Box::new(
                StackStage::new(head, stack.base_name.clone())
                    .with_base_hidden(stack.base_hidden)
                    .with_layers(stack.layers.clone())
                    .with_domain(stack.domain.clone())
                    .with_filters(self.filters.clone()),
            );
        }
        Ok(head)
    }

    fn stack_settings(&mut self) -> &mut StackSettings {
        self.stack.get_or_insert_with(|| StackSettings {
            base_name: "layer 0".to_owned(),
            base_hidden: false,
            layers: Vec::new(),
            domain: StackDomain::LayerZero,
        })
    }
}

impl Default for DataTransformChain {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStage for DataTransformChain {
    fn data(&self) -> ChartResult<Vec<PlotRecord>> {
        self.build()?.data()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::core::{Filter, Key, Record, StaticGroup};

    fn chain(values: &[(i32, f64)]) -> DataTransformChain {
        let records = values.iter().map(|(k, v)| Record::new(*k, *v)).collect();
        DataTransformChain::new().with_source(Rc::new(StaticGroup::new(records)))
    }

    #[test]
    fn chain_without_source_reports_missing_group() {
        let err = DataTransformChain::new().data().expect_err("no source");
        assert!(matches!(
            err,
            ChartError::MissingAttribute {
                attribute: "group",
                ..
            }
        ));
    }

    #[test]
    fn filter_then_cap_then_stack() {
        let mut chain = chain(&[(1, 5.0), (2, 1.0), (3, 8.0), (4, 2.0), (5, 4.0)]);
        chain.filters().replace(vec![Filter::range(1, 5).expect("range")]);
        chain
            .set_cap(CapConfig::new(2).with_others_label("rest"))
            .expect("cap");
        chain.set_base_layer_name("base");
        chain.stack(StackLayer::new(
            "extra",
            Rc::new(StaticGroup::new(vec![Record::new(3, 1.0)])),
            number_value(),
        ));

        let data = chain.data().expect("data");
        let keys: Vec<Key> = data.iter().map(|r| r.key.clone()).collect();
        assert_eq!(keys, vec![Key::number(3.0), Key::number(1.0), Key::text("rest")]);
        assert_eq!(data[2].plot_value, 3.0);
        assert_eq!(data[0].stack[1].y1, 9.0);
    }

    #[test]
    fn disabling_cap_restores_pass_through() {
        let mut chain = chain(&[(1, 1.0), (2, 2.0), (3, 3.0)]);
        chain.set_cap(CapConfig::new(1)).expect("cap");
        assert_eq!(chain.data().expect("data").len(), 2);
        chain.set_cap(CapConfig::default()).expect("uncapped");
        assert_eq!(chain.data().expect("data").len(), 3);
    }

    #[test]
    fn negative_cap_is_rejected_at_configuration_time() {
        let mut chain = chain(&[(1, 1.0)]);
        assert_eq!(
            chain.set_cap(CapConfig::new(-3)),
            Err(ChartError::InvalidCapCount { cap: -3 })
        );
        assert!(chain.cap().is_none());
    }

    #[test]
    fn layer_visibility_toggles_by_name() {
        let mut chain = chain(&[(1, 1.0)]);
        chain.set_base_layer_name("base");
        chain.stack(StackLayer::new(
            "top",
            Rc::new(StaticGroup::new(Vec::new())),
            number_value(),
        ));
        assert!(chain.set_layer_hidden("top", true));
        assert!(!chain.set_layer_hidden("missing", true));
        assert_eq!(
            chain.stack_layers(),
            vec![("base".to_owned(), false), ("top".to_owned(), true)]
        );
    }
}
