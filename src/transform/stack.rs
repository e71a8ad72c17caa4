use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use smallvec::SmallVec;
use tracing::trace;

use crate::core::{FilterSet, Key, PlotRecord, SourceHandle, StackSegment, ValueAccessor};
use crate::error::ChartResult;

use super::DataStage;

/// One additional series stacked on top of the chart's own group.
#[derive(Clone)]
pub struct StackLayer {
    pub name: String,
    pub source: SourceHandle,
    pub accessor: ValueAccessor,
    pub hidden: bool,
}

impl StackLayer {
    #[must_use]
    pub fn new(name: impl Into<String>, source: SourceHandle, accessor: ValueAccessor) -> Self {
        Self {
            name: name.into(),
            source,
            accessor,
            hidden: false,
        }
    }
}

impl fmt::Debug for StackLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackLayer")
            .field("name", &self.name)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

/// Which keys the stacked sequence is produced for.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StackDomain {
    /// Keys of layer 0, in layer 0's order.
    #[default]
    LayerZero,
    /// Layer 0's keys followed by keys first seen in later layers.
    Union,
    /// Caller-provided keys, in the given order.
    Explicit(Vec<Key>),
}

/// Accumulates `y0`/`y1` offsets layer over layer for every key of the domain.
///
/// Layer 0 is the wrapped stage's output. Keys missing from a layer count as 0.
/// Layer records and domain keys rejected by `filters` never reach the output.
pub struct StackStage {
    inner: Box<dyn DataStage>,
    base_name: String,
    base_hidden: bool,
    layers: Vec<StackLayer>,
    domain: StackDomain,
    filters: FilterSet,
}

impl StackStage {
    #[must_use]
    pub fn new(inner: Box<dyn DataStage>, base_name: impl Into<String>) -> Self {
        Self {
            inner,
            base_name: base_name.into(),
            base_hidden: false,
            layers: Vec::new(),
            domain: StackDomain::LayerZero,
            filters: FilterSet::new(),
        }
    }

    #[must_use]
    pub fn with_base_hidden(mut self, hidden: bool) -> Self {
        self.base_hidden = hidden;
        self
    }

    #[must_use]
    pub fn with_layers(mut self, layers: Vec<StackLayer>) -> Self {
        self.layers = layers;
        self
    }

    #[must_use]
    pub fn with_domain(mut self, domain: StackDomain) -> Self {
        self.domain = domain;
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    fn layer_values(&self) -> ChartResult<Vec<IndexMap<Key, f64>>> {
        let mut out = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let mut values = IndexMap::new();
            for record in layer.source.all() {
                if !self.filters.accepts(&record.key) {
                    continue;
                }
                let value = (layer.accessor)(&record.value)?;
                values.insert(record.key, value);
            }
            out.push(values);
        }
        Ok(out)
    }

    fn annotate(&self, mut record: PlotRecord, raw0: f64, lookups: &[IndexMap<Key, f64>]) -> PlotRecord {
        let mut segments = SmallVec::with_capacity(lookups.len() + 1);
        segments.push(StackSegment {
            layer: self.base_name.clone(),
            raw: raw0,
            y0: 0.0,
            y1: raw0,
            hidden: self.base_hidden,
        });
        let mut offset = raw0;
        for (layer, values) in self.layers.iter().zip(lookups) {
            let raw = values.get(&record.key).copied().unwrap_or(0.0);
            segments.push(StackSegment {
                layer: layer.name.clone(),
                raw,
                y0: offset,
                y1: offset + raw,
                hidden: layer.hidden,
            });
            offset += raw;
        }
        record.stack = segments;
        record
    }
}

impl DataStage for StackStage {
    fn data(&self) -> ChartResult<Vec<PlotRecord>> {
        let base = self.inner.data()?;
        let lookups = self.layer_values()?;

        let out: Vec<PlotRecord> = match &self.domain {
            StackDomain::LayerZero => base
                .into_iter()
                .map(|record| {
                    let raw0 = record.plot_value;
                    self.annotate(record, raw0, &lookups)
                })
                .collect(),
            StackDomain::Union | StackDomain::Explicit(_) => {
                let mut keys: IndexSet<Key> = match &self.domain {
                    StackDomain::Explicit(keys) => keys.iter().cloned().collect(),
                    _ => base
                        .iter()
                        .map(|record| record.key.clone())
                        .chain(lookups.iter().flat_map(|values| values.keys().cloned()))
                        .collect(),
                };
                keys.retain(|key| self.filters.accepts(key));
                let mut by_key: IndexMap<Key, PlotRecord> = IndexMap::with_capacity(base.len());
                for record in base {
                    by_key.entry(record.key.clone()).or_insert(record);
                }
                keys.into_iter()
                    .map(|key| match by_key.swap_remove(&key) {
                        Some(record) => {
                            let raw0 = record.plot_value;
                            self.annotate(record, raw0, &lookups)
                        }
                        None => {
                            let mut record = PlotRecord::new(key, Value::Null, 0.0);
                            record.synthetic = true;
                            self.annotate(record, 0.0, &lookups)
                        }
                    })
                    .collect()
            }
        };
        trace!(
            count = out.len(),
            layers = self.layers.len() + 1,
            "stack stage applied"
        );
        Ok(out)
    }
}
