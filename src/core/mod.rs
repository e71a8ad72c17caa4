pub mod accessor;
pub mod filter;
pub mod scale;
pub mod source;
pub mod types;

pub use accessor::{
    OrderingAccessor, ValueAccessor, field_value, number_value, ordering_accessor, value_accessor,
};
pub use filter::{Filter, FilterSet, KeyPredicate};
pub use scale::LinearScale;
pub use source::{
    Dimension, DimensionFilter, DimensionHandle, GroupedSource, RecordingDimension, SourceHandle,
    StaticGroup,
};
pub use types::{Geometry, Key, Margins, PlotRecord, Record, StackSegment};
