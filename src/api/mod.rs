mod axis_extent;
mod base_chart;
mod chart;
mod composite;
mod config;
mod context;
mod registry;
mod render_cycle;
mod renderlets;

pub use axis_extent::{AxisExtent, aggregate_extent, align_zero};
pub use base_chart::{BaseChart, FilteredListener};
pub use chart::{Chart, ChartHandle, CoordinateGridChart, Legendable, RenderContext, TitleFn};
pub use composite::CompositeChart;
pub use config::{ChartOptions, CompositeConfig, TransitionConfig};
pub use context::{CoordinationContext, with_default_context};
pub use registry::{ChartGroupKey, ChartRegistry, same_chart};
pub use render_cycle::{BroadcastOp, BroadcastReport, ChartFailure};
pub use renderlets::{Renderlet, RenderletId};
