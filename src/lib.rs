//! crosschart: coordination core for dimensional cross-filter charts.
//!
//! Charts register into named groups, pull their plotted records through a
//! composable transform chain (filter, sort, cap, stack) and are rendered or
//! redrawn group-wide. Composite charts share one coordinate grid across
//! several children and align dual y-axes. Drawing is delegated to a
//! [`render::Renderer`] backend.

pub mod api;
pub mod core;
pub mod error;
pub mod render;
pub mod telemetry;
pub mod transform;

pub use api::{
    BaseChart, BroadcastReport, Chart, ChartHandle, CompositeChart, CoordinateGridChart,
    CoordinationContext,
};
pub use error::{ChartError, ChartResult};
