mod frame;
mod null_renderer;
mod transition;

pub use frame::{AxisSide, RenderFrame, RenderPhase};
pub use null_renderer::{FrameSummary, NullRenderer, RenderLog, TransitionCall};
pub use transition::{TransitionPlan, TransitionTarget};

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `RenderFrame`, so shape drawing
/// stays isolated from filtering, grouping and axis coordination.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;

    /// Animation collaborator, when the backend supports transitions.
    fn transition_target(&mut self) -> Option<&mut dyn TransitionTarget> {
        None
    }
}
