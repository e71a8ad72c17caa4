use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::{DimensionHandle, Filter, LinearScale, Margins, PlotRecord, SourceHandle};
use crate::error::ChartResult;
use crate::render::{RenderPhase, TransitionPlan, TransitionTarget};

use super::ChartOptions;

/// Shared handle under which charts are registered.
pub type ChartHandle = Rc<RefCell<dyn Chart>>;

/// Produces the hover title for one plotted record.
pub type TitleFn = Rc<dyn Fn(&PlotRecord) -> String>;

/// Process-wide render settings handed to every chart of a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderContext {
    pub transitions_disabled: bool,
}

impl RenderContext {
    /// Transition gate: decides whether `target` gets configured at all.
    ///
    /// A zero duration or the global disable switch yields an immediate plan
    /// and leaves `target` untouched.
    pub fn transition<T: TransitionTarget + ?Sized>(
        &self,
        target: &mut T,
        duration_ms: u64,
        delay_ms: Option<u64>,
        name: Option<&str>,
    ) -> TransitionPlan {
        let plan = TransitionPlan::resolve(duration_ms, delay_ms, name, self.transitions_disabled);
        plan.apply(target);
        plan
    }
}

/// Legend entry contributed by a chart or one of its stack layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legendable {
    pub chart: String,
    pub name: String,
    pub hidden: bool,
}

/// Minimal capability set of every coordinated widget.
pub trait Chart {
    fn name(&self) -> &str;

    /// Chart group label; `None` is the implicit global group.
    fn chart_group(&self) -> Option<&str>;

    /// Updates the label only. Registry membership follows through
    /// `CoordinationContext::set_chart_group`.
    fn set_chart_group(&mut self, group: Option<String>);

    fn filters(&self) -> Vec<Filter>;

    fn has_filter(&self) -> bool {
        !self.filters().is_empty()
    }

    /// Adds the filter when absent, removes it when present.
    fn toggle_filter(&mut self, filter: Filter) -> ChartResult<()>;

    /// Replaces the whole filter set.
    fn replace_filters(&mut self, filters: Vec<Filter>) -> ChartResult<()>;

    /// Clears this chart's own filters.
    fn filter_all(&mut self) -> ChartResult<()> {
        self.replace_filters(Vec::new())
    }

    fn render(&mut self, cx: &RenderContext) -> ChartResult<()>;

    fn redraw(&mut self, cx: &RenderContext) -> ChartResult<()>;

    fn apply_options(&mut self, options: &ChartOptions) -> ChartResult<()>;

    fn legendables(&self) -> Vec<Legendable>;
}

/// Charts plotted on an x/y grid; the only kind a composite can host.
pub trait CoordinateGridChart: Chart {
    fn width(&self) -> f64;
    fn set_width(&mut self, width: f64);
    fn height(&self) -> f64;
    fn set_height(&mut self, height: f64);
    fn margins(&self) -> Margins;
    fn set_margins(&mut self, margins: Margins);

    fn x_scale(&self) -> LinearScale;
    fn set_x_scale(&mut self, scale: LinearScale);
    fn y_scale(&self) -> LinearScale;
    fn set_y_scale(&mut self, scale: LinearScale);

    fn dimension(&self) -> Option<DimensionHandle>;
    fn set_dimension(&mut self, dimension: DimensionHandle);
    fn source(&self) -> Option<SourceHandle>;
    fn set_source(&mut self, source: SourceHandle);

    fn use_right_y_axis(&self) -> bool;
    fn set_use_right_y_axis(&mut self, right: bool);

    fn title_fn(&self) -> Option<TitleFn>;
    fn set_title_fn(&mut self, title: Option<TitleFn>);
    fn colors(&self) -> Vec<String>;
    fn set_colors(&mut self, colors: Vec<String>);

    /// Plotted `(min, max)` y values, `None` when there is no data.
    fn y_extent(&self) -> ChartResult<Option<(f64, f64)>>;
    /// Lowest plotted y value of this chart's data, 0 when empty.
    fn y_axis_min(&self) -> ChartResult<f64> {
        Ok(self.y_extent()?.map_or(0.0, |(min, _)| min))
    }
    /// Highest plotted y value of this chart's data, 0 when empty.
    fn y_axis_max(&self) -> ChartResult<f64> {
        Ok(self.y_extent()?.map_or(0.0, |(_, max)| max))
    }
    /// Numeric key extent, `None` when no key is numeric.
    fn x_extent(&self) -> ChartResult<Option<(f64, f64)>>;

    /// Draws with the scales currently set, without recomputing them.
    fn plot(&mut self, cx: &RenderContext, phase: RenderPhase) -> ChartResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{NullRenderer, TransitionCall};

    #[test]
    fn zero_duration_never_touches_collaborator() {
        let mut target = NullRenderer::default();
        let plan = RenderContext::default().transition(&mut target, 0, Some(0), None);
        assert_eq!(plan, TransitionPlan::Immediate);
        assert!(target.log().transition_calls().is_empty());
    }

    #[test]
    fn disabled_switch_skips_even_long_transitions() {
        let mut target = NullRenderer::default();
        let cx = RenderContext {
            transitions_disabled: true,
        };
        assert!(!cx.transition(&mut target, 500, Some(20), None).is_animated());
        assert!(target.log().transition_calls().is_empty());
    }

    #[test]
    fn configures_duration_delay_and_name() {
        let mut target = NullRenderer::default();
        let plan = RenderContext::default().transition(&mut target, 100, Some(100), Some("fade"));
        assert!(plan.is_animated());
        assert_eq!(
            target.log().transition_calls(),
            vec![
                TransitionCall::Transition(Some("fade".to_owned())),
                TransitionCall::Duration(100),
                TransitionCall::Delay(100),
            ]
        );
    }

    #[test]
    fn delay_defaults_to_zero() {
        let mut target = NullRenderer::default();
        RenderContext::default().transition(&mut target, 250, None, None);
        assert!(target.log().transition_calls().contains(&TransitionCall::Delay(0)));
    }
}
