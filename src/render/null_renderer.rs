use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ChartResult;
use crate::render::{
    AxisSide, RenderFrame, RenderPhase, Renderer, TransitionPlan, TransitionTarget,
};

/// Condensed record of one frame a [`NullRenderer`] accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub chart: String,
    pub phase: RenderPhase,
    pub record_count: usize,
    pub x_domain: (f64, f64),
    pub y_domain: (f64, f64),
    pub y_axis: AxisSide,
    pub right_y_domain: Option<(f64, f64)>,
    pub grid_lines: AxisSide,
    pub title_count: usize,
    pub color_count: usize,
    pub transition: TransitionPlan,
}

/// Call made on the transition collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionCall {
    Transition(Option<String>),
    Duration(u64),
    Delay(u64),
}

#[derive(Debug, Default)]
struct RenderLogInner {
    frames: Vec<FrameSummary>,
    transitions: Vec<TransitionCall>,
}

/// Shared, cloneable log of what headless renderers received.
///
/// Several renderers may write into one log so tests can observe the
/// interleaving of a whole broadcast.
#[derive(Debug, Clone, Default)]
pub struct RenderLog {
    inner: Rc<RefCell<RenderLogInner>>,
}

impl RenderLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames(&self) -> Vec<FrameSummary> {
        self.inner.borrow().frames.clone()
    }

    #[must_use]
    pub fn frames_for(&self, chart: &str) -> Vec<FrameSummary> {
        self.inner
            .borrow()
            .frames
            .iter()
            .filter(|frame| frame.chart == chart)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<FrameSummary> {
        self.inner.borrow().frames.last().cloned()
    }

    #[must_use]
    pub fn transition_calls(&self) -> Vec<TransitionCall> {
        self.inner.borrow().transitions.clone()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.frames.clear();
        inner.transitions.clear();
    }
}

/// No-op renderer used by tests and headless coordination.
///
/// It still validates each frame so geometry and domain mistakes surface
/// without a real backend.
#[derive(Debug, Default)]
pub struct NullRenderer {
    log: RenderLog,
}

impl NullRenderer {
    #[must_use]
    pub fn with_log(log: RenderLog) -> Self {
        Self { log }
    }

    #[must_use]
    pub fn log(&self) -> &RenderLog {
        &self.log
    }
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.log.inner.borrow_mut().frames.push(FrameSummary {
            chart: frame.chart.clone(),
            phase: frame.phase,
            record_count: frame.records.len(),
            x_domain: frame.x_domain,
            y_domain: frame.y_domain,
            y_axis: frame.y_axis,
            right_y_domain: frame.right_y_domain,
            grid_lines: frame.grid_lines,
            title_count: frame.titles.len(),
            color_count: frame.colors.len(),
            transition: frame.transition.clone(),
        });
        Ok(())
    }

    fn transition_target(&mut self) -> Option<&mut dyn TransitionTarget> {
        Some(self)
    }
}

impl TransitionTarget for NullRenderer {
    fn transition(&mut self, name: Option<&str>) {
        self.log
            .inner
            .borrow_mut()
            .transitions
            .push(TransitionCall::Transition(name.map(str::to_owned)));
    }

    fn duration(&mut self, ms: u64) {
        self.log
            .inner
            .borrow_mut()
            .transitions
            .push(TransitionCall::Duration(ms));
    }

    fn delay(&mut self, ms: u64) {
        self.log
            .inner
            .borrow_mut()
            .transitions
            .push(TransitionCall::Delay(ms));
    }
}
