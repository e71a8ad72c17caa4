use tracing::{debug, warn};

use crate::core::Filter;
use crate::error::{ChartError, ChartResult};
use crate::render::{TransitionPlan, TransitionTarget};

use super::{Chart, ChartHandle, CoordinationContext, RenderContext};

/// Group-scoped operation a broadcast performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOp {
    FilterAll,
    Render,
    Redraw,
}

/// One chart that failed during a broadcast.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFailure {
    pub chart: String,
    pub error: ChartError,
}

/// Outcome of a broadcast. Failures are collected per chart; a failing chart
/// never stops its siblings from being visited.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastReport {
    pub op: BroadcastOp,
    pub group: Option<String>,
    pub visited: usize,
    pub failures: Vec<ChartFailure>,
}

impl BroadcastReport {
    fn new(op: BroadcastOp, group: Option<&str>) -> Self {
        Self {
            op,
            group: group.map(str::to_owned),
            visited: 0,
            failures: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Converts to the first failure, for callers that want fail-fast semantics.
    pub fn into_result(self) -> ChartResult<Self> {
        match self.failures.first() {
            Some(failure) => Err(failure.error.clone()),
            None => Ok(self),
        }
    }
}

impl CoordinationContext {
    /// Clears the filters of every chart in `group`.
    pub fn filter_all(&mut self, group: Option<&str>) -> BroadcastReport {
        self.broadcast(BroadcastOp::FilterAll, group, |chart, _| chart.filter_all())
    }

    /// Renders every chart in `group`, then fires each renderlet once.
    pub fn render_all(&mut self, group: Option<&str>) -> BroadcastReport {
        let report = self.broadcast(BroadcastOp::Render, group, |chart, cx| chart.render(cx));
        self.renderlets.fire(group);
        report
    }

    /// Redraws every chart in `group`, then fires each renderlet once.
    pub fn redraw_all(&mut self, group: Option<&str>) -> BroadcastReport {
        let report = self.broadcast(BroadcastOp::Redraw, group, |chart, cx| chart.redraw(cx));
        self.renderlets.fire(group);
        report
    }

    /// Transition gate bound to this context's disable switch.
    pub fn transition<T: TransitionTarget + ?Sized>(
        &self,
        target: &mut T,
        duration_ms: u64,
        delay_ms: Option<u64>,
        name: Option<&str>,
    ) -> TransitionPlan {
        self.render_context()
            .transition(target, duration_ms, delay_ms, name)
    }

    /// Toggles `filter` on `chart`, then redraws the group that holds it.
    ///
    /// Registry membership decides the group; the chart's own label is used
    /// only while the chart is unregistered.
    pub fn filter_and_redraw(
        &mut self,
        chart: &ChartHandle,
        filter: Filter,
    ) -> ChartResult<BroadcastReport> {
        let label = {
            let mut target = chart.try_borrow_mut().map_err(|_| ChartError::ChartBusy {
                chart: "<borrowed>".to_owned(),
            })?;
            target.toggle_filter(filter)?;
            target.chart_group().map(str::to_owned)
        };
        let group = match self.registry.group_of(chart) {
            Some(key) => key.label().map(str::to_owned),
            None => label,
        };
        Ok(self.redraw_all(group.as_deref()))
    }

    fn broadcast(
        &mut self,
        op: BroadcastOp,
        group: Option<&str>,
        mut action: impl FnMut(&mut dyn Chart, &RenderContext) -> ChartResult<()>,
    ) -> BroadcastReport {
        let cx = self.render_context();
        let mut report = BroadcastReport::new(op, group);
        for chart in self.registry.list(group) {
            report.visited += 1;
            let Ok(mut target) = chart.try_borrow_mut() else {
                warn!(?op, group = ?group, "chart busy during broadcast");
                report.failures.push(ChartFailure {
                    chart: "<borrowed>".to_owned(),
                    error: ChartError::ChartBusy {
                        chart: "<borrowed>".to_owned(),
                    },
                });
                continue;
            };
            if let Err(error) = action(&mut *target, &cx) {
                warn!(?op, chart = target.name(), error = %error, "chart failed during broadcast");
                report.failures.push(ChartFailure {
                    chart: target.name().to_owned(),
                    error,
                });
            }
        }
        debug!(
            ?op,
            group = ?group,
            visited = report.visited,
            failed = report.failures.len(),
            "broadcast finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::api::BaseChart;
    use crate::core::{RecordingDimension, Record, StaticGroup};
    use crate::render::NullRenderer;

    #[test]
    fn broadcast_collects_failures_and_keeps_going() {
        let mut cx = CoordinationContext::new();
        let broken: ChartHandle = Rc::new(RefCell::new(BaseChart::new("broken", NullRenderer::default())));
        let healthy: ChartHandle = Rc::new(RefCell::new(
            BaseChart::new("healthy", NullRenderer::default())
                .with_source(Rc::new(StaticGroup::new(vec![Record::new(1, 1.0)])))
                .with_dimension(Rc::new(RecordingDimension::default())),
        ));
        cx.set_chart_group(&broken, Some("g")).expect("broken");
        cx.set_chart_group(&healthy, Some("g")).expect("healthy");

        let report = cx.render_all(Some("g"));
        assert_eq!(report.visited, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].chart, "broken");
        assert!(report.failures[0].error.is_configuration());
        assert!(report.into_result().is_err());
    }
}
