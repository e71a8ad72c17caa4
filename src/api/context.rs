use std::cell::RefCell;

use tracing::debug;

use crate::error::{ChartError, ChartResult};

use super::renderlets::RenderletRegistry;
use super::{ChartHandle, ChartRegistry, RenderContext, RenderletId};

/// Explicit coordination state: chart registry, renderlet callbacks and the
/// global transition switch.
///
/// Nothing in the crate reaches for an ambient instance; hosts that want one
/// can use [`with_default_context`].
#[derive(Debug, Default)]
pub struct CoordinationContext {
    pub(super) registry: ChartRegistry,
    pub(super) renderlets: RenderletRegistry,
    transitions_disabled: bool,
}

impl CoordinationContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn registry(&self) -> &ChartRegistry {
        &self.registry
    }

    /// Registers `chart` under the group its own label names.
    pub fn register_chart(&mut self, chart: ChartHandle) -> ChartResult<()> {
        let group = borrow_label(&chart)?;
        self.registry.register(chart, group.as_deref());
        Ok(())
    }

    /// Empties `group`, or every group when `group` is `None`.
    pub fn deregister_all(&mut self, group: Option<&str>) {
        self.registry.deregister_all(group);
    }

    /// Removes `chart` from whichever group holds it.
    pub fn deregister_chart(&mut self, chart: &ChartHandle) -> bool {
        match self.registry.group_of(chart) {
            Some(key) => self.registry.deregister(chart, key.label()),
            None => false,
        }
    }

    /// Moves `chart` to `group`, updating both its label and its registry slot.
    pub fn set_chart_group(&mut self, chart: &ChartHandle, group: Option<&str>) -> ChartResult<()> {
        {
            let mut target = chart.try_borrow_mut().map_err(|_| ChartError::ChartBusy {
                chart: "<borrowed>".to_owned(),
            })?;
            target.set_chart_group(group.map(str::to_owned));
            debug!(chart = target.name(), group = ?group, "chart group changed");
        }
        self.registry.register(chart.clone(), group);
        Ok(())
    }

    pub fn register_renderlet(&mut self, renderlet: impl FnMut(Option<&str>) + 'static) -> RenderletId {
        self.renderlets.register(Box::new(renderlet))
    }

    pub fn remove_renderlet(&mut self, id: RenderletId) -> bool {
        self.renderlets.remove(id)
    }

    #[must_use]
    pub fn renderlet_count(&self) -> usize {
        self.renderlets.len()
    }

    pub fn clear_renderlets(&mut self) {
        self.renderlets.clear();
    }

    pub fn set_transitions_disabled(&mut self, disabled: bool) {
        self.transitions_disabled = disabled;
    }

    #[must_use]
    pub fn transitions_disabled(&self) -> bool {
        self.transitions_disabled
    }

    #[must_use]
    pub fn render_context(&self) -> RenderContext {
        RenderContext {
            transitions_disabled: self.transitions_disabled,
        }
    }
}

fn borrow_label(chart: &ChartHandle) -> ChartResult<Option<String>> {
    let chart = chart.try_borrow().map_err(|_| ChartError::ChartBusy {
        chart: "<borrowed>".to_owned(),
    })?;
    Ok(chart.chart_group().map(str::to_owned))
}

thread_local! {
    static DEFAULT_CONTEXT: RefCell<CoordinationContext> = RefCell::new(CoordinationContext::new());
}

/// Runs `f` against this thread's default context.
///
/// Renderlets and chart callbacks must not re-enter this function while it
/// is running; the context is exclusively borrowed for the duration of `f`.
pub fn with_default_context<T>(f: impl FnOnce(&mut CoordinationContext) -> T) -> T {
    DEFAULT_CONTEXT.with(|cx| f(&mut cx.borrow_mut()))
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::api::BaseChart;
    use crate::render::NullRenderer;

    #[test]
    fn register_chart_uses_the_chart_label() {
        let mut cx = CoordinationContext::new();
        let chart: ChartHandle = Rc::new(RefCell::new(
            BaseChart::new("a", NullRenderer::default()).in_chart_group("dash"),
        ));
        cx.register_chart(chart.clone()).expect("register");
        assert_eq!(cx.registry().list(Some("dash")).len(), 1);
    }

    #[test]
    fn set_chart_group_migrates_label_and_membership() {
        let mut cx = CoordinationContext::new();
        let chart: ChartHandle = Rc::new(RefCell::new(BaseChart::new("a", NullRenderer::default())));
        cx.register_chart(chart.clone()).expect("register");
        cx.set_chart_group(&chart, Some("g2")).expect("migrate");

        assert!(cx.registry().list(None).is_empty());
        assert_eq!(cx.registry().list(Some("g2")).len(), 1);
        assert_eq!(chart.borrow().chart_group(), Some("g2"));
    }

    #[test]
    fn busy_chart_is_reported_not_panicked() {
        let mut cx = CoordinationContext::new();
        let chart: ChartHandle = Rc::new(RefCell::new(BaseChart::new("a", NullRenderer::default())));
        let _guard = chart.borrow_mut();
        assert!(matches!(
            cx.set_chart_group(&chart, Some("g")),
            Err(ChartError::ChartBusy { .. })
        ));
    }

    #[test]
    fn default_context_is_shared_per_thread() {
        with_default_context(|cx| {
            cx.register_renderlet(|_| {});
        });
        let count = with_default_context(|cx| {
            let count = cx.renderlet_count();
            cx.clear_renderlets();
            count
        });
        assert_eq!(count, 1);
    }
}
