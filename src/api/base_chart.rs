use std::rc::Rc;

use tracing::{debug, trace};

use crate::core::{
    DimensionHandle, Filter, Geometry, LinearScale, Margins, OrderingAccessor, PlotRecord,
    SourceHandle, ValueAccessor,
};
use crate::error::{ChartError, ChartResult};
use crate::render::{AxisSide, RenderFrame, RenderPhase, Renderer, TransitionPlan};
use crate::transform::{CapConfig, DataStage, DataTransformChain, StackDomain, StackLayer};

use super::axis_extent::AxisExtent;
use super::{
    Chart, ChartOptions, CoordinateGridChart, Legendable, RenderContext, TitleFn,
    TransitionConfig,
};

/// Called after every change of a chart's filter set.
pub type FilteredListener = Box<dyn FnMut(&str, &[Filter])>;

/// Default concrete coordinate-grid chart.
///
/// Owns its data chain and rendering collaborator; shape drawing is left to
/// the renderer, which receives one `RenderFrame` per draw pass.
pub struct BaseChart<R: Renderer> {
    name: String,
    chart_group: Option<String>,
    chain: DataTransformChain,
    dimension: Option<DimensionHandle>,
    renderer: R,
    geometry: Geometry,
    x_scale: LinearScale,
    y_scale: LinearScale,
    elastic_x: bool,
    elastic_y: bool,
    y_axis_padding: f64,
    use_right_y_axis: bool,
    transition: TransitionConfig,
    title_fn: Option<TitleFn>,
    render_title: bool,
    colors: Vec<String>,
    filtered_listeners: Vec<FilteredListener>,
    has_rendered: bool,
}

impl<R: Renderer> BaseChart<R> {
    #[must_use]
    pub fn new(name: impl Into<String>, renderer: R) -> Self {
        Self {
            name: name.into(),
            chart_group: None,
            chain: DataTransformChain::new(),
            dimension: None,
            renderer,
            geometry: Geometry::default(),
            x_scale: LinearScale::default(),
            y_scale: LinearScale::default(),
            elastic_x: false,
            elastic_y: false,
            y_axis_padding: 0.0,
            use_right_y_axis: false,
            transition: TransitionConfig::default(),
            title_fn: None,
            render_title: true,
            colors: Vec::new(),
            filtered_listeners: Vec::new(),
            has_rendered: false,
        }
    }

    /// Sets the group label before the chart is registered.
    #[must_use]
    pub fn in_chart_group(mut self, group: impl Into<String>) -> Self {
        self.chart_group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: SourceHandle) -> Self {
        self.chain.set_source(source);
        self
    }

    #[must_use]
    pub fn with_dimension(mut self, dimension: DimensionHandle) -> Self {
        self.dimension = Some(dimension);
        self
    }

    #[must_use]
    pub fn with_value_accessor(mut self, accessor: ValueAccessor) -> Self {
        self.chain.set_value_accessor(accessor);
        self
    }

    #[must_use]
    pub fn with_ordering(mut self, ordering: OrderingAccessor) -> Self {
        self.chain.set_ordering(Some(ordering));
        self
    }

    pub fn with_cap(mut self, cap: CapConfig) -> ChartResult<Self> {
        self.chain.set_cap(cap)?;
        Ok(self)
    }

    /// Names this chart's own group when it is stack layer 0.
    #[must_use]
    pub fn with_base_layer_name(mut self, name: impl Into<String>) -> Self {
        self.chain.set_base_layer_name(name);
        self
    }

    #[must_use]
    pub fn with_stack_layer(mut self, layer: StackLayer) -> Self {
        self.chain.stack(layer);
        self
    }

    #[must_use]
    pub fn with_stack_domain(mut self, domain: StackDomain) -> Self {
        self.chain.set_stack_domain(domain);
        self
    }

    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    #[must_use]
    pub fn with_x_scale(mut self, scale: LinearScale) -> Self {
        self.x_scale = scale;
        self
    }

    #[must_use]
    pub fn with_y_scale(mut self, scale: LinearScale) -> Self {
        self.y_scale = scale;
        self
    }

    #[must_use]
    pub fn with_elastic_x(mut self, elastic: bool) -> Self {
        self.elastic_x = elastic;
        self
    }

    #[must_use]
    pub fn with_elastic_y(mut self, elastic: bool) -> Self {
        self.elastic_y = elastic;
        self
    }

    #[must_use]
    pub fn with_y_axis_padding(mut self, padding: f64) -> Self {
        self.y_axis_padding = padding;
        self
    }

    #[must_use]
    pub fn with_right_y_axis(mut self, right: bool) -> Self {
        self.use_right_y_axis = right;
        self
    }

    #[must_use]
    pub fn with_transition(mut self, transition: TransitionConfig) -> Self {
        self.transition = transition;
        self
    }

    #[must_use]
    pub fn with_title_fn(mut self, title: impl Fn(&PlotRecord) -> String + 'static) -> Self {
        self.title_fn = Some(Rc::new(title));
        self
    }

    #[must_use]
    pub fn with_render_title(mut self, render_title: bool) -> Self {
        self.render_title = render_title;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: Vec<String>) -> Self {
        self.colors = colors;
        self
    }

    /// Registers a callback invoked after every filter change.
    pub fn on_filtered(&mut self, listener: impl FnMut(&str, &[Filter]) + 'static) {
        self.filtered_listeners.push(Box::new(listener));
    }

    /// Current plotted sequence.
    pub fn data(&self) -> ChartResult<Vec<PlotRecord>> {
        self.chain.data()
    }

    #[must_use]
    pub fn chain(&self) -> &DataTransformChain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut DataTransformChain {
        &mut self.chain
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[must_use]
    pub fn elastic_y(&self) -> bool {
        self.elastic_y
    }

    #[must_use]
    pub fn transition_config(&self) -> &TransitionConfig {
        &self.transition
    }

    #[must_use]
    pub fn has_rendered(&self) -> bool {
        self.has_rendered
    }

    /// Hides a stack layer from drawing while keeping its stacking slot.
    pub fn hide_layer(&mut self, name: &str) -> bool {
        self.chain.set_layer_hidden(name, true)
    }

    pub fn show_layer(&mut self, name: &str) -> bool {
        self.chain.set_layer_hidden(name, false)
    }

    fn check_mandatory(&self) -> ChartResult<()> {
        if self.dimension.is_none() {
            return Err(ChartError::MissingAttribute {
                chart: self.name.clone(),
                attribute: "dimension",
            });
        }
        if self.chain.source().is_none() {
            return Err(ChartError::MissingAttribute {
                chart: self.name.clone(),
                attribute: "group",
            });
        }
        Ok(())
    }

    fn filters_changed(&mut self) {
        let filters = self.chain.filters().snapshot();
        if let Some(dimension) = &self.dimension {
            dimension.filter(self.chain.filters().to_dimension_filter());
        }
        for listener in &mut self.filtered_listeners {
            listener(&self.name, &filters);
        }
        debug!(chart = %self.name, active = filters.len(), "chart filters changed");
    }

    fn rescale(&mut self, records: &[PlotRecord]) -> ChartResult<()> {
        if self.elastic_y {
            if let Some((min, max)) = records_y_extent(records) {
                let (start, end) = AxisExtent::new(min, max + self.y_axis_padding).to_domain();
                self.y_scale.set_domain(start, end)?;
            }
        }
        if self.elastic_x {
            if let Some((min, max)) = numeric_key_extent(records) {
                let (start, end) = AxisExtent::new(min, max).to_domain();
                self.x_scale.set_domain(start, end)?;
            }
        }
        Ok(())
    }

    fn draw(
        &mut self,
        cx: &RenderContext,
        phase: RenderPhase,
        records: Vec<PlotRecord>,
    ) -> ChartResult<()> {
        let geometry = self.geometry.validate()?;
        self.x_scale.set_range(0.0, geometry.effective_width())?;
        self.y_scale.set_range(geometry.effective_height(), 0.0)?;

        let duration_ms = self.transition.duration_ms;
        let delay_ms = self.transition.delay_ms;
        let name = self.transition.name.clone();
        let transition = match self.renderer.transition_target() {
            Some(target) => cx.transition(target, duration_ms, Some(delay_ms), name.as_deref()),
            None => TransitionPlan::resolve(
                duration_ms,
                Some(delay_ms),
                name.as_deref(),
                cx.transitions_disabled,
            ),
        };

        let titles = match (&self.title_fn, self.render_title) {
            (Some(title), true) => records.iter().map(|record| title(record)).collect(),
            _ => Vec::new(),
        };

        let mut frame = RenderFrame::new(self.name.clone(), phase, geometry);
        frame.x_domain = self.x_scale.domain();
        frame.y_domain = self.y_scale.domain();
        frame.y_axis = if self.use_right_y_axis {
            AxisSide::Right
        } else {
            AxisSide::Left
        };
        frame.grid_lines = frame.y_axis;
        frame.titles = titles;
        frame.colors = self.colors.clone();
        frame.transition = transition;
        frame.records = records;

        self.renderer.render(&frame)?;
        self.has_rendered = true;
        trace!(chart = %self.name, ?phase, records = frame.records.len(), "chart drawn");
        Ok(())
    }
}

fn records_y_extent(records: &[PlotRecord]) -> Option<(f64, f64)> {
    records.iter().fold(None, |acc, record| {
        let (low, high) = (record.y_low(), record.y_high());
        Some(match acc {
            None => (low, high),
            Some((min, max)) => (f64::min(min, low), f64::max(max, high)),
        })
    })
}

fn numeric_key_extent(records: &[PlotRecord]) -> Option<(f64, f64)> {
    records
        .iter()
        .filter_map(|record| record.key.as_f64())
        .fold(None, |acc, key| {
            Some(match acc {
                None => (key, key),
                Some((min, max)) => (f64::min(min, key), f64::max(max, key)),
            })
        })
}

impl<R: Renderer> Chart for BaseChart<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn chart_group(&self) -> Option<&str> {
        self.chart_group.as_deref()
    }

    fn set_chart_group(&mut self, group: Option<String>) {
        self.chart_group = group;
    }

    fn filters(&self) -> Vec<Filter> {
        self.chain.filters().snapshot()
    }

    fn toggle_filter(&mut self, filter: Filter) -> ChartResult<()> {
        self.chain.filters().toggle(filter);
        self.filters_changed();
        Ok(())
    }

    fn replace_filters(&mut self, filters: Vec<Filter>) -> ChartResult<()> {
        self.chain.filters().replace(filters);
        self.filters_changed();
        Ok(())
    }

    fn render(&mut self, cx: &RenderContext) -> ChartResult<()> {
        self.check_mandatory()?;
        let records = self.chain.data()?;
        self.rescale(&records)?;
        self.draw(cx, RenderPhase::Render, records)
    }

    fn redraw(&mut self, cx: &RenderContext) -> ChartResult<()> {
        self.check_mandatory()?;
        let records = self.chain.data()?;
        self.rescale(&records)?;
        self.draw(cx, RenderPhase::Redraw, records)
    }

    fn apply_options(&mut self, options: &ChartOptions) -> ChartResult<()> {
        if let Some(cap) = &options.cap {
            self.chain.set_cap(cap.clone())?;
        }
        if let Some(transition) = &options.transition {
            self.transition = transition.clone();
        }
        if let Some(elastic) = options.elastic_x {
            self.elastic_x = elastic;
        }
        if let Some(elastic) = options.elastic_y {
            self.elastic_y = elastic;
        }
        if let Some(right) = options.use_right_y_axis {
            self.use_right_y_axis = right;
        }
        if let Some(render_title) = options.render_title {
            self.render_title = render_title;
        }
        if let Some(padding) = options.y_axis_padding {
            self.y_axis_padding = padding;
        }
        if let Some(colors) = &options.colors {
            self.colors = colors.clone();
        }
        Ok(())
    }

    fn legendables(&self) -> Vec<Legendable> {
        if !self.chain.is_stacked() {
            return vec![Legendable {
                chart: self.name.clone(),
                name: self.name.clone(),
                hidden: false,
            }];
        }
        self.chain
            .stack_layers()
            .into_iter()
            .map(|(name, hidden)| Legendable {
                chart: self.name.clone(),
                name,
                hidden,
            })
            .collect()
    }
}

impl<R: Renderer> CoordinateGridChart for BaseChart<R> {
    fn width(&self) -> f64 {
        self.geometry.width
    }

    fn set_width(&mut self, width: f64) {
        self.geometry.width = width;
    }

    fn height(&self) -> f64 {
        self.geometry.height
    }

    fn set_height(&mut self, height: f64) {
        self.geometry.height = height;
    }

    fn margins(&self) -> Margins {
        self.geometry.margins
    }

    fn set_margins(&mut self, margins: Margins) {
        self.geometry.margins = margins;
    }

    fn x_scale(&self) -> LinearScale {
        self.x_scale
    }

    fn set_x_scale(&mut self, scale: LinearScale) {
        self.x_scale = scale;
    }

    fn y_scale(&self) -> LinearScale {
        self.y_scale
    }

    fn set_y_scale(&mut self, scale: LinearScale) {
        self.y_scale = scale;
    }

    fn dimension(&self) -> Option<DimensionHandle> {
        self.dimension.clone()
    }

    fn set_dimension(&mut self, dimension: DimensionHandle) {
        self.dimension = Some(dimension);
    }

    fn source(&self) -> Option<SourceHandle> {
        self.chain.source().cloned()
    }

    fn set_source(&mut self, source: SourceHandle) {
        self.chain.set_source(source);
    }

    fn use_right_y_axis(&self) -> bool {
        self.use_right_y_axis
    }

    fn set_use_right_y_axis(&mut self, right: bool) {
        self.use_right_y_axis = right;
    }

    fn title_fn(&self) -> Option<TitleFn> {
        self.title_fn.clone()
    }

    fn set_title_fn(&mut self, title: Option<TitleFn>) {
        self.title_fn = title;
    }

    fn colors(&self) -> Vec<String> {
        self.colors.clone()
    }

    fn set_colors(&mut self, colors: Vec<String>) {
        self.colors = colors;
    }

    fn y_extent(&self) -> ChartResult<Option<(f64, f64)>> {
        Ok(records_y_extent(&self.chain.data()?))
    }

    fn x_extent(&self) -> ChartResult<Option<(f64, f64)>> {
        Ok(numeric_key_extent(&self.chain.data()?))
    }

    fn plot(&mut self, cx: &RenderContext, phase: RenderPhase) -> ChartResult<()> {
        self.check_mandatory()?;
        let records = self.chain.data()?;
        self.draw(cx, phase, records)
    }
}
