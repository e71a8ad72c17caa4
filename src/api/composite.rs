use std::rc::Rc;

use tracing::{debug, trace};

use crate::core::{
    DimensionHandle, Filter, FilterSet, Geometry, LinearScale, Margins, PlotRecord, SourceHandle,
};
use crate::error::{ChartError, ChartResult};
use crate::render::{AxisSide, RenderFrame, RenderPhase, Renderer, TransitionPlan};

use super::axis_extent::{AxisExtent, aggregate_extent, align_zero};
use super::{
    Chart, ChartOptions, CompositeConfig, CoordinateGridChart, Legendable, RenderContext,
    TitleFn, TransitionConfig,
};

/// Parent chart that plots several coordinate-grid children on shared axes.
///
/// Children are owned exclusively; `compose` replaces the whole list. The
/// parent sizes both y axes from its children's extents and pushes geometry,
/// scales and filters down before each child plots.
pub struct CompositeChart<R: Renderer> {
    name: String,
    chart_group: Option<String>,
    renderer: R,
    geometry: Geometry,
    config: CompositeConfig,
    children: Vec<Box<dyn CoordinateGridChart>>,
    child_options: ChartOptions,
    filters: FilterSet,
    dimension: Option<DimensionHandle>,
    source: Option<SourceHandle>,
    x_scale: LinearScale,
    y_scale: LinearScale,
    right_y_scale: LinearScale,
    elastic_x: bool,
    use_right_y_axis: bool,
    transition: TransitionConfig,
    title_fn: Option<TitleFn>,
    colors: Vec<String>,
}

impl<R: Renderer> CompositeChart<R> {
    #[must_use]
    pub fn new(name: impl Into<String>, renderer: R) -> Self {
        Self {
            name: name.into(),
            chart_group: None,
            renderer,
            geometry: Geometry::default(),
            config: CompositeConfig::default(),
            children: Vec::new(),
            child_options: ChartOptions::default(),
            filters: FilterSet::new(),
            dimension: None,
            source: None,
            x_scale: LinearScale::default(),
            y_scale: LinearScale::default(),
            right_y_scale: LinearScale::default(),
            elastic_x: false,
            use_right_y_axis: false,
            transition: TransitionConfig::default(),
            title_fn: None,
            colors: Vec::new(),
        }
    }

    #[must_use]
    pub fn in_chart_group(mut self, group: impl Into<String>) -> Self {
        self.chart_group = Some(group.into());
        self
    }

    pub fn with_config(mut self, config: CompositeConfig) -> ChartResult<Self> {
        self.config = config.validate()?;
        Ok(self)
    }

    /// Option bag applied to every child on `compose`.
    #[must_use]
    pub fn with_child_options(mut self, options: ChartOptions) -> Self {
        self.child_options = options;
        self
    }

    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    #[must_use]
    pub fn with_dimension(mut self, dimension: DimensionHandle) -> Self {
        self.dimension = Some(dimension);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: SourceHandle) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_x_scale(mut self, scale: LinearScale) -> Self {
        self.x_scale = scale;
        self
    }

    #[must_use]
    pub fn with_elastic_x(mut self, elastic: bool) -> Self {
        self.elastic_x = elastic;
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
    pub fn with_colors(mut self, colors: Vec<String>) -> Self {
        self.colors = colors;
        self
    }

    #[must_use]
    pub fn config(&self) -> CompositeConfig {
        self.config
    }

    pub fn set_config(&mut self, config: CompositeConfig) -> ChartResult<()> {
        self.config = config.validate()?;
        Ok(())
    }

    /// Replaces the child list and pushes shared state down to each child.
    pub fn compose(&mut self, children: Vec<Box<dyn CoordinateGridChart>>) -> ChartResult<()> {
        self.children = children;
        let filters = self.filters.snapshot();
        for index in 0..self.children.len() {
            self.sync_child(index);
            let child = &mut self.children[index];
            child.apply_options(&self.child_options)?;
            child.replace_filters(filters.clone())?;
        }
        debug!(chart = %self.name, children = self.children.len(), "composite composed");
        Ok(())
    }

    #[must_use]
    pub fn children(&self) -> &[Box<dyn CoordinateGridChart>] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Box<dyn CoordinateGridChart>] {
        &mut self.children
    }

    #[must_use]
    pub fn right_y_scale(&self) -> LinearScale {
        self.right_y_scale
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    fn sync_child(&mut self, index: usize) {
        let geometry = self.geometry;
        let child = &mut self.children[index];
        child.set_width(geometry.width);
        child.set_height(geometry.height);
        child.set_margins(geometry.margins);
        if self.config.share_title {
            if let Some(title) = &self.title_fn {
                child.set_title_fn(Some(title.clone()));
            }
        }
        if self.config.share_colors {
            child.set_colors(self.colors.clone());
        }
        if child.dimension().is_none() {
            if let Some(dimension) = &self.dimension {
                child.set_dimension(dimension.clone());
            }
        }
        if child.source().is_none() {
            if let Some(source) = &self.source {
                child.set_source(source.clone());
            }
        }
    }

    /// Aggregated `(left, right)` extents, aligned at zero when configured.
    pub fn y_extents(&self) -> ChartResult<(Option<AxisExtent>, Option<AxisExtent>)> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for child in &self.children {
            let Some(extent) = child.y_extent()? else {
                continue;
            };
            if child.use_right_y_axis() {
                right.push(extent);
            } else {
                left.push(extent);
            }
        }
        let padding = self.config.y_axis_padding;
        let left = aggregate_extent(left, padding);
        let right = aggregate_extent(right, padding);
        Ok(match (left, right) {
            (Some(l), Some(r)) if self.config.align_y_axes => {
                let (l, r) = align_zero(l, r);
                (Some(l), Some(r))
            }
            other => other,
        })
    }

    fn filters_changed(&mut self) -> ChartResult<()> {
        if let Some(dimension) = &self.dimension {
            dimension.filter(self.filters.to_dimension_filter());
        }
        let filters = self.filters.snapshot();
        for child in &mut self.children {
            child.replace_filters(filters.clone())?;
        }
        debug!(chart = %self.name, active = filters.len(), "composite filters propagated");
        Ok(())
    }

    fn refresh(&mut self, cx: &RenderContext, phase: RenderPhase) -> ChartResult<()> {
        let geometry = self.geometry.validate()?;
        for index in 0..self.children.len() {
            self.sync_child(index);
        }

        let (left, right) = self.y_extents()?;
        if let Some(extent) = left {
            let (start, end) = extent.to_domain();
            self.y_scale.set_domain(start, end)?;
        }
        if let Some(extent) = right {
            let (start, end) = extent.to_domain();
            self.right_y_scale.set_domain(start, end)?;
        }
        if self.elastic_x {
            if let Some((min, max)) = self.x_extent()? {
                let (start, end) = AxisExtent::new(min, max).to_domain();
                self.x_scale.set_domain(start, end)?;
            }
        }

        self.x_scale.set_range(0.0, geometry.effective_width())?;
        self.y_scale.set_range(geometry.effective_height(), 0.0)?;
        self.right_y_scale
            .set_range(geometry.effective_height(), 0.0)?;

        for child in &mut self.children {
            child.set_x_scale(self.x_scale);
            if child.use_right_y_axis() {
                child.set_y_scale(self.right_y_scale);
            } else {
                child.set_y_scale(self.y_scale);
            }
        }

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

        let mut frame = RenderFrame::new(self.name.clone(), phase, geometry);
        frame.x_domain = self.x_scale.domain();
        frame.y_domain = self.y_scale.domain();
        frame.right_y_domain = right.map(|_| self.right_y_scale.domain());
        frame.grid_lines = if self.config.use_right_axis_grid_lines && right.is_some() {
            AxisSide::Right
        } else {
            AxisSide::Left
        };
        frame.colors = self.colors.clone();
        frame.transition = transition;
        self.renderer.render(&frame)?;

        for child in &mut self.children {
            child.plot(cx, phase)?;
        }
        trace!(chart = %self.name, ?phase, children = self.children.len(), "composite drawn");
        Ok(())
    }
}

impl<R: Renderer> Chart for CompositeChart<R> {
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
        self.filters.snapshot()
    }

    fn toggle_filter(&mut self, filter: Filter) -> ChartResult<()> {
        self.filters.toggle(filter);
        self.filters_changed()
    }

    fn replace_filters(&mut self, filters: Vec<Filter>) -> ChartResult<()> {
        self.filters.replace(filters);
        self.filters_changed()
    }

    fn render(&mut self, cx: &RenderContext) -> ChartResult<()> {
        self.refresh(cx, RenderPhase::Render)
    }

    fn redraw(&mut self, cx: &RenderContext) -> ChartResult<()> {
        self.refresh(cx, RenderPhase::Redraw)
    }

    fn apply_options(&mut self, options: &ChartOptions) -> ChartResult<()> {
        if let Some(transition) = &options.transition {
            self.transition = transition.clone();
        }
        if let Some(elastic) = options.elastic_x {
            self.elastic_x = elastic;
        }
        if let Some(right) = options.use_right_y_axis {
            self.use_right_y_axis = right;
        }
        if let Some(padding) = options.y_axis_padding {
            self.config.y_axis_padding = padding;
        }
        if let Some(colors) = &options.colors {
            self.colors = colors.clone();
        }
        Ok(())
    }

    fn legendables(&self) -> Vec<Legendable> {
        self.children
            .iter()
            .flat_map(|child| child.legendables())
            .collect()
    }
}

impl<R: Renderer> CoordinateGridChart for CompositeChart<R> {
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
        self.source.clone()
    }

    fn set_source(&mut self, source: SourceHandle) {
        self.source = Some(source);
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
        Err(ChartError::CompositeAxisExtent)
    }

    fn x_extent(&self) -> ChartResult<Option<(f64, f64)>> {
        let mut union: Option<(f64, f64)> = None;
        for child in &self.children {
            if let Some((min, max)) = child.x_extent()? {
                union = Some(match union {
                    None => (min, max),
                    Some((lo, hi)) => (lo.min(min), hi.max(max)),
                });
            }
        }
        Ok(union)
    }

    fn plot(&mut self, cx: &RenderContext, phase: RenderPhase) -> ChartResult<()> {
        self.refresh(cx, phase)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::api::BaseChart;
    use crate::core::{Record, RecordingDimension, StaticGroup};
    use crate::render::{NullRenderer, RenderLog};

    fn child(name: &str, log: &RenderLog, values: &[(i32, f64)], right: bool) -> Box<dyn CoordinateGridChart> {
        let records = values.iter().map(|(k, v)| Record::new(*k, *v)).collect();
        Box::new(
            BaseChart::new(name, NullRenderer::with_log(log.clone()))
                .with_source(Rc::new(StaticGroup::new(records)))
                .with_right_y_axis(right),
        )
    }

    #[test]
    fn composite_refuses_its_own_axis_extent() {
        let composite = CompositeChart::new("combo", NullRenderer::default());
        assert_eq!(composite.y_axis_min(), Err(ChartError::CompositeAxisExtent));
        assert_eq!(composite.y_axis_max(), Err(ChartError::CompositeAxisExtent));
        assert_eq!(composite.y_extent(), Err(ChartError::CompositeAxisExtent));
    }

    #[test]
    fn compose_pushes_geometry_and_dimension() {
        let log = RenderLog::new();
        let mut composite = CompositeChart::new("combo", NullRenderer::with_log(log.clone()))
            .with_geometry(Geometry::new(640.0, 320.0))
            .with_dimension(Rc::new(RecordingDimension::default()));
        composite
            .compose(vec![child("a", &log, &[(1, 2.0)], false)])
            .expect("compose");
        let child = &composite.children()[0];
        assert_eq!(child.width(), 640.0);
        assert_eq!(child.height(), 320.0);
        assert!(child.dimension().is_some());
    }

    #[test]
    fn aligned_axes_render_both_domains() {
        let log = RenderLog::new();
        let mut composite = CompositeChart::new("combo", NullRenderer::with_log(log.clone()))
            .with_dimension(Rc::new(RecordingDimension::default()))
            .with_config(CompositeConfig {
                align_y_axes: true,
                ..CompositeConfig::default()
            })
            .expect("config");
        composite
            .compose(vec![
                child("left", &log, &[(1, -2.0), (2, 8.0)], false),
                child("right", &log, &[(1, -20.0), (2, 40.0)], true),
            ])
            .expect("compose");
        composite.render(&RenderContext::default()).expect("render");

        let frame = log.frames_for("combo").pop().expect("composite frame");
        let (left_min, left_max) = frame.y_domain;
        let (right_min, right_max) = frame.right_y_domain.expect("right domain");
        assert_relative_eq!(
            -left_min / (left_max - left_min),
            -right_min / (right_max - right_min),
            epsilon = 1e-12
        );
        let right_child = log.frames_for("right").pop().expect("right frame");
        assert_eq!(right_child.y_domain, (right_min, right_max));
    }

    #[test]
    fn parent_filters_replace_child_filters() {
        let log = RenderLog::new();
        let mut composite = CompositeChart::new("combo", NullRenderer::with_log(log.clone()));
        composite
            .compose(vec![child("a", &log, &[(1, 1.0)], false)])
            .expect("compose");
        composite.children_mut()[0]
            .toggle_filter(Filter::exact(9))
            .expect("child filter");

        composite.toggle_filter(Filter::exact(1)).expect("parent filter");
        assert_eq!(composite.children()[0].filters(), vec![Filter::exact(1)]);
    }
}
