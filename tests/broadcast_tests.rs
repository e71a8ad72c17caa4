use std::cell::RefCell;
use std::rc::Rc;

use crosschart::api::{BroadcastOp, CoordinationContext};
use crosschart::core::{DimensionFilter, Filter, Record, RecordingDimension, StaticGroup};
use crosschart::render::{NullRenderer, RenderLog, RenderPhase};
use crosschart::{BaseChart, ChartHandle};

fn wired(name: &str, group: &str, log: &RenderLog) -> (ChartHandle, Rc<RecordingDimension>) {
    let dimension = Rc::new(RecordingDimension::default());
    let chart: ChartHandle = Rc::new(RefCell::new(
        BaseChart::new(name, NullRenderer::with_log(log.clone()))
            .in_chart_group(group)
            .with_dimension(dimension.clone())
            .with_source(Rc::new(StaticGroup::new(vec![
                Record::new(1, 3.0),
                Record::new(2, 5.0),
                Record::new(3, 1.0),
            ]))),
    ));
    (chart, dimension)
}

#[test]
fn filter_all_only_touches_the_named_group() {
    let log = RenderLog::new();
    let mut cx = CoordinationContext::new();
    let (in_group, _) = wired("a", "g", &log);
    let (outside, _) = wired("b", "other", &log);
    cx.register_chart(in_group.clone()).expect("a");
    cx.register_chart(outside.clone()).expect("b");
    in_group.borrow_mut().toggle_filter(Filter::exact(1)).expect("filter a");
    outside.borrow_mut().toggle_filter(Filter::exact(2)).expect("filter b");

    let report = cx.filter_all(Some("g"));
    assert_eq!(report.op, BroadcastOp::FilterAll);
    assert_eq!(report.visited, 1);
    assert!(!in_group.borrow().has_filter());
    assert_eq!(outside.borrow().filters(), vec![Filter::exact(2)]);
}

#[test]
fn filter_all_on_empty_group_is_a_no_op() {
    let mut cx = CoordinationContext::new();
    let report = cx.filter_all(Some("nobody"));
    assert_eq!(report.visited, 0);
    assert!(report.is_clean());
}

#[test]
fn renderlets_fire_once_per_broadcast_with_the_group() {
    let log = RenderLog::new();
    let mut cx = CoordinationContext::new();
    for name in ["a", "b", "c"] {
        cx.register_chart(wired(name, "g", &log).0).expect("register");
    }
    let calls = Rc::new(RefCell::new(Vec::new()));
    {
        let calls = calls.clone();
        cx.register_renderlet(move |group| calls.borrow_mut().push(group.map(str::to_owned)));
    }

    assert!(cx.render_all(Some("g")).is_clean());
    assert!(cx.redraw_all(Some("g")).is_clean());

    assert_eq!(*calls.borrow(), vec![Some("g".to_owned()), Some("g".to_owned())]);
    assert_eq!(log.frames().len(), 6);
    assert_eq!(log.frames_for("b")[1].phase, RenderPhase::Redraw);
}

#[test]
fn removed_renderlet_stops_firing() {
    let mut cx = CoordinationContext::new();
    let count = Rc::new(RefCell::new(0));
    let id = {
        let count = count.clone();
        cx.register_renderlet(move |_| *count.borrow_mut() += 1)
    };
    cx.render_all(None);
    assert!(cx.remove_renderlet(id));
    cx.render_all(None);
    assert_eq!(*count.borrow(), 1);
    assert_eq!(cx.renderlet_count(), 0);
}

#[test]
fn renderlet_fires_even_when_a_chart_fails() {
    let mut cx = CoordinationContext::new();
    let broken: ChartHandle = Rc::new(RefCell::new(BaseChart::new("broken", NullRenderer::default())));
    cx.set_chart_group(&broken, Some("g")).expect("group");
    let fired = Rc::new(RefCell::new(false));
    {
        let fired = fired.clone();
        cx.register_renderlet(move |_| *fired.borrow_mut() = true);
    }

    let report = cx.redraw_all(Some("g"));
    assert_eq!(report.failures.len(), 1);
    assert!(*fired.borrow());
}

#[test]
fn filter_and_redraw_filters_then_redraws_the_group() {
    let log = RenderLog::new();
    let mut cx = CoordinationContext::new();
    let (clicked, dimension) = wired("clicked", "g", &log);
    let (sibling, _) = wired("sibling", "g", &log);
    cx.register_chart(clicked.clone()).expect("clicked");
    cx.register_chart(sibling).expect("sibling");

    let report = cx
        .filter_and_redraw(&clicked, Filter::range(1, 3).expect("range"))
        .expect("filter and redraw");

    assert_eq!(report.op, BroadcastOp::Redraw);
    assert_eq!(report.visited, 2);
    assert!(matches!(dimension.last(), Some(DimensionFilter::Range { .. })));
    let frame = log.frames_for("clicked").pop().expect("clicked frame");
    assert_eq!(frame.record_count, 2);
    assert_eq!(log.frames_for("sibling").pop().expect("sibling").record_count, 3);
}

#[test]
fn filter_and_redraw_follows_registry_membership_over_the_label() {
    let log = RenderLog::new();
    let mut cx = CoordinationContext::new();
    let (clicked, _) = wired("clicked", "g", &log);
    let (sibling, _) = wired("sibling", "g", &log);
    cx.register_chart(clicked.clone()).expect("clicked");
    cx.register_chart(sibling).expect("sibling");
    clicked.borrow_mut().set_chart_group(Some("elsewhere".to_owned()));

    let report = cx
        .filter_and_redraw(&clicked, Filter::exact(1))
        .expect("filter and redraw");

    assert_eq!(report.group.as_deref(), Some("g"));
    assert_eq!(report.visited, 2);
    assert_eq!(log.frames_for("sibling").len(), 1);
}

#[test]
fn filter_and_redraw_uses_the_label_of_an_unregistered_chart() {
    let log = RenderLog::new();
    let mut cx = CoordinationContext::new();
    let (loose, _) = wired("loose", "g", &log);
    let (member, _) = wired("member", "g", &log);
    cx.register_chart(member).expect("member");

    let report = cx
        .filter_and_redraw(&loose, Filter::exact(2))
        .expect("filter and redraw");

    assert_eq!(report.group.as_deref(), Some("g"));
    assert_eq!(report.visited, 1);
    assert!(loose.borrow().has_filter());
}

#[test]
fn busy_chart_is_reported_not_panicked() {
    let log = RenderLog::new();
    let mut cx = CoordinationContext::new();
    let (chart, _) = wired("held", "g", &log);
    cx.register_chart(chart.clone()).expect("register");

    let _guard = chart.borrow_mut();
    let report = cx.render_all(Some("g"));
    assert_eq!(report.failures.len(), 1);
    assert!(!report.failures[0].error.is_configuration());
}
