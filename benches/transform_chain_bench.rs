use crosschart::core::{Filter, Record, StaticGroup, number_value};
use crosschart::transform::{CapConfig, DataStage, DataTransformChain, StackLayer};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::rc::Rc;

fn records(count: usize, scale: f64) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let key = i as f64;
            Record::new(key, ((key * 0.37).sin() + 1.5) * scale)
        })
        .collect()
}

fn bench_filter_and_cap_10k(c: &mut Criterion) {
    let mut chain = DataTransformChain::new().with_source(Rc::new(StaticGroup::new(records(10_000, 100.0))));
    chain
        .filters()
        .replace(vec![Filter::range(1_000.0, 9_000.0).expect("valid range")]);
    chain.set_cap(CapConfig::new(25)).expect("valid cap");

    c.bench_function("filter_and_cap_10k", |b| {
        b.iter(|| {
            let _ = black_box(&chain).data().expect("chain should produce data");
        })
    });
}

fn bench_stack_three_layers_5k(c: &mut Criterion) {
    let mut chain = DataTransformChain::new().with_source(Rc::new(StaticGroup::new(records(5_000, 10.0))));
    chain.set_base_layer_name("base");
    for (index, scale) in [20.0, 30.0].into_iter().enumerate() {
        chain.stack(StackLayer::new(
            format!("layer {}", index + 1),
            Rc::new(StaticGroup::new(records(5_000, scale))),
            number_value(),
        ));
    }

    c.bench_function("stack_three_layers_5k", |b| {
        b.iter(|| {
            let _ = black_box(&chain).data().expect("chain should produce data");
        })
    });
}

criterion_group!(benches, bench_filter_and_cap_10k, bench_stack_three_layers_5k);
criterion_main!(benches);
