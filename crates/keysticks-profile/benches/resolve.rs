use codspeed_criterion_compat::{black_box, criterion_group, criterion_main, Criterion};
use keysticks_control::InputControl;
use keysticks_profile::{parse_profile, AxisKey, BindingIndex, Source, StateVector};

fn load() -> Source {
    let yaml: &str = include_str!("../../../keysticks_profile.yaml");
    parse_profile(yaml).expect("profile should parse")
}

fn state(s: &str) -> StateVector {
    s.parse().expect("valid state")
}

fn bench_inherited_lookup(c: &mut Criterion) {
    let source = load();
    let situation = state("3,2,4");
    let control = InputControl::button(10);

    c.bench_function("resolve_inherited_lookup", |b| {
        b.iter(|| {
            let set = source.get_actions_for_input_control(
                black_box(&situation),
                black_box(&control),
                true,
            );
            black_box(set);
        })
    });
}

fn bench_state_table(c: &mut Criterion) {
    let source = load();
    let situation = state("3,2,1");

    c.bench_function("resolve_state_table_uncached", |b| {
        b.iter(|| {
            let store = source.store().clone();
            black_box(store.get_actions_for_state(black_box(&situation), true));
        })
    });

    c.bench_function("resolve_state_table_cached", |b| {
        b.iter(|| black_box(source.get_actions_for_state(black_box(&situation), true)))
    });
}

fn bench_grid_index(c: &mut Criterion) {
    let source = load();
    let grid = source.tree().grid(AxisKey::Id(2)).expect("keyboard grid").clone();

    c.bench_function("grid_index_build_keyboard", |b| {
        b.iter(|| black_box(BindingIndex::build(black_box(&grid))))
    });
}

criterion_group!(benches, bench_inherited_lookup, bench_state_table, bench_grid_index);
criterion_main!(benches);
