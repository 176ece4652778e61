use codspeed_criterion_compat::{black_box, criterion_group, criterion_main, Criterion};
use keysticks_profile::parse_profile;

fn bench_parse_profile(c: &mut Criterion) {
    let yaml: &str = include_str!("../../../keysticks_profile.yaml");

    c.bench_function("profile_parse_keysticks_profile", |b| {
        b.iter(|| {
            let input = black_box(yaml);
            let source = parse_profile(input).expect("profile should parse");
            black_box(source);
        })
    });
}

fn bench_validate_profile(c: &mut Criterion) {
    let yaml: &str = include_str!("../../../keysticks_profile.yaml");
    let source = parse_profile(yaml).expect("profile should parse");

    c.bench_function("profile_validate_keysticks_profile", |b| {
        b.iter(|| {
            let mut source = source.clone();
            black_box(source.validate());
        })
    });
}

criterion_group!(benches, bench_parse_profile, bench_validate_profile);
criterion_main!(benches);
