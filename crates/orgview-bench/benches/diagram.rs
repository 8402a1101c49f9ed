use criterion::{Criterion, black_box, criterion_group, criterion_main};
use orgview_bench::synthetic_hierarchy;
use orgview_graph::{
    DiagramConfig, DiagramState, Layouter, RetainedSurface, StackLayouter, build_view_tree,
    expand_all,
};
use std::sync::Arc;

fn bench_expand_all_layout(c: &mut Criterion) {
    // 1 + 6 + 36 + 216 + 1296 people
    let raw = Arc::new(synthetic_hierarchy(4, 6));
    let layouter = StackLayouter::default();

    c.bench_function("expand_all_layout_1555_people", |b| {
        b.iter(|| {
            let mut root = build_view_tree(Some(raw.clone())).expect("view tree");
            expand_all(&mut root);
            let metrics = layouter.compute_layout(black_box(&mut root), 1200.0);
            black_box(metrics);
        })
    });
}

fn bench_expand_all_render(c: &mut Criterion) {
    let raw = Arc::new(synthetic_hierarchy(4, 6));

    c.bench_function("expand_all_render_1555_people", |b| {
        b.iter(|| {
            let mut surface = RetainedSurface::new();
            let mut diagram =
                DiagramState::new(Some(raw.clone()), DiagramConfig::default()).expect("diagram");
            diagram.refresh(&mut surface);
            let pass = diagram.expand_all(&mut surface);
            black_box(pass);
        })
    });
}

criterion_group!(benches, bench_expand_all_layout, bench_expand_all_render);
criterion_main!(benches);
