use std::collections::BTreeMap;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use flowtree::{Graph, LayoutConfig, LockStore, ParentRef, Row, compute_layout};
use std::hint::black_box;

/// A forest of `roots` trees, each a complete tree of the given fanout
/// and depth, with deterministic per-node widths.
fn synthetic_forest(roots: usize, fanout: usize, depth: usize) -> (Vec<Row>, BTreeMap<String, f32>) {
    let mut rows = Vec::new();
    let mut widths = BTreeMap::new();

    fn grow(
        id: String,
        parent: Option<&str>,
        level: usize,
        fanout: usize,
        depth: usize,
        rows: &mut Vec<Row>,
        widths: &mut BTreeMap<String, f32>,
    ) {
        let parents = match parent {
            Some(parent) => vec![ParentRef::new(parent)],
            None => Vec::new(),
        };
        widths.insert(id.clone(), 100.0 + (id.len() % 7) as f32 * 20.0);
        rows.push(Row {
            id: id.clone(),
            label: id.clone(),
            bg_color: None,
            locked: false,
            parents,
        });
        if level < depth {
            for child in 0..fanout {
                grow(
                    format!("{id}_{child}"),
                    Some(&id),
                    level + 1,
                    fanout,
                    depth,
                    rows,
                    widths,
                );
            }
        }
    }

    for root in 0..roots {
        grow(
            format!("t{root}"),
            None,
            0,
            fanout,
            depth,
            &mut rows,
            &mut widths,
        );
    }
    (rows, widths)
}

fn bench_forest_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_layout");
    for (name, roots, fanout, depth) in [
        ("small", 2, 2, 3),
        ("wide", 4, 5, 2),
        ("deep", 2, 2, 7),
    ] {
        let (rows, widths) = synthetic_forest(roots, fanout, depth);
        let graph = Graph::from_rows(&rows).expect("synthetic rows are unique");
        let locks = LockStore::new();
        let config = LayoutConfig::default();
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
            b.iter(|| black_box(compute_layout(graph, &widths, &locks, &config)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_forest_layout);
criterion_main!(benches);
