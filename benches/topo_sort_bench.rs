use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use vertex_dag::prelude::*;

/// One root feeding `layers` layers of `width` vertices; every vertex in layer
/// `k + 1` depends on two neighbours in layer `k`.
fn build_layered(layers: usize, width: usize) -> Dag {
    let mut dag = Dag::new();
    let root: VertexRef = Node::new("root", ());
    dag.add_vertex(root.clone()).unwrap();

    let mut prev = vec![root];
    for k in 0..layers {
        let layer: Vec<VertexRef> = (0..width)
            .map(|i| -> VertexRef { Node::new(format!("{k}-{i}"), ()) })
            .collect();
        dag.add_vertices(layer.iter().cloned()).unwrap();
        for (i, v) in layer.iter().enumerate() {
            let a = &prev[i % prev.len()];
            let b = &prev[(i + 1) % prev.len()];
            dag.add_edge(a, v).unwrap();
            if a.id() != b.id() {
                dag.add_edge(b, v).unwrap();
            }
        }
        prev = layer;
    }
    dag
}

fn bench_topological_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("topological_sort");

    for &(layers, width) in &[(8usize, 8usize), (16, 16), (32, 16)] {
        let mut dag = build_layered(layers, width);
        let label = format!("{layers}x{width}");

        group.bench_with_input(BenchmarkId::new("flat", &label), &label, |b, _| {
            b.iter(|| {
                let out = dag.topological_sort().unwrap();
                black_box(out);
            });
        });

        group.bench_with_input(BenchmarkId::new("levels", &label), &label, |b, _| {
            b.iter(|| {
                let out = dag.topological_levels(SortOptions::strict()).unwrap();
                black_box(out);
            });
        });

        group.bench_with_input(BenchmarkId::new("resync_only", &label), &label, |b, _| {
            b.iter(|| {
                dag.resync_relations();
                black_box(dag.relations().len());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_topological_sort);
criterion_main!(benches);
