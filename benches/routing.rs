use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use nodelink_layout::geometry::Point;
use nodelink_layout::layout::{AvoidOptions, build_obstacles, route_avoiding};
use nodelink_layout::{Edge, Graph, Node, layout};

/// A dense flat graph: `n` nodes in implicit grid order, chained edges plus
/// a few self-loops.
fn dense_graph(n: usize) -> Graph {
    let mut graph = Graph::new();
    for i in 0..n {
        graph
            .children
            .push(Node::new(&format!("n{i}"), 60.0, 40.0));
    }
    for i in 0..n.saturating_sub(1) {
        graph
            .edges
            .push(Edge::new(&format!("e{i}"), &format!("n{i}"), &format!("n{}", i + 1)));
    }
    for i in (0..n).step_by(16) {
        graph
            .edges
            .push(Edge::new(&format!("loop{i}"), &format!("n{i}"), &format!("n{i}")));
    }
    graph
}

fn bench_layout(c: &mut Criterion) {
    for n in [32usize, 128, 512] {
        c.bench_function(&format!("layout/flat_{n}"), |b| {
            b.iter(|| {
                let mut graph = dense_graph(n);
                layout(black_box(&mut graph)).unwrap();
                black_box(graph.width)
            })
        });
    }

    c.bench_function("layout/flat_128_avoid", |b| {
        b.iter(|| {
            let mut graph = dense_graph(128);
            graph.options.set("elk.edgeRouting", "LIBAVOID");
            layout(black_box(&mut graph)).unwrap();
            black_box(graph.width)
        })
    });
}

fn bench_avoid(c: &mut Criterion) {
    // A wall of obstacles between the endpoints forces a long detour.
    let mut nodes = Vec::new();
    for i in 0..12 {
        nodes.push(Node::new(&format!("wall{i}"), 30.0, 30.0).at(200.0, i as f32 * 40.0 - 200.0));
    }
    let obstacles = build_obstacles(&nodes, 10.0);
    let options = AvoidOptions::default();

    c.bench_function("avoid/wall_detour", |b| {
        b.iter(|| {
            route_avoiding(
                black_box(Point::new(0.0, 0.0)),
                black_box(Point::new(400.0, 0.0)),
                &obstacles,
                &options,
            )
        })
    });
}

criterion_group!(benches, bench_layout, bench_avoid);
criterion_main!(benches);
