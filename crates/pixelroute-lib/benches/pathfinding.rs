use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use pixelroute_lib::{
    Dataset, EdgeRecord, Engine, EngineConfig, NearestStrategy, NodeRecord, Point, SearchOptions,
    SearchRadius,
};
use std::hint::black_box;

const GRID: usize = 60;
const SPACING: f64 = 100.0;

/// Square grid with edges in both directions between orthogonal neighbours.
fn grid_dataset() -> Dataset {
    let name = |row: usize, col: usize| format!("W{row}_{col}");
    let mut nodes = Vec::with_capacity(GRID * GRID);
    let mut edges = Vec::new();
    for row in 0..GRID {
        for col in 0..GRID {
            nodes.push(NodeRecord::new(
                name(row, col),
                col as f64 * SPACING,
                row as f64 * SPACING,
            ));
            if col + 1 < GRID {
                edges.push(EdgeRecord::new(name(row, col), name(row, col + 1), 1.0));
                edges.push(EdgeRecord::new(name(row, col + 1), name(row, col), 1.0));
            }
            if row + 1 < GRID {
                edges.push(EdgeRecord::new(name(row, col), name(row + 1, col), 1.0));
                edges.push(EdgeRecord::new(name(row + 1, col), name(row, col), 1.0));
            }
        }
    }
    Dataset::new(nodes, edges)
}

static DATASET: Lazy<Dataset> = Lazy::new(grid_dataset);
static A_STAR: Lazy<Engine> =
    Lazy::new(|| Engine::from_dataset(&DATASET, &EngineConfig::default()).expect("grid builds"));
static DIJKSTRA: Lazy<Engine> = Lazy::new(|| {
    let config = EngineConfig::default().with_search(SearchOptions::dijkstra());
    Engine::from_dataset(&DATASET, &config).expect("grid builds")
});
static KD_TREE: Lazy<Engine> = Lazy::new(|| {
    let config = EngineConfig::default().with_nearest(NearestStrategy::KdTree);
    Engine::from_dataset(&DATASET, &config).expect("grid builds")
});

fn benchmark_pathfinding(c: &mut Criterion) {
    let goal = format!("W{}_{}", GRID - 1, GRID - 1);

    c.bench_function("a_star_grid_corner_to_corner", |b| {
        let engine = &*A_STAR;
        b.iter(|| {
            let path = engine.find_path("W0_0", &goal).expect("route exists");
            black_box(path.hop_count())
        });
    });

    c.bench_function("dijkstra_grid_corner_to_corner", |b| {
        let engine = &*DIJKSTRA;
        b.iter(|| {
            let path = engine.find_path("W0_0", &goal).expect("route exists");
            black_box(path.total_cost)
        });
    });

    c.bench_function("nearest_linear", |b| {
        let engine = &*A_STAR;
        b.iter(|| black_box(engine.nearest_waypoint(Point::new(3021.0, 4417.0), SearchRadius::default())));
    });

    c.bench_function("nearest_kd_tree", |b| {
        let engine = &*KD_TREE;
        b.iter(|| black_box(engine.nearest_waypoint(Point::new(3021.0, 4417.0), SearchRadius::default())));
    });
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);
