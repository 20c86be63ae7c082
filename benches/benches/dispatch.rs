// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};
use understory_collider::{BoundsLookup, ColliderTree};
use understory_multipointer::{
    DispatchConfig, Dispatcher, Handler, Handlers, Outcome, PointerEvent, TargetHost,
};

const CELL: f64 = 10.0;

/// A `side x side` grid of cells keyed row-major, grouped under one composite
/// per row. Row `r` is keyed `u32::MAX - r`.
struct Grid {
    side: u32,
    hits: u64,
}

impl BoundsLookup<u32> for Grid {
    fn bounds(&self, id: &u32) -> Option<Rect> {
        let width = f64::from(self.side) * CELL;
        let row = u32::MAX - id;
        if row < self.side {
            let y = f64::from(row) * CELL;
            return Some(Rect::new(0.0, y, width, y + CELL));
        }
        let x = f64::from(id % self.side) * CELL;
        let y = f64::from(id / self.side) * CELL;
        Some(Rect::new(x, y, x + CELL, y + CELL))
    }
}

impl TargetHost<u32, u32> for Grid {
    fn handlers(&self, _: &u32) -> Handlers {
        Handlers::MOUSE_MOVE | Handlers::MOUSE_ENTER | Handlers::MOUSE_LEAVE
    }

    fn invoke(&mut self, _: &u32, handler: Handler, _: &PointerEvent<u32>) -> Outcome {
        self.hits += 1;
        // Moves stop at the first cell so the cache can skip the walk.
        if handler == Handler::MouseMove {
            Outcome::Stop
        } else {
            Outcome::Continue
        }
    }
}

fn build(side: u32, config: DispatchConfig) -> Dispatcher<u32, u32> {
    let mut d = Dispatcher::with_config(config);
    for row in 0..side {
        let group = d.create_collider(None, u32::MAX - row, 0);
        d.create_colliders(Some(group), row * side..(row + 1) * side, 0);
    }
    d
}

/// Eight small steps inside each cell, visiting cells in row-major order.
fn path(side: u32, steps: usize) -> Vec<Point> {
    let cells = (side * side) as usize;
    (0..steps)
        .map(|i| {
            let cell = (i / 8 % cells) as u32;
            let x = f64::from(cell % side) * CELL;
            let y = f64::from(cell / side) * CELL;
            Point::new(x + 1.0 + (i % 8) as f64, y + 5.0)
        })
        .collect()
}

fn moves(c: &mut Criterion) {
    let mut g = c.benchmark_group("multipointer_moves");
    for &side in &[8_u32, 32, 64] {
        let points = path(side, 512);
        for (name, cache) in [("cached", true), ("uncached", false)] {
            g.bench_with_input(BenchmarkId::new(name, side), &side, |b, &side| {
                b.iter_batched(
                    || {
                        let d = build(side, DispatchConfig::new().with_hit_cache(cache));
                        let host = Grid { side, hits: 0 };
                        (d, host)
                    },
                    |(mut d, mut host)| {
                        for p in &points {
                            black_box(d.deliver(&mut host, &PointerEvent::pointer_move(1, *p)));
                        }
                        black_box(host.hits)
                    },
                    BatchSize::LargeInput,
                );
            });
        }
    }
    g.finish();
}

fn registration(c: &mut Criterion) {
    let mut g = c.benchmark_group("collider_tree_build");
    for &n in &[256_u32, 4096] {
        g.bench_with_input(BenchmarkId::new("flat", n), &n, |b, &n| {
            b.iter(|| {
                let mut tree = ColliderTree::new();
                tree.create_colliders(None, 0..n, 0);
                black_box(tree.len())
            });
        });
        g.bench_with_input(BenchmarkId::new("reregister", n), &n, |b, &n| {
            let mut tree = ColliderTree::new();
            tree.create_colliders(None, 0..n, 0);
            b.iter(|| black_box(tree.create_colliders(None, 0..n, 0).len()));
        });
    }
    g.finish();
}

criterion_group!(benches, moves, registration);
criterion_main!(benches);
