//! Benchmarks for wind barb rendering.
//!
//! Run with: cargo bench --package renderer --bench barbs_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use projection::{Equirectangular, Frame, RegularMesh, RowOrder};
use renderer::barbs::{uv_to_speed_direction, BarbRenderer};
use renderer::{BarbStyle, Canvas};
use test_utils::create_vortex;
use wind_common::{BoundingBox, GridField};

// =============================================================================
// UV TO SPEED/DIRECTION BENCHMARKS
// =============================================================================

fn bench_uv_to_speed_direction(c: &mut Criterion) {
    let mut group = c.benchmark_group("uv_to_speed_direction");

    let test_cases: Vec<(f32, f32)> = (0..100)
        .map(|i| {
            let angle = (i as f32 / 100.0) * std::f32::consts::PI * 2.0;
            let speed = (i as f32 / 10.0).min(20.0);
            (speed * angle.cos(), speed * angle.sin())
        })
        .collect();

    group.bench_function("100_conversions", |b| {
        b.iter(|| {
            for &(u, v) in &test_cases {
                black_box(uv_to_speed_direction(u, v));
            }
        })
    });

    group.finish();
}

// =============================================================================
// FIELD RENDERING BENCHMARKS
// =============================================================================

fn bench_draw_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw_field");
    let bounds = BoundingBox::new(-6.0, 30.0, 36.0, 46.0);

    for &(nx, ny) in &[(22usize, 9usize), (43, 17), (85, 33)] {
        let (u, v) = create_vortex(nx, ny, 60.0);
        let u = GridField::new(nx, ny, u).expect("u grid");
        let v = GridField::new(nx, ny, v).expect("v grid");
        let mesh = RegularMesh::new(&bounds, nx, ny, RowOrder::NorthToSouth);

        group.throughput(Throughput::Elements((nx * ny) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", nx, ny)),
            &(nx, ny),
            |b, _| {
                let mut renderer = BarbRenderer::new(BarbStyle::default()).expect("renderer");
                b.iter(|| {
                    let mut canvas =
                        Canvas::new(Frame::new(0.0, 0.0, 1500.0, 900.0), 150.0).expect("canvas");
                    let viewport = Equirectangular::new(bounds)
                        .expect("projection")
                        .fit(Frame::new(150.0, 90.0, 1200.0, 720.0));
                    black_box(
                        renderer
                            .draw_field(&mut canvas, &viewport, &mesh, &u, &v)
                            .expect("draw"),
                    )
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_uv_to_speed_direction, bench_draw_field);
criterion_main!(benches);
