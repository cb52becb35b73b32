//! Benchmarks for ball pivoting reconstruction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Point3;
use pivotmesh_core::{NormalPoint3d, PointCloud};
use pivotmesh_reconstruction::ball_pivoting_reconstruction;

/// Generate a test point cloud on the unit sphere with radial normals
fn generate_sphere_cloud(num_points: usize) -> PointCloud<NormalPoint3d> {
    let golden_ratio = (1.0 + 5.0_f64.sqrt()) / 2.0;

    (0..num_points)
        .map(|i| {
            let z = 1.0 - 2.0 * (i as f64 + 0.5) / num_points as f64;
            let ring = (1.0 - z * z).sqrt();
            let theta = 2.0 * std::f64::consts::PI * i as f64 / golden_ratio;

            let position = Point3::new(ring * theta.cos(), ring * theta.sin(), z);
            NormalPoint3d::new(position, position.coords)
        })
        .collect()
}

fn benchmark_reconstruction(c: &mut Criterion) {
    let mut group = c.benchmark_group("ball_pivoting");

    for size in [200, 500, 1000] {
        let cloud = generate_sphere_cloud(size);
        // scale the ball with the sampling density
        let radius = 4.0 / (size as f64).sqrt();

        group.bench_with_input(BenchmarkId::new("sphere", size), &size, |b, _| {
            b.iter(|| {
                let mesh = ball_pivoting_reconstruction(&cloud, &[radius]).unwrap();
                black_box(mesh);
            });
        });
    }

    group.finish();
}

fn benchmark_multi_radius(c: &mut Criterion) {
    let cloud = generate_sphere_cloud(500);
    let radii = [0.12, 0.2, 0.35];

    c.bench_function("ball_pivoting/multi_radius", |b| {
        b.iter(|| {
            let mesh = ball_pivoting_reconstruction(&cloud, &radii).unwrap();
            black_box(mesh);
        });
    });
}

criterion_group!(benches, benchmark_reconstruction, benchmark_multi_radius);
criterion_main!(benches);
