use criterion::{criterion_group, criterion_main, Criterion};

use bladeprep::geom::Vec3;
use bladeprep::windfield::{
    BilinearVelocityInterpolator, Grid, VelocityInterpolator, VelocityStore,
};

fn synthetic_field() -> (Grid, VelocityStore) {
    let grid = Grid::new(31, 31, 4.0, 4.0, 90.0).unwrap();
    let mut velocities = VelocityStore::new(grid.points_per_timestep());
    for step in 0..64usize {
        let mut samples = Vec::with_capacity(grid.points_per_timestep());
        for iz in 0..grid.num_z() {
            for iy in 0..grid.num_y() {
                // smooth shear-like profile with a per-timestep phase
                let u = 10.0 + 0.05 * iz as f64 + 0.01 * (iy as f64 + step as f64).sin();
                samples.push(Vec3::new(u, 0.3 * (iy as f64).cos(), 0.0));
            }
        }
        velocities.push_timestep(samples).unwrap();
    }
    (grid, velocities)
}

fn bilinear_benchmark(c: &mut Criterion) {
    let (grid, velocities) = synthetic_field();
    let interpolator = BilinearVelocityInterpolator::new();
    // sweep a rotor-sized circle of query points through the grid
    let queries: Vec<Vec3> = (0..360)
        .map(|deg| {
            let phi = (deg as f64).to_radians();
            Vec3::new(0.0, 45.0 * phi.cos(), 90.0 + 45.0 * phi.sin())
        })
        .collect();

    c.bench_function("bilinear_rotor_sweep", |b| {
        b.iter(|| {
            for (i, &point) in queries.iter().enumerate() {
                interpolator
                    .velocity_at(point, i % 64, &grid, &velocities)
                    .unwrap();
            }
        })
    });
}

criterion_group!(benches, bilinear_benchmark);
criterion_main!(benches);
