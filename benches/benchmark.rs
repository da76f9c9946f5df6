use criterion::{criterion_group, criterion_main, Criterion};
use stl_inspect::{animation::extract_frames, mesh::*, voxel::*};

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut tris = cuboid((0., 0., 0.), (10., 10., 40.));
    tris.extend(cuboid((20., 0., 0.), (30., 10., 10.)));
    let mesh = Mesh::from_triangles(&tris);
    let pitch = pitch_for(&mesh, 50).unwrap();
    c.bench_function("voxelize", |b| {
        b.iter(|| {
            let _grid = voxelize(&mesh, pitch).unwrap();
        })
    });
    let grid = voxelize(&mesh, pitch).unwrap();
    c.bench_function("extract frames", |b| {
        b.iter(|| {
            let _frames = extract_frames(&grid);
        })
    });
    c.bench_function("mass properties", |b| {
        b.iter(|| {
            let _props = mesh.mass_properties(DEFAULT_DENSITY);
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
