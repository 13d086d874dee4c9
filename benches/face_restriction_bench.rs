//! Benchmarks for connectivity and face restriction.
//!
//! Run with: `cargo bench --bench face_restriction_bench`
//!
//! Uses structured triangle grids of the unit square with growing resolution.

use std::collections::HashMap;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dg_mesh::basis::warp_and_blend_nodes;
use dg_mesh::connection::{HostArrayContext, make_face_restriction};
use dg_mesh::discretization::{Discretization, PolynomialWarpAndBlendGroupFactory};
use dg_mesh::mesh::{
    BoundaryTag, ElementKind, FacialAdjacencyGroup, FacialAdjacencyMap, Mesh,
    UnboundElementGroup, VertexIndices, compute_connectivity_from_vertices,
};
use faer::Mat;

/// Triangulated n×n grid on the unit square with full facial adjacency.
fn grid_mesh(n: usize, order: usize) -> Arc<Mesh> {
    let nv = n + 1;
    let h = 1.0 / n as f64;
    let vertices = Mat::from_fn(2, nv * nv, |d, v| {
        if d == 0 { (v % nv) as f64 * h } else { (v / nv) as f64 * h }
    });

    let mut elements = Vec::with_capacity(2 * n * n);
    for j in 0..n {
        for i in 0..n {
            let v = j * nv + i;
            elements.push([v, v + 1, v + nv]);
            elements.push([v + nv + 1, v + nv, v + 1]);
        }
    }

    let unit = warp_and_blend_nodes(2, order).unwrap();
    let nodes = (0..2)
        .map(|d| {
            Mat::from_fn(elements.len(), unit.ncols(), |el, k| {
                let row = elements[el];
                let v0 = vertices[(d, row[0])];
                v0 + 0.5 * (unit[(0, k)] + 1.0) * (vertices[(d, row[1])] - v0)
                    + 0.5 * (unit[(1, k)] + 1.0) * (vertices[(d, row[2])] - v0)
            })
        })
        .collect();

    // match faces through their sorted vertex pairs
    let faces = ElementKind::Simplex.face_vertex_indices(2).unwrap();
    let mut open: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
    let mut interior = Vec::new();
    for (el, row) in elements.iter().enumerate() {
        for (face, fvi) in faces.iter().enumerate() {
            let (a, b) = (row[fvi[0]], row[fvi[1]]);
            let key = (a.min(b), a.max(b));
            match open.remove(&key) {
                Some((nb_el, nb_face)) => {
                    interior.push((el, face, nb_el, nb_face));
                    interior.push((nb_el, nb_face, el, face));
                }
                None => {
                    open.insert(key, (el, face));
                }
            }
        }
    }
    let mut boundary: Vec<(usize, usize, u64)> =
        open.into_values().map(|(el, face)| (el, face, 0b11)).collect();
    boundary.sort_unstable();

    let mut adjacency = FacialAdjacencyMap::new();
    adjacency.insert(None, FacialAdjacencyGroup::boundary(0, &boundary).unwrap());
    adjacency.insert(Some(0), FacialAdjacencyGroup::interior(0, 0, &interior).unwrap());

    let group = UnboundElementGroup::simplex(
        order,
        VertexIndices::from_rows(&elements).unwrap(),
        nodes,
        Some(unit),
        None,
    )
    .unwrap();

    Arc::new(
        Mesh::builder(vertices)
            .with_group(group)
            .with_facial_adjacency(vec![adjacency])
            .build()
            .unwrap(),
    )
}

fn bench_connectivity(c: &mut Criterion) {
    let mut group = c.benchmark_group("connectivity_from_vertices");

    for n in [16, 32, 64] {
        let mesh = grid_mesh(n, 1);
        group.bench_with_input(BenchmarkId::from_parameter(n), &mesh, |b, mesh| {
            b.iter(|| compute_connectivity_from_vertices(black_box(mesh)))
        });
    }

    group.finish();
}

fn bench_face_restriction(c: &mut Criterion) {
    let mut group = c.benchmark_group("face_restriction");
    group.sample_size(20);

    let n = 16;
    for order in [1, 3, 5] {
        let factory = PolynomialWarpAndBlendGroupFactory::new(order);
        let discr = Arc::new(Discretization::new(grid_mesh(n, order), &factory).unwrap());

        group.bench_with_input(BenchmarkId::new("boundary", order), &discr, |b, discr| {
            b.iter(|| {
                make_face_restriction(
                    &HostArrayContext,
                    black_box(discr),
                    &factory,
                    Some(&BoundaryTag::All),
                )
                .unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("interior", order), &discr, |b, discr| {
            b.iter(|| make_face_restriction(&HostArrayContext, black_box(discr), &factory, None).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_connectivity, bench_face_restriction);
criterion_main!(benches);
