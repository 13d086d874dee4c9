//! Mesh construction, connectivity and geometric checks.

use dg_mesh::basis::warp_and_blend_nodes;
use dg_mesh::mesh::{
    BoundaryTag, ConnectivitySource, ElementConnectivity, FacialAdjacencyGroup,
    FacialAdjacencyMap, IndexWidth, Mesh, MeshError, UnboundElementGroup, VertexIndices,
    consistency_tolerance, element_orientations, find_bounding_box, node_vertex_errors,
};
use faer::Mat;

/// Simplex group whose nodes are affine images of the warp-and-blend nodes,
/// passed through `warp`.
fn simplex_group<R: AsRef<[usize]>>(
    vertices: &Mat<f64>,
    elements: &[R],
    order: usize,
    warp: impl Fn(&mut [f64]),
) -> UnboundElementGroup {
    let dim = elements[0].as_ref().len() - 1;
    let ambient = vertices.nrows();
    let unit = warp_and_blend_nodes(dim, order).unwrap();
    let mut nodes = vec![Mat::<f64>::zeros(elements.len(), unit.ncols()); ambient];
    for (el, row) in elements.iter().enumerate() {
        let row = row.as_ref();
        for j in 0..unit.ncols() {
            let mut x: Vec<f64> = (0..ambient)
                .map(|d| {
                    let v0 = vertices[(d, row[0])];
                    v0 + (0..dim)
                        .map(|k| 0.5 * (unit[(k, j)] + 1.0) * (vertices[(d, row[k + 1])] - v0))
                        .sum::<f64>()
                })
                .collect();
            warp(x.as_mut_slice());
            for (d, &xd) in x.iter().enumerate() {
                nodes[d][(el, j)] = xd;
            }
        }
    }
    let vertex_indices = VertexIndices::from_rows(elements).unwrap();
    UnboundElementGroup::simplex(order, vertex_indices, nodes, Some(unit), None).unwrap()
}

fn vertices_2d(points: &[[f64; 2]]) -> Mat<f64> {
    Mat::from_fn(2, points.len(), |d, v| points[v][d])
}

fn vertices_1d(points: &[f64]) -> Mat<f64> {
    Mat::from_fn(1, points.len(), |_, v| points[v])
}

fn unit_square() -> Mat<f64> {
    vertices_2d(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]])
}

const SQUARE_TRIANGLES: [[usize; 3]; 2] = [[0, 1, 2], [3, 2, 1]];

#[test]
fn test_element_and_node_bases_are_prefix_sums() {
    let vertices = vertices_1d(&[0.0, 0.25, 0.5, 1.0]);
    let order = 3;
    let mesh = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &[[0, 1], [1, 2]], order, |_| {}))
        .with_group(simplex_group(&vertices, &[[2, 3]], order, |_| {}))
        .build()
        .unwrap();

    assert_eq!(mesh.nelements(), 3);
    assert_eq!(mesh.nnodes(), 3 * (order + 1));
    assert_eq!(mesh.dim(), 1);
    assert_eq!(mesh.ambient_dim(), 1);

    let groups = mesh.groups();
    assert_eq!(groups[0].element_nr_base(), 0);
    assert_eq!(groups[1].element_nr_base(), 2);
    assert_eq!(groups[0].node_nr_base(), 0);
    assert_eq!(groups[1].node_nr_base(), 2 * (order + 1));
}

#[test]
fn test_connectivity_from_vertices() {
    let vertices = vertices_1d(&[0.0, 0.25, 0.5, 1.0]);
    let mesh = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &[[0, 1], [1, 2]], 2, |_| {}))
        .with_group(simplex_group(&vertices, &[[2, 3]], 2, |_| {}))
        .build()
        .unwrap();

    let conn = mesh.element_connectivity().unwrap();
    assert_eq!(conn.neighbors_of(0), &[0, 1]);
    assert_eq!(conn.neighbors_of(1), &[0, 1, 2]);
    assert_eq!(conn.neighbors_of(2), &[1, 2]);

    // cached on first access
    assert!(std::ptr::eq(conn, mesh.element_connectivity().unwrap()));
}

#[test]
fn test_connectivity_csr_structure_and_symmetry() {
    // 2x2 grid of squares, each split into two triangles
    let n = 3;
    let points: Vec<[f64; 2]> = (0..n * n)
        .map(|i| [(i % n) as f64 / 2.0, (i / n) as f64 / 2.0])
        .collect();
    let vertices = vertices_2d(&points);
    let mut elements = Vec::new();
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            let v = j * n + i;
            elements.push([v, v + 1, v + n]);
            elements.push([v + n + 1, v + n, v + 1]);
        }
    }
    let mesh = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &elements, 2, |_| {}))
        .build()
        .unwrap();

    let conn = mesh.element_connectivity().unwrap();
    let starts = conn.neighbors_starts();
    assert_eq!(starts.len(), mesh.nelements() + 1);
    assert_eq!(starts[0], 0);
    assert_eq!(*starts.last().unwrap(), conn.neighbors().len());
    assert!(starts.windows(2).all(|w| w[0] <= w[1]));

    for el in 0..mesh.nelements() {
        let nbs = conn.neighbors_of(el);
        assert!(nbs.windows(2).all(|w| w[0] < w[1]), "neighbors sorted");
        for &nb in nbs {
            assert!(conn.neighbors_of(nb).contains(&el), "{el} <-> {nb}");
        }
    }
}

#[test]
fn test_connectivity_keeps_self_adjacency() {
    let vertices = unit_square();
    let mesh = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &SQUARE_TRIANGLES, 1, |_| {}))
        .build()
        .unwrap();

    let conn = mesh.element_connectivity().unwrap();
    for el in 0..mesh.nelements() {
        assert!(conn.neighbors_of(el).contains(&el));
    }
}

#[test]
fn test_explicit_connectivity_is_used() {
    let vertices = unit_square();
    let explicit = ElementConnectivity::new(vec![0, 1, 2], vec![1, 0]).unwrap();
    let mesh = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &SQUARE_TRIANGLES, 1, |_| {}))
        .with_element_connectivity(ConnectivitySource::Explicit(explicit.clone()))
        .build()
        .unwrap();

    assert_eq!(mesh.element_connectivity().unwrap(), &explicit);
}

#[test]
fn test_explicit_connectivity_wrong_size() {
    let vertices = unit_square();
    let explicit = ElementConnectivity::new(vec![0, 1], vec![0]).unwrap();
    let err = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &SQUARE_TRIANGLES, 1, |_| {}))
        .with_element_connectivity(ConnectivitySource::Explicit(explicit))
        .build()
        .unwrap_err();
    assert!(matches!(err, MeshError::InvalidConnectivity(_)));
}

#[test]
fn test_unavailable_connectivity() {
    let vertices = unit_square();
    let mesh = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &SQUARE_TRIANGLES, 1, |_| {}))
        .with_element_connectivity(ConnectivitySource::Unavailable)
        .build()
        .unwrap();

    assert_eq!(
        mesh.element_connectivity().unwrap_err(),
        MeshError::ConnectivityUnavailable
    );
}

#[test]
fn test_affine_nodes_are_consistent() {
    let vertices = unit_square();
    let mesh = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &SQUARE_TRIANGLES, 4, |_| {}))
        .build()
        .unwrap();

    for err in node_vertex_errors(&mesh, 0).unwrap() {
        assert!(err < 1e-13, "error {err}");
    }
}

#[test]
fn test_curved_nodes_are_consistent() {
    let bend = |x: &mut [f64]| {
        let (u, v) = (x[0], x[1]);
        x[0] = u + 0.1 * u * v;
        x[1] = v - 0.05 * u * u;
    };

    let mut vertices = unit_square();
    let straight = vertices.clone();
    for v in 0..vertices.ncols() {
        let mut x = [vertices[(0, v)], vertices[(1, v)]];
        bend(&mut x[..]);
        vertices[(0, v)] = x[0];
        vertices[(1, v)] = x[1];
    }

    let mesh = Mesh::builder(vertices)
        .with_group(simplex_group(&straight, &SQUARE_TRIANGLES, 2, bend))
        .build();
    assert!(mesh.is_ok(), "{:?}", mesh.err());
}

#[test]
fn test_displaced_node_is_inconsistent() {
    let vertices = unit_square();
    let unit = warp_and_blend_nodes(2, 1).unwrap();
    let displaced = |d: usize, j: usize| {
        let shift = if d == 0 && j == 0 { 0.1 } else { 0.0 };
        vertices[(d, 0)]
            + 0.5 * (unit[(0, j)] + 1.0) * (vertices[(d, 1)] - vertices[(d, 0)])
            + 0.5 * (unit[(1, j)] + 1.0) * (vertices[(d, 2)] - vertices[(d, 0)])
            + shift
    };
    let nodes = vec![
        Mat::from_fn(1, 3, |_, j| displaced(0, j)),
        Mat::from_fn(1, 3, |_, j| displaced(1, j)),
    ];
    let make_group = || {
        UnboundElementGroup::simplex(
            1,
            VertexIndices::from_rows(&[[0, 1, 2]]).unwrap(),
            nodes.clone(),
            Some(unit.clone()),
            None,
        )
        .unwrap()
    };

    let err = Mesh::builder(vertices.clone())
        .with_group(make_group())
        .build()
        .unwrap_err();
    match err {
        MeshError::NodeVertexInconsistency {
            group,
            max_error,
            tolerance,
        } => {
            assert_eq!(group, 0);
            assert!(max_error > tolerance);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // checks can be skipped
    assert!(
        Mesh::builder(vertices.clone())
            .with_group(make_group())
            .skip_tests()
            .build()
            .is_ok()
    );
}

#[test]
fn test_negative_orientation_rejected() {
    let vertices = unit_square();
    let err = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &[[0, 2, 1]], 1, |_| {}))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        MeshError::NegativeOrientation { element: 0, .. }
    ));
}

#[test]
fn test_element_orientations() {
    let vertices = unit_square();
    let mesh = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &SQUARE_TRIANGLES, 1, |_| {}))
        .build()
        .unwrap();
    let orientations = element_orientations(&mesh).unwrap();
    assert_eq!(orientations.len(), 2);
    assert!((orientations[0] - 1.0).abs() < 1e-14);
    assert!((orientations[1] - 1.0).abs() < 1e-14);
}

#[test]
fn test_surface_mesh_skips_orientation() {
    // reversed segment embedded in 2D: no orientation to check
    let vertices = vertices_2d(&[[1.0, 0.0], [0.0, 1.0]]);
    let mesh = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &[[1, 0]], 2, |_| {}))
        .build()
        .unwrap();
    assert_eq!(mesh.dim(), 1);
    assert_eq!(mesh.ambient_dim(), 2);
}

#[test]
fn test_index_width_mismatch() {
    let vertices = unit_square();
    let group = || {
        simplex_group(&vertices, &SQUARE_TRIANGLES, 1, |_| {}).with_index_width(IndexWidth::I64)
    };

    let err = Mesh::builder(vertices.clone())
        .with_group(group())
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        MeshError::IndexWidthMismatch {
            group: 0,
            expected: IndexWidth::I32,
            actual: IndexWidth::I64,
        }
    );

    let mesh = Mesh::builder(vertices.clone())
        .with_group(group())
        .with_vertex_id_width(IndexWidth::I64)
        .build()
        .unwrap();
    assert_eq!(mesh.vertex_id_width(), IndexWidth::I64);
}

#[test]
fn test_vertex_index_out_of_range() {
    let vertices = unit_square();
    let group = simplex_group(&vertices, &SQUARE_TRIANGLES, 1, |_| {});
    let err = Mesh::builder(vertices_2d(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]))
        .with_group(group)
        .skip_tests()
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        MeshError::VertexIndexOutOfRange {
            index: 3,
            nvertices: 3
        }
    );
}

#[test]
fn test_groups_must_share_dimension() {
    let vertices = unit_square();
    let err = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &[[0, 1, 2]], 1, |_| {}))
        .with_group(simplex_group(&vertices, &[[1, 3]], 1, |_| {}))
        .build()
        .unwrap_err();
    assert_eq!(err, MeshError::InconsistentDimensions { first: 2, other: 1 });
}

#[test]
fn test_boundary_tag_bits() {
    let vertices = unit_square();
    let mesh = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &SQUARE_TRIANGLES, 1, |_| {}))
        .with_boundary_tags([BoundaryTag::named("wall"), BoundaryTag::named("inflow")])
        .build()
        .unwrap();

    assert_eq!(mesh.boundary_tag_bit(&BoundaryTag::All).unwrap(), 1);
    assert_eq!(mesh.boundary_tag_bit(&BoundaryTag::ReallyAll).unwrap(), 2);
    assert_eq!(mesh.boundary_tag_bit(&BoundaryTag::named("wall")).unwrap(), 4);
    assert_eq!(mesh.boundary_tag_bit(&BoundaryTag::named("inflow")).unwrap(), 8);
    assert_eq!(mesh.boundary_tag_bit(&BoundaryTag::NoBoundary).unwrap(), 0);
    assert!(matches!(
        mesh.boundary_tag_bit(&BoundaryTag::named("outflow")),
        Err(MeshError::UnknownBoundaryTag(_))
    ));
}

#[test]
fn test_facial_adjacency_must_cover_every_group() {
    let vertices = unit_square();
    let err = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &SQUARE_TRIANGLES, 1, |_| {}))
        .with_facial_adjacency(Vec::new())
        .build()
        .unwrap_err();
    assert!(matches!(err, MeshError::InvalidFacialAdjacency(_)));
}

#[test]
fn test_facial_adjacency_face_out_of_range() {
    let vertices = unit_square();
    let mut map = FacialAdjacencyMap::new();
    map.insert(None, FacialAdjacencyGroup::boundary(0, &[(0, 3, 1)]).unwrap());
    let err = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &SQUARE_TRIANGLES, 1, |_| {}))
        .with_facial_adjacency(vec![map])
        .build()
        .unwrap_err();
    assert!(matches!(err, MeshError::InvalidFacialAdjacency(_)));
}

#[test]
fn test_hypercube_group_skips_consistency() {
    let vertices = unit_square();
    let unit = Mat::from_fn(2, 4, |d, v| if (v >> d) & 1 == 1 { 1.0 } else { -1.0 });
    // deliberately wrong nodes: never checked for hypercubes
    let nodes = vec![Mat::zeros(1, 4), Mat::zeros(1, 4)];
    let group = UnboundElementGroup::hypercube(
        1,
        VertexIndices::from_rows(&[[0, 1, 2, 3]]).unwrap(),
        nodes,
        unit,
    )
    .unwrap();

    let mesh = Mesh::builder(vertices).with_group(group).build().unwrap();
    assert_eq!(mesh.nelements(), 1);
    assert!(matches!(
        node_vertex_errors(&mesh, 0),
        Err(MeshError::UnsupportedElementKind(_))
    ));
}

#[test]
fn test_bounding_box() {
    let vertices = vertices_2d(&[[-1.0, 2.0], [3.0, 0.5], [0.0, -4.0]]);
    let mesh = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &[[0, 2, 1]], 1, |_| {}))
        .build()
        .unwrap();
    let (lo, hi) = find_bounding_box(&mesh);
    assert_eq!(lo, vec![-1.0, -4.0]);
    assert_eq!(hi, vec![3.0, 2.0]);
}

#[test]
fn test_node_vertex_errors_group_out_of_range() {
    let vertices = unit_square();
    let mesh = Mesh::builder(vertices.clone())
        .with_group(simplex_group(&vertices, &SQUARE_TRIANGLES, 1, |_| {}))
        .build()
        .unwrap();

    assert_eq!(
        node_vertex_errors(&mesh, 1).unwrap_err(),
        MeshError::GroupOutOfRange {
            group: 1,
            ngroups: 1
        }
    );
}

#[test]
fn test_tolerance_of_single_point_mesh() {
    let wide = vertices_1d(&[0.0, 2.0]);
    let mesh = Mesh::builder(wide.clone())
        .with_group(simplex_group(&wide, &[[0, 1]], 1, |_| {}))
        .build()
        .unwrap();
    assert_eq!(consistency_tolerance(&mesh), 1e3 * f64::EPSILON * 2.0);

    // zero extent: scale by the coordinate magnitude, never below 1
    for (x, scale) in [(3.0, 3.0), (0.25, 1.0), (0.0, 1.0)] {
        let point = vertices_1d(&[x]);
        let mesh = Mesh::builder(point.clone())
            .with_group(simplex_group(&point, &[[0, 0]], 1, |_| {}))
            .skip_tests()
            .build()
            .unwrap();
        assert_eq!(consistency_tolerance(&mesh), 1e3 * f64::EPSILON * scale);
    }
}
