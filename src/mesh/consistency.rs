//! Geometric sanity checks: node/vertex consistency and element orientation.
//!
//! The nodes of a curved element must interpolate its vertices: resampling the
//! nodal coordinates to the reference vertices has to reproduce the vertex
//! table up to roundoff. The tolerance scales with the mesh extent,
//! `1000 · ε · |bbox_max − bbox_min|`. A zero-extent box (a single vertex)
//! falls back to the largest vertex coordinate magnitude, at least 1.

use tracing::{debug, warn};

use super::{ElementKind, Mesh, MeshError};
use crate::basis::{SimplexBasis, apply_resampling, resampling_matrix};

/// Relative tolerance factor for node/vertex consistency.
const CONSISTENCY_TOL_FACTOR: f64 = 1e3;

/// Axis-aligned bounding box `(min, max)` of the mesh vertices.
///
/// A mesh without vertices has a degenerate box at the origin.
pub fn find_bounding_box(mesh: &Mesh) -> (Vec<f64>, Vec<f64>) {
    let vertices = mesh.vertices();
    if vertices.ncols() == 0 {
        return (vec![0.0; mesh.ambient_dim()], vec![0.0; mesh.ambient_dim()]);
    }
    (0..mesh.ambient_dim())
        .map(|axis| {
            (0..vertices.ncols()).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                let x = vertices[(axis, v)];
                (lo.min(x), hi.max(x))
            })
        })
        .unzip()
}

/// Tolerance for node/vertex consistency of `mesh`.
pub fn consistency_tolerance(mesh: &Mesh) -> f64 {
    let (lo, hi) = find_bounding_box(mesh);
    let diag = lo
        .iter()
        .zip(&hi)
        .map(|(a, b)| (b - a) * (b - a))
        .sum::<f64>()
        .sqrt();
    let scale = if diag > 0.0 {
        diag
    } else {
        let vertices = mesh.vertices();
        (0..vertices.ncols())
            .flat_map(|v| (0..vertices.nrows()).map(move |axis| vertices[(axis, v)].abs()))
            .fold(1.0, f64::max)
    };
    CONSISTENCY_TOL_FACTOR * f64::EPSILON * scale
}

/// Per-element distance between the vertices predicted by the nodes and the
/// actual vertex coordinates, for group `igroup`.
pub fn node_vertex_errors(mesh: &Mesh, igroup: usize) -> Result<Vec<f64>, MeshError> {
    let grp = mesh.groups().get(igroup).ok_or(MeshError::GroupOutOfRange {
        group: igroup,
        ngroups: mesh.groups().len(),
    })?;
    if grp.kind() != ElementKind::Simplex {
        return Err(MeshError::UnsupportedElementKind(grp.kind()));
    }

    let basis = SimplexBasis::new(grp.dim(), grp.order())?;
    let vertex_unit = grp.vertex_unit_coordinates()?;
    let to_vertices = resampling_matrix(&basis, vertex_unit.as_ref(), grp.unit_nodes().as_ref())?;

    let vi = grp.vertex_indices();
    let mut sq_errors = vec![0.0; grp.nelements()];
    for (axis, coords) in grp.nodes().iter().enumerate() {
        let predicted = apply_resampling(to_vertices.as_ref(), coords.as_ref())?;
        for (el, err) in sq_errors.iter_mut().enumerate() {
            for (v, &ivertex) in vi.row(el).iter().enumerate() {
                let diff = predicted[(el, v)] - mesh.vertices()[(axis, ivertex)];
                *err += diff * diff;
            }
        }
    }

    Ok(sq_errors.into_iter().map(f64::sqrt).collect())
}

/// Fail if any group's nodes do not reproduce its vertices.
///
/// Non-simplex groups are skipped with a warning.
pub fn check_node_vertex_consistency(mesh: &Mesh) -> Result<(), MeshError> {
    let tolerance = consistency_tolerance(mesh);

    for (igroup, grp) in mesh.groups().iter().enumerate() {
        if grp.kind() != ElementKind::Simplex {
            warn!(
                group = igroup,
                kind = ?grp.kind(),
                "node-vertex consistency check not implemented for element kind, skipping"
            );
            continue;
        }

        let max_error = node_vertex_errors(mesh, igroup)?
            .into_iter()
            .fold(0.0, f64::max);
        debug!(group = igroup, max_error, tolerance, "node-vertex consistency");

        if max_error > tolerance {
            return Err(MeshError::NodeVertexInconsistency {
                group: igroup,
                max_error,
                tolerance,
            });
        }
    }
    Ok(())
}

/// Signed volume measure (Jacobian determinant of the vertex spans) of every
/// element, in global element order.
///
/// Only defined for volume meshes (dim == ambient_dim) of dimension 0 to 3.
pub fn element_orientations(mesh: &Mesh) -> Result<Vec<f64>, MeshError> {
    let dim = mesh.dim();
    if dim != mesh.ambient_dim() {
        return Err(MeshError::ShapeMismatch(format!(
            "orientation needs a volume mesh, got dim {dim} in ambient dimension {}",
            mesh.ambient_dim()
        )));
    }

    let vertices = mesh.vertices();
    let mut orientations = Vec::with_capacity(mesh.nelements());
    for grp in mesh.groups() {
        if dim > 3 {
            return Err(MeshError::UnsupportedDimension {
                kind: grp.kind(),
                dim,
            });
        }
        let axes = grp.kind().axis_vertices(dim);
        let vi = grp.vertex_indices();
        for el in 0..grp.nelements() {
            let row = vi.row(el);
            let origin = row[0];
            // j[c][r]: column c = edge vector to axis vertex c
            let mut j = [[0.0; 3]; 3];
            for (c, &a) in axes.iter().enumerate() {
                for (r, entry) in j[c].iter_mut().enumerate().take(dim) {
                    *entry = vertices[(r, row[a])] - vertices[(r, origin)];
                }
            }
            orientations.push(determinant(dim, &j));
        }
    }
    Ok(orientations)
}

fn determinant(dim: usize, j: &[[f64; 3]; 3]) -> f64 {
    match dim {
        0 => 1.0,
        1 => j[0][0],
        2 => j[0][0] * j[1][1] - j[1][0] * j[0][1],
        _ => {
            j[0][0] * (j[1][1] * j[2][2] - j[2][1] * j[1][2])
                - j[1][0] * (j[0][1] * j[2][2] - j[2][1] * j[0][2])
                + j[2][0] * (j[0][1] * j[1][2] - j[1][1] * j[0][2])
        }
    }
}

/// Fail on the first negatively oriented element of a volume mesh.
///
/// Meshes with dim < ambient_dim have no orientation and always pass.
pub fn check_volume_orientation(mesh: &Mesh) -> Result<(), MeshError> {
    if mesh.dim() != mesh.ambient_dim() {
        return Ok(());
    }
    let orientations = element_orientations(mesh)?;
    match orientations.iter().position(|&det| det < 0.0) {
        Some(element) => Err(MeshError::NegativeOrientation {
            element,
            determinant: orientations[element],
        }),
        None => Ok(()),
    }
}
