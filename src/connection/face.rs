//! Face restriction: derived meshes on element faces.
//!
//! Restricting a volume discretization to a tagged boundary (or to all interior
//! faces) yields three things:
//! - a lower-dimensional mesh whose elements are the selected faces,
//! - a discretization of that mesh,
//! - a connection interpolating volume fields onto it.
//!
//! Each face id of a reference simplex is the image of the reference
//! (dim-1)-simplex under an affine map `x -> A (x + 1)/2 + b`, where `b` is the
//! first face vertex and the columns of `A` run from it to the other face
//! vertices. All selected faces sharing a face id share one such map and form
//! one interpolation batch.

use std::collections::BTreeSet;
use std::sync::Arc;

use faer::Mat;
use tracing::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{
    ArrayContext, ConnectionElementGroup, ConnectionError, DiscretizationConnection,
    InterpolationBatch,
};
use crate::basis::{SimplexBasis, apply_resampling, resampling_matrix, warp_and_blend_nodes};
use crate::discretization::{Discretization, ElementGroupFactory};
use crate::mesh::{
    BoundaryTag, ElementKind, FacialAdjacencyMap, Mesh, MeshError, UnboundElementGroup,
    VertexIndices,
};

/// Result of [`make_face_restriction`].
#[derive(Clone, Debug)]
pub struct FaceRestriction<I = Vec<usize>> {
    /// Mesh made of the selected faces.
    pub mesh: Arc<Mesh>,
    /// Discretization of `mesh`.
    pub discr: Arc<Discretization>,
    /// Interpolation from the volume discretization onto `discr`.
    pub connection: DiscretizationConnection<I>,
}

/// Elements of one derived group that come from the same local face.
#[derive(Clone, Debug)]
pub(crate) struct FaceBatch {
    pub(crate) face_id: usize,
    /// Source elements, parent group numbering.
    pub(crate) source_elements: Vec<usize>,
    /// Target elements, derived group numbering.
    pub(crate) target_elements: Vec<usize>,
    /// (dim, dim-1) linear part of the face map.
    pub(crate) a: Mat<f64>,
    /// Offset of the face map (first face vertex).
    pub(crate) b: Vec<f64>,
}

/// Sorted, deduplicated vertices touched by the faces of `boundary_tag`.
///
/// Without a tag (interior faces) every vertex of the mesh is returned.
pub fn face_vertices(mesh: &Mesh, boundary_tag: Option<&BoundaryTag>) -> Result<Vec<usize>, MeshError> {
    let Some(tag) = boundary_tag else {
        return Ok((0..mesh.nvertices()).collect());
    };

    let bit = mesh.boundary_tag_bit(tag)?;
    let mut vertices = BTreeSet::new();
    for fagrp_map in mesh.facial_adjacency_groups()? {
        let Some(bdry) = fagrp_map.get(&None) else {
            continue;
        };
        let grp = &mesh.groups()[bdry.igroup()];
        let faces = grp.face_vertex_indices()?;
        for (el, face) in bdry.faces_with_tag(bit) {
            let row = grp.vertex_indices().row(el);
            vertices.extend(faces[face].iter().map(|&v| row[v]));
        }
    }
    Ok(vertices.into_iter().collect())
}

/// Map reference (dim-1)-simplex nodes onto a face: `A (x + 1)/2 + b`.
pub(crate) fn map_to_face(a: &Mat<f64>, b: &[f64], unit_nodes: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(a.nrows(), unit_nodes.ncols(), |d, j| {
        b[d] + (0..a.ncols())
            .map(|k| a[(d, k)] * (unit_nodes[(k, j)] + 1.0) * 0.5)
            .sum::<f64>()
    })
}

/// `(element, face)` pairs of one group selected by the tag bit, or all
/// interior pairs when there is no tag.
fn selected_faces(fagrp_map: &FacialAdjacencyMap, tag_bit: Option<u64>) -> Vec<(usize, usize)> {
    match tag_bit {
        Some(bit) => fagrp_map
            .get(&None)
            .map(|bdry| bdry.faces_with_tag(bit).collect())
            .unwrap_or_default(),
        None => fagrp_map
            .values()
            .filter(|fagrp| !fagrp.is_boundary())
            .flat_map(|fagrp| fagrp.faces())
            .collect(),
    }
}

/// Build the derived group and batch data for group `igroup`.
fn restrict_group(
    mesh: &Mesh,
    igroup: usize,
    fagrp_map: &FacialAdjacencyMap,
    tag_bit: Option<u64>,
    vol_to_bdry: &[Option<usize>],
) -> Result<(UnboundElementGroup, Vec<FaceBatch>), ConnectionError> {
    let mgrp = &mesh.groups()[igroup];
    if mgrp.kind() != ElementKind::Simplex {
        return Err(MeshError::UnsupportedElementKind(mgrp.kind()).into());
    }

    let dim = mgrp.dim();
    let face_vertex_indices = mgrp.face_vertex_indices()?;
    let vertex_unit = mgrp.vertex_unit_coordinates()?;

    let pairs = selected_faces(fagrp_map, tag_bit);

    // one pass: bucket elements by face id, keeping encounter order
    let mut by_face: Vec<Vec<usize>> = vec![Vec::new(); face_vertex_indices.len()];
    for &(el, face) in &pairs {
        by_face[face].push(el);
    }

    let bdry_unit_nodes = warp_and_blend_nodes(dim - 1, mgrp.order())?;
    let nbdry_unit_nodes = bdry_unit_nodes.ncols();
    let vol_basis = SimplexBasis::new(dim, mgrp.order())?;

    let mut vertex_indices = Vec::with_capacity(pairs.len() * dim);
    let mut nodes: Vec<Mat<f64>> = (0..mesh.ambient_dim())
        .map(|_| Mat::zeros(pairs.len(), nbdry_unit_nodes))
        .collect();
    let mut batches = Vec::with_capacity(by_face.len());
    let mut batch_base = 0;

    for (face_id, source_elements) in by_face.into_iter().enumerate() {
        let loc_face_vertices = face_vertex_indices[face_id];

        let b: Vec<f64> = (0..dim).map(|d| vertex_unit[(d, loc_face_vertices[0])]).collect();
        let a = Mat::from_fn(dim, dim - 1, |d, k| {
            vertex_unit[(d, loc_face_vertices[k + 1])] - b[d]
        });

        let face_unit_nodes = map_to_face(&a, &b, &bdry_unit_nodes);
        let resample = resampling_matrix(
            &vol_basis,
            face_unit_nodes.as_ref(),
            mgrp.unit_nodes().as_ref(),
        )?;

        for &el in &source_elements {
            let row = mgrp.vertex_indices().row(el);
            for &v in loc_face_vertices {
                let ivertex = row[v];
                let mapped = vol_to_bdry[ivertex]
                    .ok_or(ConnectionError::UnmappedVertex { vertex: ivertex })?;
                vertex_indices.push(mapped);
            }
        }

        for (axis, coords) in mgrp.nodes().iter().enumerate() {
            let selected = Mat::from_fn(source_elements.len(), coords.ncols(), |i, j| {
                coords[(source_elements[i], j)]
            });
            let face_nodes = apply_resampling(resample.as_ref(), selected.as_ref())?;
            for i in 0..source_elements.len() {
                for j in 0..nbdry_unit_nodes {
                    nodes[axis][(batch_base + i, j)] = face_nodes[(i, j)];
                }
            }
        }

        let nbatch = source_elements.len();
        batches.push(FaceBatch {
            face_id,
            source_elements,
            target_elements: (batch_base..batch_base + nbatch).collect(),
            a,
            b,
        });
        batch_base += nbatch;
    }

    debug!(
        group = igroup,
        nfaces = pairs.len(),
        nbatches = batches.len(),
        "restricted element group"
    );

    let vertex_indices = VertexIndices::from_flat(vertex_indices, dim)?;
    let group = UnboundElementGroup::simplex(
        mgrp.order(),
        vertex_indices,
        nodes,
        Some(bdry_unit_nodes),
        Some(dim - 1),
    )?
    .with_index_width(mgrp.index_width());

    Ok((group, batches))
}

/// Assemble the connection from the volume discretization to the face
/// discretization out of per-group batch data.
pub(crate) fn build_boundary_connection<C: ArrayContext>(
    ctx: &C,
    vol_discr: &Arc<Discretization>,
    bdry_discr: &Arc<Discretization>,
    connection_data: &[Vec<FaceBatch>],
) -> Result<DiscretizationConnection<C::IndexArray>, ConnectionError> {
    let mut groups = Vec::with_capacity(connection_data.len());
    for (igrp, batches) in connection_data.iter().enumerate() {
        let vol_grp = &vol_discr.groups()[igrp];
        let bdry_grp = &bdry_discr.groups()[igrp];

        let mut connection_batches = Vec::with_capacity(batches.len());
        for batch in batches {
            let result_unit_nodes = map_to_face(&batch.a, &batch.b, bdry_grp.unit_nodes());

            let from: Vec<usize> = batch
                .source_elements
                .iter()
                .map(|&el| vol_grp.element_nr_base() + el)
                .collect();
            let to: Vec<usize> = batch
                .target_elements
                .iter()
                .map(|&el| bdry_grp.element_nr_base() + el)
                .collect();

            connection_batches.push(InterpolationBatch::new(
                igrp,
                ctx.to_device(&from)?,
                ctx.to_device(&to)?,
                result_unit_nodes,
                Some(batch.face_id),
            ));
        }
        groups.push(ConnectionElementGroup::new(connection_batches));
    }

    Ok(DiscretizationConnection::new(
        Arc::clone(vol_discr),
        Arc::clone(bdry_discr),
        groups,
    ))
}

/// Restrict `discr` to the faces tagged `boundary_tag`, or to all interior
/// faces when `boundary_tag` is `None`.
///
/// The derived mesh keeps only the vertices touched by the selected faces,
/// renumbered in ascending order. Each volume group yields one derived group
/// whose elements are ordered by face id, then by encounter order in the
/// facial adjacency tables.
pub fn make_face_restriction<C: ArrayContext>(
    ctx: &C,
    discr: &Arc<Discretization>,
    group_factory: &dyn ElementGroupFactory,
    boundary_tag: Option<&BoundaryTag>,
) -> Result<FaceRestriction<C::IndexArray>, ConnectionError> {
    info!(?boundary_tag, "building face restriction: start");

    let mesh = discr.mesh();

    let bdry_vertex_vol_nrs = face_vertices(mesh, boundary_tag)?;
    let mut vol_to_bdry = vec![None; mesh.nvertices()];
    for (ibdry, &ivol) in bdry_vertex_vol_nrs.iter().enumerate() {
        vol_to_bdry[ivol] = Some(ibdry);
    }
    let bdry_vertices = Mat::from_fn(mesh.ambient_dim(), bdry_vertex_vol_nrs.len(), |d, v| {
        mesh.vertices()[(d, bdry_vertex_vol_nrs[v])]
    });

    let tag_bit = boundary_tag
        .map(|tag| mesh.boundary_tag_bit(tag))
        .transpose()?;
    let facial_adjacency = mesh.facial_adjacency_groups()?;

    let restrict = |igroup: usize| {
        restrict_group(mesh, igroup, &facial_adjacency[igroup], tag_bit, &vol_to_bdry)
    };

    #[cfg(feature = "parallel")]
    let restricted = (0..mesh.groups().len())
        .into_par_iter()
        .map(restrict)
        .collect::<Result<Vec<_>, _>>()?;

    #[cfg(not(feature = "parallel"))]
    let restricted = (0..mesh.groups().len())
        .map(restrict)
        .collect::<Result<Vec<_>, _>>()?;

    let (bdry_groups, connection_data): (Vec<_>, Vec<_>) = restricted.into_iter().unzip();

    let bdry_mesh = Arc::new(
        Mesh::builder(bdry_vertices)
            .with_groups(bdry_groups)
            .with_boundary_tags(mesh.boundary_tags().iter().cloned())
            .with_vertex_id_width(mesh.vertex_id_width())
            .with_element_id_width(mesh.element_id_width())
            .build()?,
    );
    let bdry_discr = Arc::new(Discretization::new(Arc::clone(&bdry_mesh), group_factory)?);

    let connection = build_boundary_connection(ctx, discr, &bdry_discr, &connection_data)?;

    info!(
        nelements = bdry_mesh.nelements(),
        nvertices = bdry_mesh.nvertices(),
        "building face restriction: done"
    );

    Ok(FaceRestriction {
        mesh: bdry_mesh,
        discr: bdry_discr,
        connection,
    })
}
