//! Minimal nodal discretization over a mesh.
//!
//! A [`Discretization`] places its own unit nodes on every element group of a
//! mesh, chosen by an [`ElementGroupFactory`]. It is the source and target of
//! [`DiscretizationConnection`](crate::connection::DiscretizationConnection)s.

use std::sync::Arc;

use faer::Mat;

use crate::basis::{SimplexBasis, apply_resampling, resampling_matrix, warp_and_blend_nodes};
use crate::mesh::{ElementKind, Mesh, MeshElementGroup, MeshError};

/// Chooses the unit nodes of each discretization group.
pub trait ElementGroupFactory {
    /// Polynomial order used for `group`.
    fn order(&self, group: &MeshElementGroup) -> usize;

    /// Unit nodes (dim × nunit_dofs) used for `group`.
    fn unit_nodes(&self, group: &MeshElementGroup) -> Result<Mat<f64>, MeshError>;
}

/// Warp-and-blend nodes of a fixed order on simplex groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolynomialWarpAndBlendGroupFactory {
    pub order: usize,
}

impl PolynomialWarpAndBlendGroupFactory {
    pub fn new(order: usize) -> Self {
        Self { order }
    }
}

impl ElementGroupFactory for PolynomialWarpAndBlendGroupFactory {
    fn order(&self, _group: &MeshElementGroup) -> usize {
        self.order
    }

    fn unit_nodes(&self, group: &MeshElementGroup) -> Result<Mat<f64>, MeshError> {
        match group.kind() {
            ElementKind::Simplex => Ok(warp_and_blend_nodes(group.dim(), self.order)?),
            kind => Err(MeshError::UnsupportedElementKind(kind)),
        }
    }
}

/// Discretization of one mesh element group.
#[derive(Clone, Debug)]
pub struct DiscretizationGroup {
    order: usize,
    unit_nodes: Mat<f64>,
    nelements: usize,
    element_nr_base: usize,
    dof_nr_base: usize,
}

impl DiscretizationGroup {
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn dim(&self) -> usize {
        self.unit_nodes.nrows()
    }

    /// Reference node coordinates, one node per column.
    pub fn unit_nodes(&self) -> &Mat<f64> {
        &self.unit_nodes
    }

    pub fn nelements(&self) -> usize {
        self.nelements
    }

    pub fn nunit_dofs(&self) -> usize {
        self.unit_nodes.ncols()
    }

    pub fn ndofs(&self) -> usize {
        self.nelements * self.nunit_dofs()
    }

    /// Global number of the group's first element (same as the mesh group's).
    pub fn element_nr_base(&self) -> usize {
        self.element_nr_base
    }

    /// Offset of the group's first degree of freedom in global field arrays.
    pub fn dof_nr_base(&self) -> usize {
        self.dof_nr_base
    }

    /// Orthonormal basis matching this group's unit nodes.
    pub fn basis(&self) -> Result<SimplexBasis, MeshError> {
        Ok(SimplexBasis::new(self.dim(), self.order)?)
    }
}

/// Nodal discretization of a whole mesh.
///
/// Fields are flat arrays of length [`Discretization::ndofs`], element-major
/// within each group: dof `k` of element `el` in group `g` sits at
/// `groups[g].dof_nr_base() + el * groups[g].nunit_dofs() + k`.
#[derive(Clone, Debug)]
pub struct Discretization {
    mesh: Arc<Mesh>,
    groups: Vec<DiscretizationGroup>,
}

impl Discretization {
    pub fn new(mesh: Arc<Mesh>, factory: &dyn ElementGroupFactory) -> Result<Self, MeshError> {
        let mut dof_nr_base = 0;
        let mut groups = Vec::with_capacity(mesh.groups().len());
        for mgrp in mesh.groups() {
            let grp = DiscretizationGroup {
                order: factory.order(mgrp),
                unit_nodes: factory.unit_nodes(mgrp)?,
                nelements: mgrp.nelements(),
                element_nr_base: mgrp.element_nr_base(),
                dof_nr_base,
            };
            if grp.dim() != mgrp.dim() {
                return Err(MeshError::ShapeMismatch(format!(
                    "factory produced {}-dimensional unit nodes for a {}-dimensional group",
                    grp.dim(),
                    mgrp.dim()
                )));
            }
            dof_nr_base += grp.ndofs();
            groups.push(grp);
        }
        Ok(Self { mesh, groups })
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn groups(&self) -> &[DiscretizationGroup] {
        &self.groups
    }

    pub fn dim(&self) -> usize {
        self.mesh.dim()
    }

    pub fn ambient_dim(&self) -> usize {
        self.mesh.ambient_dim()
    }

    pub fn ndofs(&self) -> usize {
        self.groups.iter().map(DiscretizationGroup::ndofs).sum()
    }

    /// Physical coordinates of the discretization nodes.
    ///
    /// Returns one flat field (length `ndofs`) per ambient axis, obtained by
    /// resampling the mesh geometry to this discretization's unit nodes.
    pub fn nodes(&self) -> Result<Vec<Vec<f64>>, MeshError> {
        let mut nodes = vec![vec![0.0; self.ndofs()]; self.ambient_dim()];
        for (grp, mgrp) in self.groups.iter().zip(self.mesh.groups()) {
            let basis = SimplexBasis::new(mgrp.dim(), mgrp.order())?;
            let resample = resampling_matrix(
                &basis,
                grp.unit_nodes().as_ref(),
                mgrp.unit_nodes().as_ref(),
            )?;
            for (axis, coords) in mgrp.nodes().iter().enumerate() {
                let values = apply_resampling(resample.as_ref(), coords.as_ref())?;
                let out = &mut nodes[axis][grp.dof_nr_base()..grp.dof_nr_base() + grp.ndofs()];
                for el in 0..grp.nelements() {
                    for k in 0..grp.nunit_dofs() {
                        out[el * grp.nunit_dofs() + k] = values[(el, k)];
                    }
                }
            }
        }
        Ok(nodes)
    }
}
