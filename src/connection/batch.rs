//! Interpolation batches and discretization connections.
//!
//! A connection maps nodal fields on a source discretization onto a target
//! discretization. For each target group it holds a list of batches; a batch
//! says "target elements `to_element_indices` take their values from source
//! elements `from_element_indices` of group `from_group_index`, evaluated at
//! `result_unit_nodes` in the source element's reference coordinates".

use std::sync::Arc;

use faer::Mat;

use super::{ArrayContext, ConnectionError};
use crate::basis::resampling_matrix;
use crate::discretization::{Discretization, DiscretizationGroup};

/// One homogeneous block of element-to-element interpolation.
#[derive(Clone, Debug)]
pub struct InterpolationBatch<I> {
    pub(crate) from_group_index: usize,
    pub(crate) from_element_indices: I,
    pub(crate) to_element_indices: I,
    pub(crate) result_unit_nodes: Mat<f64>,
    pub(crate) to_element_face: Option<usize>,
}

impl<I> InterpolationBatch<I> {
    pub fn new(
        from_group_index: usize,
        from_element_indices: I,
        to_element_indices: I,
        result_unit_nodes: Mat<f64>,
        to_element_face: Option<usize>,
    ) -> Self {
        Self {
            from_group_index,
            from_element_indices,
            to_element_indices,
            result_unit_nodes,
            to_element_face,
        }
    }

    /// Source group of this batch.
    pub fn from_group_index(&self) -> usize {
        self.from_group_index
    }

    /// Global numbers of the source elements.
    pub fn from_element_indices(&self) -> &I {
        &self.from_element_indices
    }

    /// Global numbers of the target elements.
    pub fn to_element_indices(&self) -> &I {
        &self.to_element_indices
    }

    /// Target nodes in the source element's unit coordinates, one per column.
    pub fn result_unit_nodes(&self) -> &Mat<f64> {
        &self.result_unit_nodes
    }

    /// Face of the source element the target elements lie on, if any.
    pub fn to_element_face(&self) -> Option<usize> {
        self.to_element_face
    }
}

/// Batches feeding one target group.
#[derive(Clone, Debug)]
pub struct ConnectionElementGroup<I> {
    batches: Vec<InterpolationBatch<I>>,
}

impl<I> ConnectionElementGroup<I> {
    pub fn new(batches: Vec<InterpolationBatch<I>>) -> Self {
        Self { batches }
    }

    pub fn batches(&self) -> &[InterpolationBatch<I>] {
        &self.batches
    }
}

/// Interpolation from one discretization onto another.
#[derive(Clone, Debug)]
pub struct DiscretizationConnection<I = Vec<usize>> {
    from_discr: Arc<Discretization>,
    to_discr: Arc<Discretization>,
    groups: Vec<ConnectionElementGroup<I>>,
}

impl<I> DiscretizationConnection<I> {
    pub fn new(
        from_discr: Arc<Discretization>,
        to_discr: Arc<Discretization>,
        groups: Vec<ConnectionElementGroup<I>>,
    ) -> Self {
        Self {
            from_discr,
            to_discr,
            groups,
        }
    }

    pub fn from_discr(&self) -> &Arc<Discretization> {
        &self.from_discr
    }

    pub fn to_discr(&self) -> &Arc<Discretization> {
        &self.to_discr
    }

    /// Connection groups, one per target discretization group.
    pub fn groups(&self) -> &[ConnectionElementGroup<I>] {
        &self.groups
    }

    /// Interpolate `values` (a field on `from_discr`) onto `to_discr`.
    ///
    /// Target nodes not covered by any batch are zero.
    pub fn apply<C>(&self, ctx: &C, values: &[f64]) -> Result<Vec<f64>, ConnectionError>
    where
        C: ArrayContext<IndexArray = I>,
    {
        if values.len() != self.from_discr.ndofs() {
            return Err(ConnectionError::FieldLength {
                expected: self.from_discr.ndofs(),
                actual: values.len(),
            });
        }

        let mut result = vec![0.0; self.to_discr.ndofs()];
        for (igrp, cgrp) in self.groups.iter().enumerate() {
            let to_grp = &self.to_discr.groups()[igrp];
            for batch in &cgrp.batches {
                let from_grp = &self.from_discr.groups()[batch.from_group_index];
                let basis = from_grp.basis()?;
                let resample = resampling_matrix(
                    &basis,
                    batch.result_unit_nodes.as_ref(),
                    from_grp.unit_nodes().as_ref(),
                )?;
                if resample.nrows() != to_grp.nunit_dofs() {
                    return Err(ConnectionError::FieldLength {
                        expected: to_grp.nunit_dofs(),
                        actual: resample.nrows(),
                    });
                }

                let from_els = ctx.to_host(&batch.from_element_indices)?;
                let to_els = ctx.to_host(&batch.to_element_indices)?;
                for (&from_el, &to_el) in from_els.iter().zip(&to_els) {
                    let src = dof_range(from_grp, from_el, batch.from_group_index)?;
                    let dst = dof_range(to_grp, to_el, igrp)?;
                    let src = &values[src];
                    for (i, out) in result[dst].iter_mut().enumerate() {
                        *out = src
                            .iter()
                            .enumerate()
                            .map(|(j, v)| resample[(i, j)] * v)
                            .sum();
                    }
                }
            }
        }
        Ok(result)
    }
}

/// Flat field range holding the dofs of global element `element`.
fn dof_range(
    grp: &DiscretizationGroup,
    element: usize,
    igroup: usize,
) -> Result<std::ops::Range<usize>, ConnectionError> {
    let el = element
        .checked_sub(grp.element_nr_base())
        .filter(|&el| el < grp.nelements())
        .ok_or(ConnectionError::ElementOutOfRange {
            element,
            group: igroup,
        })?;
    let start = grp.dof_nr_base() + el * grp.nunit_dofs();
    Ok(start..start + grp.nunit_dofs())
}
