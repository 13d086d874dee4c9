//! Element groups: homogeneous batches of curved elements.
//!
//! A group is created unbound ([`UnboundElementGroup`]) and handed to a
//! [`MeshBuilder`](super::MeshBuilder). Building the mesh consumes it and
//! yields a [`MeshElementGroup`] stamped with its element and node number
//! bases, so a group can belong to exactly one mesh.
//!
//! Nodes are stored per ambient axis: `nodes[axis]` is an
//! (nelements, nunit_nodes) matrix of physical coordinates.

use faer::Mat;

use super::{ElementKind, MeshError};
use crate::basis::warp_and_blend_nodes;

/// Integer width used to store vertex or element indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IndexWidth {
    #[default]
    I32,
    I64,
}

impl IndexWidth {
    /// Largest index representable in this width.
    pub fn max_index(self) -> usize {
        match self {
            IndexWidth::I32 => i32::MAX as usize,
            IndexWidth::I64 => usize::try_from(i64::MAX).unwrap_or(usize::MAX),
        }
    }

    /// Check if `index` is representable in this width.
    pub fn fits(self, index: usize) -> bool {
        index <= self.max_index()
    }
}

/// Row-major (nelements, nvertices_per_element) table of global vertex indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexIndices {
    data: Vec<usize>,
    nvertices_per_element: usize,
}

impl VertexIndices {
    /// Wrap a flat row-major index array.
    pub fn from_flat(data: Vec<usize>, nvertices_per_element: usize) -> Result<Self, MeshError> {
        let ragged = if nvertices_per_element == 0 {
            !data.is_empty()
        } else {
            data.len() % nvertices_per_element != 0
        };
        if ragged {
            return Err(MeshError::ShapeMismatch(format!(
                "{} vertex indices cannot form rows of {}",
                data.len(),
                nvertices_per_element
            )));
        }
        Ok(Self {
            data,
            nvertices_per_element,
        })
    }

    /// Build from one row per element. Needs at least one row; use
    /// [`VertexIndices::from_flat`] for empty groups.
    pub fn from_rows<R: AsRef<[usize]>>(rows: &[R]) -> Result<Self, MeshError> {
        let Some(first) = rows.first() else {
            return Err(MeshError::ShapeMismatch(
                "cannot infer vertices per element from zero rows".into(),
            ));
        };
        let nvertices_per_element = first.as_ref().len();
        let mut data = Vec::with_capacity(rows.len() * nvertices_per_element);
        for (el, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != nvertices_per_element {
                return Err(MeshError::ShapeMismatch(format!(
                    "element {el} has {} vertices, expected {nvertices_per_element}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            nvertices_per_element,
        })
    }

    pub fn nelements(&self) -> usize {
        if self.nvertices_per_element == 0 {
            0
        } else {
            self.data.len() / self.nvertices_per_element
        }
    }

    pub fn nvertices_per_element(&self) -> usize {
        self.nvertices_per_element
    }

    /// Vertices of element `el` (group-relative numbering).
    pub fn row(&self, el: usize) -> &[usize] {
        let start = el * self.nvertices_per_element;
        &self.data[start..start + self.nvertices_per_element]
    }

    /// All indices, row-major.
    pub fn as_slice(&self) -> &[usize] {
        &self.data
    }
}

/// Element group that has not yet joined a mesh.
#[derive(Clone, Debug)]
pub struct UnboundElementGroup {
    kind: ElementKind,
    order: usize,
    vertex_indices: VertexIndices,
    nodes: Vec<Mat<f64>>,
    unit_nodes: Mat<f64>,
    index_width: IndexWidth,
}

impl UnboundElementGroup {
    /// Create a simplex group.
    ///
    /// If `unit_nodes` is `None`, `dim` is required and the warp-and-blend
    /// nodes of (`dim`, `order`) are used.
    pub fn simplex(
        order: usize,
        vertex_indices: VertexIndices,
        nodes: Vec<Mat<f64>>,
        unit_nodes: Option<Mat<f64>>,
        dim: Option<usize>,
    ) -> Result<Self, MeshError> {
        let unit_nodes = match (unit_nodes, dim) {
            (Some(unit_nodes), Some(dim)) if unit_nodes.nrows() != dim => {
                return Err(MeshError::ShapeMismatch(format!(
                    "unit nodes have dimension {}, but dim = {dim}",
                    unit_nodes.nrows()
                )));
            }
            (Some(unit_nodes), _) => unit_nodes,
            (None, Some(dim)) => warp_and_blend_nodes(dim, order)?,
            (None, None) => return Err(MeshError::MissingDimension),
        };
        Self::new(ElementKind::Simplex, order, vertex_indices, nodes, unit_nodes)
    }

    /// Create a hypercube group. Unit nodes are always required.
    pub fn hypercube(
        order: usize,
        vertex_indices: VertexIndices,
        nodes: Vec<Mat<f64>>,
        unit_nodes: Mat<f64>,
    ) -> Result<Self, MeshError> {
        Self::new(ElementKind::Hypercube, order, vertex_indices, nodes, unit_nodes)
    }

    fn new(
        kind: ElementKind,
        order: usize,
        vertex_indices: VertexIndices,
        nodes: Vec<Mat<f64>>,
        unit_nodes: Mat<f64>,
    ) -> Result<Self, MeshError> {
        let dim = unit_nodes.nrows();
        let expected = kind.nvertices(dim);
        if vertex_indices.nvertices_per_element() != expected {
            return Err(MeshError::InvalidVertexCount {
                expected,
                actual: vertex_indices.nvertices_per_element(),
            });
        }

        let nelements = vertex_indices.nelements();
        for (axis, coords) in nodes.iter().enumerate() {
            if coords.nrows() != nelements || coords.ncols() != unit_nodes.ncols() {
                return Err(MeshError::ShapeMismatch(format!(
                    "nodes along axis {axis} are {}x{}, expected {}x{}",
                    coords.nrows(),
                    coords.ncols(),
                    nelements,
                    unit_nodes.ncols()
                )));
            }
        }

        Ok(Self {
            kind,
            order,
            vertex_indices,
            nodes,
            unit_nodes,
            index_width: IndexWidth::default(),
        })
    }

    /// Declare the integer width of this group's vertex indices.
    pub fn with_index_width(mut self, width: IndexWidth) -> Self {
        self.index_width = width;
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn dim(&self) -> usize {
        self.unit_nodes.nrows()
    }

    pub fn nelements(&self) -> usize {
        self.vertex_indices.nelements()
    }

    pub fn nnodes(&self) -> usize {
        self.nelements() * self.unit_nodes.ncols()
    }

    pub fn ambient_dim(&self) -> usize {
        self.nodes.len()
    }

    pub fn vertex_indices(&self) -> &VertexIndices {
        &self.vertex_indices
    }

    pub fn index_width(&self) -> IndexWidth {
        self.index_width
    }

    /// Stamp the group with its position in a mesh.
    pub(crate) fn join_mesh(self, element_nr_base: usize, node_nr_base: usize) -> MeshElementGroup {
        MeshElementGroup {
            kind: self.kind,
            order: self.order,
            vertex_indices: self.vertex_indices,
            nodes: self.nodes,
            unit_nodes: self.unit_nodes,
            index_width: self.index_width,
            element_nr_base,
            node_nr_base,
        }
    }
}

/// Element group owned by a [`Mesh`](super::Mesh).
#[derive(Clone, Debug)]
pub struct MeshElementGroup {
    kind: ElementKind,
    order: usize,
    vertex_indices: VertexIndices,
    nodes: Vec<Mat<f64>>,
    unit_nodes: Mat<f64>,
    index_width: IndexWidth,
    element_nr_base: usize,
    node_nr_base: usize,
}

impl MeshElementGroup {
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Maximum polynomial degree of the geometry interpolant.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn vertex_indices(&self) -> &VertexIndices {
        &self.vertex_indices
    }

    /// Physical node coordinates, one (nelements, nunit_nodes) matrix per axis.
    pub fn nodes(&self) -> &[Mat<f64>] {
        &self.nodes
    }

    /// Reference node coordinates, one node per column.
    pub fn unit_nodes(&self) -> &Mat<f64> {
        &self.unit_nodes
    }

    pub fn index_width(&self) -> IndexWidth {
        self.index_width
    }

    /// Global number of this group's first element.
    pub fn element_nr_base(&self) -> usize {
        self.element_nr_base
    }

    /// Global number of this group's first node.
    pub fn node_nr_base(&self) -> usize {
        self.node_nr_base
    }

    pub fn dim(&self) -> usize {
        self.unit_nodes.nrows()
    }

    pub fn nelements(&self) -> usize {
        self.vertex_indices.nelements()
    }

    pub fn nunit_nodes(&self) -> usize {
        self.unit_nodes.ncols()
    }

    pub fn nnodes(&self) -> usize {
        self.nelements() * self.nunit_nodes()
    }

    pub fn face_vertex_indices(&self) -> Result<&'static [&'static [usize]], MeshError> {
        self.kind.face_vertex_indices(self.dim())
    }

    pub fn vertex_unit_coordinates(&self) -> Result<Mat<f64>, MeshError> {
        self.kind.vertex_unit_coordinates(self.dim())
    }
}
