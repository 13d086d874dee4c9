//! Connections between discretizations.
//!
//! - [`make_face_restriction`]: derive a face mesh (tagged boundary or all
//!   interior faces) and the connection from the volume onto it
//! - [`DiscretizationConnection`]: batched element-to-element interpolation
//! - [`ArrayContext`]: where connection index arrays are stored

mod array_context;
mod batch;
mod error;
mod face;

#[cfg(feature = "burn")]
pub use array_context::BurnArrayContext;
pub use array_context::{ArrayContext, HostArrayContext};
pub use batch::{ConnectionElementGroup, DiscretizationConnection, InterpolationBatch};
pub use error::ConnectionError;
pub use face::{FaceRestriction, face_vertices, make_face_restriction};
