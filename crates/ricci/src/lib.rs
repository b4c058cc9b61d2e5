//! # RICCI: Einstein-notation tensor algebra and tensor fields
//!
//! Dense fixed-rank tensors whose axes are labeled with symbolic index
//! tags, arithmetic expressions that contract repeated tags and broadcast
//! free ones automatically, and grid containers holding one tensor per
//! point with a fourth-order finite-difference gradient.
//!
//! This is the meta crate re-exporting the RICCI components for
//! convenient access.
//!
//! ## Quick start
//!
//! ```
//! use ricci::prelude::*;
//!
//! const I: Tag = Tag::new('i');
//! const J: Tag = Tag::new('j');
//!
//! // A stress tensor and a direction at a single point.
//! let sigma = Tensor::from_vec(2, 2, vec![3.0, 1.0, 1.0, 2.0])?;
//! let n = Tensor::from_vec(2, 1, vec![1.0, 0.0])?;
//!
//! // Traction: t_i = sigma_ij n_j.
//! let mut t = Tensor::<f64>::zeros(2, 1);
//! t.idx_mut(&[I]).assign(sigma.idx(&[I, J]) * n.idx(&[J]));
//! assert_eq!(t.to_vec(), vec![3.0, 1.0]);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Components
//!
//! ### Core tensor algebra ([`core`])
//!
//! Index tags, the tag-sequence algebra, dense tensors, the lazy
//! expression engine, and direct sums.
//!
//! ### Tensor fields ([`field`])
//!
//! Grid containers with per-point expressions and the fourth-order
//! [`gradient`](field::gradient()) operator under one-sided or periodic
//! boundaries.
//!
//! ```
//! use ricci::prelude::*;
//!
//! let phi = TensorField::from_fn(2, 8, 0, |c| {
//!     Tensor::from_elem(2, 0, c[0] as f64)
//! })?;
//! let grad = gradient(&phi, 1.0, BoundaryPolicy::OneSided);
//! assert_eq!(grad.rank(), 1);
//! # Ok::<(), ricci::field::FieldError>(())
//! ```

#![deny(warnings)]

pub use ricci_core as core;
pub use ricci_field as field;

pub mod prelude {
    //! Prelude module for convenient imports.
    //!
    //! # Example
    //!
    //! ```
    //! use ricci::prelude::*;
    //!
    //! let tensor = Tensor::<f64>::zeros(3, 2);
    //! assert_eq!(tensor.len(), 9);
    //! ```

    // Core types
    pub use crate::core::{DirectSum, InnerSpace, IndexedMut, Tag, TagList, Tensor, TensorExpr};

    // Fields and the differential operator
    pub use crate::field::{
        gradient, BoundaryPolicy, FieldError, FieldExpr, FieldIndexedMut, TensorField,
    };
}
