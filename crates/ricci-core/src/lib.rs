//! # ricci-core
//!
//! Dense tensors whose axes are addressed by symbolic index tags, and an
//! Einstein-summation expression engine built on top of them.
//!
//! This crate provides the foundational pieces of the RICCI stack:
//!
//! - **Index tags** ([`Tag`]) and the pure tag-sequence algebra ([`index`])
//!   that decides which axes of a combined expression are contracted and
//!   which stay free
//! - **Dense tensors** ([`Tensor`]) with fixed rank and a single per-axis
//!   extent, stored as one flat row-major buffer
//! - **Lazy tensor expressions** ([`TensorExpr`]) composed with `*`, `/`,
//!   `+` and `-`, materialised by [`IndexedMut::assign`] and friends
//! - **Direct sums** ([`DirectSum`]) aggregating heterogeneous vector-like
//!   values for inner-product style accounting
//!
//! ## Einstein summation in five lines
//!
//! A tag appearing once across the operands of a product is a *free* axis of
//! the result; a tag appearing twice is *contracted* (summed out). Repeating
//! a tag on a single tensor takes a trace.
//!
//! ```
//! use ricci_core::{Tag, Tensor};
//!
//! const I: Tag = Tag::new('i');
//! const J: Tag = Tag::new('j');
//!
//! let m = Tensor::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
//! let v = Tensor::from_vec(2, 1, vec![10.0, 20.0]).unwrap();
//! let mut out = Tensor::<f64>::zeros(2, 1);
//!
//! // out_i = sum_j m_ij * v_j
//! out.idx_mut(&[I]).assign(m.idx(&[I, J]) * v.idx(&[J]));
//! assert_eq!(out.to_vec(), vec![50.0, 110.0]);
//!
//! // trace: sum_i m_ii
//! assert_eq!(m.idx(&[I, I]).eval(), 5.0);
//! ```
//!
//! ## Error handling
//!
//! Index bookkeeping mistakes (wrong tag count, mismatched free-tag sets,
//! assigning into a trace) are programming errors and panic at expression
//! construction time with a descriptive message; they never surface during
//! evaluation. Data-carrying constructors such as [`Tensor::from_vec`]
//! return `anyhow::Result` instead. Ordinary floating-point misbehaviour
//! (division by zero, NaN) is propagated, not trapped.

#![deny(warnings)]

pub mod direct_sum;
pub mod expr;
pub mod index;
pub mod tensor;


pub use direct_sum::{DirectSum, InnerSpace};
pub use expr::{IndexedMut, TensorExpr};
pub use index::{Tag, TagList};
pub use tensor::Tensor;
