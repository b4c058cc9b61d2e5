//! Dense fixed-shape tensors.
//!
//! A [`Tensor`] has a fixed `rank` (number of axes) and a single `extent`
//! shared by every axis, so it always holds exactly `extent^rank` elements.
//! Storage is one flat row-major buffer owned by the tensor: axis 0 is the
//! slowest-varying, and a coordinate tuple maps to
//! `offset = Σ coordinate[axis] · extent^(rank - 1 - axis)`.
//!
//! Neither rank nor extent of an existing tensor ever changes.

mod arith;
mod display;

use anyhow::Result;
use num_traits::{FromPrimitive, Num};
use rand::Rng;

use crate::expr::{IndexedMut, TensorExpr};
use crate::index::Tag;

/// Dense tensor with `extent^rank` elements in one row-major buffer.
///
/// # Type Parameters
///
/// * `T` - The element type (typically `f32` or `f64`)
///
/// # Examples
///
/// ```
/// use ricci_core::Tensor;
///
/// let tensor = Tensor::<f64>::zeros(3, 2);
/// assert_eq!(tensor.extent(), 3);
/// assert_eq!(tensor.rank(), 2);
/// assert_eq!(tensor.len(), 9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    extent: usize,
    rank: usize,
    data: Vec<T>,
}

impl<T> Tensor<T>
where
    T: Copy + Num,
{
    /// Create a zero-filled tensor.
    ///
    /// # Panics
    ///
    /// Panics if `extent < 2`; an axis needs at least two positions to
    /// carry an index.
    ///
    /// # Examples
    ///
    /// ```
    /// use ricci_core::Tensor;
    ///
    /// let tensor = Tensor::<f64>::zeros(2, 3);
    /// assert_eq!(tensor.len(), 8);
    /// assert!(tensor.iter().all(|&x| x == 0.0));
    /// ```
    pub fn zeros(extent: usize, rank: usize) -> Self {
        assert!(
            extent >= 2,
            "tensor axes need an extent of at least 2, got {}",
            extent
        );
        let len = extent.pow(rank as u32);
        Self {
            extent,
            rank,
            data: vec![T::zero(); len],
        }
    }

    /// Create a tensor from a flat vector in row-major order.
    ///
    /// # Errors
    ///
    /// Fails when `extent < 2` or when `values` does not hold exactly
    /// `extent^rank` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use ricci_core::Tensor;
    ///
    /// let tensor = Tensor::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(tensor[&[1, 0]], 3.0);
    ///
    /// assert!(Tensor::from_vec(2, 2, vec![1.0]).is_err());
    /// ```
    pub fn from_vec(extent: usize, rank: usize, values: Vec<T>) -> Result<Self> {
        if extent < 2 {
            anyhow::bail!("tensor axes need an extent of at least 2, got {}", extent);
        }
        let len = extent.pow(rank as u32);
        if values.len() != len {
            anyhow::bail!(
                "a rank {} tensor of extent {} needs {} elements, got {}",
                rank,
                extent,
                len,
                values.len()
            );
        }
        Ok(Self {
            extent,
            rank,
            data: values,
        })
    }

    /// Create a tensor filled with a single value.
    ///
    /// # Panics
    ///
    /// Panics if `extent < 2`.
    pub fn from_elem(extent: usize, rank: usize, value: T) -> Self {
        let mut tensor = Self::zeros(extent, rank);
        tensor.data.fill(value);
        tensor
    }

    /// Create a tensor whose elements are produced by a function of the
    /// coordinate tuple.
    ///
    /// # Panics
    ///
    /// Panics if `extent < 2`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ricci_core::Tensor;
    ///
    /// // identity matrix
    /// let eye = Tensor::from_fn(3, 2, |c| if c[0] == c[1] { 1.0 } else { 0.0 });
    /// assert_eq!(eye[&[1, 1]], 1.0);
    /// assert_eq!(eye[&[1, 2]], 0.0);
    /// ```
    pub fn from_fn<F>(extent: usize, rank: usize, mut f: F) -> Self
    where
        F: FnMut(&[usize]) -> T,
    {
        let mut tensor = Self::zeros(extent, rank);
        let mut coordinate = vec![0usize; rank];
        for offset in 0..tensor.data.len() {
            let mut remaining = offset;
            for axis in (0..rank).rev() {
                coordinate[axis] = remaining % extent;
                remaining /= extent;
            }
            tensor.data[offset] = f(&coordinate);
        }
        tensor
    }

    /// Create a tensor with values drawn uniformly from `[low, high)`.
    ///
    /// # Panics
    ///
    /// Panics if `extent < 2` or `low >= high`.
    pub fn random_uniform(extent: usize, rank: usize, low: f64, high: f64) -> Self
    where
        T: FromPrimitive,
    {
        let mut rng = rand::thread_rng();
        let mut tensor = Self::zeros(extent, rank);
        for slot in tensor.data.iter_mut() {
            let sample: f64 = rng.gen_range(low..high);
            *slot = T::from_f64(sample).expect("uniform sample must fit the element type");
        }
        tensor
    }

    /// Extent shared by every axis.
    pub fn extent(&self) -> usize {
        self.extent
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Total number of elements (`extent^rank`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no elements. Always false: rank 0 still
    /// stores one scalar.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major flat offset of a full coordinate tuple.
    ///
    /// Axis 0 is the slowest-varying. Coordinates are expected to lie in
    /// `[0, extent)`; the tag algebra guarantees this for every offset the
    /// expression engine computes.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate count differs from the rank.
    pub fn offset_of(&self, coordinate: &[usize]) -> usize {
        assert_eq!(
            coordinate.len(),
            self.rank,
            "rank {} tensor addressed with {} coordinates",
            self.rank,
            coordinate.len()
        );
        coordinate
            .iter()
            .fold(0, |offset, &position| offset * self.extent + position)
    }

    /// Get an element by coordinate tuple without panicking.
    pub fn get(&self, coordinate: &[usize]) -> Option<&T> {
        if coordinate.len() != self.rank {
            return None;
        }
        if coordinate.iter().any(|&position| position >= self.extent) {
            return None;
        }
        self.data.get(self.offset_of(coordinate))
    }

    /// Get a mutable reference to an element without panicking.
    pub fn get_mut(&mut self, coordinate: &[usize]) -> Option<&mut T> {
        if coordinate.len() != self.rank {
            return None;
        }
        if coordinate.iter().any(|&position| position >= self.extent) {
            return None;
        }
        let offset = self.offset_of(coordinate);
        self.data.get_mut(offset)
    }

    /// The flat element buffer in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The flat element buffer, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Copy of the flat element sequence.
    ///
    /// Together with [`Tensor::from_vec`] this round-trips exactly.
    ///
    /// # Examples
    ///
    /// ```
    /// use ricci_core::Tensor;
    ///
    /// let values = vec![1.0, 2.0, 3.0, 4.0];
    /// let tensor = Tensor::from_vec(2, 2, values.clone()).unwrap();
    /// assert_eq!(tensor.to_vec(), values);
    /// ```
    pub fn to_vec(&self) -> Vec<T> {
        self.data.clone()
    }

    /// Forward iterator over all elements in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Mutable forward iterator over all elements in row-major order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Whether another tensor has the same extent and rank.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.extent == other.extent && self.rank == other.rank
    }

    /// Index this tensor with one tag per axis, producing a lazy
    /// expression.
    ///
    /// Repeating a tag within the list takes a trace over the repeated
    /// axes; tags shared with another operand of a product are contracted.
    ///
    /// # Panics
    ///
    /// Panics unless exactly `rank` tags are supplied.
    ///
    /// # Examples
    ///
    /// ```
    /// use ricci_core::{Tag, Tensor};
    ///
    /// const I: Tag = Tag::new('i');
    ///
    /// let m = Tensor::from_vec(3, 2, (1..=9).map(f64::from).collect()).unwrap();
    /// // trace of [[1,2,3],[4,5,6],[7,8,9]]
    /// assert_eq!(m.idx(&[I, I]).eval(), 15.0);
    /// ```
    pub fn idx(&self, tags: &[Tag]) -> TensorExpr<'_, T> {
        TensorExpr::leaf(self, tags)
    }

    /// Index this tensor mutably, producing an assignment target for
    /// `=`, `+=` and `-=` against a source expression.
    ///
    /// # Panics
    ///
    /// Panics unless exactly `rank` distinct tags are supplied: a traced
    /// destination has no well-defined storage to write into.
    pub fn idx_mut(&mut self, tags: &[Tag]) -> IndexedMut<'_, T> {
        IndexedMut::new(self, tags)
    }
}
