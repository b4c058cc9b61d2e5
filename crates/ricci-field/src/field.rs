//! The tensor-field grid container.
//!
//! A [`TensorField`] holds one [`Tensor`] per point of a uniform grid of
//! `divisions^dimensions` points, all in one buffer. The point tensors
//! inherit the grid's axis count as their extent, so a rank-1 field over a
//! 3-D grid stores a 3-vector at every point.
//!
//! The buffer is reference-counted: [`TensorField::share`] creates another
//! handle to the same storage, `Clone` deep-copies, and the buffer is
//! released when the last handle drops. All access is single-threaded;
//! the interior `RefCell` aborts on aliased mutation instead of allowing
//! it.

use std::cell::{Ref, RefCell, RefMut};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};
use std::rc::Rc;

use num_traits::{Float, Num, NumAssign};
use ricci_core::{InnerSpace, Tag, Tensor};

use crate::error::FieldError;
use crate::expr::{FieldExpr, FieldIndexedMut};

/// Grid of `divisions^dimensions` tensors in one shared buffer.
///
/// # Examples
///
/// ```
/// use ricci_field::TensorField;
///
/// // rank-1 field (one 2-vector per point) on a 5x5 grid
/// let field = TensorField::<f64>::new(2, 5, 1).unwrap();
/// assert_eq!(field.num_points(), 25);
/// assert_eq!(field.point(7).rank(), 1);
/// assert_eq!(field.point(7).extent(), 2);
/// ```
#[derive(Debug)]
pub struct TensorField<T> {
    dimensions: usize,
    divisions: usize,
    rank: usize,
    points: Rc<RefCell<Vec<Tensor<T>>>>,
}

impl<T: Clone> Clone for TensorField<T> {
    /// Deep copy: the new field owns a fresh buffer. Use
    /// [`TensorField::share`] for another handle to the same buffer.
    fn clone(&self) -> Self {
        Self {
            dimensions: self.dimensions,
            divisions: self.divisions,
            rank: self.rank,
            points: Rc::new(RefCell::new(self.points.borrow().clone())),
        }
    }
}

impl<T: Copy + Num> TensorField<T> {
    /// Create a zero-filled field.
    ///
    /// # Errors
    ///
    /// Fails when `dimensions < 2` or `divisions <= 4`.
    pub fn new(dimensions: usize, divisions: usize, rank: usize) -> Result<Self, FieldError> {
        Self::validated(dimensions, divisions)?;
        let count = divisions.pow(dimensions as u32);
        let points = (0..count).map(|_| Tensor::zeros(dimensions, rank)).collect();
        Ok(Self {
            dimensions,
            divisions,
            rank,
            points: Rc::new(RefCell::new(points)),
        })
    }

    /// Create a zero-filled scalar (rank 0) field.
    pub fn scalar(dimensions: usize, divisions: usize) -> Result<Self, FieldError> {
        Self::new(dimensions, divisions, 0)
    }

    /// Create a field from an ordered point buffer (row-major over the
    /// grid, axis 0 slowest).
    ///
    /// # Errors
    ///
    /// Fails on bad geometry, a wrong point count, or any point tensor
    /// whose shape differs from the field's.
    pub fn from_points(
        dimensions: usize,
        divisions: usize,
        rank: usize,
        points: Vec<Tensor<T>>,
    ) -> Result<Self, FieldError> {
        Self::validated(dimensions, divisions)?;
        let expected = divisions.pow(dimensions as u32);
        if points.len() != expected {
            return Err(FieldError::WrongPointCount {
                dimensions,
                divisions,
                expected,
                actual: points.len(),
            });
        }
        for (index, point) in points.iter().enumerate() {
            if point.extent() != dimensions || point.rank() != rank {
                return Err(FieldError::PointShapeMismatch {
                    index,
                    extent: point.extent(),
                    rank: point.rank(),
                    expected_extent: dimensions,
                    expected_rank: rank,
                });
            }
        }
        Ok(Self {
            dimensions,
            divisions,
            rank,
            points: Rc::new(RefCell::new(points)),
        })
    }

    /// Create a field by sampling a function of the grid coordinate.
    ///
    /// The coordinate has one entry per grid axis in `[0, divisions)`;
    /// multiply by the grid spacing to recover a position.
    ///
    /// # Errors
    ///
    /// Fails on bad geometry or when `f` produces a tensor of the wrong
    /// shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use ricci_core::Tensor;
    /// use ricci_field::TensorField;
    ///
    /// // phi(x, y) = x + y sampled with unit spacing
    /// let phi = TensorField::from_fn(2, 5, 0, |coord| {
    ///     Tensor::from_elem(2, 0, (coord[0] + coord[1]) as f64)
    /// }).unwrap();
    /// assert_eq!(phi.point(0)[&[]], 0.0);
    /// assert_eq!(phi.point(24)[&[]], 8.0);
    /// ```
    pub fn from_fn<F>(
        dimensions: usize,
        divisions: usize,
        rank: usize,
        mut f: F,
    ) -> Result<Self, FieldError>
    where
        F: FnMut(&[usize]) -> Tensor<T>,
    {
        Self::validated(dimensions, divisions)?;
        let count = divisions.pow(dimensions as u32);
        let mut coordinate = vec![0usize; dimensions];
        let mut points = Vec::with_capacity(count);
        for flat in 0..count {
            let mut remaining = flat;
            for axis in (0..dimensions).rev() {
                coordinate[axis] = remaining % divisions;
                remaining /= divisions;
            }
            points.push(f(&coordinate));
        }
        Self::from_points(dimensions, divisions, rank, points)
    }

    fn validated(dimensions: usize, divisions: usize) -> Result<(), FieldError> {
        if dimensions < 2 {
            return Err(FieldError::TooFewDimensions { dimensions });
        }
        if divisions <= 4 {
            return Err(FieldError::GridTooCoarse { divisions });
        }
        Ok(())
    }

    /// Another lightweight handle to the same point buffer.
    ///
    /// Writes through either handle are visible through both; the buffer
    /// is freed when the last handle drops.
    pub fn share(&self) -> Self {
        Self {
            dimensions: self.dimensions,
            divisions: self.divisions,
            rank: self.rank,
            points: Rc::clone(&self.points),
        }
    }

    /// Number of grid axes (also the extent of every point tensor).
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Grid points per axis.
    pub fn divisions(&self) -> usize {
        self.divisions
    }

    /// Rank of the point tensors.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Total number of grid points (`divisions^dimensions`).
    pub fn num_points(&self) -> usize {
        self.divisions.pow(self.dimensions as u32)
    }

    /// Flat-index stride of one step along a grid axis
    /// (`divisions^(dimensions - 1 - axis)`; axis 0 is the slowest).
    ///
    /// # Panics
    ///
    /// Panics when `axis >= dimensions`.
    pub fn step(&self, axis: usize) -> usize {
        assert!(
            axis < self.dimensions,
            "axis {} out of bounds for a {}-dimensional grid",
            axis,
            self.dimensions
        );
        self.divisions.pow((self.dimensions - 1 - axis) as u32)
    }

    /// The tensor at a flat grid index.
    ///
    /// # Panics
    ///
    /// Panics when the index is out of bounds or the buffer is mutably
    /// borrowed elsewhere.
    pub fn point(&self, index: usize) -> Ref<'_, Tensor<T>> {
        Ref::map(self.points.borrow(), |points| &points[index])
    }

    /// The tensor at a flat grid index, mutably.
    ///
    /// # Panics
    ///
    /// Panics when the index is out of bounds or the buffer is borrowed
    /// elsewhere.
    pub fn point_mut(&mut self, index: usize) -> RefMut<'_, Tensor<T>> {
        RefMut::map(self.points.borrow_mut(), |points| &mut points[index])
    }

    /// Copy of the full point buffer, row-major over the grid.
    pub fn to_points(&self) -> Vec<Tensor<T>> {
        self.points.borrow().clone()
    }

    pub(crate) fn borrow_points(&self) -> Ref<'_, Vec<Tensor<T>>> {
        self.points.borrow()
    }

    pub(crate) fn borrow_points_mut(&self) -> RefMut<'_, Vec<Tensor<T>>> {
        self.points.borrow_mut()
    }

    /// Index every grid point with the same tags, producing a lazy
    /// per-point expression.
    ///
    /// # Panics
    ///
    /// Panics unless exactly `rank` tags are supplied.
    pub fn idx(&self, tags: &[Tag]) -> FieldExpr<'_, T> {
        FieldExpr::leaf(self, tags)
    }

    /// Index every grid point mutably, producing the destination of a
    /// field-level `=`, `+=` or `-=`.
    ///
    /// # Panics
    ///
    /// Panics unless exactly `rank` distinct tags are supplied, or when
    /// the buffer is already borrowed (e.g. the source expression reads
    /// this same field through another handle).
    pub fn idx_mut(&mut self, tags: &[Tag]) -> FieldIndexedMut<'_, T> {
        FieldIndexedMut::new(self, tags)
    }

    fn assert_same_grid(&self, other: &Self) {
        assert!(
            self.dimensions == other.dimensions && self.divisions == other.divisions,
            "grids of {}^{} and {}^{} points cannot be combined",
            other.divisions,
            other.dimensions,
            self.divisions,
            self.dimensions
        );
    }
}

impl<T: Copy + NumAssign> AddAssign<&TensorField<T>> for TensorField<T> {
    /// # Panics
    ///
    /// Panics when the geometries differ, or when `other` shares this
    /// field's buffer.
    fn add_assign(&mut self, other: &TensorField<T>) {
        self.assert_same_grid(other);
        let mut mine = self.points.borrow_mut();
        let theirs = other.points.borrow();
        for (dst, src) in mine.iter_mut().zip(theirs.iter()) {
            *dst += src;
        }
    }
}

impl<T: Copy + NumAssign> SubAssign<&TensorField<T>> for TensorField<T> {
    /// # Panics
    ///
    /// Panics when the geometries differ, or when `other` shares this
    /// field's buffer.
    fn sub_assign(&mut self, other: &TensorField<T>) {
        self.assert_same_grid(other);
        let mut mine = self.points.borrow_mut();
        let theirs = other.points.borrow();
        for (dst, src) in mine.iter_mut().zip(theirs.iter()) {
            *dst -= src;
        }
    }
}

impl<T: Copy + NumAssign> MulAssign<T> for TensorField<T> {
    fn mul_assign(&mut self, factor: T) {
        for point in self.points.borrow_mut().iter_mut() {
            *point *= factor;
        }
    }
}

impl<T: Copy + NumAssign> DivAssign<T> for TensorField<T> {
    fn div_assign(&mut self, factor: T) {
        for point in self.points.borrow_mut().iter_mut() {
            *point /= factor;
        }
    }
}

impl<T: Copy + NumAssign> MulAssign<&TensorField<T>> for TensorField<T> {
    /// Scale every point by the matching point of a rank-0 field.
    ///
    /// # Panics
    ///
    /// Panics when the grids differ or `scalar_field` is not rank 0.
    fn mul_assign(&mut self, scalar_field: &TensorField<T>) {
        self.assert_same_grid(scalar_field);
        assert_eq!(
            scalar_field.rank, 0,
            "per-point scaling needs a rank 0 field, got rank {}",
            scalar_field.rank
        );
        let mut mine = self.points.borrow_mut();
        let theirs = scalar_field.points.borrow();
        for (dst, src) in mine.iter_mut().zip(theirs.iter()) {
            *dst *= src.as_slice()[0];
        }
    }
}

impl<T: Copy + NumAssign> DivAssign<&TensorField<T>> for TensorField<T> {
    /// Divide every point by the matching point of a rank-0 field.
    ///
    /// # Panics
    ///
    /// Panics when the grids differ or `scalar_field` is not rank 0.
    fn div_assign(&mut self, scalar_field: &TensorField<T>) {
        self.assert_same_grid(scalar_field);
        assert_eq!(
            scalar_field.rank, 0,
            "per-point scaling needs a rank 0 field, got rank {}",
            scalar_field.rank
        );
        let mut mine = self.points.borrow_mut();
        let theirs = scalar_field.points.borrow();
        for (dst, src) in mine.iter_mut().zip(theirs.iter()) {
            *dst /= src.as_slice()[0];
        }
    }
}

impl<'b, T: Copy + NumAssign> Add<&'b TensorField<T>> for &TensorField<T> {
    type Output = TensorField<T>;

    fn add(self, other: &'b TensorField<T>) -> TensorField<T> {
        let mut out = self.clone();
        out += other;
        out
    }
}

impl<'b, T: Copy + NumAssign> Sub<&'b TensorField<T>> for &TensorField<T> {
    type Output = TensorField<T>;

    fn sub(self, other: &'b TensorField<T>) -> TensorField<T> {
        let mut out = self.clone();
        out -= other;
        out
    }
}

impl<T: Copy + NumAssign> Mul<T> for &TensorField<T> {
    type Output = TensorField<T>;

    fn mul(self, factor: T) -> TensorField<T> {
        let mut out = self.clone();
        out *= factor;
        out
    }
}

impl<T: Copy + NumAssign> Div<T> for &TensorField<T> {
    type Output = TensorField<T>;

    fn div(self, factor: T) -> TensorField<T> {
        let mut out = self.clone();
        out /= factor;
        out
    }
}

impl<T: Float + NumAssign> InnerSpace for TensorField<T> {
    type Scalar = T;

    fn scale(&mut self, factor: T) {
        *self *= factor;
    }

    fn unscale(&mut self, factor: T) {
        *self /= factor;
    }

    /// # Panics
    ///
    /// Panics when the geometries differ.
    fn dot(&self, other: &Self) -> T {
        self.assert_same_grid(other);
        let mine = self.points.borrow();
        let theirs = other.points.borrow();
        mine.iter()
            .zip(theirs.iter())
            .fold(T::zero(), |total, (a, b)| total + a.dot(b))
    }
}
