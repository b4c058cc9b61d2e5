//! Per-point indexed expressions over whole fields.
//!
//! Indexing a [`TensorField`] with tags yields a [`FieldExpr`]: the same
//! Einstein-summation semantics as [`ricci_core::TensorExpr`], applied
//! independently at each of the `divisions^dimensions` grid points.
//! Expressions over two fields require identical grids; a field expression
//! can also be multiplied by a plain tensor expression, broadcasting that
//! constant factor (with full contraction semantics) across every point.
//!
//! Assignment walks the grid once, lowering the tree to a core tensor
//! expression per point.

use std::cell::{Ref, RefMut};
use std::ops::{Add, Div, Mul, Sub};

use num_traits::{Num, NumAssign};
use ricci_core::index::{self, Tag, TagList};
use ricci_core::{Tensor, TensorExpr};

use crate::field::TensorField;

/// A field paired with one tag per point-tensor axis.
///
/// The leaf holds a shared borrow of the field's point buffer for the
/// lifetime of the expression.
pub struct FieldLeaf<'a, T> {
    points: Ref<'a, Vec<Tensor<T>>>,
    tags: TagList,
    free: TagList,
    dimensions: usize,
    divisions: usize,
}

/// Product (or quotient) of two field expressions on the same grid.
pub struct FieldProduct<'a, T> {
    left: FieldExpr<'a, T>,
    right: FieldExpr<'a, T>,
    free: TagList,
    divide: bool,
}

/// Sum or difference of two field expressions with set-equal free tags.
pub struct FieldSum<'a, T> {
    left: FieldExpr<'a, T>,
    right: FieldExpr<'a, T>,
    subtract: bool,
}

/// A field expression with a plain scalar factor.
pub struct FieldScale<'a, T> {
    inner: FieldExpr<'a, T>,
    factor: T,
    divide: bool,
}

/// A field expression multiplied (or divided) by one constant tensor
/// expression, broadcast across every grid point.
pub struct FieldBroadcast<'a, T> {
    field: FieldExpr<'a, T>,
    factor: TensorExpr<'a, T>,
    free: TagList,
    divide: bool,
}

/// Lazy per-point expression over tag-indexed tensor fields.
///
/// Built by [`TensorField::idx`] and the arithmetic operators; consumed
/// by the assignment operators on [`FieldIndexedMut`].
///
/// # Examples
///
/// ```
/// use ricci_core::{Tag, Tensor};
/// use ricci_field::TensorField;
///
/// const I: Tag = Tag::new('i');
/// const J: Tag = Tag::new('j');
///
/// let m = TensorField::from_fn(2, 5, 2, |_| {
///     Tensor::from_vec(2, 2, vec![0.0, 1.0, 1.0, 0.0]).unwrap()
/// }).unwrap();
/// let v = TensorField::from_fn(2, 5, 1, |_| {
///     Tensor::from_vec(2, 1, vec![3.0, 4.0]).unwrap()
/// }).unwrap();
/// let mut out = TensorField::new(2, 5, 1).unwrap();
///
/// // at every grid point: out_i = m_ij v_j
/// out.idx_mut(&[I]).assign(m.idx(&[I, J]) * v.idx(&[J]));
/// assert_eq!(out.point(20).to_vec(), vec![4.0, 3.0]);
/// ```
pub enum FieldExpr<'a, T> {
    /// A single indexed field.
    Leaf(FieldLeaf<'a, T>),
    /// Product or quotient of two field expressions.
    Product(Box<FieldProduct<'a, T>>),
    /// Sum or difference of two field expressions.
    Sum(Box<FieldSum<'a, T>>),
    /// A field expression with a scalar factor.
    Scale(Box<FieldScale<'a, T>>),
    /// A field expression times a constant tensor expression.
    Broadcast(Box<FieldBroadcast<'a, T>>),
}

impl<'a, T: Copy + Num> FieldExpr<'a, T> {
    pub(crate) fn leaf(field: &'a TensorField<T>, tags: &[Tag]) -> Self {
        assert_eq!(
            tags.len(),
            field.rank(),
            "rank {} field indexed with {} tags",
            field.rank(),
            tags.len()
        );
        let tags: TagList = tags.iter().copied().collect();
        let traced = index::repeated(&tags);
        let free = index::without(&traced, &tags);
        FieldExpr::Leaf(FieldLeaf {
            points: field.borrow_points(),
            tags,
            free,
            dimensions: field.dimensions(),
            divisions: field.divisions(),
        })
    }

    /// The tags this expression exposes per grid point, in order.
    pub fn free_tags(&self) -> &[Tag] {
        match self {
            FieldExpr::Leaf(leaf) => &leaf.free,
            FieldExpr::Product(product) => &product.free,
            FieldExpr::Sum(sum) => sum.left.free_tags(),
            FieldExpr::Scale(scale) => scale.inner.free_tags(),
            FieldExpr::Broadcast(broadcast) => &broadcast.free,
        }
    }

    /// The underlying grid's `(dimensions, divisions)`.
    pub fn geometry(&self) -> (usize, usize) {
        match self {
            FieldExpr::Leaf(leaf) => (leaf.dimensions, leaf.divisions),
            FieldExpr::Product(product) => product.left.geometry(),
            FieldExpr::Sum(sum) => sum.left.geometry(),
            FieldExpr::Scale(scale) => scale.inner.geometry(),
            FieldExpr::Broadcast(broadcast) => broadcast.field.geometry(),
        }
    }

    /// Lower this expression to a core tensor expression for one grid
    /// point.
    pub(crate) fn at(&self, point: usize) -> TensorExpr<'_, T> {
        match self {
            FieldExpr::Leaf(leaf) => leaf.points[point].idx(&leaf.tags),
            FieldExpr::Product(product) => {
                let left = product.left.at(point);
                let right = product.right.at(point);
                if product.divide {
                    left / right
                } else {
                    left * right
                }
            }
            FieldExpr::Sum(sum) => {
                let left = sum.left.at(point);
                let right = sum.right.at(point);
                if sum.subtract {
                    left - right
                } else {
                    left + right
                }
            }
            FieldExpr::Scale(scale) => {
                let inner = scale.inner.at(point);
                if scale.divide {
                    inner.unscaled(scale.factor)
                } else {
                    inner.scaled(scale.factor)
                }
            }
            FieldExpr::Broadcast(broadcast) => {
                let field = broadcast.field.at(point);
                let factor = broadcast.factor.clone();
                if broadcast.divide {
                    field / factor
                } else {
                    field * factor
                }
            }
        }
    }

    /// Multiply every evaluated element by a plain scalar.
    pub fn scaled(self, factor: T) -> Self {
        FieldExpr::Scale(Box::new(FieldScale {
            inner: self,
            factor,
            divide: false,
        }))
    }

    /// Divide every evaluated element by a plain scalar.
    pub fn unscaled(self, factor: T) -> Self {
        FieldExpr::Scale(Box::new(FieldScale {
            inner: self,
            factor,
            divide: true,
        }))
    }

    fn product(left: Self, right: Self, divide: bool) -> Self {
        assert_eq!(
            left.geometry(),
            right.geometry(),
            "field expressions must share one grid"
        );
        let mut combined: TagList = left.free_tags().iter().copied().collect();
        combined.extend_from_slice(right.free_tags());
        let contracted = index::repeated(&combined);
        let free = index::without(&contracted, &combined);
        FieldExpr::Product(Box::new(FieldProduct {
            left,
            right,
            free,
            divide,
        }))
    }

    fn sum(left: Self, right: Self, subtract: bool) -> Self {
        assert_eq!(
            left.geometry(),
            right.geometry(),
            "field expressions must share one grid"
        );
        assert!(
            index::set_equal(left.free_tags(), right.free_tags()),
            "cannot {} field expressions with free index sets {:?} and {:?}",
            if subtract { "subtract" } else { "add" },
            left.free_tags(),
            right.free_tags()
        );
        FieldExpr::Sum(Box::new(FieldSum {
            left,
            right,
            subtract,
        }))
    }

    fn broadcast(field: Self, factor: TensorExpr<'a, T>, divide: bool) -> Self {
        let mut combined: TagList = field.free_tags().iter().copied().collect();
        combined.extend_from_slice(factor.free_tags());
        let contracted = index::repeated(&combined);
        let free = index::without(&contracted, &combined);
        FieldExpr::Broadcast(Box::new(FieldBroadcast {
            field,
            factor,
            free,
            divide,
        }))
    }
}

impl<'a, T: Copy + Num> Mul for FieldExpr<'a, T> {
    type Output = FieldExpr<'a, T>;

    /// Per-point product, contracting tags shared between the operands.
    fn mul(self, rhs: Self) -> Self::Output {
        FieldExpr::product(self, rhs, false)
    }
}

impl<'a, T: Copy + Num> Div for FieldExpr<'a, T> {
    type Output = FieldExpr<'a, T>;

    fn div(self, rhs: Self) -> Self::Output {
        FieldExpr::product(self, rhs, true)
    }
}

impl<'a, T: Copy + Num> Add for FieldExpr<'a, T> {
    type Output = FieldExpr<'a, T>;

    /// # Panics
    ///
    /// Panics unless both operands share one grid and one free tag set.
    fn add(self, rhs: Self) -> Self::Output {
        FieldExpr::sum(self, rhs, false)
    }
}

impl<'a, T: Copy + Num> Sub for FieldExpr<'a, T> {
    type Output = FieldExpr<'a, T>;

    /// # Panics
    ///
    /// Panics unless both operands share one grid and one free tag set.
    fn sub(self, rhs: Self) -> Self::Output {
        FieldExpr::sum(self, rhs, true)
    }
}

impl<'a, T: Copy + Num> Mul<TensorExpr<'a, T>> for FieldExpr<'a, T> {
    type Output = FieldExpr<'a, T>;

    /// Broadcast a constant tensor expression across every grid point.
    fn mul(self, factor: TensorExpr<'a, T>) -> Self::Output {
        FieldExpr::broadcast(self, factor, false)
    }
}

impl<'a, T: Copy + Num> Div<TensorExpr<'a, T>> for FieldExpr<'a, T> {
    type Output = FieldExpr<'a, T>;

    /// Broadcast-divide by a constant tensor expression.
    fn div(self, factor: TensorExpr<'a, T>) -> Self::Output {
        FieldExpr::broadcast(self, factor, true)
    }
}

macro_rules! impl_field_scalar_ops {
    ($($scalar:ty),*) => {$(
        impl<'a> Mul<$scalar> for FieldExpr<'a, $scalar> {
            type Output = FieldExpr<'a, $scalar>;

            fn mul(self, factor: $scalar) -> Self::Output {
                self.scaled(factor)
            }
        }

        impl<'a> Div<$scalar> for FieldExpr<'a, $scalar> {
            type Output = FieldExpr<'a, $scalar>;

            fn div(self, factor: $scalar) -> Self::Output {
                self.unscaled(factor)
            }
        }

        impl<'a> Mul<FieldExpr<'a, $scalar>> for $scalar {
            type Output = FieldExpr<'a, $scalar>;

            fn mul(self, expr: FieldExpr<'a, $scalar>) -> Self::Output {
                expr.scaled(self)
            }
        }

        impl<'a> Mul<FieldExpr<'a, $scalar>> for TensorExpr<'a, $scalar> {
            type Output = FieldExpr<'a, $scalar>;

            fn mul(self, field: FieldExpr<'a, $scalar>) -> Self::Output {
                FieldExpr::broadcast(field, self, false)
            }
        }
    )*};
}

impl_field_scalar_ops!(f32, f64);

#[derive(Debug, Clone, Copy)]
enum AssignOp {
    Set,
    Add,
    Sub,
}

/// A mutably indexed field: the destination of a field-level `=`, `+=`
/// or `-=`.
///
/// Holds the exclusive borrow of the destination buffer for the duration
/// of the statement.
pub struct FieldIndexedMut<'a, T> {
    points: RefMut<'a, Vec<Tensor<T>>>,
    tags: TagList,
    dimensions: usize,
    divisions: usize,
}

impl<'a, T: Copy + Num> FieldIndexedMut<'a, T> {
    pub(crate) fn new(field: &'a mut TensorField<T>, tags: &[Tag]) -> Self {
        assert_eq!(
            tags.len(),
            field.rank(),
            "rank {} field indexed with {} tags",
            field.rank(),
            tags.len()
        );
        let tags: TagList = tags.iter().copied().collect();
        assert!(
            index::repeated(&tags).is_empty(),
            "cannot assign into a traced index list {:?}",
            tags
        );
        let dimensions = field.dimensions();
        let divisions = field.divisions();
        FieldIndexedMut {
            points: field.borrow_points_mut(),
            tags,
            dimensions,
            divisions,
        }
    }
}

impl<'a, T: Copy + Num + NumAssign> FieldIndexedMut<'a, T> {
    /// Overwrite every grid point with the source expression (`=`).
    ///
    /// # Panics
    ///
    /// Panics unless the grids match and the source's free tag set equals
    /// the destination tag set.
    pub fn assign(self, source: FieldExpr<'_, T>) {
        self.apply(&source, AssignOp::Set);
    }

    /// Accumulate the source expression into every grid point (`+=`).
    ///
    /// # Panics
    ///
    /// Same contract as [`FieldIndexedMut::assign`].
    pub fn add_assign(self, source: FieldExpr<'_, T>) {
        self.apply(&source, AssignOp::Add);
    }

    /// Subtract the source expression from every grid point (`-=`).
    ///
    /// # Panics
    ///
    /// Same contract as [`FieldIndexedMut::assign`].
    pub fn sub_assign(self, source: FieldExpr<'_, T>) {
        self.apply(&source, AssignOp::Sub);
    }

    fn apply(mut self, source: &FieldExpr<'_, T>, op: AssignOp) {
        assert_eq!(
            (self.dimensions, self.divisions),
            source.geometry(),
            "destination and source fields must share one grid"
        );
        assert!(
            index::set_equal(&self.tags, source.free_tags()),
            "destination indices {:?} do not match source free indices {:?}",
            self.tags,
            source.free_tags()
        );
        for point in 0..self.points.len() {
            let expr = source.at(point);
            let target = &mut self.points[point];
            match op {
                AssignOp::Set => target.idx_mut(&self.tags).assign(expr),
                AssignOp::Add => target.idx_mut(&self.tags).add_assign(expr),
                AssignOp::Sub => target.idx_mut(&self.tags).sub_assign(expr),
            }
        }
    }
}
