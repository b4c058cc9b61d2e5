//! Lazy tensor expressions with Einstein-summation semantics.
//!
//! Indexing a [`Tensor`] with tags yields a [`TensorExpr`] leaf. Leaves
//! compose with `*`, `/`, `+`, `-` and scalar factors into a small tree of
//! node kinds (leaf, product, sum, scalar scale). The tree's shape, that
//! is, which tags stay free and which are contracted, is fixed at
//! construction time by the [`crate::index`] algebra; elements are only
//! touched when the tree
//! is materialised through [`IndexedMut::assign`] (and `add_assign` /
//! `sub_assign`), or collapsed to a scalar with [`TensorExpr::eval`].
//!
//! Evaluation is a recursive descent carrying an explicit cursor of
//! tag-to-axis-position bindings:
//!
//! - the assignment walk binds every destination tag, outermost first, so
//!   destination offsets advance contiguously through the buffer;
//! - each product node loops its contracted tags over `[0, extent)`,
//!   binding the shared cursor before descending into both children;
//! - each leaf with a repeated tag loops that tag the same way and sums
//!   the selected elements (a trace).
//!
//! Cost is `O(extent^(free tags) · extent^(contracted tags))` scalar
//! operations per assignment, the arithmetic cost of the mathematical
//! operation itself.
//!
//! Expressions borrow the tensors they index and are meant to live for a
//! single assignment statement.

use std::ops::{Add, Div, Mul, Sub};

use num_traits::{Num, NumAssign};
use smallvec::SmallVec;

use crate::index::{self, Tag, TagList};
use crate::tensor::Tensor;

/// Tag to current axis position bindings, threaded through the evaluation
/// walk. Bindings are overwritten in place as loops advance, so the map
/// holds one slot per distinct tag in the statement.
#[derive(Debug, Default)]
struct Cursor {
    bound: SmallVec<[(Tag, usize); 8]>,
}

impl Cursor {
    fn new() -> Self {
        Self::default()
    }

    fn bind(&mut self, tag: Tag, position: usize) {
        if let Some(slot) = self.bound.iter_mut().find(|(bound, _)| *bound == tag) {
            slot.1 = position;
        } else {
            self.bound.push((tag, position));
        }
    }

    fn position(&self, tag: Tag) -> usize {
        self.bound
            .iter()
            .find(|(bound, _)| *bound == tag)
            .map(|&(_, position)| position)
            .expect("index tag must be bound before a leaf is evaluated")
    }
}

/// A tensor paired with one tag per axis.
///
/// Repeated tags within the list are *traced*: evaluation sums the
/// elements along the repeated axes before the leaf's value is handed to
/// its parent, so the leaf's free tags are exactly the tags occurring
/// once.
#[derive(Debug, Clone)]
pub struct Leaf<'a, T> {
    data: &'a [T],
    extent: usize,
    tags: TagList,
    free: TagList,
    traced: TagList,
}

impl<'a, T: Copy + Num> Leaf<'a, T> {
    fn offset(&self, cursor: &Cursor) -> usize {
        self.tags
            .iter()
            .fold(0, |offset, &tag| offset * self.extent + cursor.position(tag))
    }

    fn value(&self, cursor: &mut Cursor) -> T {
        if self.traced.is_empty() {
            self.data[self.offset(cursor)]
        } else {
            let mut total = T::zero();
            self.trace(0, cursor, &mut total);
            total
        }
    }

    // Nested summation over the traced tags, first occurrence outermost.
    fn trace(&self, depth: usize, cursor: &mut Cursor, total: &mut T) {
        if depth == self.traced.len() {
            *total = *total + self.data[self.offset(cursor)];
            return;
        }
        let tag = self.traced[depth];
        for position in 0..self.extent {
            cursor.bind(tag, position);
            self.trace(depth + 1, cursor, total);
        }
    }
}

/// Product (or quotient) of two sub-expressions, contracting every tag
/// left free by one child and matched by the other.
#[derive(Debug, Clone)]
pub struct Product<'a, T> {
    left: TensorExpr<'a, T>,
    right: TensorExpr<'a, T>,
    free: TagList,
    contracted: TagList,
    divide: bool,
    extent: Option<usize>,
}

impl<'a, T: Copy + Num> Product<'a, T> {
    fn value(&self, cursor: &mut Cursor) -> T {
        if self.contracted.is_empty() {
            return self.combine(cursor);
        }
        let extent = self
            .extent
            .expect("a contracting product always has a concrete extent");
        let mut total = T::zero();
        self.contract(0, extent, cursor, &mut total);
        total
    }

    fn combine(&self, cursor: &mut Cursor) -> T {
        let left = self.left.value(cursor);
        let right = self.right.value(cursor);
        if self.divide {
            left / right
        } else {
            left * right
        }
    }

    // Nested summation over the contracted tags, first occurrence
    // outermost; the shared cursor binding reaches both children.
    fn contract(&self, depth: usize, extent: usize, cursor: &mut Cursor, total: &mut T) {
        if depth == self.contracted.len() {
            *total = *total + self.combine(cursor);
            return;
        }
        let tag = self.contracted[depth];
        for position in 0..extent {
            cursor.bind(tag, position);
            self.contract(depth + 1, extent, cursor, total);
        }
    }
}

/// Sum or difference of two sub-expressions with set-equal free tags.
#[derive(Debug, Clone)]
pub struct Sum<'a, T> {
    left: TensorExpr<'a, T>,
    right: TensorExpr<'a, T>,
    subtract: bool,
}

/// A sub-expression scaled (or divided) by a plain scalar.
#[derive(Debug, Clone)]
pub struct Scale<'a, T> {
    inner: TensorExpr<'a, T>,
    factor: T,
    divide: bool,
}

/// Lazy expression over tag-indexed tensors.
///
/// Built by [`Tensor::idx`] and the arithmetic operators; consumed by the
/// assignment operators on [`IndexedMut`] or by [`TensorExpr::eval`].
///
/// # Examples
///
/// ```
/// use ricci_core::{Tag, Tensor};
///
/// const I: Tag = Tag::new('i');
/// const J: Tag = Tag::new('j');
/// const K: Tag = Tag::new('k');
///
/// let a = Tensor::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let b = Tensor::from_vec(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
/// let mut c = Tensor::<f64>::zeros(2, 2);
///
/// // matrix product: c_ij = sum_k a_ik b_kj
/// c.idx_mut(&[I, J]).assign(a.idx(&[I, K]) * b.idx(&[K, J]));
/// assert_eq!(c.to_vec(), vec![19.0, 22.0, 43.0, 50.0]);
/// ```
#[derive(Debug, Clone)]
pub enum TensorExpr<'a, T> {
    /// A single indexed tensor.
    Leaf(Leaf<'a, T>),
    /// Product or quotient of two sub-expressions.
    Product(Box<Product<'a, T>>),
    /// Sum or difference of two sub-expressions.
    Sum(Box<Sum<'a, T>>),
    /// A sub-expression with a scalar factor.
    Scale(Box<Scale<'a, T>>),
}

impl<'a, T: Copy + Num> TensorExpr<'a, T> {
    pub(crate) fn leaf(tensor: &'a Tensor<T>, tags: &[Tag]) -> Self {
        assert_eq!(
            tags.len(),
            tensor.rank(),
            "rank {} tensor indexed with {} tags",
            tensor.rank(),
            tags.len()
        );
        let tags: TagList = tags.iter().copied().collect();
        let traced = index::repeated(&tags);
        let free = index::without(&traced, &tags);
        TensorExpr::Leaf(Leaf {
            data: tensor.as_slice(),
            extent: tensor.extent(),
            tags,
            free,
            traced,
        })
    }

    /// The tags this expression exposes to its consumer, in order.
    pub fn free_tags(&self) -> &[Tag] {
        match self {
            TensorExpr::Leaf(leaf) => &leaf.free,
            TensorExpr::Product(product) => &product.free,
            TensorExpr::Sum(sum) => sum.left.free_tags(),
            TensorExpr::Scale(scale) => scale.inner.free_tags(),
        }
    }

    /// The axis extent of the indexed tensors, or `None` for a tree built
    /// purely from rank-0 tensors.
    pub fn extent(&self) -> Option<usize> {
        match self {
            TensorExpr::Leaf(leaf) => {
                if leaf.tags.is_empty() {
                    None
                } else {
                    Some(leaf.extent)
                }
            }
            TensorExpr::Product(product) => product.extent,
            TensorExpr::Sum(sum) => sum.left.extent().or_else(|| sum.right.extent()),
            TensorExpr::Scale(scale) => scale.inner.extent(),
        }
    }

    /// Collapse a fully contracted expression (no free tags) to its value.
    ///
    /// # Panics
    ///
    /// Panics when free tags remain.
    ///
    /// # Examples
    ///
    /// ```
    /// use ricci_core::{Tag, Tensor};
    ///
    /// const I: Tag = Tag::new('i');
    ///
    /// let a = Tensor::from_vec(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
    /// let b = Tensor::from_vec(3, 1, vec![4.0, 5.0, 6.0]).unwrap();
    /// // inner product: sum_i a_i b_i
    /// assert_eq!((a.idx(&[I]) * b.idx(&[I])).eval(), 32.0);
    /// ```
    pub fn eval(&self) -> T {
        assert!(
            self.free_tags().is_empty(),
            "expression with free indices {:?} has no single value",
            self.free_tags()
        );
        self.value(&mut Cursor::new())
    }

    /// Multiply every evaluated element by a plain scalar.
    pub fn scaled(self, factor: T) -> Self {
        TensorExpr::Scale(Box::new(Scale {
            inner: self,
            factor,
            divide: false,
        }))
    }

    /// Divide every evaluated element by a plain scalar.
    pub fn unscaled(self, factor: T) -> Self {
        TensorExpr::Scale(Box::new(Scale {
            inner: self,
            factor,
            divide: true,
        }))
    }

    fn product(left: Self, right: Self, divide: bool) -> Self {
        let extent = merged_extent(left.extent(), right.extent());
        let mut combined: TagList = left.free_tags().iter().copied().collect();
        combined.extend_from_slice(right.free_tags());
        let contracted = index::repeated(&combined);
        let free = index::without(&contracted, &combined);
        TensorExpr::Product(Box::new(Product {
            left,
            right,
            free,
            contracted,
            divide,
            extent,
        }))
    }

    fn sum(left: Self, right: Self, subtract: bool) -> Self {
        merged_extent(left.extent(), right.extent());
        assert!(
            index::set_equal(left.free_tags(), right.free_tags()),
            "cannot {} expressions with free index sets {:?} and {:?}",
            if subtract { "subtract" } else { "add" },
            left.free_tags(),
            right.free_tags()
        );
        TensorExpr::Sum(Box::new(Sum {
            left,
            right,
            subtract,
        }))
    }

    fn value(&self, cursor: &mut Cursor) -> T {
        match self {
            TensorExpr::Leaf(leaf) => leaf.value(cursor),
            TensorExpr::Product(product) => product.value(cursor),
            TensorExpr::Sum(sum) => {
                let left = sum.left.value(cursor);
                let right = sum.right.value(cursor);
                if sum.subtract {
                    left - right
                } else {
                    left + right
                }
            }
            TensorExpr::Scale(scale) => {
                let inner = scale.inner.value(cursor);
                if scale.divide {
                    inner / scale.factor
                } else {
                    scale.factor * inner
                }
            }
        }
    }
}

fn merged_extent(left: Option<usize>, right: Option<usize>) -> Option<usize> {
    match (left, right) {
        (Some(a), Some(b)) => {
            assert_eq!(a, b, "tensor extents {} and {} mixed in one expression", a, b);
            Some(a)
        }
        (Some(extent), None) | (None, Some(extent)) => Some(extent),
        (None, None) => None,
    }
}

impl<'a, T: Copy + Num> Mul for TensorExpr<'a, T> {
    type Output = TensorExpr<'a, T>;

    /// Contract every tag shared between the operands' free sets, leaving
    /// the rest free.
    fn mul(self, rhs: Self) -> Self::Output {
        TensorExpr::product(self, rhs, false)
    }
}

impl<'a, T: Copy + Num> Div for TensorExpr<'a, T> {
    type Output = TensorExpr<'a, T>;

    /// Same index behaviour as `*`, but dividing the element values.
    fn div(self, rhs: Self) -> Self::Output {
        TensorExpr::product(self, rhs, true)
    }
}

impl<'a, T: Copy + Num> Add for TensorExpr<'a, T> {
    type Output = TensorExpr<'a, T>;

    /// # Panics
    ///
    /// Panics unless both operands carry the same free tag set.
    fn add(self, rhs: Self) -> Self::Output {
        TensorExpr::sum(self, rhs, false)
    }
}

impl<'a, T: Copy + Num> Sub for TensorExpr<'a, T> {
    type Output = TensorExpr<'a, T>;

    /// # Panics
    ///
    /// Panics unless both operands carry the same free tag set.
    fn sub(self, rhs: Self) -> Self::Output {
        TensorExpr::sum(self, rhs, true)
    }
}

macro_rules! impl_scalar_ops {
    ($($scalar:ty),*) => {$(
        impl<'a> Mul<$scalar> for TensorExpr<'a, $scalar> {
            type Output = TensorExpr<'a, $scalar>;

            fn mul(self, factor: $scalar) -> Self::Output {
                self.scaled(factor)
            }
        }

        impl<'a> Div<$scalar> for TensorExpr<'a, $scalar> {
            type Output = TensorExpr<'a, $scalar>;

            fn div(self, factor: $scalar) -> Self::Output {
                self.unscaled(factor)
            }
        }

        impl<'a> Mul<TensorExpr<'a, $scalar>> for $scalar {
            type Output = TensorExpr<'a, $scalar>;

            fn mul(self, expr: TensorExpr<'a, $scalar>) -> Self::Output {
                expr.scaled(self)
            }
        }
    )*};
}

impl_scalar_ops!(f32, f64);

#[derive(Debug, Clone, Copy)]
enum AssignOp {
    Set,
    Add,
    Sub,
}

/// A mutably indexed tensor: the destination of `=`, `+=` and `-=`
/// against a source expression.
///
/// The destination tag order matches the tensor's own axis order, so the
/// materialising walk advances through the buffer contiguously.
#[derive(Debug)]
pub struct IndexedMut<'a, T> {
    tensor: &'a mut Tensor<T>,
    tags: TagList,
}

impl<'a, T: Copy + Num> IndexedMut<'a, T> {
    pub(crate) fn new(tensor: &'a mut Tensor<T>, tags: &[Tag]) -> Self {
        assert_eq!(
            tags.len(),
            tensor.rank(),
            "rank {} tensor indexed with {} tags",
            tensor.rank(),
            tags.len()
        );
        let tags: TagList = tags.iter().copied().collect();
        assert!(
            index::repeated(&tags).is_empty(),
            "cannot assign into a traced index list {:?}",
            tags
        );
        IndexedMut { tensor, tags }
    }

    /// The destination tags, in axis order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

impl<'a, T: Copy + Num + NumAssign> IndexedMut<'a, T> {
    /// Overwrite the destination with the source expression (`=`).
    ///
    /// # Panics
    ///
    /// Panics unless the source's free tag set equals the destination tag
    /// set and the extents agree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ricci_core::{Tag, Tensor};
    ///
    /// const I: Tag = Tag::new('i');
    /// const J: Tag = Tag::new('j');
    ///
    /// let m = Tensor::from_vec(3, 2, (1..=9).map(f64::from).collect()).unwrap();
    /// let v = Tensor::from_vec(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
    /// let mut out = Tensor::<f64>::zeros(3, 1);
    ///
    /// out.idx_mut(&[I]).assign(m.idx(&[I, J]) * v.idx(&[J]));
    /// assert_eq!(out.to_vec(), vec![14.0, 32.0, 50.0]);
    /// ```
    pub fn assign(self, source: TensorExpr<'_, T>) {
        self.apply(&source, AssignOp::Set);
    }

    /// Accumulate the source expression into the destination (`+=`).
    ///
    /// # Panics
    ///
    /// Same contract as [`IndexedMut::assign`].
    pub fn add_assign(self, source: TensorExpr<'_, T>) {
        self.apply(&source, AssignOp::Add);
    }

    /// Subtract the source expression from the destination (`-=`).
    ///
    /// # Panics
    ///
    /// Same contract as [`IndexedMut::assign`].
    pub fn sub_assign(self, source: TensorExpr<'_, T>) {
        self.apply(&source, AssignOp::Sub);
    }

    fn apply(mut self, source: &TensorExpr<'_, T>, op: AssignOp) {
        assert!(
            index::set_equal(&self.tags, source.free_tags()),
            "destination indices {:?} do not match source free indices {:?}",
            self.tags,
            source.free_tags()
        );
        if self.tensor.rank() > 0 {
            if let Some(extent) = source.extent() {
                assert_eq!(
                    extent,
                    self.tensor.extent(),
                    "source extent {} does not match destination extent {}",
                    extent,
                    self.tensor.extent()
                );
            }
        }
        let mut cursor = Cursor::new();
        self.walk(0, 0, source, &mut cursor, op);
    }

    // Nested iteration of the destination tags, outermost (axis 0) first;
    // the innermost stride is 1 so offsets advance contiguously.
    fn walk(
        &mut self,
        axis: usize,
        offset: usize,
        source: &TensorExpr<'_, T>,
        cursor: &mut Cursor,
        op: AssignOp,
    ) {
        if axis == self.tags.len() {
            let value = source.value(cursor);
            let slot = &mut self.tensor.as_mut_slice()[offset];
            match op {
                AssignOp::Set => *slot = value,
                AssignOp::Add => *slot += value,
                AssignOp::Sub => *slot -= value,
            }
            return;
        }
        let extent = self.tensor.extent();
        let stride = extent.pow((self.tags.len() - 1 - axis) as u32);
        let tag = self.tags[axis];
        for position in 0..extent {
            cursor.bind(tag, position);
            self.walk(axis + 1, offset + position * stride, source, cursor, op);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const I: Tag = Tag::new('i');
    const J: Tag = Tag::new('j');
    const K: Tag = Tag::new('k');

    fn counting(extent: usize, rank: usize) -> Tensor<f64> {
        let len = extent.pow(rank as u32);
        Tensor::from_vec(extent, rank, (1..=len).map(|x| x as f64).collect()).unwrap()
    }

    #[test]
    fn test_matvec_contraction() {
        let m = counting(3, 2);
        let v = Tensor::from_vec(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
        let mut out = Tensor::<f64>::zeros(3, 1);
        out.idx_mut(&[I]).assign(m.idx(&[I, J]) * v.idx(&[J]));
        assert_eq!(out.to_vec(), vec![14.0, 32.0, 50.0]);
    }

    #[test]
    fn test_matmul_contraction() {
        let a = Tensor::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Tensor::from_vec(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        let mut c = Tensor::<f64>::zeros(2, 2);
        c.idx_mut(&[I, J]).assign(a.idx(&[I, K]) * b.idx(&[K, J]));
        assert_eq!(c.to_vec(), vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_trace_sums_diagonal() {
        let m = counting(3, 2);
        assert_eq!(m.idx(&[I, I]).eval(), 15.0);
    }

    #[test]
    fn test_trace_of_rank_three_leaf() {
        let t = Tensor::from_fn(2, 3, |c| (100 * c[0] + 10 * c[1] + c[2]) as f64);
        // sum_i t[i, i, j]
        let mut out = Tensor::<f64>::zeros(2, 1);
        out.idx_mut(&[J]).assign(t.idx(&[I, I, J]));
        assert_eq!(out.to_vec(), vec![110.0, 112.0]);
    }

    #[test]
    fn test_double_contraction_is_inner_product() {
        let a = Tensor::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Tensor::from_vec(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        assert_eq!((a.idx(&[I, J]) * b.idx(&[I, J])).eval(), 70.0);
    }

    #[test]
    fn test_traced_operand_broadcasts_through_product() {
        // m(i,i) * w(i): the trace binds inside the leaf, so i stays free.
        let m = Tensor::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let w = Tensor::from_vec(2, 1, vec![10.0, 20.0]).unwrap();
        let mut out = Tensor::<f64>::zeros(2, 1);
        out.idx_mut(&[I]).assign(m.idx(&[I, I]) * w.idx(&[I]));
        assert_eq!(out.to_vec(), vec![50.0, 100.0]);
    }

    #[test]
    fn test_sum_permuted_operands_bind_by_tag() {
        let a = Tensor::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Tensor::from_vec(2, 2, vec![10.0, 20.0, 30.0, 40.0]).unwrap();
        let mut out = Tensor::<f64>::zeros(2, 2);
        // out_ij = a_ij + b_ji
        out.idx_mut(&[I, J]).assign(a.idx(&[I, J]) + b.idx(&[J, I]));
        assert_eq!(out.to_vec(), vec![11.0, 32.0, 23.0, 44.0]);
    }

    #[test]
    fn test_additive_identity() {
        let a = counting(3, 2);
        let zero = Tensor::<f64>::zeros(3, 2);
        let mut out = Tensor::<f64>::zeros(3, 2);
        out.idx_mut(&[I, J]).assign(a.idx(&[I, J]) + zero.idx(&[I, J]));
        assert_eq!(out.to_vec(), a.to_vec());
    }

    #[test]
    fn test_scalar_scale_both_sides_and_divide() {
        let v = Tensor::from_vec(2, 1, vec![1.0, 2.0]).unwrap();
        let mut out = Tensor::<f64>::zeros(2, 1);
        out.idx_mut(&[I]).assign(2.0 * v.idx(&[I]) + v.idx(&[I]) * 4.0);
        assert_eq!(out.to_vec(), vec![6.0, 12.0]);
        out.idx_mut(&[I]).assign(v.idx(&[I]) / 2.0);
        assert_eq!(out.to_vec(), vec![0.5, 1.0]);
    }

    #[test]
    fn test_elementwise_division_contracts_like_product() {
        let a = Tensor::from_vec(2, 1, vec![2.0, 6.0]).unwrap();
        let b = Tensor::from_vec(2, 1, vec![2.0, 3.0]).unwrap();
        // shared tag, so the quotients are summed out
        assert_eq!((a.idx(&[I]) / b.idx(&[I])).eval(), 3.0);
    }

    #[test]
    fn test_assign_into_rank_zero() {
        let a = Tensor::from_vec(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
        let b = Tensor::from_vec(3, 1, vec![4.0, 5.0, 6.0]).unwrap();
        let mut s = Tensor::<f64>::zeros(2, 0);
        s.idx_mut(&[]).assign(a.idx(&[I]) * b.idx(&[I]));
        assert_eq!(s[&[]], 32.0);
    }

    #[test]
    fn test_accumulating_assignments() {
        let v = Tensor::from_vec(2, 1, vec![1.0, 2.0]).unwrap();
        let mut out = Tensor::from_vec(2, 1, vec![10.0, 10.0]).unwrap();
        out.idx_mut(&[I]).add_assign(v.idx(&[I]));
        assert_eq!(out.to_vec(), vec![11.0, 12.0]);
        out.idx_mut(&[I]).sub_assign(v.idx(&[I]) * 2.0);
        assert_eq!(out.to_vec(), vec![9.0, 8.0]);
    }

    #[test]
    fn test_chained_contraction_three_factors() {
        // u_i = a_ij b_jk c_k
        let a = Tensor::from_vec(2, 2, vec![1.0, 0.0, 0.0, 2.0]).unwrap();
        let b = Tensor::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let c = Tensor::from_vec(2, 1, vec![1.0, 1.0]).unwrap();
        let mut u = Tensor::<f64>::zeros(2, 1);
        u.idx_mut(&[I])
            .assign(a.idx(&[I, J]) * b.idx(&[J, K]) * c.idx(&[K]));
        assert_eq!(u.to_vec(), vec![3.0, 14.0]);
    }

    #[test]
    #[should_panic(expected = "free index sets")]
    fn test_sum_rejects_mismatched_free_sets() {
        let a = Tensor::<f64>::zeros(2, 2);
        let b = Tensor::<f64>::zeros(2, 1);
        let _ = a.idx(&[I, J]) + b.idx(&[I]);
    }

    #[test]
    #[should_panic(expected = "indexed with")]
    fn test_leaf_rejects_wrong_tag_count() {
        let a = Tensor::<f64>::zeros(2, 2);
        let _ = a.idx(&[I]);
    }

    #[test]
    #[should_panic(expected = "traced index list")]
    fn test_assignment_into_trace_rejected() {
        let mut a = Tensor::<f64>::zeros(2, 2);
        let _ = a.idx_mut(&[I, I]);
    }

    #[test]
    #[should_panic(expected = "has no single value")]
    fn test_eval_rejects_free_indices() {
        let a = Tensor::<f64>::zeros(2, 1);
        let _ = a.idx(&[I]).eval();
    }

    #[test]
    #[should_panic(expected = "mixed in one expression")]
    fn test_mixed_extents_rejected() {
        let a = Tensor::<f64>::zeros(2, 1);
        let b = Tensor::<f64>::zeros(3, 1);
        let _ = a.idx(&[I]) * b.idx(&[J]);
    }
}
