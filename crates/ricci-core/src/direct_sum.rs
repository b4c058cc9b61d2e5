//! Direct sums of heterogeneous vector-like values.
//!
//! A [`DirectSum`] groups values from different inner-product spaces (a
//! scalar, a tensor, a whole field) into one block vector with
//! componentwise arithmetic and an inner product summed across the blocks.
//! Time integrators and residual accounting work with the block vector as
//! a single state value.
//!
//! The component contract is the [`InnerSpace`] trait; this crate
//! implements it for `f32`, `f64` and [`Tensor`], and `ricci-field` adds
//! its grid container.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

use num_traits::{Float, NumAssign};

use crate::tensor::Tensor;

/// A value that can live inside a [`DirectSum`]: in-place addition and
/// subtraction, scalar scaling, and an inner product against its own kind.
pub trait InnerSpace: Clone + for<'a> AddAssign<&'a Self> + for<'a> SubAssign<&'a Self> {
    /// Scalar field of the space.
    type Scalar: Float;

    /// Multiply in place by a scalar.
    fn scale(&mut self, factor: Self::Scalar);

    /// Divide in place by a scalar.
    fn unscale(&mut self, factor: Self::Scalar);

    /// Inner product with another value of the same shape.
    fn dot(&self, other: &Self) -> Self::Scalar;

    /// Squared Euclidean norm.
    fn norm_sq(&self) -> Self::Scalar {
        self.dot(self)
    }

    /// Euclidean norm.
    fn norm(&self) -> Self::Scalar {
        self.norm_sq().sqrt()
    }
}

macro_rules! impl_scalar_inner_space {
    ($($scalar:ty),*) => {$(
        impl InnerSpace for $scalar {
            type Scalar = $scalar;

            fn scale(&mut self, factor: $scalar) {
                *self *= factor;
            }

            fn unscale(&mut self, factor: $scalar) {
                *self /= factor;
            }

            fn dot(&self, other: &$scalar) -> $scalar {
                *self * *other
            }
        }
    )*};
}

impl_scalar_inner_space!(f32, f64);

impl<T: Float + NumAssign> InnerSpace for Tensor<T> {
    type Scalar = T;

    fn scale(&mut self, factor: T) {
        *self *= factor;
    }

    fn unscale(&mut self, factor: T) {
        *self /= factor;
    }

    /// # Panics
    ///
    /// Panics when the shapes differ.
    fn dot(&self, other: &Self) -> T {
        assert!(
            self.same_shape(other),
            "inner product needs matching shapes"
        );
        self.iter()
            .zip(other.iter())
            .fold(T::zero(), |total, (&a, &b)| total + a * b)
    }
}

/// Block vector over a tuple of [`InnerSpace`] components.
///
/// Arithmetic is componentwise; the inner product sums the component
/// inner products. Supported for tuples of one through six components
/// sharing one scalar type.
///
/// # Examples
///
/// ```
/// use ricci_core::{DirectSum, InnerSpace, Tensor};
///
/// let v = Tensor::from_vec(2, 1, vec![3.0, 4.0]).unwrap();
/// let mut state = DirectSum::new((1.0_f64, v));
///
/// state.scale(2.0);
/// assert_eq!(state.parts().0, 2.0);
/// assert_eq!(state.parts().1.to_vec(), vec![6.0, 8.0]);
///
/// // 2*2 + 6*6 + 8*8
/// assert_eq!(state.norm_sq(), 104.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DirectSum<P>(pub P);

impl<P> DirectSum<P> {
    /// Wrap a tuple of components.
    pub fn new(parts: P) -> Self {
        DirectSum(parts)
    }

    /// The component tuple.
    pub fn parts(&self) -> &P {
        &self.0
    }

    /// The component tuple, mutably.
    pub fn parts_mut(&mut self) -> &mut P {
        &mut self.0
    }

    /// Unwrap the component tuple.
    pub fn into_parts(self) -> P {
        self.0
    }
}

macro_rules! impl_direct_sum {
    ($(($head:ident . $hslot:tt $(, $tail:ident . $tslot:tt)*)),+ $(,)?) => {$(
        impl<S, $head $(, $tail)*> AddAssign<&DirectSum<($head, $($tail,)*)>>
            for DirectSum<($head, $($tail,)*)>
        where
            S: Float,
            $head: InnerSpace<Scalar = S>,
            $($tail: InnerSpace<Scalar = S>,)*
        {
            fn add_assign(&mut self, other: &DirectSum<($head, $($tail,)*)>) {
                self.0.$hslot += &other.0.$hslot;
                $(self.0.$tslot += &other.0.$tslot;)*
            }
        }

        impl<S, $head $(, $tail)*> SubAssign<&DirectSum<($head, $($tail,)*)>>
            for DirectSum<($head, $($tail,)*)>
        where
            S: Float,
            $head: InnerSpace<Scalar = S>,
            $($tail: InnerSpace<Scalar = S>,)*
        {
            fn sub_assign(&mut self, other: &DirectSum<($head, $($tail,)*)>) {
                self.0.$hslot -= &other.0.$hslot;
                $(self.0.$tslot -= &other.0.$tslot;)*
            }
        }

        impl<S, $head $(, $tail)*> InnerSpace for DirectSum<($head, $($tail,)*)>
        where
            S: Float,
            $head: InnerSpace<Scalar = S>,
            $($tail: InnerSpace<Scalar = S>,)*
        {
            type Scalar = S;

            fn scale(&mut self, factor: S) {
                self.0.$hslot.scale(factor);
                $(self.0.$tslot.scale(factor);)*
            }

            fn unscale(&mut self, factor: S) {
                self.0.$hslot.unscale(factor);
                $(self.0.$tslot.unscale(factor);)*
            }

            fn dot(&self, other: &Self) -> S {
                #[allow(unused_mut)]
                let mut total = self.0.$hslot.dot(&other.0.$hslot);
                $(total = total + self.0.$tslot.dot(&other.0.$tslot);)*
                total
            }
        }

        impl<S, $head $(, $tail)*> Add<&DirectSum<($head, $($tail,)*)>>
            for DirectSum<($head, $($tail,)*)>
        where
            S: Float,
            $head: InnerSpace<Scalar = S>,
            $($tail: InnerSpace<Scalar = S>,)*
        {
            type Output = DirectSum<($head, $($tail,)*)>;

            fn add(mut self, other: &DirectSum<($head, $($tail,)*)>) -> Self::Output {
                self += other;
                self
            }
        }

        impl<S, $head $(, $tail)*> Sub<&DirectSum<($head, $($tail,)*)>>
            for DirectSum<($head, $($tail,)*)>
        where
            S: Float,
            $head: InnerSpace<Scalar = S>,
            $($tail: InnerSpace<Scalar = S>,)*
        {
            type Output = DirectSum<($head, $($tail,)*)>;

            fn sub(mut self, other: &DirectSum<($head, $($tail,)*)>) -> Self::Output {
                self -= other;
                self
            }
        }

        impl<S, $head $(, $tail)*> Mul<S> for DirectSum<($head, $($tail,)*)>
        where
            S: Float,
            $head: InnerSpace<Scalar = S>,
            $($tail: InnerSpace<Scalar = S>,)*
        {
            type Output = DirectSum<($head, $($tail,)*)>;

            fn mul(mut self, factor: S) -> Self::Output {
                self.scale(factor);
                self
            }
        }

        impl<S, $head $(, $tail)*> Div<S> for DirectSum<($head, $($tail,)*)>
        where
            S: Float,
            $head: InnerSpace<Scalar = S>,
            $($tail: InnerSpace<Scalar = S>,)*
        {
            type Output = DirectSum<($head, $($tail,)*)>;

            fn div(mut self, factor: S) -> Self::Output {
                self.unscale(factor);
                self
            }
        }

        impl<$head $(, $tail)*> fmt::Display for DirectSum<($head, $($tail,)*)>
        where
            $head: fmt::Display,
            $($tail: fmt::Display,)*
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "<{}", self.0.$hslot)?;
                $(write!(f, ", {}", self.0.$tslot)?;)*
                write!(f, ">")
            }
        }
    )+};
}

impl_direct_sum!(
    (A.0),
    (A.0, B.1),
    (A.0, B.1, C.2),
    (A.0, B.1, C.2, D.3),
    (A.0, B.1, C.2, D.3, E.4),
    (A.0, B.1, C.2, D.3, E.4, F.5),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_componentwise_add_sub() {
        let mut a = DirectSum::new((1.0_f64, 2.0_f64));
        let b = DirectSum::new((10.0_f64, 20.0_f64));
        a += &b;
        assert_eq!(a, DirectSum::new((11.0, 22.0)));
        a -= &b;
        assert_eq!(a, DirectSum::new((1.0, 2.0)));
    }

    #[test]
    fn test_dot_sums_over_components() {
        let v = Tensor::from_vec(2, 1, vec![1.0, 2.0]).unwrap();
        let w = Tensor::from_vec(2, 1, vec![3.0, 4.0]).unwrap();
        let a = DirectSum::new((2.0_f64, v));
        let b = DirectSum::new((5.0_f64, w));
        // 2*5 + (1*3 + 2*4)
        assert_eq!(a.dot(&b), 21.0);
    }

    #[test]
    fn test_norm_of_mixed_sum() {
        let v = Tensor::from_vec(2, 1, vec![0.0, 4.0]).unwrap();
        let state = DirectSum::new((3.0_f64, v));
        assert_eq!(state.norm_sq(), 25.0);
        assert_eq!(state.norm(), 5.0);
    }

    #[test]
    fn test_value_operators() {
        let a = DirectSum::new((1.0_f64, 2.0_f64, 3.0_f64));
        let b = DirectSum::new((1.0_f64, 1.0_f64, 1.0_f64));
        assert_eq!(a.clone() + &b, DirectSum::new((2.0, 3.0, 4.0)));
        assert_eq!(a.clone() - &b, DirectSum::new((0.0, 1.0, 2.0)));
        assert_eq!(a.clone() * 2.0, DirectSum::new((2.0, 4.0, 6.0)));
        assert_eq!(a / 2.0, DirectSum::new((0.5, 1.0, 1.5)));
    }

    #[test]
    fn test_display() {
        let a = DirectSum::new((1.5_f64, -2.0_f64));
        assert_eq!(a.to_string(), "<1.5, -2>");
    }
}
