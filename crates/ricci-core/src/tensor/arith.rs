//! Element-wise and scalar arithmetic on tensors.
//!
//! In-place operators (`+=`, `-=` against another tensor of identical
//! shape, `*=`, `/=` by a scalar) mutate the flat buffer directly;
//! reference-taking value operators build a new tensor. Shape mismatches
//! are contract violations and panic.

use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Sub, SubAssign};

use num_traits::{Num, NumAssign};

use super::Tensor;

impl<T: Copy + Num> Index<&[usize]> for Tensor<T> {
    type Output = T;

    fn index(&self, coordinate: &[usize]) -> &T {
        &self.data[self.offset_of(coordinate)]
    }
}

impl<T: Copy + Num> IndexMut<&[usize]> for Tensor<T> {
    fn index_mut(&mut self, coordinate: &[usize]) -> &mut T {
        let offset = self.offset_of(coordinate);
        &mut self.data[offset]
    }
}

impl<T: Copy + NumAssign> AddAssign<&Tensor<T>> for Tensor<T> {
    /// # Panics
    ///
    /// Panics when the shapes differ.
    fn add_assign(&mut self, other: &Tensor<T>) {
        assert!(
            self.same_shape(other),
            "cannot add a rank {} tensor of extent {} to a rank {} tensor of extent {}",
            other.rank,
            other.extent,
            self.rank,
            self.extent
        );
        for (slot, &value) in self.data.iter_mut().zip(other.data.iter()) {
            *slot += value;
        }
    }
}

impl<T: Copy + NumAssign> SubAssign<&Tensor<T>> for Tensor<T> {
    /// # Panics
    ///
    /// Panics when the shapes differ.
    fn sub_assign(&mut self, other: &Tensor<T>) {
        assert!(
            self.same_shape(other),
            "cannot subtract a rank {} tensor of extent {} from a rank {} tensor of extent {}",
            other.rank,
            other.extent,
            self.rank,
            self.extent
        );
        for (slot, &value) in self.data.iter_mut().zip(other.data.iter()) {
            *slot -= value;
        }
    }
}

impl<T: Copy + NumAssign> MulAssign<T> for Tensor<T> {
    fn mul_assign(&mut self, factor: T) {
        for slot in self.data.iter_mut() {
            *slot *= factor;
        }
    }
}

impl<T: Copy + NumAssign> DivAssign<T> for Tensor<T> {
    fn div_assign(&mut self, factor: T) {
        for slot in self.data.iter_mut() {
            *slot /= factor;
        }
    }
}

impl<'b, T: Copy + NumAssign> Add<&'b Tensor<T>> for &Tensor<T> {
    type Output = Tensor<T>;

    fn add(self, other: &'b Tensor<T>) -> Tensor<T> {
        let mut out = self.clone();
        out += other;
        out
    }
}

impl<'b, T: Copy + NumAssign> Sub<&'b Tensor<T>> for &Tensor<T> {
    type Output = Tensor<T>;

    fn sub(self, other: &'b Tensor<T>) -> Tensor<T> {
        let mut out = self.clone();
        out -= other;
        out
    }
}

impl<T: Copy + NumAssign> Mul<T> for &Tensor<T> {
    type Output = Tensor<T>;

    fn mul(self, factor: T) -> Tensor<T> {
        let mut out = self.clone();
        out *= factor;
        out
    }
}

impl<T: Copy + NumAssign> Div<T> for &Tensor<T> {
    type Output = Tensor<T>;

    fn div(self, factor: T) -> Tensor<T> {
        let mut out = self.clone();
        out /= factor;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elementwise_add_sub() {
        let mut a = Tensor::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Tensor::from_vec(2, 2, vec![10.0, 20.0, 30.0, 40.0]).unwrap();
        a += &b;
        assert_eq!(a.to_vec(), vec![11.0, 22.0, 33.0, 44.0]);
        a -= &b;
        assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_scale_then_unscale_restores_exactly() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let mut m = Tensor::from_vec(3, 2, values.clone()).unwrap();
        m *= 2.0;
        assert_eq!(m[&[0, 1]], 4.0);
        m /= 2.0;
        assert_eq!(m.to_vec(), values);
    }

    #[test]
    fn test_value_operators_leave_operands_alone() {
        let a = Tensor::from_vec(2, 1, vec![1.0, 2.0]).unwrap();
        let b = Tensor::from_vec(2, 1, vec![3.0, 4.0]).unwrap();
        let sum = &a + &b;
        let difference = &a - &b;
        assert_eq!(sum.to_vec(), vec![4.0, 6.0]);
        assert_eq!(difference.to_vec(), vec![-2.0, -2.0]);
        assert_eq!(a.to_vec(), vec![1.0, 2.0]);
        assert_eq!((&a * 3.0).to_vec(), vec![3.0, 6.0]);
        assert_eq!((&b / 2.0).to_vec(), vec![1.5, 2.0]);
    }

    #[test]
    #[should_panic(expected = "cannot add")]
    fn test_shape_mismatch_panics() {
        let mut a = Tensor::<f64>::zeros(2, 2);
        let b = Tensor::<f64>::zeros(3, 2);
        a += &b;
    }
}
