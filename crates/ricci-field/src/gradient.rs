//! Fourth-order finite-difference gradient of a tensor field.
//!
//! [`gradient`] raises the rank of a field by one: the new trailing tensor
//! axis indexes the derivative direction, so the output element at
//! `[coord.., a]` holds the derivative of the input element at `[coord..]`
//! along grid axis `a`.
//!
//! Two boundary policies are provided. [`BoundaryPolicy::OneSided`] keeps
//! the centered five-point stencil in the interior and switches to
//! one-sided fourth-order stencils at the two rows nearest each edge.
//! [`BoundaryPolicy::Periodic`] uses the centered stencil everywhere, with
//! neighbour offsets wrapping modulo the grid size.

use num_traits::{Float, FromPrimitive, Num, NumAssign};
use ricci_core::Tensor;

use crate::field::TensorField;

/// How the derivative treats the edges of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// One-sided fourth-order stencils at the two rows nearest each edge.
    OneSided,
    /// The centered stencil everywhere, wrapping around the grid.
    Periodic,
}

// Five-point stencil taps as (coefficient, neighbour offset) pairs, all
// divided by 12h. The boundary coefficients are the standard fourth-order
// one-sided constants and must not be altered.
const CENTERED: [(f64, isize); 4] = [(8.0, 1), (-8.0, -1), (-1.0, 2), (1.0, -2)];
const FORWARD_EDGE: [(f64, isize); 5] = [(-25.0, 0), (48.0, 1), (-36.0, 2), (16.0, 3), (-3.0, 4)];
const FORWARD_INNER: [(f64, isize); 5] = [(-3.0, -1), (-10.0, 0), (18.0, 1), (-6.0, 2), (1.0, 3)];
const BACKWARD_INNER: [(f64, isize); 5] = [(3.0, 1), (10.0, 0), (-18.0, -1), (6.0, -2), (-1.0, -3)];
const BACKWARD_EDGE: [(f64, isize); 5] = [(25.0, 0), (-48.0, -1), (36.0, -2), (-16.0, -3), (3.0, -4)];

fn constant<T: FromPrimitive>(value: f64) -> T {
    T::from_f64(value).expect("stencil coefficients must be representable in the element type")
}

/// Fourth-order per-axis derivative of `input`, returned as a field of
/// rank + 1.
///
/// `spacing` is the uniform grid step. The trailing axis of each output
/// tensor indexes the derivative direction.
///
/// # Examples
///
/// ```
/// use ricci_core::Tensor;
/// use ricci_field::{gradient, BoundaryPolicy, TensorField};
///
/// // phi(x, y) = x^2 with unit spacing
/// let phi = TensorField::from_fn(2, 8, 0, |c| {
///     Tensor::from_elem(2, 0, (c[0] * c[0]) as f64)
/// }).unwrap();
///
/// let grad = gradient(&phi, 1.0, BoundaryPolicy::OneSided);
/// // at x = 3: d phi / dx = 6, d phi / dy = 0
/// let point = 3 * phi.step(0);
/// assert!((grad.point(point)[&[0]] - 6.0).abs() < 1e-10);
/// assert!(grad.point(point)[&[1]].abs() < 1e-10);
/// ```
pub fn gradient<T>(input: &TensorField<T>, spacing: T, policy: BoundaryPolicy) -> TensorField<T>
where
    T: Float + FromPrimitive + NumAssign,
{
    log::debug!(
        "gradient over {}^{} points, rank {} -> {}, {:?} boundaries",
        input.divisions(),
        input.dimensions(),
        input.rank(),
        input.rank() + 1,
        policy
    );

    let dimensions = input.dimensions();
    let divisions = input.divisions();
    let rank = input.rank();
    let count = input.num_points();
    let twelve_h = constant::<T>(12.0) * spacing;

    let guard = input.borrow_points();
    let points: &[Tensor<T>] = &guard;
    let mut out_points = vec![Tensor::<T>::zeros(dimensions, rank + 1); count];

    let mut stride = 1usize;
    for axis in (0..dimensions).rev() {
        for point in 0..count {
            let coord = (point / stride) % divisions;
            let interior = coord >= 2 && coord + 2 < divisions;
            let derivative = match policy {
                _ if interior => apply_stencil(points, point, stride, &CENTERED, twelve_h),
                BoundaryPolicy::Periodic => {
                    wrapped_stencil(points, point, coord, stride, divisions, twelve_h)
                }
                BoundaryPolicy::OneSided => {
                    let taps: &[(f64, isize)] = if coord == 0 {
                        &FORWARD_EDGE
                    } else if coord == 1 {
                        &FORWARD_INNER
                    } else if coord == divisions - 1 {
                        &BACKWARD_EDGE
                    } else {
                        &BACKWARD_INNER
                    };
                    apply_stencil(points, point, stride, taps, twelve_h)
                }
            };
            scatter(&mut out_points[point], &derivative, axis, dimensions);
        }
        stride *= divisions;
    }
    drop(guard);

    TensorField::from_points(dimensions, divisions, rank + 1, out_points)
        .expect("the input field's geometry was already validated")
}

// Weighted sum of neighbours along one grid axis, divided by 12h.
fn apply_stencil<T>(
    points: &[Tensor<T>],
    point: usize,
    stride: usize,
    taps: &[(f64, isize)],
    twelve_h: T,
) -> Tensor<T>
where
    T: Float + FromPrimitive + NumAssign,
{
    let mut total = Tensor::zeros(points[point].extent(), points[point].rank());
    for &(coefficient, offset) in taps {
        let neighbour = (point as isize + offset * stride as isize) as usize;
        total += &(&points[neighbour] * constant::<T>(coefficient));
    }
    total /= twelve_h;
    total
}

// The centered stencil with neighbour coordinates wrapped modulo the grid.
fn wrapped_stencil<T>(
    points: &[Tensor<T>],
    point: usize,
    coord: usize,
    stride: usize,
    divisions: usize,
    twelve_h: T,
) -> Tensor<T>
where
    T: Float + FromPrimitive + NumAssign,
{
    let base = point - coord * stride;
    let mut total = Tensor::zeros(points[point].extent(), points[point].rank());
    for &(coefficient, offset) in CENTERED.iter() {
        let wrapped = (coord as isize + offset).rem_euclid(divisions as isize) as usize;
        total += &(&points[base + wrapped * stride] * constant::<T>(coefficient));
    }
    total /= twelve_h;
    total
}

// Write the derivative along `axis` into the trailing-axis slot `axis` of
// the output point tensor.
fn scatter<T: Copy + Num>(out: &mut Tensor<T>, derivative: &Tensor<T>, axis: usize, extent: usize) {
    let dst = out.as_mut_slice();
    for (offset, &value) in derivative.as_slice().iter().enumerate() {
        dst[offset * extent + axis] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_field_has_constant_gradient() {
        let spacing = 0.25;
        // phi = 2x - 3y
        let phi = TensorField::from_fn(2, 8, 0, |c| {
            Tensor::from_elem(2, 0, 2.0 * c[0] as f64 * spacing - 3.0 * c[1] as f64 * spacing)
        })
        .unwrap();

        let grad = gradient(&phi, spacing, BoundaryPolicy::OneSided);
        assert_eq!(grad.rank(), 1);
        for point in 0..grad.num_points() {
            assert!((grad.point(point)[&[0]] - 2.0).abs() < 1e-10);
            assert!((grad.point(point)[&[1]] + 3.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_quartic_is_differentiated_exactly() {
        let spacing = 0.5;
        // one-sided and centered five-point stencils are exact through
        // degree four
        let phi = TensorField::from_fn(2, 8, 0, |c| {
            let x = c[0] as f64 * spacing;
            Tensor::from_elem(2, 0, x * x * x * x)
        })
        .unwrap();

        let grad = gradient(&phi, spacing, BoundaryPolicy::OneSided);
        for point in 0..grad.num_points() {
            let x = (point / phi.step(0)) as f64 * spacing;
            let expected = 4.0 * x * x * x;
            assert!(
                (grad.point(point)[&[0]] - expected).abs() < 1e-9,
                "d/dx at x = {}: {} vs {}",
                x,
                grad.point(point)[&[0]],
                expected
            );
            assert!(grad.point(point)[&[1]].abs() < 1e-9);
        }
    }

    #[test]
    fn test_periodic_gradient_of_sine_wraps_cleanly() {
        let divisions = 16usize;
        let spacing = 1.0;
        let length = divisions as f64 * spacing;
        let wave_number = 2.0 * std::f64::consts::PI / length;

        let phi = TensorField::from_fn(2, divisions, 0, |c| {
            Tensor::from_elem(2, 0, (wave_number * c[0] as f64 * spacing).sin())
        })
        .unwrap();

        let grad = gradient(&phi, spacing, BoundaryPolicy::Periodic);
        // fourth-order truncation error of the centered stencil
        let tolerance = wave_number.powi(5) * spacing.powi(4) / 30.0 * 2.0;
        for point in 0..grad.num_points() {
            let x = (point / phi.step(0)) as f64 * spacing;
            let expected = wave_number * (wave_number * x).cos();
            assert!(
                (grad.point(point)[&[0]] - expected).abs() < tolerance,
                "d/dx at x = {}: {} vs {}",
                x,
                grad.point(point)[&[0]],
                expected
            );
        }
    }

    #[test]
    fn test_rank_one_field_scatters_into_trailing_axis() {
        let spacing = 1.0;
        // v = (x^2, y^2)
        let v = TensorField::from_fn(2, 8, 1, |c| {
            let x = c[0] as f64 * spacing;
            let y = c[1] as f64 * spacing;
            Tensor::from_vec(2, 1, vec![x * x, y * y]).unwrap()
        })
        .unwrap();

        let grad = gradient(&v, spacing, BoundaryPolicy::OneSided);
        assert_eq!(grad.rank(), 2);

        let x = 3usize;
        let y = 5usize;
        let point = x * v.step(0) + y * v.step(1);
        let tensor = grad.point(point);
        // [component, derivative direction]
        assert!((tensor[&[0, 0]] - 2.0 * x as f64).abs() < 1e-10);
        assert!(tensor[&[0, 1]].abs() < 1e-10);
        assert!(tensor[&[1, 0]].abs() < 1e-10);
        assert!((tensor[&[1, 1]] - 2.0 * y as f64).abs() < 1e-10);
    }
}
