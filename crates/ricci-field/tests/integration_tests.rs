//! Integration tests for ricci-field.
//!
//! End-to-end flows: sampling fields, per-point expression assignment,
//! broadcasting constant tensors, and the differential operator under
//! both boundary policies.

use ricci_core::{InnerSpace, Tag, Tensor};
use ricci_field::{gradient, BoundaryPolicy, TensorField};

const I: Tag = Tag::new('i');
const J: Tag = Tag::new('j');

#[test]
fn test_divergence_style_pipeline() {
    // v = (x, y) has divergence 2 everywhere: grad(v) is the identity,
    // and tracing its two axes sums the diagonal.
    let spacing = 0.5;
    let v = TensorField::from_fn(2, 8, 1, |c| {
        Tensor::from_vec(
            2,
            1,
            vec![c[0] as f64 * spacing, c[1] as f64 * spacing],
        )
        .unwrap()
    })
    .unwrap();

    let jacobian = gradient(&v, spacing, BoundaryPolicy::OneSided);
    let mut divergence = TensorField::scalar(2, 8).unwrap();
    divergence.idx_mut(&[]).assign(jacobian.idx(&[I, I]));

    for point in 0..divergence.num_points() {
        assert!(
            (divergence.point(point)[&[]] - 2.0).abs() < 1e-10,
            "divergence at point {}: {}",
            point,
            divergence.point(point)[&[]]
        );
    }
}

#[test]
fn test_gradient_of_product_rule_smoke() {
    // d(x y)/dx = y and d(x y)/dy = x
    let phi = TensorField::from_fn(2, 8, 0, |c| {
        Tensor::from_elem(2, 0, (c[0] * c[1]) as f64)
    })
    .unwrap();

    let grad = gradient(&phi, 1.0, BoundaryPolicy::OneSided);
    for x in 0..8usize {
        for y in 0..8usize {
            let point = x * phi.step(0) + y * phi.step(1);
            assert!((grad.point(point)[&[0]] - y as f64).abs() < 1e-10);
            assert!((grad.point(point)[&[1]] - x as f64).abs() < 1e-10);
        }
    }
}

#[test]
fn test_periodic_gradient_at_wrap_points() {
    let divisions = 16usize;
    let length = divisions as f64;
    let k = 2.0 * std::f64::consts::PI / length;

    let phi = TensorField::from_fn(2, divisions, 0, |c| {
        Tensor::from_elem(2, 0, (k * c[0] as f64).sin())
    })
    .unwrap();

    let grad = gradient(&phi, 1.0, BoundaryPolicy::Periodic);
    let tolerance = k.powi(5) / 30.0 * 2.0;

    // specifically the rows where the stencil wraps
    for x in [0usize, 1, divisions - 2, divisions - 1] {
        let point = x * phi.step(0);
        let expected = k * (k * x as f64).cos();
        assert!(
            (grad.point(point)[&[0]] - expected).abs() < tolerance,
            "wrapped row x = {}: {} vs {}",
            x,
            grad.point(point)[&[0]],
            expected
        );
    }
}

#[test]
fn test_second_gradient_raises_rank_twice() {
    let phi = TensorField::from_fn(2, 8, 0, |c| {
        let x = c[0] as f64;
        let y = c[1] as f64;
        Tensor::from_elem(2, 0, x * x + x * y)
    })
    .unwrap();

    let hessian = gradient(&gradient(&phi, 1.0, BoundaryPolicy::OneSided), 1.0, BoundaryPolicy::OneSided);
    assert_eq!(hessian.rank(), 2);

    let point = 4 * phi.step(0) + 3 * phi.step(1);
    let h = hessian.point(point);
    assert!((h[&[0, 0]] - 2.0).abs() < 1e-9); // d2/dx2
    assert!((h[&[0, 1]] - 1.0).abs() < 1e-9); // d2/dydx
    assert!((h[&[1, 0]] - 1.0).abs() < 1e-9); // d2/dxdy
    assert!(h[&[1, 1]].abs() < 1e-9); // d2/dy2
}

#[test]
fn test_field_expression_with_broadcast_metric() {
    // lower an index with a constant metric at every point
    let metric = Tensor::from_vec(2, 2, vec![2.0, 0.0, 0.0, 1.0]).unwrap();
    let v = TensorField::from_fn(2, 5, 1, |c| {
        Tensor::from_vec(2, 1, vec![c[0] as f64, c[1] as f64]).unwrap()
    })
    .unwrap();

    let mut lowered = TensorField::new(2, 5, 1).unwrap();
    lowered
        .idx_mut(&[I])
        .assign(metric.idx(&[I, J]) * v.idx(&[J]));

    for x in 0..5usize {
        for y in 0..5usize {
            let point = x * v.step(0) + y * v.step(1);
            assert_eq!(lowered.point(point).to_vec(), vec![2.0 * x as f64, y as f64]);
        }
    }
}

#[test]
fn test_shared_handles_see_expression_writes() {
    let v = TensorField::from_fn(2, 5, 1, |_| {
        Tensor::from_vec(2, 1, vec![1.0, 2.0]).unwrap()
    })
    .unwrap();

    let mut target = TensorField::new(2, 5, 1).unwrap();
    let observer = target.share();
    target.idx_mut(&[I]).assign(v.idx(&[I]) * 3.0);

    assert_eq!(observer.point(8).to_vec(), vec![3.0, 6.0]);
}

#[test]
fn test_field_inner_space_for_time_stepping() {
    let mut state = TensorField::from_fn(2, 5, 1, |_| {
        Tensor::from_vec(2, 1, vec![1.0, 0.0]).unwrap()
    })
    .unwrap();
    let rate = TensorField::from_fn(2, 5, 1, |_| {
        Tensor::from_vec(2, 1, vec![0.0, 4.0]).unwrap()
    })
    .unwrap();

    // forward Euler step with dt folded into the rate
    let mut step = rate.clone();
    step.scale(0.25);
    state += &step;

    assert_eq!(state.point(0).to_vec(), vec![1.0, 1.0]);
    assert_eq!(state.norm_sq(), 2.0 * 25.0);
}
