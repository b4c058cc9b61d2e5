//! Advect a scalar blob with a constant velocity, using the gradient
//! operator and field expressions for the update.
//!
//! Run with:
//! ```bash
//! cargo run --example advection
//! ```

use ricci_core::{Tag, Tensor};
use ricci_field::{gradient, BoundaryPolicy, TensorField};

const I: Tag = Tag::new('i');

fn main() {
    let divisions = 16usize;
    let spacing = 1.0 / divisions as f64;
    let dt = 0.02;

    // a smooth periodic bump centred in the box
    let mut phi = TensorField::from_fn(2, divisions, 0, |c| {
        let x = c[0] as f64 * spacing;
        let y = c[1] as f64 * spacing;
        let k = 2.0 * std::f64::consts::PI;
        Tensor::from_elem(2, 0, (k * x).sin() * (k * y).sin())
    })
    .expect("valid geometry");

    // constant velocity (1, 0.5)
    let velocity = Tensor::from_vec(2, 1, vec![1.0, 0.5]).expect("valid tensor");

    for step in 0..10 {
        // phi <- phi - dt * (u . grad phi), per point
        let grad = gradient(&phi, spacing, BoundaryPolicy::Periodic);
        phi.idx_mut(&[])
            .sub_assign(grad.idx(&[I]) * velocity.idx(&[I]) * dt);

        let total: f64 = (0..phi.num_points())
            .map(|p| phi.point(p)[&[]])
            .sum();
        println!("step {:2}: sum(phi) = {:+.3e}", step, total);
    }

    println!("{}", phi.point(0));
}
