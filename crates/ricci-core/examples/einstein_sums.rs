//! A tour of tag-indexed tensor arithmetic.
//!
//! Run with:
//! ```bash
//! cargo run --example einstein_sums
//! ```

use ricci_core::{Tag, Tensor};

const I: Tag = Tag::new('i');
const J: Tag = Tag::new('j');
const K: Tag = Tag::new('k');

fn main() -> anyhow::Result<()> {
    let m = Tensor::from_vec(3, 2, (1..=9).map(f64::from).collect())?;
    let v = Tensor::from_vec(3, 1, vec![1.0, 0.0, -1.0])?;

    println!("{}", m);
    println!("{}", v);

    // Matrix-vector product: out_i = m_ij v_j
    let mut out = Tensor::<f64>::zeros(3, 1);
    out.idx_mut(&[I]).assign(m.idx(&[I, J]) * v.idx(&[J]));
    println!("m_ij v_j        = {}", out);

    // Trace: repeating a tag on one tensor sums its diagonal.
    println!("m_ii            = {}", m.idx(&[I, I]).eval());

    // Quadratic form: v_i m_ij v_j collapses to a scalar.
    let quadratic = (v.idx(&[I]) * m.idx(&[I, J]) * v.idx(&[J])).eval();
    println!("v_i m_ij v_j    = {}", quadratic);

    // Matrix product with a scalar factor folded in.
    let mut sq = Tensor::<f64>::zeros(3, 2);
    sq.idx_mut(&[I, J])
        .assign(m.idx(&[I, K]) * m.idx(&[K, J]) / 2.0);
    println!("m_ik m_kj / 2   = {}", sq);

    Ok(())
}
