//! Diagnostic rendering of tensors.
//!
//! Rank 0 and 1 render inline, rank 2 as a bracketed matrix of row
//! vectors, and higher ranks as one labeled matrix block per leading-axis
//! slice, recursively.

use std::fmt;

use num_traits::Num;

use super::Tensor;

fn fmt_vector<T: fmt::Display>(f: &mut fmt::Formatter<'_>, row: &[T]) -> fmt::Result {
    write!(f, "<{}", row[0])?;
    for value in &row[1..] {
        write!(f, ", {}", value)?;
    }
    write!(f, ">")
}

fn fmt_matrix<T: fmt::Display>(f: &mut fmt::Formatter<'_>, data: &[T], extent: usize) -> fmt::Result {
    write!(f, "[")?;
    fmt_vector(f, &data[..extent])?;
    for row in 1..extent {
        write!(f, "\n ")?;
        fmt_vector(f, &data[row * extent..(row + 1) * extent])?;
    }
    write!(f, "]")
}

fn fmt_sub_tensor<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    data: &[T],
    extent: usize,
    rank_remaining: usize,
    label: &str,
) -> fmt::Result {
    if rank_remaining == 2 {
        writeln!(f, "{}):", label)?;
        fmt_matrix(f, data, extent)?;
        writeln!(f)
    } else {
        let block = extent.pow((rank_remaining - 1) as u32);
        for slice in 0..extent {
            fmt_sub_tensor(
                f,
                &data[slice * block..(slice + 1) * block],
                extent,
                rank_remaining - 1,
                &format!("{}, {}", label, slice),
            )?;
        }
        Ok(())
    }
}

impl<T> fmt::Display for Tensor<T>
where
    T: Copy + Num + fmt::Display,
{
    /// ```
    /// use ricci_core::Tensor;
    ///
    /// let v = Tensor::from_vec(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(v.to_string(), "Rank 1 3D Tensor: <1, 2, 3>");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rank {} {}D Tensor:", self.rank(), self.extent())?;
        match self.rank() {
            0 => write!(f, " {}", self.as_slice()[0]),
            1 => {
                write!(f, " ")?;
                fmt_vector(f, self.as_slice())
            }
            2 => {
                writeln!(f)?;
                fmt_matrix(f, self.as_slice(), self.extent())
            }
            rank => {
                writeln!(f)?;
                let block = self.extent().pow((rank - 1) as u32);
                for slice in 0..self.extent() {
                    fmt_sub_tensor(
                        f,
                        &self.as_slice()[slice * block..(slice + 1) * block],
                        self.extent(),
                        rank - 1,
                        &format!("Sub-matrix ({}", slice),
                    )?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_and_vector_render_inline() {
        let s = Tensor::from_vec(2, 0, vec![7.5]).unwrap();
        assert_eq!(s.to_string(), "Rank 0 2D Tensor: 7.5");

        let v = Tensor::from_vec(2, 1, vec![1.0, -2.0]).unwrap();
        assert_eq!(v.to_string(), "Rank 1 2D Tensor: <1, -2>");
    }

    #[test]
    fn test_matrix_renders_rows() {
        let m = Tensor::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m.to_string(), "Rank 2 2D Tensor:\n[<1, 2>\n <3, 4>]");
    }

    #[test]
    fn test_high_rank_renders_labeled_blocks() {
        let t = Tensor::from_fn(2, 3, |c| (100 * c[0] + 10 * c[1] + c[2]) as f64);
        let rendered = t.to_string();
        assert!(rendered.starts_with("Rank 3 2D Tensor:\n"));
        assert!(rendered.contains("Sub-matrix (0):\n[<0, 1>\n <10, 11>]"));
        assert!(rendered.contains("Sub-matrix (1):\n[<100, 101>\n <110, 111>]"));
    }
}
