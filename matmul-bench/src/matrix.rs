use crate::config::Dims;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::fmt;

/// Dense row-major `f32` matrix.
#[derive(Clone, PartialEq, Debug)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.; rows * cols],
        }
    }

    /// Values drawn uniformly from [0, 1).
    pub fn random(rows: usize, cols: usize, rng: &mut impl Rng) -> Self {
        Self {
            rows,
            cols,
            data: (0..rows * cols).map(|_| rng.random::<f32>()).collect(),
        }
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    #[inline]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.chunks(self.cols.max(1)) {
            for x in row {
                write!(f, "{x:6.2} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The three matrices of one session: `C = A · B`.
#[derive(Clone, Debug)]
pub struct Operands {
    pub dims: Dims,
    pub a: Matrix,
    pub b: Matrix,
    pub c: Matrix,
}

impl Operands {
    /// Random A and B, zeroed C.
    pub fn random(dims: Dims, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let (m, k, n) = (dims.m as usize, dims.k as usize, dims.n as usize);
        Self {
            dims,
            a: Matrix::random(m, k, &mut rng),
            b: Matrix::random(k, n, &mut rng),
            c: Matrix::zeros(m, n),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_random_operands() {
        let dims = Dims::new(16, 32, 8).unwrap();
        let ops = Operands::random(dims, Some(42));
        assert_eq!((ops.a.rows(), ops.a.cols()), (16, 32));
        assert_eq!((ops.b.rows(), ops.b.cols()), (32, 8));
        assert_eq!((ops.c.rows(), ops.c.cols()), (16, 8));
        assert!(ops.a.as_slice().iter().all(|x| (0. ..1.).contains(x)));
        assert!(ops.b.as_slice().iter().all(|x| (0. ..1.).contains(x)));
        assert!(ops.c.as_slice().iter().all(|&x| x == 0.));

        let again = Operands::random(dims, Some(42));
        assert_eq!(ops.a, again.a);
        assert_eq!(ops.b, again.b);
        assert_ne!(ops.a, Operands::random(dims, Some(43)).a);
    }

    #[test]
    fn test_display() {
        let m = Matrix::from_vec(2, 2, vec![1., 0.5, -2.25, 10.]);
        assert_eq!(m.to_string(), "  1.00   0.50 \n -2.25  10.00 \n");
    }

    #[test]
    fn test_finite() {
        let mut m = Matrix::zeros(2, 3);
        assert!(m.is_finite());
        m.as_mut_slice()[4] = f32::NAN;
        assert!(!m.is_finite());
    }
}
