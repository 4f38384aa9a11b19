//! Seedable generation of benchmark inputs
//!
//! Every random matrix or vector is drawn from an explicitly owned
//! `ChaCha8Rng`, so the same seed always yields the same inputs.

use rand::distributions::{Distribution, Uniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::Result;
use crate::matrix::{CsrMatrix, DenseMatrix};

/// Generates uniform [0, 1) dense and sparse inputs
pub struct MatrixGenerator {
    rng: ChaCha8Rng,
}

impl MatrixGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Random `n × n` matrix with entries in [0, 1)
    pub fn dense_matrix(&mut self, n: usize) -> DenseMatrix {
        let mut m = DenseMatrix::zeros(n);
        for v in m.as_mut_slice() {
            *v = self.rng.gen();
        }
        m
    }

    /// Random vector of length `n` with entries in [0, 1)
    pub fn vector(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.rng.gen::<f64>()).collect()
    }

    /// Random square sparse matrix where each row holds about
    /// `density * n` entries (at least one when `n > 0`).
    ///
    /// Columns within a row are distinct and appear in random order. The
    /// arrays go through [`CsrMatrix::new`], so the result is validated
    /// like any other input.
    pub fn sparse_matrix(&mut self, n: usize, density: f64) -> Result<CsrMatrix> {
        if n == 0 {
            return CsrMatrix::zeros(0, 0);
        }

        let per_row = ((density.clamp(0.0, 1.0) * n as f64).round() as usize).clamp(1, n);
        let col_dist = Uniform::from(0..n);

        let mut row_ptr = Vec::with_capacity(n + 1);
        let mut col_idx = Vec::with_capacity(n * per_row);
        let mut values = Vec::with_capacity(n * per_row);
        let mut seen = vec![false; n];

        row_ptr.push(0);
        for _ in 0..n {
            let start = col_idx.len();
            while col_idx.len() - start < per_row {
                let col = col_dist.sample(&mut self.rng);
                if !seen[col] {
                    seen[col] = true;
                    col_idx.push(col);
                    values.push(self.rng.gen::<f64>());
                }
            }
            for &col in &col_idx[start..] {
                seen[col] = false;
            }
            row_ptr.push(col_idx.len());
        }

        CsrMatrix::new(n, n, row_ptr, col_idx, values)
    }
}
