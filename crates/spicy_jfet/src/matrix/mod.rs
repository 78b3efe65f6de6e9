pub mod builder;
pub mod error;
pub mod sparse;

use num_complex::Complex64;

use crate::matrix::sparse::CscMatrix;

/// The MNA system devices load into: a sparse matrix with real and
/// imaginary parts and the matching right-hand sides.
///
/// Indices are MNA indices (ground already removed).
#[derive(Debug, Clone)]
pub struct SolverMatrix {
    matrix: CscMatrix,
    rhs: Vec<f64>,
    irhs: Vec<f64>,
}

impl SolverMatrix {
    pub fn new(matrix: CscMatrix) -> Self {
        let n = matrix.dim.nrows;
        Self {
            matrix,
            rhs: vec![0.0; n],
            irhs: vec![0.0; n],
        }
    }

    pub fn dim(&self) -> usize {
        self.rhs.len()
    }

    pub fn matrix(&self) -> &CscMatrix {
        &self.matrix
    }

    /// Add `value` at a cached stamp slot; `None` slots touch ground and are skipped.
    pub fn add(&mut self, slot: Option<usize>, value: f64) {
        if let Some(nnz) = slot {
            *self.matrix.get_mut_nnz(nnz) += value;
        }
    }

    pub fn add_imag(&mut self, slot: Option<usize>, value: f64) {
        if let Some(nnz) = slot {
            *self.matrix.get_mut_imag(nnz) += value;
        }
    }

    pub fn add_rhs(&mut self, node: Option<usize>, value: f64) {
        if let Some(index) = node {
            self.rhs[index] += value;
        }
    }

    pub fn add_rhs_complex(&mut self, node: Option<usize>, value: Complex64) {
        if let Some(index) = node {
            self.rhs[index] += value.re;
            self.irhs[index] += value.im;
        }
    }

    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    pub fn irhs(&self) -> &[f64] {
        &self.irhs
    }

    /// Real value at (row, column); zero outside the pattern.
    pub fn value(&self, row: usize, column: usize) -> f64 {
        self.matrix
            .find(row, column)
            .map_or(0.0, |nnz| self.matrix.values[nnz])
    }

    /// Imaginary value at (row, column); zero outside the pattern.
    pub fn imag_value(&self, row: usize, column: usize) -> f64 {
        self.matrix
            .find(row, column)
            .map_or(0.0, |nnz| self.matrix.imag[nnz])
    }

    /// Zero matrix and right-hand sides before a new load.
    pub fn clear(&mut self) {
        self.matrix.clear();
        self.rhs.fill(0.0);
        self.irhs.fill(0.0);
    }
}
