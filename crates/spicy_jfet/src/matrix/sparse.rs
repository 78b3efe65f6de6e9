use crate::matrix::error::MatrixError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dim {
    pub nrows: usize,
    pub ncols: usize,
}

/// Compressed Sparse Column matrix with a parallel imaginary part.
/// - column pointers are the indices of the start and end of each column
/// - row indices are the indices of the rows of the non zero values
/// - `values` and `imag` share the same pattern
#[derive(Debug, Clone)]
pub struct CscMatrix {
    pub dim: Dim,
    /// Column pointers, len = ncols + 1
    pub column_pointers: Vec<usize>,
    /// Row indices, len = nnz
    pub row_indices: Vec<usize>,
    /// Real part, len = nnz
    pub values: Vec<f64>,
    /// Imaginary part, len = nnz. Only written by AC and distortion loads.
    pub imag: Vec<f64>,
}

impl CscMatrix {
    /// number of non zero values
    pub fn nnz(&self) -> usize {
        self.row_indices.len()
    }

    pub fn check_invariants(&self) -> Result<(), MatrixError> {
        let last = self.column_pointers.last().copied().unwrap_or(usize::MAX);
        if self.column_pointers.len() != self.dim.ncols + 1 || last != self.nnz() {
            return Err(MatrixError::InvalidColumnPointers {
                index: self.dim.ncols,
                expected: self.nnz(),
                actual: last,
            });
        }
        for j in 0..self.dim.ncols {
            let (start, end) = (self.column_pointers[j], self.column_pointers[j + 1]);
            if start > end {
                return Err(MatrixError::InvalidColumnPointers {
                    index: j,
                    expected: start,
                    actual: end,
                });
            }
            let mut prev = None;
            for &r in &self.row_indices[start..end] {
                if r >= self.dim.nrows {
                    return Err(MatrixError::OutOfBoundsIndex {
                        index: r,
                        max: self.dim.nrows,
                    });
                }
                if let Some(p) = prev
                    && r <= p
                {
                    return Err(MatrixError::RowsNotStrictlyIncreasing {
                        index: j,
                        expected: p,
                        actual: r,
                    });
                }
                prev = Some(r);
            }
        }
        Ok(())
    }

    /// nnz index of (row, column), if it is part of the pattern.
    pub fn find(&self, row: usize, column: usize) -> Option<usize> {
        if column >= self.dim.ncols {
            return None;
        }
        let (s, e) = (self.column_pointers[column], self.column_pointers[column + 1]);
        self.row_indices[s..e]
            .binary_search(&row)
            .ok()
            .map(|offset| s + offset)
    }

    pub fn get_mut_nnz(&mut self, nnz: usize) -> &mut f64 {
        &mut self.values[nnz]
    }

    pub fn get_mut_imag(&mut self, nnz: usize) -> &mut f64 {
        &mut self.imag[nnz]
    }

    /// Zero both parts, keeping the pattern.
    pub fn clear(&mut self) {
        self.values.fill(0.0);
        self.imag.fill(0.0);
    }
}
