use crate::matrix::error::MatrixError;
use crate::matrix::sparse::{CscMatrix, Dim};

#[derive(Debug, Clone, Copy)]
struct CooEntry {
    entry: usize,
    final_index: usize,
    column: usize,
    row: usize,
}

/// Maps builder entry indices to nnz indices of the built pattern.
#[derive(Debug, Clone)]
pub struct EntryMapping(Vec<usize>);

impl EntryMapping {
    pub fn get(&self, index: usize) -> usize {
        self.0[index]
    }
}

/// Collects the (column, row) coordinates devices will stamp into and
/// turns them into a CSC pattern.
///
/// Usage:
///   let mut b = MatrixBuilder::new(n);
///   let e = b.push(column, row)?; ...
///   let (pattern, mapping) = b.build_csc_pattern()?;
///   // mapping.get(e) is the nnz slot of (row, column)
#[derive(Debug)]
pub struct MatrixBuilder {
    dim: Dim,
    /// COO entries in insertion order.
    entries: Vec<CooEntry>,
}

impl MatrixBuilder {
    /// Square builder of dimension `n`.
    pub fn new(n: usize) -> Self {
        Self {
            dim: Dim { nrows: n, ncols: n },
            entries: Vec::new(),
        }
    }

    pub fn reserve(&mut self, nnz: usize) {
        self.entries.reserve(nnz);
    }

    /// push a (column, row) coordinate; duplicates share a slot
    pub fn push(&mut self, column: usize, row: usize) -> Result<usize, MatrixError> {
        if column >= self.dim.ncols {
            return Err(MatrixError::OutOfBoundsIndex {
                index: column,
                max: self.dim.ncols,
            });
        }
        if row >= self.dim.nrows {
            return Err(MatrixError::OutOfBoundsIndex {
                index: row,
                max: self.dim.nrows,
            });
        }

        let entry_index = self.entries.len();
        self.entries.push(CooEntry {
            entry: entry_index,
            final_index: 0, // set by build_csc_pattern
            column,
            row,
        });
        Ok(entry_index)
    }

    pub fn build_csc_pattern(mut self) -> Result<(CscMatrix, EntryMapping), MatrixError> {
        let n = self.dim.ncols;

        self.entries
            .sort_by(|a, b| (a.column, a.row).cmp(&(b.column, b.row)));

        let mut last = None;
        let mut nnz = 0;
        for e in &mut self.entries {
            if last != Some((e.column, e.row)) {
                nnz += 1;
                last = Some((e.column, e.row));
            }
            e.final_index = nnz - 1;
        }

        let mut column_pointers = vec![0usize; n + 1];
        let mut row_indices = vec![0usize; nnz];
        let mut entry_mapping = vec![0usize; self.entries.len()];

        // duplicates share the same `final_index` and are counted once
        let mut last_final_index = usize::MAX;
        for e in &self.entries {
            entry_mapping[e.entry] = e.final_index;
            if e.final_index != last_final_index {
                column_pointers[e.column + 1] += 1;
                row_indices[e.final_index] = e.row;
                last_final_index = e.final_index;
            }
        }

        for j in 0..n {
            column_pointers[j + 1] += column_pointers[j];
        }

        let a = CscMatrix {
            dim: self.dim,
            column_pointers,
            row_indices,
            values: vec![0.0; nnz],
            imag: vec![0.0; nnz],
        };
        a.check_invariants()?;
        Ok((a, EntryMapping(entry_mapping)))
    }
}
