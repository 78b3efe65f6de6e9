use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    #[error("out of bounds index: {index} (max: {max})")]
    OutOfBoundsIndex { index: usize, max: usize },

    #[error("invalid column pointers: {index} (expected: {expected}, actual: {actual})")]
    InvalidColumnPointers {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("rows not strictly increasing: {index} (expected: {expected}, actual: {actual})")]
    RowsNotStrictlyIncreasing {
        index: usize,
        expected: usize,
        actual: usize,
    },
}
