use thiserror::Error;

use crate::matrix::error::MatrixError;

#[derive(Debug, Error)]
pub enum JfetError {
    #[error("bad parameter: {param}")]
    BadParameter { param: String },

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("instance {instance} has not been set up")]
    NotSetUp { instance: String },

    #[error("instance {instance} has no distortion coefficients")]
    DistortionNotSetUp { instance: String },

    #[error("no such device: {name}")]
    UnknownDevice { name: String },
}

impl JfetError {
    pub(crate) fn bad_parameter(param: impl Into<String>) -> Self {
        Self::BadParameter {
            param: param.into(),
        }
    }
}

pub type JfetResult<T> = Result<T, JfetError>;
