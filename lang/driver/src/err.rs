use mcx_lift::LiftError;
use mcx_pack::PackError;
use mcx_staging::StageError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("staging: {0}")]
    StageError(#[from] StageError),
    #[error("lifting: {0}")]
    LiftError(#[from] LiftError),
    #[error("packing: {0}")]
    PackError(#[from] PackError),
}

impl BuildError {
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            | BuildError::StageError(err) => err.is_invariant_violation(),
            | BuildError::LiftError(err) => err.is_invariant_violation(),
            | BuildError::PackError(err) => err.is_invariant_violation(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
