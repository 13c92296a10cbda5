use mcx_dynamics::EvalError;
use mcx_syntax::DefinitionLocation;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("unexpected hole during staging")]
    UnexpectedHole,
    #[error("type alias `{0}` never reaches a type")]
    CyclicAlias(DefinitionLocation),
}

impl StageError {
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            | StageError::Eval(err) => err.is_invariant_violation(),
            | StageError::UnexpectedHole | StageError::CyclicAlias(_) => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, StageError>;
