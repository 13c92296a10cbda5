use mcx_syntax::DefinitionLocation;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("unexpected hole during evaluation")]
    UnexpectedHole,
    #[error("no native implementation registered for builtin `{0}`")]
    MissingBuiltin(DefinitionLocation),
    #[error("`{0}` is called but is not a function")]
    NotAFunction(DefinitionLocation),
    #[error("a value depends on itself")]
    CyclicValue,
    #[error("cannot read back {value} at type {ty}")]
    IllTyped { value: String, ty: String },
}

impl EvalError {
    /// Defects of an earlier phase, as opposed to failures of this one.
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            | EvalError::UnexpectedHole
            | EvalError::MissingBuiltin(_)
            | EvalError::NotAFunction(_)
            | EvalError::IllTyped { .. } => true,
            | EvalError::CyclicValue => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
