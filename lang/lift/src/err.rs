use mcx_syntax::{DefinitionLocation, packed::StackKind, typed::Annotation};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiftError {
    #[error("unexpected hole during lifting")]
    UnexpectedHole,
    #[error("quote or splice left after staging")]
    UnexpectedStaging,
    #[error("type `{0}` has no runtime representation")]
    UnexpectedType(String),
    #[error("annotation {0:?} cannot reach lifting")]
    UnexpectedAnnotation(Annotation),
    #[error("variable `{0}` is not in scope")]
    UnresolvedVariable(String),
    #[error("definition `{0}` does not exist")]
    UnresolvedDefinition(DefinitionLocation),
    #[error("conditional branches occupy {found:?} but the conditional occupies {expected:?}")]
    BranchShapeMismatch { expected: Vec<StackKind>, found: Vec<StackKind> },
}

impl LiftError {
    pub fn is_invariant_violation(&self) -> bool {
        !matches!(self, LiftError::UnexpectedType(_))
    }
}

pub type Result<T> = std::result::Result<T, LiftError>;
