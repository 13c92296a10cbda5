use mcx_syntax::packed::StackKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PackError {
    #[error("variable `{0}` has no slot on the stacks")]
    UnresolvedVariable(String),
    #[error("the {0} stack has no such slot")]
    StackUnderflow(StackKind),
    #[error("not yet supported: {0}")]
    Unsupported(String),
    #[error("`{location}` leaves {found} {kind} slots instead of {expected}")]
    ShapeMismatch { location: String, kind: StackKind, expected: usize, found: usize },
}

impl PackError {
    /// Everything but the acknowledged gaps is a defect of an earlier phase.
    pub fn is_invariant_violation(&self) -> bool {
        !matches!(self, PackError::Unsupported(_))
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
