use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::helpers::Role;

/// Errors raised by the protocol suite. Precondition failures are reported
/// synchronously, before any engine round trip starts.
#[derive(Error, Debug)]
pub enum Error {
    #[error("bridging sharing passed where a standard sharing is required")]
    InvalidDtype,
    #[error(transparent)]
    ShapeMismatch(#[from] ShapeError),
    #[error("field moduli disagree: {0} vs {1}")]
    FieldMismatch(i128, i128),
    #[error("operands are held by different role sets")]
    RoleMismatch,
    #[error("{0} holds no share of this value")]
    NotAHolder(Role),
}

#[derive(Debug, PartialEq, Eq)]
pub struct ShapeError {
    pub expected: Vec<usize>,
    pub actual: Vec<usize>,
}

impl Display for ShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "expected a tensor of shape {:?}, got {:?}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for ShapeError {}

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
