use std::fmt;
use std::path::PathBuf;

/// The two record shapes an IDX file can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdxKind {
    Images,
    Labels,
}

impl IdxKind {
    pub fn magic_number(self) -> u32 {
        match self {
            IdxKind::Images => 2051,
            IdxKind::Labels => 2049,
        }
    }
}

impl fmt::Display for IdxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdxKind::Images => write!(f, "image"),
            IdxKind::Labels => write!(f, "label"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid magic number for {kind} file: expected {expected}, found {found}")]
    Format {
        kind: IdxKind,
        expected: u32,
        found: u32,
    },

    #[error("expected {expected} {kind} records, but found {found}")]
    CountMismatch {
        kind: IdxKind,
        expected: u32,
        found: u32,
    },

    #[error("truncated {kind} file: expected {expected} bytes, got {got}")]
    TruncatedInput {
        kind: IdxKind,
        expected: u64,
        got: u64,
    },

    #[error("label {index} has value {value}, which is not a digit")]
    LabelOutOfRange { index: usize, value: u8 },

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
