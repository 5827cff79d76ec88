//! Structured errors raised while loading assets.

use std::{io, path::PathBuf};

use corelib::Attribute;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    /// The source could not be opened or read.
    #[error("Failed to read {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed {what} on line {line}: expected a number, found {found}")]
    MalformedNumber {
        line: usize,
        what: &'static str,
        found: String,
    },

    #[error("Malformed face on line {line}: {defect}")]
    MalformedFace { line: usize, defect: FaceDefect },

    #[error(
        "Face {face} vertex {corner} references {attribute} {index}, but only {len} are defined"
    )]
    IndexOutOfRange {
        face: usize,
        corner: usize,
        attribute: Attribute,
        index: usize,
        len: usize,
    },
}

impl AssetError {
    pub(crate) fn missing_number(line: usize, what: &'static str) -> Self {
        AssetError::MalformedNumber {
            line,
            what,
            found: "end of line".to_string(),
        }
    }

    pub(crate) fn bad_number(line: usize, what: &'static str, token: &str) -> Self {
        AssetError::MalformedNumber {
            line,
            what,
            found: format!("'{token}'"),
        }
    }
}

/// Why a face record was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FaceDefect {
    #[error("expected 3 vertex definitions, found {0}")]
    VertexCount(usize),
    #[error("vertex '{token}' has {found} index components, expected position/texcoord/normal")]
    ComponentCount { token: String, found: usize },
    #[error("vertex '{token}' has an invalid index '{component}'")]
    InvalidIndex { token: String, component: String },
    #[error("vertex '{token}' uses index 0; indices are 1-based")]
    ZeroIndex { token: String },
}

pub type AssetResult<T> = Result<T, AssetError>;
