use std::{
    io,
    num::{ParseFloatError, ParseIntError},
    string::FromUtf8Error,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid ascii data: {0}")]
    InvalidAscii(#[from] FromUtf8Error),

    #[error("Invalid PLY header: {0}")]
    InvalidHeader(String),

    #[error("Unsupported PLY format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Face element declared without a 'vertex_indices' or 'vertex_index' list property")]
    MissingFaceIndices,

    #[error("Unsupported element '{0}' precedes vertex or face data")]
    UnsupportedElement(String),

    #[error("Unexpected end of data in {element} record {index}")]
    Truncated { element: String, index: usize },

    #[error("Invalid token '{token}' in face {face}")]
    InvalidFace { face: usize, token: String },

    #[error("Face {face} references vertex {index}, but only {vertex_count} vertices exist")]
    IndexOutOfRange {
        face: usize,
        index: i64,
        vertex_count: usize,
    },

    #[error("Error parsing integer: {0}")]
    ParseIntError(#[from] ParseIntError),

    #[error("Error parsing float: {0}")]
    ParseFloatError(#[from] ParseFloatError),

    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

impl Error {
    /// Attaches the record position to an end-of-stream error. Other errors
    /// pass through untouched.
    pub(crate) fn in_record(self, element: &str, index: usize) -> Self {
        match self {
            Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => Error::Truncated {
                element: element.to_string(),
                index,
            },
            other => other,
        }
    }
}
