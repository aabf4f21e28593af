//! Graph-layer error types.

use crate::graph::id::ElementId;
use crate::graph::socket::SocketKind;
use thiserror::Error;

/// Recoverable failures of element and package operations.
///
/// Caller contract violations (wiring a nonexistent socket, touching a freed
/// slot) panic instead; `Package::try_connect` reports the wiring ones here
/// for callers that build graphs from untrusted input.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Element already has the maximum of {max} {kind}s")]
    SocketLimit { kind: SocketKind, max: u8 },

    #[error("Invalid {kind} bounds: min {min} > max {max}")]
    InvalidBounds { kind: SocketKind, min: u8, max: u8 },

    #[error("Unknown element type '{0}'")]
    UnknownElementType(String),

    #[error("Unknown element {0:?}")]
    UnknownElement(ElementId),

    #[error("Element {id:?} has no {kind} socket {socket} (count {count})")]
    SocketOutOfRange {
        id: ElementId,
        kind: SocketKind,
        socket: u8,
        count: usize,
    },

    #[error("Package {0:?} boundary inputs are fed by its owner")]
    Detached(ElementId),

    #[error("Package has no registry attached")]
    NoRegistry,

    #[error("External package '{0}' is not registered")]
    ExternalPackageNotFound(String),

    #[error("External package '{0}' includes itself")]
    RecursivePackage(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;
