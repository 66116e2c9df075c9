//! Upload error types.

use chunkdrop_transfer::TransferError;

use crate::types::TransferId;

/// Failure reported by a [`ChunkTransport`](crate::ChunkTransport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server rejected chunk with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("aborted")]
    Aborted,
}

/// Errors from [`SessionRegistry`](crate::SessionRegistry) mutations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("session closed: {0}")]
    SessionClosed(TransferId),
}

/// Errors that terminate one file's upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("chunk {index} upload error: {source}")]
    ChunkSend {
        index: u64,
        #[source]
        source: TransportError,
    },

    #[error("chunk {index} aborted")]
    Aborted { index: u64 },

    #[error("upload task failed: {0}")]
    Task(String),
}

impl UploadError {
    /// Index of the chunk that failed, if the failure is tied to one.
    pub fn chunk_index(&self) -> Option<u64> {
        match self {
            Self::Transfer(TransferError::ChunkRead { index, .. }) => Some(*index),
            Self::ChunkSend { index, .. } | Self::Aborted { index } => Some(*index),
            _ => None,
        }
    }

    /// Returns `true` if the upload stopped because cancellation was requested.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}
