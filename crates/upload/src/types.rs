//! Data types for the upload flow.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier generated for every upload started.
///
/// Two files sharing a name get distinct identifiers, so one transfer's
/// cancel handle can never overwrite another's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(Uuid);

impl TransferId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Uploading,
    Completed,
    Failed,
    Cancelled,
}

impl TransferStatus {
    /// Returns `true` once the transfer has stopped for any reason.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Uploading)
    }
}

/// What a UI reads back for one transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub id: TransferId,
    pub file_name: String,
    pub file_size: u64,
    pub progress: u8,
    pub status: TransferStatus,
}

/// Outcome of one pipeline run.
///
/// Failures are reported here rather than returned as `Err`.
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub id: TransferId,
    pub file_name: String,
    pub status: TransferStatus,
    /// Last progress percentage applied.
    pub progress: u8,
    /// Chunks acknowledged by the transport.
    pub chunks_sent: u64,
    pub total_chunks: u64,
    pub error: Option<String>,
}

/// Event emitted while uploading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// A transfer was segmented and is about to send its first chunk.
    Started {
        id: TransferId,
        file_name: String,
        file_size: u64,
        total_chunks: u64,
    },
    /// A chunk was acknowledged.
    Progress {
        id: TransferId,
        chunk_index: u64,
        total_chunks: u64,
        progress: u8,
    },
    /// Every chunk was acknowledged.
    Completed { id: TransferId },
    /// The transfer stopped on an error.
    Failed {
        id: TransferId,
        chunk_index: Option<u64>,
        error: String,
    },
    /// The transfer stopped because cancellation was requested.
    Cancelled { id: TransferId, chunk_index: u64 },
}

impl UploadEvent {
    pub fn id(&self) -> TransferId {
        match self {
            Self::Started { id, .. }
            | Self::Progress { id, .. }
            | Self::Completed { id }
            | Self::Failed { id, .. }
            | Self::Cancelled { id, .. } => *id,
        }
    }
}

/// Tunables for an [`Uploader`](crate::Uploader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Maximum chunk size in bytes.
    pub chunk_size: usize,
    /// Capacity of the event channel.
    pub event_buffer: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size: chunkdrop_transfer::DEFAULT_CHUNK_SIZE,
            event_buffer: 256,
        }
    }
}
