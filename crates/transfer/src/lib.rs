//! Chunk segmentation for sequential file uploads.
//!
//! A [`FileSource`] is split into an ordered, lazy sequence of [`Chunk`]s by
//! [`segment`]. Only one chunk's bytes are held in memory at a time.

mod chunked;
mod progress;
mod source;
mod types;

pub use chunked::{Segments, segment, total_chunks};
pub use progress::percent_complete;
pub use source::{FileSource, LocalFile, MemorySource, ReadFuture};
pub use types::Chunk;

/// Default chunk size: 5 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 5 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read chunk {index}: {source}")]
    ChunkRead {
        index: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}
