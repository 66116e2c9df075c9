//! Transport trait and the per-chunk wire metadata.
//!
//! `ChunkTransport` is implemented by an HTTP adapter in production and by
//! mocks in tests. It sends exactly one chunk per call.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::error::TransportError;

pub const HEADER_FILE_NAME: &str = "X-File-Name";
pub const HEADER_FILE_SIZE: &str = "X-File-Size";
pub const HEADER_CHUNK_INDEX: &str = "X-Chunk-Index";
pub const HEADER_TOTAL_CHUNKS: &str = "X-Total-Chunks";

/// Future returned by [`ChunkTransport::send_chunk`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>;

/// Identifying metadata sent alongside every chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMeta {
    pub file_name: String,
    /// Total size of the file, not of this chunk.
    pub file_size: u64,
    /// 1-based.
    pub chunk_index: u64,
    pub total_chunks: u64,
}

impl ChunkMeta {
    /// Header name/value pairs in wire order.
    pub fn headers(&self) -> [(&'static str, String); 4] {
        [
            (HEADER_FILE_NAME, self.file_name.clone()),
            (HEADER_FILE_SIZE, self.file_size.to_string()),
            (HEADER_CHUNK_INDEX, self.chunk_index.to_string()),
            (HEADER_TOTAL_CHUNKS, self.total_chunks.to_string()),
        ]
    }
}

/// Sends one chunk to the remote endpoint.
///
/// Implementations must resolve with [`TransportError::Aborted`] promptly
/// once `cancel` is triggered. Any non-success response is an error.
pub trait ChunkTransport: Send + Sync {
    fn send_chunk(
        &self,
        meta: ChunkMeta,
        data: Vec<u8>,
        cancel: CancellationToken,
    ) -> SendFuture<'_>;
}
