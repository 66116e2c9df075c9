//! Sequential chunked uploads with progress tracking and cancellation.
//!
//! This crate holds the **engine**: it has no HTTP dependency. The caller
//! supplies a [`ChunkTransport`] implementation that performs the actual
//! network send, which keeps the pipeline testable with mocks.
//!
//! # Pipeline
//!
//! 1. **Start**: open a session in the [`SessionRegistry`]
//! 2. **Segment**: read the next chunk from the file source
//! 3. **Send**: hand the chunk to the transport with a fresh cancel token
//! 4. **Progress**: record `round(uploaded / size * 100)`, held below 100 until the last chunk
//! 5. **Finish**: close the session as completed, failed or cancelled

pub mod error;
pub mod pipeline;
pub mod registry;
pub mod transport;
pub mod types;
pub mod uploader;

pub use error::{RegistryError, TransportError, UploadError};
pub use pipeline::UploadPipeline;
pub use registry::SessionRegistry;
pub use transport::{
    ChunkMeta, ChunkTransport, HEADER_CHUNK_INDEX, HEADER_FILE_NAME, HEADER_FILE_SIZE,
    HEADER_TOTAL_CHUNKS, SendFuture,
};
pub use types::{
    TransferId, TransferRecord, TransferReport, TransferStatus, UploadConfig, UploadEvent,
};
pub use uploader::{UploadHandle, Uploader};
