//! HTTP transport for chunked uploads.
//!
//! Each chunk is a `POST` with a single multipart part named `chunk` and
//! the `X-File-Name`, `X-File-Size`, `X-Chunk-Index` and `X-Total-Chunks`
//! headers. Any 2xx response acknowledges the chunk.

pub mod transport;

pub use transport::{DEFAULT_ENDPOINT, Error, HttpTransport};
