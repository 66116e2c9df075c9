//! Multipart chunk transport over `reqwest`.

use chunkdrop_upload::{ChunkMeta, ChunkTransport, SendFuture, TransportError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Upload endpoint of the reference receiver.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/upload";

/// Multipart field carrying the chunk bytes.
const CHUNK_FIELD: &str = "chunk";

/// Errors from building an [`HttpTransport`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

/// Sends chunks to a fixed endpoint, one `POST` per chunk.
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpTransport {
    /// Creates a transport posting to `endpoint`.
    pub fn new(endpoint: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder().build()?;
        Self::with_client(http, endpoint)
    }

    /// Creates a transport reusing an existing client.
    pub fn with_client(http: reqwest::Client, endpoint: &str) -> Result<Self, Error> {
        let url = reqwest::Url::parse(endpoint).map_err(|e| Error::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        Ok(Self {
            http,
            endpoint: url,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    async fn post_chunk(&self, meta: ChunkMeta, data: Vec<u8>) -> Result<(), TransportError> {
        let headers = chunk_headers(&meta)?;
        let part = Part::bytes(data)
            .file_name(meta.file_name.clone())
            .mime_str("application/octet-stream")
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let form = Form::new().part(CHUNK_FIELD, part);

        let resp = self
            .http
            .post(self.endpoint.clone())
            .headers(headers)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            file = %meta.file_name,
            chunk = meta.chunk_index,
            total = meta.total_chunks,
            status = status.as_u16(),
            "chunk accepted"
        );
        Ok(())
    }
}

impl ChunkTransport for HttpTransport {
    fn send_chunk(
        &self,
        meta: ChunkMeta,
        data: Vec<u8>,
        cancel: CancellationToken,
    ) -> SendFuture<'_> {
        Box::pin(async move {
            // Dropping the request future closes the connection.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(TransportError::Aborted),
                res = self.post_chunk(meta, data) => res,
            }
        })
    }
}

/// File names may carry non-ASCII bytes, which `from_bytes` passes through.
fn chunk_headers(meta: &ChunkMeta) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();
    for (name, value) in meta.headers() {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(format!("{name}: {e}")))?;
        let value = HeaderValue::from_bytes(value.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(format!("{name} header: {e}")))?;
        headers.insert(header, value);
    }
    Ok(headers)
}
