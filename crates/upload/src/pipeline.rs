//! Per-file upload pipeline.
//!
//! Sends one file's chunks strictly in order: chunk N+1 is read only after
//! chunk N's send has resolved. The first failure ends the transfer.
//!
//! Event delivery waits on the same cancel token as the chunk send, so a
//! slow event consumer never keeps a cancelled transfer alive.

use std::sync::Arc;

use chunkdrop_transfer::{FileSource, percent_complete, segment};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{TransportError, UploadError};
use crate::registry::SessionRegistry;
use crate::transport::{ChunkMeta, ChunkTransport};
use crate::types::{TransferId, TransferReport, TransferStatus, UploadEvent};

/// Drives uploads through a transport, recording progress in a registry.
#[derive(Clone)]
pub struct UploadPipeline {
    transport: Arc<dyn ChunkTransport>,
    registry: Arc<SessionRegistry>,
    chunk_size: usize,
    events_tx: Option<mpsc::Sender<UploadEvent>>,
}

/// Progress of one run, kept for the final report.
#[derive(Default)]
struct RunState {
    chunks_sent: u64,
    total_chunks: u64,
    progress: u8,
    /// Token currently registered for the session.
    cancel: CancellationToken,
}

impl UploadPipeline {
    pub fn new(
        transport: Arc<dyn ChunkTransport>,
        registry: Arc<SessionRegistry>,
        chunk_size: usize,
    ) -> Self {
        Self {
            transport,
            registry,
            chunk_size,
            events_tx: None,
        }
    }

    /// Emits [`UploadEvent`]s on `events_tx`.
    pub fn with_events(mut self, events_tx: mpsc::Sender<UploadEvent>) -> Self {
        self.events_tx = Some(events_tx);
        self
    }

    /// Opens a session for `source` and uploads it.
    pub async fn upload(&self, source: &dyn FileSource) -> TransferReport {
        let id = self.registry.start_session(source.name(), source.len());
        self.run(id, source).await
    }

    /// Uploads `source` under a session already opened in the registry.
    pub async fn run(&self, id: TransferId, source: &dyn FileSource) -> TransferReport {
        let file_name = source.name().to_string();
        let mut state = RunState::default();

        let result = self.send_chunks(id, source, &mut state).await;

        let (status, error) = match result {
            Ok(()) => {
                info!(transfer = %id, file = %file_name, chunks = state.chunks_sent, "upload completed");
                self.emit(UploadEvent::Completed { id }, &state.cancel).await;
                (TransferStatus::Completed, None)
            }
            Err(e) if e.is_abort() => {
                let chunk_index = e.chunk_index().unwrap_or(state.chunks_sent + 1);
                warn!(transfer = %id, file = %file_name, chunk = chunk_index, "upload cancelled");
                self.emit(UploadEvent::Cancelled { id, chunk_index }, &state.cancel)
                    .await;
                (TransferStatus::Cancelled, Some(e.to_string()))
            }
            Err(e) => {
                let err_msg = e.to_string();
                error!(
                    transfer = %id,
                    file = %file_name,
                    chunk = ?e.chunk_index(),
                    error = %err_msg,
                    "upload failed"
                );
                self.emit(
                    UploadEvent::Failed {
                        id,
                        chunk_index: e.chunk_index(),
                        error: err_msg.clone(),
                    },
                    &state.cancel,
                )
                .await;
                (TransferStatus::Failed, Some(err_msg))
            }
        };

        self.registry.finish(id, status);

        TransferReport {
            id,
            file_name,
            status,
            progress: state.progress,
            chunks_sent: state.chunks_sent,
            total_chunks: state.total_chunks,
            error,
        }
    }

    async fn send_chunks(
        &self,
        id: TransferId,
        source: &dyn FileSource,
        state: &mut RunState,
    ) -> Result<(), UploadError> {
        // Session-wide token until the first chunk replaces it.
        self.replace_cancel(id, state, 1)?;

        let mut segments = segment(source, self.chunk_size)?;
        let file_name = source.name().to_string();
        let file_size = segments.file_size();
        state.total_chunks = segments.total_chunks();

        debug!(
            transfer = %id,
            file = %file_name,
            bytes = file_size,
            chunks = state.total_chunks,
            "segmented"
        );
        self.emit(
            UploadEvent::Started {
                id,
                file_name: file_name.clone(),
                file_size,
                total_chunks: state.total_chunks,
            },
            &state.cancel,
        )
        .await;

        if state.total_chunks == 0 {
            self.apply_progress(id, state, 0, 100).await;
            return Ok(());
        }

        while let Some(chunk) = segments.next_chunk().await? {
            let index = chunk.index;

            // Fresh token per attempt; the registry hands it to `cancel`.
            let cancel = self.replace_cancel(id, state, index)?;

            let meta = ChunkMeta {
                file_name: file_name.clone(),
                file_size,
                chunk_index: index,
                total_chunks: chunk.total_chunks,
            };
            let uploaded = chunk.uploaded_bytes;
            let send = self.transport.send_chunk(meta, chunk.data, cancel.clone());

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(TransportError::Aborted),
                res = send => res,
            };

            match outcome {
                Ok(()) => {}
                Err(_) if cancel.is_cancelled() => return Err(UploadError::Aborted { index }),
                Err(TransportError::Aborted) => return Err(UploadError::Aborted { index }),
                Err(source) => return Err(UploadError::ChunkSend { index, source }),
            }

            let percent = percent_complete(uploaded, file_size);
            self.apply_progress(id, state, index, percent).await;
            debug!(transfer = %id, chunk = index, total = state.total_chunks, progress = percent, "chunk sent");
        }

        Ok(())
    }

    /// Registers a fresh token for the session. Fails once it was closed.
    fn replace_cancel(
        &self,
        id: TransferId,
        state: &mut RunState,
        index: u64,
    ) -> Result<CancellationToken, UploadError> {
        let cancel = CancellationToken::new();
        self.registry
            .register_cancel_handle(id, cancel.clone())
            .map_err(|_| UploadError::Aborted { index })?;
        state.cancel = cancel.clone();
        Ok(cancel)
    }

    async fn apply_progress(&self, id: TransferId, state: &mut RunState, index: u64, percent: u8) {
        self.registry.set_progress(id, percent);
        state.chunks_sent = index;
        state.progress = percent;
        let event = UploadEvent::Progress {
            id,
            chunk_index: index,
            total_chunks: state.total_chunks,
            progress: percent,
        };
        self.emit(event, &state.cancel).await;
    }

    /// Sends `event`, waiting for channel capacity until `cancel` fires.
    async fn emit(&self, event: UploadEvent, cancel: &CancellationToken) {
        let Some(tx) = &self.events_tx else {
            return;
        };
        let event = match tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => return,
            Err(TrySendError::Full(event)) => event,
        };
        let id = event.id();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => debug!(transfer = %id, "event dropped after cancel"),
            _ = tx.send(event) => {}
        }
    }
}
