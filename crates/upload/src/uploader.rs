//! Upload front door for one or many files.
//!
//! Owns the session registry, the transport and the event channel. Each file
//! gets its own pipeline run; files proceed concurrently, chunks of one file
//! never do.

use std::sync::Arc;

use chunkdrop_transfer::FileSource;
use futures_util::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::UploadError;
use crate::pipeline::UploadPipeline;
use crate::registry::SessionRegistry;
use crate::transport::ChunkTransport;
use crate::types::{TransferId, TransferRecord, TransferReport, UploadConfig, UploadEvent};

/// Starts uploads and exposes their progress and cancel triggers.
pub struct Uploader {
    transport: Arc<dyn ChunkTransport>,
    registry: Arc<SessionRegistry>,
    config: UploadConfig,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
}

/// A spawned upload.
pub struct UploadHandle {
    id: TransferId,
    task: JoinHandle<TransferReport>,
}

impl UploadHandle {
    pub fn id(&self) -> TransferId {
        self.id
    }

    /// Waits for the upload task to finish.
    pub async fn join(self) -> Result<TransferReport, UploadError> {
        self.task
            .await
            .map_err(|e| UploadError::Task(format!("task join error: {e}")))
    }
}

impl Uploader {
    /// Creates an uploader with a fresh registry.
    pub fn new(transport: Arc<dyn ChunkTransport>, config: UploadConfig) -> Self {
        Self::with_registry(transport, Arc::new(SessionRegistry::new()), config)
    }

    /// Creates an uploader sharing an existing registry.
    pub fn with_registry(
        transport: Arc<dyn ChunkTransport>,
        registry: Arc<SessionRegistry>,
        config: UploadConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(config.event_buffer.max(1));
        Self {
            transport,
            registry,
            config,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// Events are only produced after the receiver has been taken, and the
    /// taker must keep draining it or uploads stall on a full channel.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Uploads one file on the current task.
    pub async fn upload(&self, source: &dyn FileSource) -> TransferReport {
        self.pipeline().upload(source).await
    }

    /// Uploads several files concurrently on the current task.
    ///
    /// Sessions are opened in the order given. Reports come back in the
    /// same order.
    pub async fn upload_all(&self, sources: &[Arc<dyn FileSource>]) -> Vec<TransferReport> {
        if sources.is_empty() {
            return Vec::new();
        }

        let pipeline = self.pipeline();
        let runs: Vec<_> = sources
            .iter()
            .map(|source| {
                let id = self.registry.start_session(source.name(), source.len());
                (id, source)
            })
            .collect();

        info!(files = runs.len(), "starting uploads");
        join_all(
            runs.into_iter()
                .map(|(id, source)| pipeline.run(id, source.as_ref())),
        )
        .await
    }

    /// Spawns an upload on its own tokio task.
    ///
    /// The session is opened before this returns, so the handle's id can be
    /// cancelled immediately.
    pub fn spawn(&self, source: Arc<dyn FileSource>) -> UploadHandle {
        let id = self.registry.start_session(source.name(), source.len());
        let pipeline = self.pipeline();
        let task = tokio::spawn(async move { pipeline.run(id, source.as_ref()).await });
        UploadHandle { id, task }
    }

    /// Cancels a transfer. No-op returning `false` if it is not live.
    pub fn cancel(&self, id: TransferId) -> bool {
        self.registry.cancel(id)
    }

    /// Cancels every live transfer.
    pub fn cancel_all(&self) -> usize {
        self.registry.cancel_all()
    }

    pub fn progress(&self, id: TransferId) -> Option<u8> {
        self.registry.progress(id)
    }

    pub fn transfers(&self) -> Vec<TransferRecord> {
        self.registry.transfers()
    }

    fn pipeline(&self) -> UploadPipeline {
        let pipeline = UploadPipeline::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.registry),
            self.config.chunk_size,
        );
        if self.events_rx.is_none() {
            pipeline.with_events(self.events_tx.clone())
        } else {
            pipeline
        }
    }
}
