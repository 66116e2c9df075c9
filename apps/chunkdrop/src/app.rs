//! Wires the HTTP transport, the uploader and progress reporting together.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chunkdrop_http::HttpTransport;
use chunkdrop_transfer::{FileSource, LocalFile};
use chunkdrop_upload::{TransferId, TransferReport, TransferStatus, UploadEvent, Uploader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Config;

/// Result of one invocation.
#[derive(Debug)]
pub struct Outcome {
    /// One report per file that could be opened, in argument order.
    pub reports: Vec<TransferReport>,
    /// Paths that could not be opened.
    pub skipped: Vec<PathBuf>,
}

impl Outcome {
    /// Files that were skipped or did not complete.
    pub fn failures(&self) -> usize {
        self.skipped.len()
            + self
                .reports
                .iter()
                .filter(|r| r.status != TransferStatus::Completed)
                .count()
    }

    /// Fails unless every requested file was uploaded.
    pub fn ensure_success(&self) -> anyhow::Result<()> {
        let failed = self.failures();
        if failed > 0 {
            let total = self.reports.len() + self.skipped.len();
            anyhow::bail!("{failed} of {total} uploads did not complete");
        }
        Ok(())
    }
}

/// Uploads every path that can be opened.
///
/// Ctrl-C cancels every live transfer; the call still returns once the
/// pipelines have wound down.
pub async fn run(config: Config, paths: Vec<PathBuf>) -> anyhow::Result<Outcome> {
    let transport = Arc::new(HttpTransport::new(&config.endpoint)?);
    let mut uploader = Uploader::new(transport, config.upload_config());
    let events_rx = uploader
        .take_events()
        .ok_or_else(|| anyhow::anyhow!("event receiver already taken"))?;

    let mut sources: Vec<Arc<dyn FileSource>> = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();
    for path in paths {
        match LocalFile::open(&path).await {
            Ok(file) => sources.push(Arc::new(file)),
            Err(e) => {
                error!(path = %path.display(), error = %e, "skipping file");
                skipped.push(path);
            }
        }
    }

    info!(
        endpoint = %config.endpoint,
        files = sources.len(),
        chunk_size = config.chunk_size,
        "uploading"
    );

    let reporter = tokio::spawn(report_events(events_rx));

    let reports = {
        let uploads = uploader.upload_all(&sources);
        tokio::pin!(uploads);

        let mut interrupted = false;
        loop {
            tokio::select! {
                reports = &mut uploads => break reports,
                res = tokio::signal::ctrl_c(), if !interrupted => {
                    interrupted = true;
                    match res {
                        Ok(()) => {
                            let cancelled = uploader.cancel_all();
                            warn!(cancelled, "interrupted, cancelling uploads");
                        }
                        Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
                    }
                }
            }
        }
    };

    let pruned = uploader.registry().prune_finished();
    debug!(pruned, "finished transfers cleared");

    // Closing the last sender ends the reporter.
    drop(uploader);
    let _ = reporter.await;

    Ok(Outcome { reports, skipped })
}

/// Logs upload events until the channel closes.
async fn report_events(mut events_rx: mpsc::Receiver<UploadEvent>) {
    let mut names: HashMap<TransferId, String> = HashMap::new();

    while let Some(event) = events_rx.recv().await {
        let id = event.id();
        let name = names.get(&id).cloned().unwrap_or_default();
        match event {
            UploadEvent::Started {
                file_name,
                file_size,
                total_chunks,
                ..
            } => {
                info!(file = %file_name, bytes = file_size, chunks = total_chunks, "started");
                names.insert(id, file_name);
            }
            UploadEvent::Progress {
                chunk_index,
                total_chunks,
                progress,
                ..
            } => {
                info!(file = %name, chunk = chunk_index, total = total_chunks, "{progress}%");
            }
            UploadEvent::Completed { .. } => {
                info!(file = %name, "completed");
            }
            UploadEvent::Failed {
                chunk_index, error, ..
            } => {
                error!(file = %name, chunk = ?chunk_index, error = %error, "failed");
            }
            UploadEvent::Cancelled { chunk_index, .. } => {
                warn!(file = %name, chunk = chunk_index, "cancelled");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: TransferStatus) -> TransferReport {
        TransferReport {
            id: TransferId::new(),
            file_name: "f.bin".into(),
            status,
            progress: 0,
            chunks_sent: 0,
            total_chunks: 1,
            error: None,
        }
    }

    #[test]
    fn counts_incomplete_reports() {
        let outcome = Outcome {
            reports: vec![
                report(TransferStatus::Completed),
                report(TransferStatus::Failed),
                report(TransferStatus::Cancelled),
            ],
            skipped: Vec::new(),
        };
        assert_eq!(outcome.failures(), 2);
        assert!(outcome.ensure_success().is_err());
    }

    #[test]
    fn all_completed_is_success() {
        let outcome = Outcome {
            reports: vec![report(TransferStatus::Completed)],
            skipped: Vec::new(),
        };
        assert_eq!(outcome.failures(), 0);
        assert!(outcome.ensure_success().is_ok());
    }

    #[tokio::test]
    async fn missing_files_count_as_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            endpoint: "http://127.0.0.1:9/upload".into(),
            ..Config::default()
        };

        let missing = vec![tmp.path().join("a.bin"), tmp.path().join("b.bin")];

        let outcome = run(config, missing.clone()).await.unwrap();
        assert!(outcome.reports.is_empty());
        assert_eq!(outcome.skipped, missing);
        assert_eq!(outcome.failures(), 2);

        let err = outcome.ensure_success().unwrap_err();
        assert_eq!(err.to_string(), "2 of 2 uploads did not complete");
    }

    #[tokio::test]
    async fn empty_file_completes_without_server() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.txt");
        std::fs::write(&path, b"").unwrap();
        let config = Config {
            endpoint: "http://127.0.0.1:9/upload".into(),
            ..Config::default()
        };

        let outcome = run(config, vec![path]).await.unwrap();
        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.reports[0].status, TransferStatus::Completed);
        assert_eq!(outcome.reports[0].progress, 100);
        assert!(outcome.ensure_success().is_ok());
    }
}
