//! Live transfer sessions and their read-back records.
//!
//! The registry is owned by whoever drives uploads (usually an
//! [`Uploader`](crate::Uploader)) and shared with pipelines through `Arc`.
//! Records outlive their sessions so a UI can still show the final state.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::RegistryError;
use crate::types::{TransferId, TransferRecord, TransferStatus};

/// Tracks every transfer started (thread-safe).
#[derive(Default)]
pub struct SessionRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    /// Arrival order; duplicate names are kept.
    records: Vec<TransferRecord>,
    /// Live sessions -> cancel handle of the chunk in flight.
    live: HashMap<TransferId, Option<CancellationToken>>,
}

impl RegistryInner {
    fn record_mut(&mut self, id: TransferId) -> Option<&mut TransferRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for a newly dropped file.
    pub fn start_session(&self, file_name: &str, file_size: u64) -> TransferId {
        let id = TransferId::new();
        let mut s = self.inner.write().unwrap();
        s.records.push(TransferRecord {
            id,
            file_name: file_name.to_string(),
            file_size,
            progress: 0,
            status: TransferStatus::Uploading,
        });
        s.live.insert(id, None);
        debug!(transfer = %id, file = %file_name, "session started");
        id
    }

    /// Installs the cancel handle for the chunk about to be sent.
    ///
    /// Replaces the previous chunk's handle. Fails if the session was
    /// cancelled or finished in the meantime.
    pub fn register_cancel_handle(
        &self,
        id: TransferId,
        handle: CancellationToken,
    ) -> Result<(), RegistryError> {
        let mut s = self.inner.write().unwrap();
        match s.live.get_mut(&id) {
            Some(slot) => {
                *slot = Some(handle);
                Ok(())
            }
            None => Err(RegistryError::SessionClosed(id)),
        }
    }

    /// Aborts the chunk in flight and closes the session.
    ///
    /// Returns `false` without side effects if the transfer already
    /// finished or never existed.
    pub fn cancel(&self, id: TransferId) -> bool {
        let mut s = self.inner.write().unwrap();
        let Some(handle) = s.live.remove(&id) else {
            return false;
        };
        if let Some(token) = handle {
            token.cancel();
        }
        if let Some(record) = s.record_mut(id) {
            record.status = TransferStatus::Cancelled;
        }
        info!(transfer = %id, "cancellation requested");
        true
    }

    /// Cancels every live session for `file_name`. Returns how many.
    pub fn cancel_by_name(&self, file_name: &str) -> usize {
        let ids: Vec<TransferId> = {
            let s = self.inner.read().unwrap();
            s.records
                .iter()
                .filter(|r| r.file_name == file_name && s.live.contains_key(&r.id))
                .map(|r| r.id)
                .collect()
        };
        ids.into_iter().filter(|id| self.cancel(*id)).count()
    }

    /// Cancels every live session. Returns how many.
    pub fn cancel_all(&self) -> usize {
        let ids: Vec<TransferId> = {
            let s = self.inner.read().unwrap();
            s.live.keys().copied().collect()
        };
        ids.into_iter().filter(|id| self.cancel(*id)).count()
    }

    /// Overwrites the stored progress percentage.
    pub fn set_progress(&self, id: TransferId, percent: u8) {
        let mut s = self.inner.write().unwrap();
        if let Some(record) = s.record_mut(id) {
            record.progress = percent.min(100);
        }
    }

    /// Closes the session and stores its terminal status.
    pub fn finish(&self, id: TransferId, status: TransferStatus) {
        let mut s = self.inner.write().unwrap();
        s.live.remove(&id);
        if let Some(record) = s.record_mut(id) {
            record.status = status;
        }
    }

    /// Drops the records of finished transfers. Returns how many.
    pub fn prune_finished(&self) -> usize {
        let mut s = self.inner.write().unwrap();
        let before = s.records.len();
        s.records.retain(|r| !r.status.is_terminal());
        before - s.records.len()
    }

    /// Last progress percentage recorded for `id`.
    pub fn progress(&self, id: TransferId) -> Option<u8> {
        let s = self.inner.read().unwrap();
        s.records.iter().find(|r| r.id == id).map(|r| r.progress)
    }

    /// Snapshot of one transfer.
    pub fn record(&self, id: TransferId) -> Option<TransferRecord> {
        let s = self.inner.read().unwrap();
        s.records.iter().find(|r| r.id == id).cloned()
    }

    /// Snapshot of every transfer, in arrival order.
    pub fn transfers(&self) -> Vec<TransferRecord> {
        let s = self.inner.read().unwrap();
        s.records.clone()
    }

    /// Returns `true` while the session is open.
    pub fn is_active(&self, id: TransferId) -> bool {
        let s = self.inner.read().unwrap();
        s.live.contains_key(&id)
    }

    /// Number of open sessions.
    pub fn active_count(&self) -> usize {
        let s = self.inner.read().unwrap();
        s.live.len()
    }
}
