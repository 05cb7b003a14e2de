//! Install/activate lifecycle and version transitions.
//!
//! State machine: `Installing -> Installed (waiting) -> Activating ->
//! Activated (controlling)`, with `InstallFailed` terminal. A broken new
//! version must never replace a working old one, so activation refuses to
//! run after a failed install and stale-store purge happens only here,
//! never during normal operation.

use std::sync::Arc;

use tokio::sync::Mutex;
use url::Url;
use waylay_core::{CacheDb, Error, StoreNames};

use crate::channels::BroadcastMessage;
use crate::clients::ClientRegistry;
use crate::request::EngineRequest;
use crate::transport::NetworkTransport;

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    /// Installed and waiting to take over.
    Installed,
    Activating,
    /// Controlling all clients.
    Activated,
    /// Terminal; activation is refused.
    InstallFailed,
}

/// Brings the engine from uninstalled to controlling and manages version
/// transitions.
pub struct LifecycleManager {
    db: CacheDb,
    transport: Arc<dyn NetworkTransport>,
    clients: Arc<dyn ClientRegistry>,
    stores: StoreNames,
    origin: Url,
    version: String,
    precache_assets: Vec<String>,
    state: Mutex<WorkerState>,
}

impl LifecycleManager {
    pub fn new(
        db: CacheDb, transport: Arc<dyn NetworkTransport>, clients: Arc<dyn ClientRegistry>, origin: Url,
        version: &str, precache_assets: Vec<String>,
    ) -> Self {
        Self {
            db,
            transport,
            clients,
            stores: StoreNames::for_version(version),
            origin,
            version: version.to_string(),
            precache_assets,
            state: Mutex::new(WorkerState::Installing),
        }
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.lock().await
    }

    /// Provision the precache store and write the shell assets into it.
    ///
    /// A missing non-critical asset must not block offline capability:
    /// individual fetch failures are logged and skipped. Only a store-level
    /// write failure marks the install as failed.
    pub async fn install(&self) -> Result<(), Error> {
        *self.state.lock().await = WorkerState::Installing;
        tracing::info!(version = %self.version, assets = self.precache_assets.len(), "installing");

        for asset in &self.precache_assets {
            let url = match self.origin.join(asset) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(asset, error = %e, "skipping unresolvable precache asset");
                    continue;
                }
            };

            let request = EngineRequest::get(url.clone());
            match self.transport.fetch(&request).await {
                Ok(response) if response.is_success() => {
                    if let Err(e) = self
                        .db
                        .put_entry(&self.stores.precache, "GET", url.as_str(), &response.to_stored())
                        .await
                    {
                        *self.state.lock().await = WorkerState::InstallFailed;
                        return Err(Error::InstallFailed(format!("precache store write failed: {e}")));
                    }
                }
                Ok(response) => {
                    tracing::warn!(asset, status = response.status, "precache asset returned error status, skipping");
                }
                Err(e) => {
                    tracing::warn!(asset, error = %e, "precache asset fetch failed, skipping");
                }
            }
        }

        *self.state.lock().await = WorkerState::Installed;
        self.clients
            .broadcast(&BroadcastMessage::UpdateAvailable { version: self.version.clone() })
            .await;
        tracing::info!(version = %self.version, "installed, waiting");
        Ok(())
    }

    /// Purge stale store versions and take over all open clients.
    ///
    /// Refused after a failed install; the previous version remains
    /// authoritative.
    pub async fn activate(&self) -> Result<(), Error> {
        {
            let mut state = self.state.lock().await;
            if *state == WorkerState::InstallFailed {
                return Err(Error::InstallFailed("install failed; previous version remains active".into()));
            }
            *state = WorkerState::Activating;
        }

        match self.purge_stale_stores().await {
            Ok(purged) => {
                tracing::info!(version = %self.version, purged, "purged stale store versions");
            }
            Err(e) => {
                // Fatal to this version only; fall back to waiting.
                *self.state.lock().await = WorkerState::Installed;
                return Err(e);
            }
        }

        self.clients.claim_all().await;
        *self.state.lock().await = WorkerState::Activated;
        tracing::info!(version = %self.version, "activated, controlling clients");
        Ok(())
    }

    /// Handle the shell's "activate now" command: a waiting version takes
    /// control immediately; in any other state the command is a no-op.
    pub async fn activate_now(&self) -> Result<(), Error> {
        if self.state().await != WorkerState::Installed {
            tracing::debug!("activate-now ignored: no waiting version");
            return Ok(());
        }
        self.activate().await
    }

    async fn purge_stale_stores(&self) -> Result<u64, Error> {
        let mut purged = 0;
        for name in self.db.list_stores().await? {
            if !self.stores.contains(&name) {
                purged += self.db.delete_store(&name).await?;
                tracing::debug!(store = %name, "deleted stale store");
            }
        }
        Ok(purged)
    }

    #[cfg(test)]
    pub(crate) async fn force_state(&self, state: WorkerState) {
        *self.state.lock().await = state;
    }
}
