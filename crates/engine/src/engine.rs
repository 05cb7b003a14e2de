//! The engine facade: one method per lifecycle hook.
//!
//! A single `Engine` instance is injected at startup and owns everything
//! the hooks need; there is no global mutable handler state. The host
//! platform wires its install/activate/fetch/message/push/sync events to
//! the corresponding `on_*` method.

use std::sync::Arc;

use url::Url;
use waylay_core::{CacheDb, EngineConfig, Error, RouteTable, StoreNames};

use crate::channels::{self, ControlMessage, Notification, NotificationSink, PushPayload, SyncFlush};
use crate::clients::ClientRegistry;
use crate::lifecycle::{LifecycleManager, WorkerState};
use crate::request::EngineRequest;
use crate::strategies::{self, FetchOutcome, StrategyContext};
use crate::supervisor::Supervisor;
use crate::transport::NetworkTransport;

/// The request-interception engine.
pub struct Engine {
    routes: RouteTable,
    db: CacheDb,
    transport: Arc<dyn NetworkTransport>,
    clients: Arc<dyn ClientRegistry>,
    supervisor: Supervisor,
    lifecycle: LifecycleManager,
    sync_hook: Arc<dyn SyncFlush>,
    notifications: Arc<dyn NotificationSink>,
    stores: StoreNames,
    origin: Url,
}

impl Engine {
    /// Build an engine from configuration and its collaborators.
    pub fn new(
        config: &EngineConfig, db: CacheDb, transport: Arc<dyn NetworkTransport>, clients: Arc<dyn ClientRegistry>,
        sync_hook: Arc<dyn SyncFlush>, notifications: Arc<dyn NotificationSink>,
    ) -> Result<Self, Error> {
        let routes = RouteTable::compile(config)?;
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let stores = StoreNames::for_version(&config.version);
        let lifecycle = LifecycleManager::new(
            db.clone(),
            Arc::clone(&transport),
            Arc::clone(&clients),
            origin.clone(),
            &config.version,
            config.precache_assets.clone(),
        );

        Ok(Self {
            routes,
            db,
            transport,
            clients,
            supervisor: Supervisor::new(),
            lifecycle,
            sync_hook,
            notifications,
            stores,
            origin,
        })
    }

    /// Install hook: provision the precache store.
    pub async fn on_install(&self) -> Result<(), Error> {
        self.lifecycle.install().await
    }

    /// Activate hook: purge stale versions and claim clients.
    pub async fn on_activate(&self) -> Result<(), Error> {
        self.lifecycle.activate().await
    }

    /// Fetch hook: classify and serve, or pass the request through.
    pub async fn on_fetch(&self, request: &EngineRequest) -> Result<FetchOutcome, Error> {
        let ctx = StrategyContext {
            db: &self.db,
            transport: &self.transport,
            stores: &self.stores,
            supervisor: &self.supervisor,
        };
        strategies::dispatch(&self.routes, &ctx, request).await
    }

    /// Control-message hook.
    pub async fn on_message(&self, message: ControlMessage) -> Result<(), Error> {
        match message {
            ControlMessage::ActivateNow => self.lifecycle.activate_now().await,
        }
    }

    /// Push hook: display a notification built from the payload.
    pub async fn on_push(&self, payload: &[u8]) -> Result<(), Error> {
        let notification = Notification::from_push(PushPayload::parse(payload));
        self.notifications.show(notification).await
    }

    /// Sync hook: the reserved tag triggers one flush of pending
    /// operations; its failure is logged, never retried here.
    pub async fn on_sync(&self, tag: &str) {
        if tag != channels::SYNC_FLUSH_TAG {
            tracing::debug!(tag, "ignoring unknown sync tag");
            return;
        }
        if let Err(e) = self.sync_hook.flush_pending().await {
            tracing::warn!(error = %e, "flush of pending operations failed");
        }
    }

    /// Notification-click hook: "open" focuses or opens the app root.
    pub async fn on_notification_click(&self, action: &str) {
        if action == "open" {
            self.clients.open_or_focus(&self.origin).await;
        }
    }

    pub async fn state(&self) -> WorkerState {
        self.lifecycle.state().await
    }

    /// Background-task tracker, exposed so hosts can await quiescence on
    /// shutdown.
    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }
}
