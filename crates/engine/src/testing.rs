//! Test doubles shared across the crate's unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;
use waylay_core::{CacheDb, EngineConfig, Error, RouteTable, StoreNames, StoredResponse};

use crate::channels::{Notification, NotificationSink, SyncFlush};
use crate::request::EngineRequest;
use crate::response::{ResponseSource, ServedResponse};
use crate::strategies::StrategyContext;
use crate::supervisor::Supervisor;
use crate::transport::NetworkTransport;

/// Scripted transport: responses and failures by exact URL, with a log of
/// every fetch.
#[derive(Default)]
pub(crate) struct MockTransport {
    scripted: Mutex<HashMap<String, Result<ServedResponse, String>>>,
    log: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: u16, content_type: &str, body: &str) {
        let response = ServedResponse {
            status,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: Bytes::from(body.as_bytes().to_vec()),
            source: ResponseSource::Network,
        };
        self.scripted.lock().unwrap().insert(url.to_string(), Ok(response));
    }

    pub fn fail(&self, url: &str, reason: &str) {
        self.scripted.lock().unwrap().insert(url.to_string(), Err(reason.to_string()));
    }

    /// Every URL fetched, in order.
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Number of fetches for one URL.
    pub fn calls(&self, url: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl NetworkTransport for MockTransport {
    async fn fetch(&self, request: &EngineRequest) -> Result<ServedResponse, Error> {
        self.log.lock().unwrap().push(request.url.to_string());
        match self.scripted.lock().unwrap().get(request.url.as_str()) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(reason)) => Err(Error::Network(reason.clone())),
            None => Err(Error::Network(format!("no scripted response for {}", request.url))),
        }
    }
}

/// Sync hook that counts invocations.
#[derive(Default)]
pub(crate) struct RecordingSync {
    pub flushes: AtomicUsize,
    pub fail: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl SyncFlush for RecordingSync {
    async fn flush_pending(&self) -> Result<(), Error> {
        self.flushes.fetch_add(1, Ordering::AcqRel);
        if self.fail.load(Ordering::Acquire) {
            return Err(Error::Network("flush endpoint unreachable".into()));
        }
        Ok(())
    }
}

/// Notification sink that records what would be displayed.
#[derive(Default)]
pub(crate) struct RecordingNotifications {
    pub shown: Mutex<Vec<Notification>>,
}

#[async_trait]
impl NotificationSink for RecordingNotifications {
    async fn show(&self, notification: Notification) -> Result<(), Error> {
        self.shown.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Common fixture for executor and dispatcher tests: in-memory store,
/// scripted transport, default routing rules, version v1.
pub(crate) struct TestHarness {
    pub db: CacheDb,
    pub transport: Arc<MockTransport>,
    pub dyn_transport: Arc<dyn NetworkTransport>,
    pub stores: StoreNames,
    pub supervisor: Supervisor,
    pub routes: RouteTable,
    pub origin: Url,
}

impl TestHarness {
    pub async fn new() -> Self {
        let config = EngineConfig::default();
        let db = CacheDb::open_in_memory().await.unwrap();
        let transport = Arc::new(MockTransport::new());
        let dyn_transport: Arc<dyn NetworkTransport> = Arc::clone(&transport) as Arc<dyn NetworkTransport>;
        Self {
            db,
            transport,
            dyn_transport,
            stores: StoreNames::for_version(&config.version),
            supervisor: Supervisor::new(),
            routes: RouteTable::compile(&config).unwrap(),
            origin: Url::parse(&config.origin).unwrap(),
        }
    }

    pub fn ctx(&self) -> StrategyContext<'_> {
        StrategyContext {
            db: &self.db,
            transport: &self.dyn_transport,
            stores: &self.stores,
            supervisor: &self.supervisor,
        }
    }

    pub fn request(&self, path: &str) -> EngineRequest {
        EngineRequest::get(self.origin.join(path).unwrap())
    }

    pub fn navigation(&self, path: &str) -> EngineRequest {
        EngineRequest::navigate(self.origin.join(path).unwrap())
    }

    pub async fn seed_cache(&self, store: &str, path: &str, body: &str) {
        let url = self.origin.join(path).unwrap();
        let record = StoredResponse::new(
            200,
            vec![("content-type".to_string(), "text/plain".to_string())],
            body.as_bytes().to_vec(),
        );
        self.db.put_entry(store, "GET", url.as_str(), &record).await.unwrap();
    }
}
