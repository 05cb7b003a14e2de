//! Request-interception engine for waylay.
//!
//! This crate provides the interception hook itself: transport, the three
//! strategy executors and their dispatcher, the install/activate lifecycle,
//! fallback generation, and the auxiliary channels (sync, push, control
//! messages). All lifecycle hooks hang off a single [`Engine`] instance
//! rather than global handler state.

pub mod channels;
pub mod clients;
pub mod engine;
pub mod fallback;
pub mod lifecycle;
pub mod request;
pub mod response;
pub mod strategies;
pub mod supervisor;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use channels::{BroadcastMessage, ControlMessage, Notification, NotificationSink, PushPayload, SyncFlush};
pub use clients::{ClientRegistry, InMemoryClients};
pub use engine::Engine;
pub use lifecycle::WorkerState;
pub use request::EngineRequest;
pub use response::{ResponseSource, ServedResponse};
pub use strategies::FetchOutcome;
pub use supervisor::Supervisor;
pub use transport::{HttpTransport, NetworkTransport, TransportConfig};
