//! The response model served back through the interception hook.

use bytes::Bytes;
use waylay_core::StoredResponse;

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    Fallback,
}

/// A complete response ready to hand back to the intercepted caller.
#[derive(Debug, Clone)]
pub struct ServedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub source: ResponseSource,
}

impl ServedResponse {
    /// Rehydrate a cached record for serving.
    pub fn from_stored(stored: StoredResponse) -> Self {
        Self {
            status: stored.status,
            headers: stored.headers,
            body: Bytes::from(stored.body),
            source: ResponseSource::Cache,
        }
    }

    /// Snapshot this response for the store, stamped with the current time.
    pub fn to_stored(&self) -> StoredResponse {
        StoredResponse::new(self.status, self.headers.clone(), self.body.to_vec())
    }

    /// Success means any 2xx status; the engine never interprets bodies.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Value of a response header, case-insensitive on the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}
