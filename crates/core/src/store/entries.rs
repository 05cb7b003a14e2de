//! Response record CRUD operations.
//!
//! Provides functions for writing, reading and purging cached response
//! records. The key is the request identity (method + absolute URL) within
//! a named store; a write is always a full replacement of the record.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A complete cached response record.
///
/// Immutable once written; an update replaces the whole record. Staleness
/// is managed by version bumps and stale-while-revalidate overwrites, so
/// there is no TTL column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub inserted_at: String,
}

impl StoredResponse {
    /// Build a record stamped with the current time.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self { status, headers, body, inserted_at: chrono::Utc::now().to_rfc3339() }
    }

    /// Value of a header, case-insensitive on the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn decode_headers(idx: usize, json: String) -> Result<Vec<(String, String)>, rusqlite::Error> {
    serde_json::from_str(&json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn decode_row(row: &rusqlite::Row<'_>) -> Result<StoredResponse, rusqlite::Error> {
    Ok(StoredResponse {
        status: row.get::<_, i64>(0)? as u16,
        headers: decode_headers(1, row.get::<_, String>(1)?)?,
        body: row.get(2)?,
        inserted_at: row.get(3)?,
    })
}

impl CacheDb {
    /// Insert or replace a cached response record.
    ///
    /// Uses UPSERT semantics keyed on (store, method, url): the previous
    /// record for the same identity, if any, is fully replaced.
    pub async fn put_entry(&self, store: &str, method: &str, url: &str, response: &StoredResponse) -> Result<(), Error> {
        let store = store.to_string();
        let method = method.to_string();
        let url = url.to_string();
        let response = response.clone();
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (store, method, url, status, headers_json, body, inserted_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(store, method, url) DO UPDATE SET
                         status = excluded.status,
                         headers_json = excluded.headers_json,
                         body = excluded.body,
                         inserted_at = excluded.inserted_at",
                    params![
                        &store,
                        &method,
                        &url,
                        response.status as i64,
                        &headers_json,
                        &response.body,
                        &response.inserted_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get a record from one named store.
    ///
    /// Returns None if the identity is not present in that store.
    pub async fn get_entry(&self, store: &str, method: &str, url: &str) -> Result<Option<StoredResponse>, Error> {
        let store = store.to_string();
        let method = method.to_string();
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let result = conn.query_row(
                    "SELECT status, headers_json, body, inserted_at
                     FROM entries WHERE store = ?1 AND method = ?2 AND url = ?3",
                    params![store, method, url],
                    decode_row,
                );

                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Look a request identity up across every store.
    ///
    /// The most recently inserted record wins, so a stale-while-revalidate
    /// overwrite is what subsequent lookups see. Returns the owning store
    /// name alongside the record.
    pub async fn lookup_any(&self, method: &str, url: &str) -> Result<Option<(String, StoredResponse)>, Error> {
        let method = method.to_string();
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<(String, StoredResponse)>, Error> {
                let result = conn.query_row(
                    "SELECT store, status, headers_json, body, inserted_at
                     FROM entries WHERE method = ?1 AND url = ?2
                     ORDER BY inserted_at DESC, store DESC LIMIT 1",
                    params![method, url],
                    |row| {
                        let store: String = row.get(0)?;
                        let response = StoredResponse {
                            status: row.get::<_, i64>(1)? as u16,
                            headers: decode_headers(2, row.get::<_, String>(2)?)?,
                            body: row.get(3)?,
                            inserted_at: row.get(4)?,
                        };
                        Ok((store, response))
                    },
                );

                match result {
                    Ok(found) => Ok(Some(found)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all stores that currently hold at least one record.
    pub async fn list_stores(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT DISTINCT store FROM entries ORDER BY store")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every record in one store.
    ///
    /// Returns the number of deleted entries.
    pub async fn delete_store(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM entries WHERE store = ?1", params![store])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of records in one store.
    pub async fn count_entries(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE store = ?1",
                    params![store],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html_response(body: &str) -> StoredResponse {
        StoredResponse::new(
            200,
            vec![("content-type".to_string(), "text/html".to_string())],
            body.as_bytes().to_vec(),
        )
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let response = html_response("<p>hello</p>");

        db.put_entry("runtime-v1", "GET", "http://localhost:3000/", &response)
            .await
            .unwrap();

        let retrieved = db
            .get_entry("runtime-v1", "GET", "http://localhost:3000/")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved.status, 200);
        assert_eq!(retrieved.body, b"<p>hello</p>");
        assert_eq!(retrieved.header("Content-Type"), Some("text/html"));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.get_entry("runtime-v1", "GET", "http://localhost:3000/missing").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_fully() {
        // Writing the same key twice leaves only the latest body; no
        // duplicate rows for the identity.
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "http://localhost:3000/app.js";

        db.put_entry("runtime-v1", "GET", url, &html_response("v1 body")).await.unwrap();
        db.put_entry("runtime-v1", "GET", url, &html_response("v2 body")).await.unwrap();

        let retrieved = db.get_entry("runtime-v1", "GET", url).await.unwrap().unwrap();
        assert_eq!(retrieved.body, b"v2 body");
        assert_eq!(db.count_entries("runtime-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_method_is_part_of_key() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "http://localhost:3000/data.json";

        db.put_entry("runtime-v1", "GET", url, &html_response("get body")).await.unwrap();

        assert!(db.get_entry("runtime-v1", "HEAD", url).await.unwrap().is_none());
        assert!(db.get_entry("runtime-v1", "GET", url).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lookup_any_prefers_latest() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "http://localhost:3000/index.html";

        let mut old = html_response("precached");
        old.inserted_at = "2026-01-01T00:00:00+00:00".to_string();
        db.put_entry("precache-v1", "GET", url, &old).await.unwrap();

        let mut fresh = html_response("runtime copy");
        fresh.inserted_at = "2026-02-01T00:00:00+00:00".to_string();
        db.put_entry("runtime-v1", "GET", url, &fresh).await.unwrap();

        let (store, found) = db.lookup_any("GET", url).await.unwrap().unwrap();
        assert_eq!(store, "runtime-v1");
        assert_eq!(found.body, b"runtime copy");
    }

    #[tokio::test]
    async fn test_lookup_any_miss() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.lookup_any("GET", "http://localhost:3000/nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_and_delete_stores() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for store in ["precache-v1", "runtime-v1", "precache-v2", "runtime-v2"] {
            db.put_entry(store, "GET", "http://localhost:3000/", &html_response(store))
                .await
                .unwrap();
        }

        let mut stores = db.list_stores().await.unwrap();
        stores.sort();
        assert_eq!(stores, vec!["precache-v1", "precache-v2", "runtime-v1", "runtime-v2"]);

        assert_eq!(db.delete_store("precache-v1").await.unwrap(), 1);
        assert_eq!(db.delete_store("runtime-v1").await.unwrap(), 1);

        let remaining = db.list_stores().await.unwrap();
        assert_eq!(remaining, vec!["precache-v2", "runtime-v2"]);
    }
}
