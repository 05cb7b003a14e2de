//! Synthetic responses for when network and cache are both exhausted.
//!
//! The offline page must render with zero additional requests, so styles
//! are inline and the only interaction is a reload. Images degrade to a
//! fixed 1x1 transparent GIF so a broken-image icon never reaches the user.
//! Everything else gets no fallback; the original failure propagates.

use bytes::Bytes;

use crate::response::{ResponseSource, ServedResponse};

/// Self-contained offline document served for failed navigations.
const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Offline</title>
<style>
  body { font-family: system-ui, sans-serif; display: flex; align-items: center;
         justify-content: center; min-height: 100vh; margin: 0; background: #f5f5f5; }
  main { text-align: center; padding: 2rem; }
  h1 { font-size: 1.5rem; color: #333; }
  p { color: #666; }
  button { padding: 0.6rem 1.4rem; border: none; border-radius: 6px;
           background: #2563eb; color: #fff; font-size: 1rem; cursor: pointer; }
</style>
</head>
<body>
<main>
  <h1>You're offline</h1>
  <p>This page isn't available without a connection.</p>
  <button onclick="location.reload()">Try again</button>
</main>
</body>
</html>
"#;

/// A 1x1 transparent GIF.
const PLACEHOLDER_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff,
    0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02,
    0x02, 0x44, 0x01, 0x00, 0x3b,
];

/// The offline page for failed navigation requests.
pub fn offline_page() -> ServedResponse {
    ServedResponse {
        status: 200,
        headers: vec![("content-type".to_string(), "text/html; charset=utf-8".to_string())],
        body: Bytes::from_static(OFFLINE_PAGE.as_bytes()),
        source: ResponseSource::Fallback,
    }
}

/// The placeholder for failed image requests.
pub fn placeholder_image() -> ServedResponse {
    ServedResponse {
        status: 200,
        headers: vec![("content-type".to_string(), "image/gif".to_string())],
        body: Bytes::from_static(PLACEHOLDER_GIF),
        source: ResponseSource::Fallback,
    }
}

/// Generic response for an unexpected internal failure in the dispatcher.
/// One bad request must never take down the interception pipeline.
pub fn internal_error() -> ServedResponse {
    ServedResponse {
        status: 500,
        headers: vec![("content-type".to_string(), "text/plain".to_string())],
        body: Bytes::from_static(b"internal error"),
        source: ResponseSource::Fallback,
    }
}
