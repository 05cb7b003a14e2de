//! The request model seen by the interception hook.

use reqwest::Method;
use url::Url;

/// Extensions treated as image requests for fallback purposes.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "ico", "avif"];

/// An intercepted outbound request.
///
/// Carries only what classification and the executors need: method, URL
/// and request headers. Bodies never appear here because non-safe-read
/// methods are never intercepted.
#[derive(Debug, Clone)]
pub struct EngineRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

impl EngineRequest {
    /// A plain GET request.
    pub fn get(url: Url) -> Self {
        Self { method: Method::GET, url, headers: Vec::new() }
    }

    /// A page-navigation GET request (Accept prefers text/html).
    pub fn navigate(url: Url) -> Self {
        Self::get(url).with_header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Value of a request header, case-insensitive on the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether this is a page-navigation request (the user is loading a
    /// document, so an offline page is an acceptable degraded answer).
    pub fn is_navigation(&self) -> bool {
        self.header("Accept").is_some_and(|accept| accept.contains("text/html"))
    }

    /// Whether this request is for an image, by extension or Accept header.
    pub fn is_image(&self) -> bool {
        if self.header("Accept").is_some_and(|accept| accept.starts_with("image/")) {
            return true;
        }
        path_extension(self.url.path()).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    }
}

fn path_extension(path: &str) -> Option<&str> {
    let file = path.rsplit('/').next()?;
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() { None } else { Some(ext) }
}
