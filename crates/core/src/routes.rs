//! Routing rules and the strategy classifier.
//!
//! Classification is a pure function from (method, URL) to a decision. The
//! rule sets are checked in fixed priority order: network-only first (auth,
//! admin and analytics paths must never be served from cache), then
//! cache-first (content-hashed static assets), then network-first. Anything
//! unmatched defaults to network-first, favoring freshness over
//! availability when intent is ambiguous.

use regex::Regex;
use url::Url;

use crate::config::{ConfigError, EngineConfig};

/// The algorithm chosen for a given request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Straight to the network. No cache read, no cache write, no fallback.
    NetworkOnly,
    /// Serve from cache, refresh in the background (stale-while-revalidate).
    CacheFirst,
    /// Try the network, fall back to cache, then to a synthetic response.
    NetworkFirst,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::NetworkOnly => write!(f, "network-only"),
            Strategy::CacheFirst => write!(f, "cache-first"),
            Strategy::NetworkFirst => write!(f, "network-first"),
        }
    }
}

/// Outcome of classification: handle the request with a strategy, or let it
/// pass through to the network untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    PassThrough,
    Handle(Strategy),
}

/// Compiled routing rules plus the application origin.
///
/// Built once from `EngineConfig`; classification itself does no
/// allocation or I/O and is deterministic for a given table.
#[derive(Debug)]
pub struct RouteTable {
    origin: Url,
    network_only: Vec<Regex>,
    cache_first: Vec<Regex>,
    network_first: Vec<Regex>,
}

impl RouteTable {
    /// Compile the routing pattern lists from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` for a pattern that fails to
    /// compile, and `ConfigError::Invalid` for a bad origin.
    pub fn compile(config: &EngineConfig) -> Result<Self, ConfigError> {
        let origin = Url::parse(&config.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;

        Ok(Self {
            origin,
            network_only: compile_set("network_only", &config.network_only)?,
            cache_first: compile_set("cache_first", &config.cache_first)?,
            network_first: compile_set("network_first", &config.network_first)?,
        })
    }

    /// Classify a request by method and URL.
    ///
    /// Non-safe-read methods and non-HTTP(S) schemes are never intercepted.
    /// Cross-origin requests pass through unless they look like static
    /// assets by extension, in which case they go cache-first (fonts and
    /// images from CDNs), never anything else.
    pub fn classify(&self, method: &str, url: &Url) -> Decision {
        if !is_safe_read(method) {
            return Decision::PassThrough;
        }
        if !matches!(url.scheme(), "http" | "https") {
            return Decision::PassThrough;
        }

        let path = url.path();

        if !self.same_origin(url) {
            if matches_any(&self.cache_first, path) {
                return Decision::Handle(Strategy::CacheFirst);
            }
            return Decision::PassThrough;
        }

        if matches_any(&self.network_only, path) {
            return Decision::Handle(Strategy::NetworkOnly);
        }
        if matches_any(&self.cache_first, path) {
            return Decision::Handle(Strategy::CacheFirst);
        }
        if matches_any(&self.network_first, path) {
            return Decision::Handle(Strategy::NetworkFirst);
        }

        Decision::Handle(Strategy::NetworkFirst)
    }

    fn same_origin(&self, url: &Url) -> bool {
        url.scheme() == self.origin.scheme()
            && url.host_str() == self.origin.host_str()
            && url.port_or_known_default() == self.origin.port_or_known_default()
    }
}

/// Safe, idempotent read methods; the only ones the engine intercepts.
fn is_safe_read(method: &str) -> bool {
    method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD")
}

fn matches_any(set: &[Regex], path: &str) -> bool {
    set.iter().any(|re| re.is_match(path))
}

fn compile_set(rule_set: &str, patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                rule_set: rule_set.into(),
                pattern: pattern.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::compile(&EngineConfig::default()).unwrap()
    }

    fn u(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_classify_deterministic() {
        let t = table();
        let url = u("http://localhost:3000/assets/logo.png");
        let first = t.classify("GET", &url);
        for _ in 0..10 {
            assert_eq!(t.classify("GET", &url), first);
        }
    }

    #[test]
    fn test_network_only_precedence() {
        // Path matches both a network-only rule and a cache-first extension;
        // network-only must win.
        let t = table();
        let url = u("http://localhost:3000/admin/dashboard.js");
        assert_eq!(t.classify("GET", &url), Decision::Handle(Strategy::NetworkOnly));
    }

    #[test]
    fn test_cache_first_extensions() {
        let t = table();
        for path in ["/img/photo.jpeg", "/fonts/inter.woff2", "/assets/app.3f2a.js", "/styles.css"] {
            let url = u(&format!("http://localhost:3000{path}"));
            assert_eq!(t.classify("GET", &url), Decision::Handle(Strategy::CacheFirst), "{path}");
        }
    }

    #[test]
    fn test_network_first_patterns() {
        let t = table();
        for path in ["/api/items", "/data/export.json", "/docs/page.html"] {
            let url = u(&format!("http://localhost:3000{path}"));
            assert_eq!(t.classify("GET", &url), Decision::Handle(Strategy::NetworkFirst), "{path}");
        }
    }

    #[test]
    fn test_unmatched_defaults_to_network_first() {
        let t = table();
        let url = u("http://localhost:3000/some/opaque/route");
        assert_eq!(t.classify("GET", &url), Decision::Handle(Strategy::NetworkFirst));
    }

    #[test]
    fn test_non_safe_read_passes_through() {
        let t = table();
        let url = u("http://localhost:3000/api/items");
        for method in ["POST", "PUT", "PATCH", "DELETE", "OPTIONS"] {
            assert_eq!(t.classify(method, &url), Decision::PassThrough, "{method}");
        }
    }

    #[test]
    fn test_head_is_intercepted() {
        let t = table();
        let url = u("http://localhost:3000/styles.css");
        assert_eq!(t.classify("HEAD", &url), Decision::Handle(Strategy::CacheFirst));
    }

    #[test]
    fn test_non_http_scheme_passes_through() {
        let t = table();
        assert_eq!(t.classify("GET", &u("ws://localhost:3000/socket")), Decision::PassThrough);
    }

    #[test]
    fn test_cross_origin_api_passes_through() {
        let t = table();
        let url = u("https://third-party.example.com/api/widget");
        assert_eq!(t.classify("GET", &url), Decision::PassThrough);
    }

    #[test]
    fn test_cross_origin_font_is_cache_first() {
        let t = table();
        let url = u("https://fonts.example.com/inter.woff2");
        assert_eq!(t.classify("GET", &url), Decision::Handle(Strategy::CacheFirst));
    }

    #[test]
    fn test_cross_origin_never_network_only() {
        // Even a path that matches a network-only rule is not handled
        // cross-origin; it passes through instead.
        let t = table();
        let url = u("https://other.example.com/admin/panel");
        assert_eq!(t.classify("GET", &url), Decision::PassThrough);
    }

    #[test]
    fn test_same_origin_default_port() {
        let config = EngineConfig { origin: "https://app.example.com".into(), ..Default::default() };
        let t = RouteTable::compile(&config).unwrap();
        // 443 is the known default for https; explicit and implicit match.
        let url = u("https://app.example.com:443/logo.svg");
        assert_eq!(t.classify("GET", &url), Decision::Handle(Strategy::CacheFirst));
    }

    #[test]
    fn test_compile_rejects_bad_pattern() {
        let config = EngineConfig { cache_first: vec![r"[".into()], ..Default::default() };
        assert!(matches!(
            RouteTable::compile(&config),
            Err(ConfigError::InvalidPattern { rule_set, .. }) if rule_set == "cache_first"
        ));
    }
}
