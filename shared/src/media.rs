//! Resolution of CMS-relative media paths into absolute URLs.
//!
//! The same upload path has to be reachable from two places: the browser,
//! which only sees the public CMS origin, and the server renderer, which may
//! sit on an internal (e.g. Docker) network.

use serde::{Deserialize, Serialize};

/// Where the resolved URL is going to be fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionContext {
    /// Rendered into HTML and fetched by the visitor's browser.
    Browser,
    /// Fetched by the server process itself.
    Server,
}

/// Prefixes relative media paths with the origin matching the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUrlResolver {
    public_base: String,
    internal_base: String,
}

impl MediaUrlResolver {
    /// Creates a resolver from the browser-reachable and internal origins.
    pub fn new(public_base: impl Into<String>, internal_base: impl Into<String>) -> Self {
        Self {
            public_base: public_base.into().trim_end_matches('/').to_string(),
            internal_base: internal_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Origin used for the given context.
    pub fn base_for(&self, context: ExecutionContext) -> &str {
        match context {
            ExecutionContext::Browser => &self.public_base,
            ExecutionContext::Server => &self.internal_base,
        }
    }

    /// Absolute URL for `path`. Absolute input is returned unchanged and
    /// empty input yields an empty string.
    pub fn resolve(&self, path: &str, context: ExecutionContext) -> String {
        let path = path.trim();
        if path.is_empty() {
            return String::new();
        }
        if is_absolute_url(path) {
            return path.to_string();
        }
        format!("{}/{}", self.base_for(context), path.trim_start_matches('/'))
    }

    /// [`MediaUrlResolver::resolve`] for optional paths.
    pub fn resolve_opt(&self, path: Option<&str>, context: ExecutionContext) -> String {
        path.map(|path| self.resolve(path, context))
            .unwrap_or_default()
    }

    /// Resolves `path`, substituting `placeholder` (itself resolved) when the
    /// path is absent or empty.
    pub fn resolve_or(
        &self,
        path: Option<&str>,
        placeholder: &str,
        context: ExecutionContext,
    ) -> String {
        let resolved = self.resolve_opt(path, context);
        if resolved.is_empty() {
            placeholder.to_string()
        } else {
            resolved
        }
    }
}

/// `scheme://...` per RFC 3986 scheme grammar, or an inline `data:` URI.
pub fn is_absolute_url(candidate: &str) -> bool {
    if candidate.starts_with("data:") {
        return true;
    }
    let Some((scheme, rest)) = candidate.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let valid_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid_scheme && rest.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> MediaUrlResolver {
        MediaUrlResolver::new("https://cms.bugninja.ai/", "http://strapi:1337")
    }

    #[test]
    fn relative_paths_get_the_context_origin() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve("/uploads/hero.png", ExecutionContext::Browser),
            "https://cms.bugninja.ai/uploads/hero.png"
        );
        assert_eq!(
            resolver.resolve("uploads/hero.png", ExecutionContext::Server),
            "http://strapi:1337/uploads/hero.png"
        );
    }

    #[test]
    fn absolute_urls_are_untouched() {
        let resolver = resolver();
        for url in [
            "https://images.example.com/a.png",
            "http://localhost:1337/uploads/a.png",
            "data:image/png;base64,AAAA",
        ] {
            assert_eq!(resolver.resolve(url, ExecutionContext::Browser), url);
            assert_eq!(resolver.resolve(url, ExecutionContext::Server), url);
        }
    }

    #[test]
    fn resolution_is_idempotent() {
        let resolver = resolver();
        for context in [ExecutionContext::Browser, ExecutionContext::Server] {
            let once = resolver.resolve("/uploads/a.png", context);
            assert_eq!(resolver.resolve("/uploads/a.png", context), once);
            assert_eq!(resolver.resolve(&once, context), once);
        }
    }

    #[test]
    fn empty_input_never_fails() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("", ExecutionContext::Browser), "");
        assert_eq!(resolver.resolve_opt(None, ExecutionContext::Server), "");
        assert_eq!(
            resolver.resolve_or(None, "/blog/default-author.jpg", ExecutionContext::Browser),
            "/blog/default-author.jpg"
        );
    }

    #[test]
    fn host_port_without_scheme_is_relative() {
        assert!(!is_absolute_url("localhost:1337/uploads/a.png"));
        assert!(!is_absolute_url("/uploads/a.png"));
        assert!(is_absolute_url("ftp://files.example.com/a.png"));
    }
}
