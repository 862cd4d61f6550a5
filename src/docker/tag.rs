//! Image references and the production tag rule.
//!
//! A production tag is a bare semantic version, optionally `v`-prefixed.
//! Building or pushing under a production tag also produces `latest`;
//! any other tag never touches `latest`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::config::LATEST_TAG;

static PRODUCTION_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?[0-9]+\.[0-9]+\.[0-9]+$")
        .unwrap_or_else(|e| unreachable!("production tag pattern is a valid regex: {e}"))
});

/// Whether `tag` should also be published as `latest`.
pub fn is_production_tag(tag: &str) -> bool {
    tag != LATEST_TAG && PRODUCTION_TAG.is_match(tag)
}

/// `{registry}/{name}:{tag}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageReference {
    pub registry: String,
    pub name: String,
    pub tag: String,
}

impl ImageReference {
    pub fn new(
        registry: impl Into<String>,
        name: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            registry: registry.into().trim_end_matches('/').to_string(),
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// Same repository under a different tag.
    pub fn with_tag(&self, tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..self.clone()
        }
    }

    pub fn is_production(&self) -> bool {
        is_production_tag(&self.tag)
    }

    /// The `latest` alias this reference implies, if any.
    pub fn latest_alias(&self) -> Option<Self> {
        self.is_production().then(|| self.with_tag(LATEST_TAG))
    }

    /// Registry host used for credential lookup and `docker login`.
    ///
    /// A first path segment without a dot, colon or `localhost` is a Docker
    /// Hub namespace, so the host is `docker.io`.
    pub fn registry_host(&self) -> &str {
        let registry = self
            .registry
            .strip_prefix("https://")
            .or_else(|| self.registry.strip_prefix("http://"))
            .unwrap_or(&self.registry);
        let first = registry.split('/').next().unwrap_or(registry);

        if first.contains('.') || first.contains(':') || first == "localhost" {
            first
        } else {
            "docker.io"
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self
            .registry
            .strip_prefix("https://")
            .or_else(|| self.registry.strip_prefix("http://"))
            .unwrap_or(&self.registry);
        if registry.is_empty() {
            write!(f, "{}:{}", self.name, self.tag)
        } else {
            write!(f, "{registry}/{}:{}", self.name, self.tag)
        }
    }
}
