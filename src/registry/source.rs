use anyhow::{Context, Result};
use tracing::info;

/// Where the registry document comes from
pub trait ManifestSource {
    fn fetch(&self) -> Result<String>;
}

/// Blocking HTTP GET of the registry URL
#[derive(Debug, Clone)]
pub struct HttpManifestSource {
    url: String,
}

impl HttpManifestSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl ManifestSource for HttpManifestSource {
    fn fetch(&self) -> Result<String> {
        info!(url = %self.url, "fetching template registry");

        let response = ureq::get(&self.url)
            .call()
            .with_context(|| format!("Failed to call template registry: {}", self.url))?;

        response
            .into_string()
            .context("Failed to read template registry response")
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::cell::Cell;

    /// Serves a fixed body and counts fetches
    pub struct StaticSource {
        pub body: Option<String>,
        pub fetches: Cell<usize>,
    }

    impl StaticSource {
        pub fn new(body: &str) -> Self {
            Self { body: Some(body.to_string()), fetches: Cell::new(0) }
        }

        pub fn unreachable() -> Self {
            Self { body: None, fetches: Cell::new(0) }
        }
    }

    impl ManifestSource for StaticSource {
        fn fetch(&self) -> Result<String> {
            self.fetches.set(self.fetches.get() + 1);
            self.body.clone().context("connection refused")
        }
    }
}
