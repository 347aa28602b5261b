use anyhow::{Context, Result};
use reqwest::blocking::Client;
use semver::Version;
use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

#[derive(Debug, Deserialize)]
struct Packument {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
}

/// Minimal client for the npm registry.
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    base_url: String,
}

impl Default for NpmRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY)
    }
}

impl NpmRegistry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolve `tag` of `package` to a version. `Ok(None)` when the tag does not exist.
    pub fn dist_tag(&self, package: &str, tag: &str) -> Result<Option<Version>> {
        let url = format!("{}/{package}", self.base_url);
        log::debug!("Fetching {url}");

        let body = http_client()?
            .get(&url)
            .send()
            .with_context(|| format!("Failed to fetch {url}"))?
            .error_for_status()
            .with_context(|| format!("Registry request for {package} failed"))?
            .text()
            .context("Failed to read registry response")?;
        parse_dist_tag(&body, tag)
    }
}

fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("turbo-codemod/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

fn parse_dist_tag(body: &str, tag: &str) -> Result<Option<Version>> {
    let packument: Packument =
        serde_json::from_str(body).context("Failed to parse registry response")?;
    packument
        .dist_tags
        .get(tag)
        .map(|version| {
            Version::parse(version)
                .with_context(|| format!("Registry returned an invalid version: {version}"))
        })
        .transpose()
}
