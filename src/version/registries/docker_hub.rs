//! Docker Hub tag listing

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::version::checker::TagSet;
use crate::version::error::ResolveError;
use crate::version::fetcher::Fetcher;
use crate::version::registry::TagRegistry;

/// One page of `/v2/repositories/{image}/tags`
#[derive(Debug, Deserialize)]
struct TagPage {
    next: Option<String>,
    results: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Registry implementation for the Docker Hub API
pub struct DockerHubRegistry {
    fetcher: Arc<Fetcher>,
    base_url: String,
}

impl DockerHubRegistry {
    pub fn new(fetcher: Arc<Fetcher>, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl TagRegistry for DockerHubRegistry {
    async fn published_tags(&self, image: &str) -> Result<TagSet, ResolveError> {
        let repository = qualify_image(image);
        let mut url = format!("{}/v2/repositories/{}/tags", self.base_url, repository);
        let mut tags = TagSet::default();
        let mut visited = HashSet::new();

        loop {
            let page: TagPage = self.fetcher.fetch_json(&url).await?;
            tags.extend(page.results.into_iter().map(|entry| entry.name));
            visited.insert(url);

            match page.next {
                Some(next) if visited.contains(&next) => {
                    return Err(ResolveError::Parse(format!(
                        "tag listing for {repository} loops back to {next}"
                    )));
                }
                Some(next) => url = next,
                None => break,
            }
        }

        debug!("Found {} published tags for {}", tags.len(), repository);
        Ok(tags)
    }
}

/// Official images live under `library/`
fn qualify_image(image: &str) -> String {
    if image.contains('/') {
        image.to_string()
    } else {
        format!("library/{image}")
    }
}
