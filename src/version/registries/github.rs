//! GitHub commits, tags and releases

use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::version::error::ResolveError;
use crate::version::fetcher::Fetcher;
use crate::version::reference::ReferenceSyntax;
use crate::version::source::{SourceKind, VersionSource};

/// Which GitHub listing a [`GitHubSource`] follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubListing {
    Commits,
    Tags,
    Releases,
}

/// Entry of `/repos/{repo}/commits`
#[derive(Debug, Deserialize)]
struct Commit {
    sha: String,
}

/// Entry of `/repos/{repo}/tags`
#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

/// Entry of `/repos/{repo}/releases`
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

/// Version source for a GitHub repository.
///
/// Identifiers look like `owner/repo[:branch][@api-base]`. The branch only
/// applies to commit listings.
pub struct GitHubSource {
    listing: GitHubListing,
    fetcher: Arc<Fetcher>,
    syntax: ReferenceSyntax,
    default_base_url: String,
}

impl GitHubSource {
    pub fn new(
        listing: GitHubListing,
        fetcher: Arc<Fetcher>,
        syntax: ReferenceSyntax,
        default_base_url: &str,
    ) -> Self {
        Self {
            listing,
            fetcher,
            syntax,
            default_base_url: default_base_url.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl VersionSource for GitHubSource {
    fn kind(&self) -> SourceKind {
        match self.listing {
            GitHubListing::Commits => SourceKind::GitHubCommits,
            GitHubListing::Tags => SourceKind::GitHubTags,
            GitHubListing::Releases => SourceKind::GitHubReleases,
        }
    }

    async fn ordered_versions(&self, identifier: &str) -> Result<Vec<String>, ResolveError> {
        let reference = self.syntax.parse(identifier, &self.default_base_url);
        let endpoint = format!("{}/repos/{}", reference.base_url, reference.repository);

        // GitHub lists newest first
        let newest_first: Vec<String> = match self.listing {
            GitHubListing::Commits => {
                let url = Url::parse_with_params(
                    &format!("{endpoint}/commits"),
                    [("sha", reference.branch.as_str())],
                )
                .map_err(|e| ResolveError::Config(format!("invalid GitHub URL {endpoint}: {e}")))?;
                let commits: Vec<Commit> = self.fetcher.fetch_json(url.as_str()).await?;
                commits.into_iter().map(|c| c.sha).collect()
            }
            GitHubListing::Tags => {
                let tags: Vec<Tag> = self.fetcher.fetch_json(&format!("{endpoint}/tags")).await?;
                tags.into_iter().map(|t| t.name).collect()
            }
            GitHubListing::Releases => {
                let releases: Vec<Release> = self
                    .fetcher
                    .fetch_json(&format!("{endpoint}/releases"))
                    .await?;
                releases.into_iter().map(|r| r.tag_name).collect()
            }
        };

        debug!(
            "Found {} {} entries for {}",
            newest_first.len(),
            self.kind().as_str(),
            reference.repository
        );

        Ok(newest_first.into_iter().rev().collect())
    }
}
