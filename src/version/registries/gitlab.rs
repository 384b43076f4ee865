//! GitLab commit history

use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::version::error::ResolveError;
use crate::version::fetcher::Fetcher;
use crate::version::reference::{ReferenceSyntax, RepositoryReference};
use crate::version::source::{SourceKind, VersionSource};

/// Response of `/projects/{path}`
#[derive(Debug, Deserialize)]
struct Project {
    id: u64,
}

/// Entry of `/projects/{id}/repository/commits`
#[derive(Debug, Deserialize)]
struct Commit {
    id: String,
}

/// Version source following commits of a GitLab project.
///
/// Identifiers are `group/project[:branch][@api-base]` or a numeric project id.
pub struct GitLabSource {
    fetcher: Arc<Fetcher>,
    syntax: ReferenceSyntax,
    default_base_url: String,
}

impl GitLabSource {
    pub fn new(fetcher: Arc<Fetcher>, syntax: ReferenceSyntax, default_base_url: &str) -> Self {
        Self {
            fetcher,
            syntax,
            default_base_url: default_base_url.to_string(),
        }
    }

    async fn project_id(&self, reference: &RepositoryReference) -> Result<u64, ResolveError> {
        if let Some(id) = reference.project_id() {
            return Ok(id);
        }

        let url = format!(
            "{}/projects/{}",
            reference.base_url,
            encode_project_path(&reference.repository)
        );
        let project: Project = self.fetcher.fetch_json(&url).await?;
        debug!("Resolved {} to project {}", reference.repository, project.id);
        Ok(project.id)
    }
}

#[async_trait::async_trait]
impl VersionSource for GitLabSource {
    fn kind(&self) -> SourceKind {
        SourceKind::GitLabCommits
    }

    async fn ordered_versions(&self, identifier: &str) -> Result<Vec<String>, ResolveError> {
        let reference = self.syntax.parse(identifier, &self.default_base_url);
        let id = self.project_id(&reference).await?;

        let endpoint = format!("{}/projects/{}/repository/commits", reference.base_url, id);
        let url = Url::parse_with_params(&endpoint, [("ref_name", reference.branch.as_str())])
            .map_err(|e| ResolveError::Config(format!("invalid GitLab URL {endpoint}: {e}")))?;
        let commits: Vec<Commit> = self.fetcher.fetch_json(url.as_str()).await?;

        debug!("Found {} commits for project {}", commits.len(), id);

        // GitLab lists newest first
        Ok(commits.into_iter().rev().map(|c| c.id).collect())
    }
}

/// Project paths are passed as a single URL-encoded path segment
fn encode_project_path(path: &str) -> String {
    path.replace('/', "%2F")
}
