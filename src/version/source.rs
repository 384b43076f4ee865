//! Source trait for resolving the latest version of an upstream artifact

#[cfg(test)]
use mockall::automock;

use crate::version::error::ResolveError;

/// Kind of upstream a [`VersionSource`] reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Python package index
    PackageRegistry,
    /// Go module proxy / toolchain
    ModuleProxy,
    /// Commits on a GitHub branch
    GitHubCommits,
    /// GitHub tags
    GitHubTags,
    /// GitHub releases
    GitHubReleases,
    /// Commits on a GitLab branch
    GitLabCommits,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::PackageRegistry => "pypi",
            SourceKind::ModuleProxy => "go",
            SourceKind::GitHubCommits => "github_commit",
            SourceKind::GitHubTags => "github_tag",
            SourceKind::GitHubReleases => "github_release",
            SourceKind::GitLabCommits => "gitlab_commit",
        }
    }
}

/// Trait for resolving versions of an upstream artifact
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// All known versions, oldest first
    ///
    /// Sources that can only report the newest version return a single element.
    async fn ordered_versions(&self, identifier: &str) -> Result<Vec<String>, ResolveError>;

    /// The newest version, i.e. the last of [`Self::ordered_versions`]
    async fn latest_version(&self, identifier: &str) -> Result<String, ResolveError> {
        self.ordered_versions(identifier)
            .await?
            .pop()
            .ok_or_else(|| no_versions(self.kind(), identifier))
    }
}

pub(crate) fn no_versions(kind: SourceKind, identifier: &str) -> ResolveError {
    ResolveError::Parse(format!(
        "{} returned no versions for {}",
        kind.as_str(),
        identifier
    ))
}
