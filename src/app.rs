//! Wiring of configuration, fetcher and sources for one resolution
//!
//! Every source shares one [`Fetcher`] and one [`CommandRunner`]; an [`App`]
//! builds the source matching a [`Selector`] and runs the tag check.

use std::sync::Arc;

use crate::config::TagwatchConfig;
use crate::selector::Selector;
use crate::version::checker::{Verdict, check};
use crate::version::command::{CommandRunner, SystemCommandRunner};
use crate::version::error::ResolveError;
use crate::version::fetcher::Fetcher;
use crate::version::registries::{
    DockerHubRegistry, GitHubListing, GitHubSource, GitLabSource, GoModuleSource, GoStrategy,
    PypiSource, PypiStrategy,
};
use crate::version::registry::TagRegistry;
use crate::version::source::{SourceKind, VersionSource};

/// Explicitly chosen alternates for sources with more than one retrieval strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Strategies {
    pub pypi: PypiStrategy,
    pub go: GoStrategy,
}

pub struct App {
    config: TagwatchConfig,
    fetcher: Arc<Fetcher>,
    runner: Arc<dyn CommandRunner>,
}

impl App {
    /// Builds an app that spawns real processes
    pub fn new(config: TagwatchConfig) -> Result<Self, ResolveError> {
        Self::with_runner(config, Arc::new(SystemCommandRunner))
    }

    pub fn with_runner(
        config: TagwatchConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, ResolveError> {
        let fetcher = Fetcher::new(config.retry_policy()?, config.request_timeout())?;
        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            runner,
        })
    }

    /// Creates the source for `kind`
    pub fn source(
        &self,
        kind: SourceKind,
        strategies: Strategies,
    ) -> Result<Box<dyn VersionSource>, ResolveError> {
        let endpoints = &self.config.endpoints;
        let tools = &self.config.tools;

        let source: Box<dyn VersionSource> = match kind {
            SourceKind::PackageRegistry => Box::new(PypiSource::new(
                strategies.pypi,
                Arc::clone(&self.fetcher),
                Arc::clone(&self.runner),
                &endpoints.pypi,
                &tools.pip,
            )),
            SourceKind::ModuleProxy => Box::new(GoModuleSource::new(
                strategies.go,
                Arc::clone(&self.fetcher),
                Arc::clone(&self.runner),
                &endpoints.go_proxy,
                &tools.go,
            )),
            SourceKind::GitHubCommits => self.github(GitHubListing::Commits)?,
            SourceKind::GitHubTags => self.github(GitHubListing::Tags)?,
            SourceKind::GitHubReleases => self.github(GitHubListing::Releases)?,
            SourceKind::GitLabCommits => Box::new(GitLabSource::new(
                Arc::clone(&self.fetcher),
                self.config.reference_syntax()?,
                &endpoints.gitlab,
            )),
        };
        Ok(source)
    }

    fn github(&self, listing: GitHubListing) -> Result<Box<dyn VersionSource>, ResolveError> {
        Ok(Box::new(GitHubSource::new(
            listing,
            Arc::clone(&self.fetcher),
            self.config.reference_syntax()?,
            &self.config.endpoints.github,
        )))
    }

    pub fn tag_registry(&self) -> DockerHubRegistry {
        DockerHubRegistry::new(Arc::clone(&self.fetcher), &self.config.endpoints.docker_hub)
    }

    /// Checks whether the newest version of the selected source is published for `image`
    pub async fn run(
        &self,
        image: &str,
        selector: &Selector,
        strategies: Strategies,
    ) -> Result<Verdict, ResolveError> {
        let source = self.source(selector.kind, strategies)?;
        let registry: &dyn TagRegistry = &self.tag_registry();
        check(source.as_ref(), &selector.identifier, registry, image).await
    }
}
