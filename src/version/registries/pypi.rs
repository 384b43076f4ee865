//! PyPI versions, from the JSON API or from a local `pip`

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::version::command::{CommandRunner, display_command};
use crate::version::error::ResolveError;
use crate::version::fetcher::Fetcher;
use crate::version::source::{SourceKind, VersionSource, no_versions};

/// Matches the version list pip prints when asked for a version that does not exist
static FROM_VERSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(from versions: (.*)\)").expect("from-versions pattern is valid")
});

/// Length of the `Available versions: ` prefix in `pip index versions` output
const PIP_INDEX_PREFIX_LEN: usize = 20;

/// How versions of a PyPI package are looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PypiStrategy {
    /// JSON API, releases ordered by upload time
    #[default]
    Metadata,
    /// `pip index versions <package>`
    PipIndex,
    /// `pip install <package>==`, reading the "from versions" hint
    PipInstall,
    /// `pip install --upgrade <package>` then `pip freeze` (latest only)
    PipFreeze,
}

/// PyPI JSON API response structure
#[derive(Debug, Deserialize)]
struct PypiResponse {
    releases: IndexMap<String, Vec<PypiFile>>,
}

/// Uploaded distribution file of a release
#[derive(Debug, Deserialize)]
struct PypiFile {
    upload_time_iso_8601: String,
}

/// Version source for Python packages
pub struct PypiSource {
    strategy: PypiStrategy,
    fetcher: Arc<Fetcher>,
    runner: Arc<dyn CommandRunner>,
    base_url: String,
    pip: String,
}

impl PypiSource {
    pub fn new(
        strategy: PypiStrategy,
        fetcher: Arc<Fetcher>,
        runner: Arc<dyn CommandRunner>,
        base_url: &str,
        pip: &str,
    ) -> Self {
        Self {
            strategy,
            fetcher,
            runner,
            base_url: base_url.trim_end_matches('/').to_string(),
            pip: pip.to_string(),
        }
    }

    async fn metadata_versions(&self, package: &str) -> Result<Vec<String>, ResolveError> {
        let url = format!("{}/pypi/{}/json", self.base_url, package);
        let response: PypiResponse = self.fetcher.fetch_json(&url).await?;

        let mut uploaded = Vec::with_capacity(response.releases.len());
        for (version, files) in response.releases {
            // Yanked-everything releases have no files and no upload time
            let Some(first) = files.first() else {
                debug!("Skipping {} {}: no files", package, version);
                continue;
            };
            let time = DateTime::<FixedOffset>::parse_from_rfc3339(&first.upload_time_iso_8601)
                .map_err(|e| {
                    ResolveError::parse(
                        format!("upload time of {package} {version}"),
                        e,
                    )
                })?;
            uploaded.push((time, version));
        }
        // Stable: releases uploaded at the same instant keep their listing order
        uploaded.sort_by_key(|(time, _)| *time);

        Ok(uploaded.into_iter().map(|(_, version)| version).collect())
    }

    async fn pip_install_versions(&self, package: &str) -> Result<Vec<String>, ResolveError> {
        // pip exits non-zero here by design; only the hint matters
        let args = vec!["install".to_string(), format!("{package}==")];
        let output = self.runner.run(&self.pip, &args).await?;

        let captures = FROM_VERSIONS.captures(&output.stderr).ok_or_else(|| {
            ResolveError::parse(
                display_command(&self.pip, &args),
                "no \"from versions\" list in output",
            )
        })?;
        let listed = &captures[1];
        if listed == "none" {
            return Ok(Vec::new());
        }

        Ok(split_versions(listed).collect())
    }

    async fn pip_index_versions(&self, package: &str) -> Result<Vec<String>, ResolveError> {
        let args = vec![
            "index".to_string(),
            "versions".to_string(),
            package.to_string(),
        ];
        let command = display_command(&self.pip, &args);
        let output = self.runner.run(&self.pip, &args).await?.into_success(&command)?;

        let line = output
            .stdout
            .lines()
            .nth(1)
            .ok_or_else(|| ResolveError::parse(&command, "missing version line"))?;
        if line.chars().count() < PIP_INDEX_PREFIX_LEN {
            return Err(ResolveError::parse(&command, format!("unexpected line {line:?}")));
        }
        let listed: String = line.chars().skip(PIP_INDEX_PREFIX_LEN).collect();

        // pip lists newest first
        let mut versions: Vec<String> = split_versions(&listed).collect();
        versions.reverse();
        Ok(versions)
    }

    async fn pip_freeze_versions(&self, package: &str) -> Result<Vec<String>, ResolveError> {
        let install = vec![
            "install".to_string(),
            "--upgrade".to_string(),
            package.to_string(),
        ];
        self.runner
            .run(&self.pip, &install)
            .await?
            .into_success(&display_command(&self.pip, &install))?;

        let freeze = vec!["freeze".to_string()];
        let command = display_command(&self.pip, &freeze);
        let output = self.runner.run(&self.pip, &freeze).await?.into_success(&command)?;

        let prefix = format!("{package}==");
        output
            .stdout
            .lines()
            .find_map(|line| line.strip_prefix(&prefix))
            .map(|version| vec![version.to_string()])
            .ok_or_else(|| ResolveError::parse(&command, format!("{package} is not installed")))
    }
}

/// Splits a `, `-separated version list, dropping empty entries
fn split_versions(listed: &str) -> impl Iterator<Item = String> + '_ {
    listed
        .split(", ")
        .map(str::trim)
        .filter(|version| !version.is_empty())
        .map(str::to_string)
}

#[async_trait::async_trait]
impl VersionSource for PypiSource {
    fn kind(&self) -> SourceKind {
        SourceKind::PackageRegistry
    }

    async fn ordered_versions(&self, identifier: &str) -> Result<Vec<String>, ResolveError> {
        let versions = match self.strategy {
            PypiStrategy::Metadata => self.metadata_versions(identifier).await?,
            PypiStrategy::PipInstall => self.pip_install_versions(identifier).await?,
            PypiStrategy::PipIndex => self.pip_index_versions(identifier).await?,
            PypiStrategy::PipFreeze => self.pip_freeze_versions(identifier).await?,
        };

        debug!(
            "Found {} versions for package {}",
            versions.len(),
            identifier
        );

        if versions.is_empty() {
            return Err(no_versions(self.kind(), identifier));
        }
        Ok(versions)
    }
}
