//! Go module versions, from the `go` toolchain or the module proxy

use std::sync::Arc;

use semver::Version;
use serde::Deserialize;
use tracing::debug;

use crate::version::command::{CommandRunner, display_command};
use crate::version::error::ResolveError;
use crate::version::fetcher::Fetcher;
use crate::version::source::{SourceKind, VersionSource, no_versions};

/// How versions of a Go module are looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum GoStrategy {
    /// `go list -json -m -versions <module>`
    #[default]
    Toolchain,
    /// `<proxy>/<module>/@latest` (latest only)
    ProxyLatest,
    /// `<proxy>/<module>/@v/list`, ordered by semantic version
    ProxyList,
}

/// Output of `go list -json -m -versions`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ModuleListing {
    /// Absent for modules without tagged versions
    #[serde(default)]
    versions: Vec<String>,
}

/// Response of the proxy `@latest` endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LatestInfo {
    version: String,
}

/// Version source for Go modules
pub struct GoModuleSource {
    strategy: GoStrategy,
    fetcher: Arc<Fetcher>,
    runner: Arc<dyn CommandRunner>,
    base_url: String,
    go: String,
}

impl GoModuleSource {
    pub fn new(
        strategy: GoStrategy,
        fetcher: Arc<Fetcher>,
        runner: Arc<dyn CommandRunner>,
        base_url: &str,
        go: &str,
    ) -> Self {
        Self {
            strategy,
            fetcher,
            runner,
            base_url: base_url.trim_end_matches('/').to_string(),
            go: go.to_string(),
        }
    }

    async fn toolchain_versions(&self, module: &str) -> Result<Vec<String>, ResolveError> {
        let args: Vec<String> = ["list", "-json", "-m", "-versions", module]
            .iter()
            .map(|arg| arg.to_string())
            .collect();
        let command = display_command(&self.go, &args);
        let output = self.runner.run(&self.go, &args).await?.into_success(&command)?;

        let listing: ModuleListing =
            serde_json::from_str(&output.stdout).map_err(|e| ResolveError::parse(&command, e))?;

        // go already lists versions in ascending order
        Ok(listing.versions)
    }

    async fn proxy_latest_version(&self, module: &str) -> Result<Vec<String>, ResolveError> {
        let url = format!("{}/{}/@latest", self.base_url, encode_module_path(module));
        let info: LatestInfo = self.fetcher.fetch_json(&url).await?;
        Ok(vec![info.version])
    }

    async fn proxy_list_versions(&self, module: &str) -> Result<Vec<String>, ResolveError> {
        let url = format!("{}/{}/@v/list", self.base_url, encode_module_path(module));
        let body = self.fetcher.fetch_text(&url).await?;

        // The proxy returns versions one per line in no particular order
        Ok(sort_semantically(body.lines()))
    }
}

#[async_trait::async_trait]
impl VersionSource for GoModuleSource {
    fn kind(&self) -> SourceKind {
        SourceKind::ModuleProxy
    }

    async fn ordered_versions(&self, identifier: &str) -> Result<Vec<String>, ResolveError> {
        let versions = match self.strategy {
            GoStrategy::Toolchain => self.toolchain_versions(identifier).await?,
            GoStrategy::ProxyLatest => self.proxy_latest_version(identifier).await?,
            GoStrategy::ProxyList => self.proxy_list_versions(identifier).await?,
        };

        debug!("Found {} versions for module {}", versions.len(), identifier);

        if versions.is_empty() {
            return Err(no_versions(self.kind(), identifier));
        }
        Ok(versions)
    }
}

/// Encodes a Go module path for use in proxy URLs.
/// Uppercase letters are escaped as !{lowercase}.
fn encode_module_path(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            result.push('!');
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Orders `v`-prefixed semantic versions ascending, dropping anything that does not parse
fn sort_semantically<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut parsed: Vec<(Version, &str)> = lines
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let stripped = line.strip_prefix('v').unwrap_or(line);
            Version::parse(stripped).ok().map(|version| (version, line))
        })
        .collect();
    parsed.sort();
    parsed.into_iter().map(|(_, line)| line.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::command::{CommandOutput, MockCommandRunner, SystemCommandRunner};
    use crate::version::fetcher::RetryPolicy;
    use mockito::Server;
    use std::time::Duration;

    fn fetcher() -> Arc<Fetcher> {
        Arc::new(Fetcher::new(RetryPolicy::no_retry(), Duration::from_secs(5)).unwrap())
    }

    fn proxy_source(strategy: GoStrategy, base_url: &str) -> GoModuleSource {
        GoModuleSource::new(
            strategy,
            fetcher(),
            Arc::new(SystemCommandRunner),
            base_url,
            "go",
        )
    }

    fn toolchain_source(runner: MockCommandRunner) -> GoModuleSource {
        GoModuleSource::new(
            GoStrategy::Toolchain,
            fetcher(),
            Arc::new(runner),
            "http://unused.invalid",
            "go",
        )
    }

    #[tokio::test]
    async fn toolchain_returns_versions_as_listed() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|program, args| {
                program == "go" && args == ["list", "-json", "-m", "-versions", "golang.org/x/text"]
            })
            .times(1)
            .returning(|_, _| {
                Ok(CommandOutput {
                    code: Some(0),
                    stdout: r#"{
                        "Path": "golang.org/x/text",
                        "Version": "v0.14.0",
                        "Versions": ["v0.12.0", "v0.13.0", "v0.14.0"]
                    }"#
                    .to_string(),
                    stderr: String::new(),
                })
            });

        let source = toolchain_source(runner);
        let versions = source.ordered_versions("golang.org/x/text").await.unwrap();

        assert_eq!(versions, vec!["v0.12.0", "v0.13.0", "v0.14.0"]);
    }

    #[tokio::test]
    async fn toolchain_latest_is_last_listed_version() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_, _| {
            Ok(CommandOutput {
                code: Some(0),
                stdout: r#"{"Path": "example.com/m", "Versions": ["v1.0.0", "v1.1.0"]}"#.to_string(),
                stderr: String::new(),
            })
        });

        let latest = toolchain_source(runner)
            .latest_version("example.com/m")
            .await
            .unwrap();

        assert_eq!(latest, "v1.1.0");
    }

    #[tokio::test]
    async fn toolchain_without_versions_is_parse_error() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_, _| {
            Ok(CommandOutput {
                code: Some(0),
                stdout: r#"{"Path": "example.com/untagged", "Version": "v0.0.0-2024"}"#.to_string(),
                stderr: String::new(),
            })
        });

        let result = toolchain_source(runner)
            .latest_version("example.com/untagged")
            .await;

        assert!(matches!(result, Err(ResolveError::Parse(_))));
    }

    #[tokio::test]
    async fn toolchain_failure_is_subprocess_error() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_, _| {
            Ok(CommandOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: "go: module example.com/missing: not found".to_string(),
            })
        });

        let result = toolchain_source(runner)
            .ordered_versions("example.com/missing")
            .await;

        assert!(matches!(result, Err(ResolveError::Subprocess { .. })));
    }

    #[tokio::test]
    async fn proxy_latest_reads_version_field() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/github.com/!azure/azure-sdk-for-go/@latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"Version": "v68.0.0+incompatible", "Time": "2022-10-18T00:00:00Z"}"#)
            .create_async()
            .await;

        let latest = proxy_source(GoStrategy::ProxyLatest, &server.url())
            .latest_version("github.com/Azure/azure-sdk-for-go")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(latest, "v68.0.0+incompatible");
    }

    #[tokio::test]
    async fn proxy_list_orders_versions_semantically() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/golang.org/x/text/@v/list")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("v0.14.0\nv0.9.0\nv0.13.0\nnot-a-version\n")
            .create_async()
            .await;

        let versions = proxy_source(GoStrategy::ProxyList, &server.url())
            .ordered_versions("golang.org/x/text")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(versions, vec!["v0.9.0", "v0.13.0", "v0.14.0"]);
    }

    #[tokio::test]
    async fn proxy_list_empty_is_parse_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/empty/module/@v/list")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let result = proxy_source(GoStrategy::ProxyList, &server.url())
            .latest_version("empty/module")
            .await;

        assert!(matches!(result, Err(ResolveError::Parse(_))));
    }

    #[tokio::test]
    async fn proxy_propagates_network_error_for_gone_module() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/deprecated/module/@latest")
            .with_status(410)
            .with_body("gone")
            .create_async()
            .await;

        let result = proxy_source(GoStrategy::ProxyLatest, &server.url())
            .latest_version("deprecated/module")
            .await;

        assert!(matches!(result, Err(ResolveError::Network { .. })));
    }

    #[test]
    fn encode_module_path_escapes_uppercase_letters() {
        assert_eq!(encode_module_path("github.com/Azure"), "github.com/!azure");
        assert_eq!(
            encode_module_path("github.com/Azure/AzureSDK"),
            "github.com/!azure/!azure!s!d!k"
        );
        assert_eq!(encode_module_path("golang.org/x/text"), "golang.org/x/text");
    }

    #[test]
    fn sort_semantically_orders_prereleases_before_releases() {
        let sorted = sort_semantically(["v1.0.0", "v1.0.0-rc.1", "v0.9.1"].into_iter());
        assert_eq!(sorted, vec!["v0.9.1", "v1.0.0-rc.1", "v1.0.0"]);
    }
}
