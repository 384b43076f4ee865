use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::version::error::ResolveError;
use crate::version::fetcher::RetryPolicy;
use crate::version::reference::ReferenceSyntax;

// =============================================================================
// Defaults
// =============================================================================

/// Number of retries after the first failed attempt
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Wait before each retry in milliseconds (30s, 60s, 90s)
pub const DEFAULT_BACKOFF_MS: [u64; 3] = [30_000, 60_000, 90_000];

/// Timeout for a single HTTP attempt in milliseconds (30 seconds)
pub const REQUEST_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_BRANCH_SEPARATOR: char = ':';
pub const DEFAULT_BASE_SEPARATOR: char = '@';

/// Empty means "let the hosting platform pick its default branch"
pub const DEFAULT_BRANCH: &str = "";

pub const DEFAULT_PYPI_URL: &str = "https://pypi.org";
pub const DEFAULT_GO_PROXY_URL: &str = "https://proxy.golang.org";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITLAB_API_URL: &str = "https://gitlab.com/api/v4";
pub const DEFAULT_DOCKER_HUB_URL: &str = "https://hub.docker.com";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TagwatchConfig {
    pub retry: RetryConfig,
    pub reference: ReferenceConfig,
    pub endpoints: EndpointsConfig,
    pub tools: ToolsConfig,
}

impl TagwatchConfig {
    /// Reads a JSON configuration file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ResolveError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResolveError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| ResolveError::Config(format!("invalid {}: {}", path.display(), e)))
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, ResolveError> {
        RetryPolicy::new(
            self.retry.max_retries,
            self.retry
                .backoff_ms
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.retry.request_timeout_ms)
    }

    pub fn reference_syntax(&self) -> Result<ReferenceSyntax, ResolveError> {
        ReferenceSyntax::new(
            self.reference.branch_separator,
            self.reference.base_separator,
            &self.reference.default_branch,
        )
    }
}

/// Retry behaviour of the fetcher
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryConfig {
    pub max_retries: usize,
    pub backoff_ms: Vec<u64>,
    pub request_timeout_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_ms: DEFAULT_BACKOFF_MS.to_vec(),
            request_timeout_ms: REQUEST_TIMEOUT_MS,
        }
    }
}

/// Delimiters and defaults used to split `repo[:branch][@base]` identifiers
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceConfig {
    pub branch_separator: char,
    pub base_separator: char,
    pub default_branch: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            branch_separator: DEFAULT_BRANCH_SEPARATOR,
            base_separator: DEFAULT_BASE_SEPARATOR,
            default_branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

/// Base URLs of the remote APIs
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointsConfig {
    pub pypi: String,
    pub go_proxy: String,
    pub github: String,
    pub gitlab: String,
    pub docker_hub: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            pypi: DEFAULT_PYPI_URL.to_string(),
            go_proxy: DEFAULT_GO_PROXY_URL.to_string(),
            github: DEFAULT_GITHUB_API_URL.to_string(),
            gitlab: DEFAULT_GITLAB_API_URL.to_string(),
            docker_hub: DEFAULT_DOCKER_HUB_URL.to_string(),
        }
    }
}

/// Local binaries invoked by subprocess-based resolvers
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolsConfig {
    pub pip: String,
    pub go: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            pip: "pip".to_string(),
            go: "go".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<TagwatchConfig>(json!({
            "retry": {
                "maxRetries": 1
            }
        }))
        .unwrap();

        assert_eq!(result.retry.max_retries, 1);
        assert_eq!(result.retry.backoff_ms, DEFAULT_BACKOFF_MS.to_vec());
        assert_eq!(result.endpoints, EndpointsConfig::default());
        assert_eq!(result.reference, ReferenceConfig::default());
    }

    #[test]
    fn config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<TagwatchConfig>(json!({
            "retry": { "maxRetries": 2, "backoffMs": [10, 20], "requestTimeoutMs": 500 },
            "reference": { "branchSeparator": "#", "baseSeparator": "|", "defaultBranch": "main" },
            "endpoints": {
                "pypi": "http://pypi.local",
                "goProxy": "http://goproxy.local",
                "github": "http://github.local",
                "gitlab": "http://gitlab.local/api/v4",
                "dockerHub": "http://hub.local"
            },
            "tools": { "pip": "pip3", "go": "/usr/local/go/bin/go" }
        }))
        .unwrap();

        assert_eq!(
            result,
            TagwatchConfig {
                retry: RetryConfig {
                    max_retries: 2,
                    backoff_ms: vec![10, 20],
                    request_timeout_ms: 500,
                },
                reference: ReferenceConfig {
                    branch_separator: '#',
                    base_separator: '|',
                    default_branch: "main".to_string(),
                },
                endpoints: EndpointsConfig {
                    pypi: "http://pypi.local".to_string(),
                    go_proxy: "http://goproxy.local".to_string(),
                    github: "http://github.local".to_string(),
                    gitlab: "http://gitlab.local/api/v4".to_string(),
                    docker_hub: "http://hub.local".to_string(),
                },
                tools: ToolsConfig {
                    pip: "pip3".to_string(),
                    go: "/usr/local/go/bin/go".to_string(),
                },
            }
        );
    }

    #[test]
    fn default_config_builds_valid_policy_and_syntax() {
        let config = TagwatchConfig::default();

        let policy = config.retry_policy().unwrap();
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(
            policy.delays(),
            &[
                Duration::from_secs(30),
                Duration::from_secs(60),
                Duration::from_secs(90)
            ]
        );
        assert!(config.reference_syntax().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn retry_policy_rejects_non_increasing_backoff() {
        let config = serde_json::from_value::<TagwatchConfig>(json!({
            "retry": { "maxRetries": 2, "backoffMs": [20, 20] }
        }))
        .unwrap();

        assert!(matches!(config.retry_policy(), Err(ResolveError::Config(_))));
    }

    #[test]
    fn from_file_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"tools": {{"pip": "pip3"}}}}"#).unwrap();

        let config = TagwatchConfig::from_file(file.path()).unwrap();

        assert_eq!(config.tools.pip, "pip3");
        assert_eq!(config.tools.go, "go");
    }

    #[test]
    fn from_file_reports_config_error_for_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = TagwatchConfig::from_file(file.path());

        assert!(matches!(result, Err(ResolveError::Config(_))));
    }

    #[test]
    fn from_file_reports_config_error_for_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();

        let result = TagwatchConfig::from_file(&dir.path().join("missing.json"));

        assert!(matches!(result, Err(ResolveError::Config(_))));
    }
}
