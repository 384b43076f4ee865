//! Parsing of `repository[:branch][@base-url]` identifiers

use crate::version::error::ResolveError;

/// A repository identifier split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    /// `owner/name`, a nested group path, or a numeric project id
    pub repository: String,
    /// Branch to follow; empty means the platform's default branch
    pub branch: String,
    /// API root to send requests to
    pub base_url: String,
}

impl RepositoryReference {
    /// Numeric identifiers are project ids and need no lookup
    pub fn project_id(&self) -> Option<u64> {
        if !self.repository.is_empty() && self.repository.bytes().all(|b| b.is_ascii_digit()) {
            self.repository.parse().ok()
        } else {
            None
        }
    }
}

/// Delimiters and defaults for [`RepositoryReference`] parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSyntax {
    branch_separator: char,
    base_separator: char,
    default_branch: String,
}

impl ReferenceSyntax {
    pub fn new(
        branch_separator: char,
        base_separator: char,
        default_branch: &str,
    ) -> Result<Self, ResolveError> {
        if branch_separator == base_separator {
            return Err(ResolveError::Config(format!(
                "branch and base separators must differ, both are '{}'",
                branch_separator
            )));
        }
        if branch_separator == '/' || base_separator == '/' {
            return Err(ResolveError::Config(
                "'/' is part of repository paths and cannot be a separator".to_string(),
            ));
        }
        Ok(Self {
            branch_separator,
            base_separator,
            default_branch: default_branch.to_string(),
        })
    }

    /// Splits `raw` into repository, branch and base URL.
    ///
    /// The base URL is split off first since it may itself contain the branch
    /// separator (`https://`). A missing part takes its default, so
    /// `owner/repo`, `owner/repo:` and `owner/repo@<default_base_url>` all
    /// parse to the same reference.
    pub fn parse(&self, raw: &str, default_base_url: &str) -> RepositoryReference {
        let (rest, base_url) = split_or_default(raw, self.base_separator, default_base_url);
        let (repository, branch) = split_or_default(rest, self.branch_separator, &self.default_branch);

        RepositoryReference {
            repository: repository.to_string(),
            branch: branch.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for ReferenceSyntax {
    fn default() -> Self {
        Self {
            branch_separator: crate::config::DEFAULT_BRANCH_SEPARATOR,
            base_separator: crate::config::DEFAULT_BASE_SEPARATOR,
            default_branch: crate::config::DEFAULT_BRANCH.to_string(),
        }
    }
}

/// Splits once on `separator`, as if `separator + default` had been appended when absent
fn split_or_default<'a>(raw: &'a str, separator: char, default: &'a str) -> (&'a str, &'a str) {
    raw.split_once(separator).unwrap_or((raw, default))
}
