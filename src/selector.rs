//! Choice of the upstream source to resolve

use crate::version::error::ResolveError;
use crate::version::source::SourceKind;

/// Environment variables consulted when no selector flag is given, in priority order
pub const SELECTOR_ENV_VARS: [(&str, SourceKind); 6] = [
    ("TAG_PIP", SourceKind::PackageRegistry),
    ("TAG_GO", SourceKind::ModuleProxy),
    ("TAG_GH_COMMIT", SourceKind::GitHubCommits),
    ("TAG_GH_TAG", SourceKind::GitHubTags),
    ("TAG_GH_RELEASE", SourceKind::GitHubReleases),
    ("TAG_GL_COMMIT", SourceKind::GitLabCommits),
];

/// The selected source and the upstream identifier passed to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub kind: SourceKind,
    pub identifier: String,
}

/// Raw selector values as given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorArgs {
    pub pip: Option<String>,
    pub go: Option<String>,
    pub gh_commit: Option<String>,
    pub gh_tag: Option<String>,
    pub gh_release: Option<String>,
    pub gl_commit: Option<String>,
}

impl SelectorArgs {
    /// Picks the first non-empty selector, filling unset flags from `env`.
    ///
    /// Fails with [`ResolveError::Config`] when nothing is selected.
    pub fn resolve<F>(self, env: F) -> Result<Selector, ResolveError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flags = [
            self.pip,
            self.go,
            self.gh_commit,
            self.gh_tag,
            self.gh_release,
            self.gl_commit,
        ];

        flags
            .into_iter()
            .zip(SELECTOR_ENV_VARS)
            .find_map(|(flag, (var, kind))| {
                flag.or_else(|| env(var))
                    .filter(|identifier| !identifier.is_empty())
                    .map(|identifier| Selector { kind, identifier })
            })
            .ok_or_else(|| {
                ResolveError::Config(
                    "no source selected: pass one of --pip, --go, --gh-commit, --gh-tag, \
                     --gh-release, --gl-commit"
                        .to_string(),
                )
            })
    }
}
