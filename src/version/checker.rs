//! Comparison of a resolved version against the published image tags

use std::collections::HashSet;
use std::fmt;

use tracing::info;

use crate::version::error::ResolveError;
use crate::version::registry::TagRegistry;
use crate::version::source::VersionSource;

/// Tags already published for an image. Only membership matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(HashSet<String>);

impl TagSet {
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for TagSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// Outcome of comparing the latest upstream version with the published tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The version has no image tag yet
    Pending(String),
    /// The version is already published
    UpToDate,
}

/// `tag=<version>` for pending versions, nothing otherwise
impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pending(version) => write!(f, "tag={version}"),
            Verdict::UpToDate => Ok(()),
        }
    }
}

/// Pending unless `latest` is already among the deployed tags
pub fn decide(latest: String, deployed: &TagSet) -> Verdict {
    if deployed.contains(&latest) {
        Verdict::UpToDate
    } else {
        Verdict::Pending(latest)
    }
}

/// Resolves the latest version of `identifier` and checks it against the tags of `image`
pub async fn check(
    source: &dyn VersionSource,
    identifier: &str,
    registry: &dyn TagRegistry,
    image: &str,
) -> Result<Verdict, ResolveError> {
    let deployed = registry.published_tags(image).await?;
    let latest = source.latest_version(identifier).await?;

    let verdict = decide(latest, &deployed);
    match &verdict {
        Verdict::Pending(version) => info!(
            "{} {} is not published as {}",
            source.kind().as_str(),
            version,
            image
        ),
        Verdict::UpToDate => info!("{} is up to date", image),
    }
    Ok(verdict)
}
