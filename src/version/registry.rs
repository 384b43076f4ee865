//! Registry trait for fetching the tags already published for an image

#[cfg(test)]
use mockall::automock;

use crate::version::checker::TagSet;
use crate::version::error::ResolveError;

/// Trait for listing published container image tags
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait TagRegistry: Send + Sync {
    /// Fetches every tag of `image`, across all pages
    ///
    /// # Arguments
    /// * `image` - Image repository, e.g. `library/nginx` or `owner/app`
    async fn published_tags(&self, image: &str) -> Result<TagSet, ResolveError>;
}
