//! Upstream sources and the image tag registry

pub mod docker_hub;
pub mod github;
pub mod gitlab;
pub mod go_proxy;
pub mod pypi;

pub use docker_hub::DockerHubRegistry;
pub use github::{GitHubListing, GitHubSource};
pub use gitlab::GitLabSource;
pub use go_proxy::{GoModuleSource, GoStrategy};
pub use pypi::{PypiSource, PypiStrategy};
