//! Version resolution layer
//!
//! This module asks upstream sources for their newest version and compares it
//! against the tags already published for a container image.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│   Fetcher   │◀────│ TagRegistry │
//! │  (latest)   │     │   (retry)   │     │   (tags)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │  Reference  │                         │   Checker   │
//! │  (parsing)  │                         │  (decide)   │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`checker`]: Tag-presence decision and the end-to-end check
//! - [`command`]: Child process execution for tool-backed sources
//! - [`error`]: Error taxonomy shared by every component
//! - [`fetcher`]: HTTP GET with bounded retry and increasing backoff
//! - [`reference`]: `repo[:branch][@base]` identifier parsing
//! - [`registries`]: Concrete sources (PyPI, Go, GitHub, GitLab) and Docker Hub
//! - [`registry`]: Trait for listing published image tags
//! - [`source`]: Trait for resolving upstream versions

pub mod checker;
pub mod command;
pub mod error;
pub mod fetcher;
pub mod reference;
pub mod registries;
pub mod registry;
pub mod source;
