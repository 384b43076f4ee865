//! Shared test utilities

mod registry;

pub use registry::*;
