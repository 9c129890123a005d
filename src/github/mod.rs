// GitHub API module.
// Provides the HTTP client, endpoint helpers, and upstream payload types.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{GitHubClient, Transport};
pub use types::*;
