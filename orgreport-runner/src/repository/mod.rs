//! Repository layer
//!
//! Traits over the remote data the runner reads and writes, with GitHub
//! implementations. Services depend on the traits only, so they can be
//! exercised against in-memory fakes.

mod contents;
mod pages;

pub use contents::{ContentStore, GitHubContentStore};
pub use pages::{GitHubPageSource, RepositoryPageSource};
