//! Station directory: the full station list from the Open Data Plaza.
//!
//! The directory is the unauthenticated half of the system: a token-keyed
//! JSON API serving every docking station with live bike counts. Fetches
//! are paged (the upstream caps each request at 1000 rows) and individual
//! unparseable rows are skipped and counted rather than failing the fetch.

mod cache;
mod client;
mod error;

pub use cache::{CachedDirectory, DirectoryCacheConfig};
pub use client::{DirectoryClient, DirectoryConfig, DirectoryFetch};
pub use error::DirectoryError;
