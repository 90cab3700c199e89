//! Source-repository access and the revision checkout cache
//!
//! Revisions are fetched once into a content-addressed cache keyed by
//! revision identifier; every tuple sharing a revision reads the same
//! checked-out tree. Checkouts are read-only shared resources.

pub mod cache;
pub mod error;
pub mod fetch;

pub use cache::{RetryPolicy, SourceCache};
pub use error::{Error, Result};
