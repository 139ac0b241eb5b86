//! Revision history lookups against a MediaWiki API.
//!
//! The [`RevisionResolver`] converts a loose request ("50 revisions back",
//! "30 days back") into a concrete [`RevisionRef`]. A page or revision that does
//! not exist is an ordinary outcome, reported as a reference without an id;
//! only transport and API failures surface as [`WikiError`].

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use client::{MediaWikiClient, WikiSource};
pub use error::{WikiError, WikiResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockWikiSource;
pub use model::{
    HistoryPolicy, RevisionDistance, RevisionEntry, RevisionId, RevisionPage, RevisionQuery,
    RevisionRef, Units,
};
pub use resolver::RevisionResolver;
