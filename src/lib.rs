//! Noteworthy-differences library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! The pipeline, in the order a comparison runs:
//!
//! - [`RevisionResolver`] - "N revisions / days back" to a concrete revision
//! - [`LeadExtractor`] - revision-pinned render to lead-section prose
//! - [`DecisionEngine`] - two classifier styles plus an arbiter, over a
//!   [`ResilientInvoker`] that retries model calls with jittered backoff
//! - [`confidence`] - agreement label for the three verdicts
//! - [`ComparisonSession`] - all of the above for one request
//!
//! Around it:
//!
//! - [`FeedbackDeduplicator`] - save / update / retract reviewer feedback
//! - [`AlignmentRepository`], [`AlignmentUpdater`] - versioned arbiter guidance
//! - [`Config`] - `NOTEWORTHY_*` environment configuration
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod alignment;
pub mod config;
pub mod constants;
pub mod decision;
pub mod extract;
pub mod feedback;
pub mod gateway;
pub mod hashing;
pub mod model;
pub mod session;
pub mod wiki;

pub use alignment::{
    AlignmentError, AlignmentRepository, AlignmentResult, AlignmentUpdater,
    FileAlignmentRepository,
};
#[cfg(any(test, feature = "mock"))]
pub use alignment::InMemoryAlignmentRepository;

pub use config::{Config, ConfigError};

pub use decision::{
    AlignmentMode, ArbiterVerdict, ClassifierVerdict, ConfidenceLabel, DecisionEngine,
    DecisionError, PromptStyle, confidence,
};

pub use extract::{LeadExtractor, lead_text};

pub use feedback::{
    FeedbackDeduplicator, FeedbackEntry, FeedbackError, FeedbackRecord, FeedbackStore,
    FeedbackValue, FileFeedbackStore, Split, SubmitAction,
};
#[cfg(any(test, feature = "mock"))]
pub use feedback::InMemoryFeedbackStore;

pub use hashing::{FieldHasher, hash_to_u64};

pub use model::{
    GenaiBackend, ModelBackend, ModelError, ModelRequest, ResilientInvoker, RetryPolicy,
};
#[cfg(any(test, feature = "mock"))]
pub use model::MockModelBackend;

pub use session::{CompareRequest, ComparisonReport, ComparisonSession, SessionError};

pub use wiki::{
    HistoryPolicy, MediaWikiClient, RevisionDistance, RevisionRef, RevisionResolver, Units,
    WikiError, WikiSource,
};
#[cfg(any(test, feature = "mock"))]
pub use wiki::MockWikiSource;
