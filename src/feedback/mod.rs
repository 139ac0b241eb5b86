//! Reviewer feedback: records, storage, and repeat-submission handling.

pub mod dedup;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod record;
pub mod store;


pub use dedup::{FeedbackDeduplicator, SubmitAction};
pub use error::{FeedbackError, FeedbackResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::InMemoryFeedbackStore;
pub use record::{
    ComparisonKey, FeedbackEntry, FeedbackRecord, FeedbackValue, Split, StoredFeedback,
    TimestampKey, format_timestamp,
};
pub use store::{FeedbackStore, FileFeedbackStore, feedback_id, parse_feedback_id};
