//! Cross-cutting, shared constants.
//!
//! Values that the MediaWiki API imposes are kept here so the resolver, the
//! client and the config loader agree on them.

/// Default MediaWiki action API endpoint.
pub const DEFAULT_WIKI_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Default model identifier handed to the `genai` client.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Largest `rvlimit` the revision API accepts for a single page.
pub const MAX_REVISIONS_PER_PAGE: u32 = 500;

/// Largest "revisions back" a count lookup can satisfy (page size is `n + 1`).
pub const MAX_REVISIONS_BACK: u32 = MAX_REVISIONS_PER_PAGE - 1;

/// Revisions fetched per page when measuring distance for age lookups.
pub const DEFAULT_HISTORY_PAGE_SIZE: u32 = MAX_REVISIONS_PER_PAGE;

/// Pages scanned before `distance_between` gives up and reports "at least".
pub const DEFAULT_MAX_HISTORY_PAGES: u32 = 10;

/// Default maximum number of attempts for a model call (including the first).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Delay before the first retry.
pub const DEFAULT_BASE_DELAY_MS: u64 = 2_000;

/// Multiplier applied to the delay after each failure (before jitter).
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;

/// Longest single wait between model call attempts.
pub const DEFAULT_MAX_DELAY_MS: u64 = 60_000;

/// Upper bound accepted for the attempt count of a model call.
pub const MAX_ATTEMPTS_LIMIT: u32 = 20;

/// Probability that a new feedback record is assigned to the test split.
pub const DEFAULT_TEST_SPLIT_PROBABILITY: f64 = 0.4;

/// Capacity of the in-memory lead-section cache.
pub const DEFAULT_LEAD_CACHE_CAPACITY: u64 = 1_024;

/// Class markers that suspend text capture inside the lead section.
pub const SUPPRESSED_CLASS_MARKERS: [&str; 4] = ["infobox", "navbox", "metadata", "toc"];

/// How far back a comparison looks when the request does not say.
pub const DEFAULT_COMPARE_NUMBER: u32 = 50;
