use std::sync::Arc;

use crate::feedback::FeedbackDeduplicator;
use crate::session::ComparisonSession;

/// Shared by every request; cloning is cheap.
#[derive(Clone)]
pub struct HandlerState {
    pub session: Arc<ComparisonSession>,

    /// The single deduplicator in front of the feedback store.
    pub feedback: Arc<FeedbackDeduplicator>,

    /// Set when upstream services are replaced by canned responses.
    pub mock_provider: bool,
}

impl HandlerState {
    pub fn new(session: ComparisonSession, feedback: FeedbackDeduplicator) -> Self {
        Self {
            session: Arc::new(session),
            feedback: Arc::new(feedback),
            mock_provider: false,
        }
    }

    pub fn with_mock_provider(mut self, mock_provider: bool) -> Self {
        self.mock_provider = mock_provider;
        self
    }
}
