use serde::{Deserialize, Serialize};

use crate::feedback::{FeedbackRecord, FeedbackValue};
use crate::session::ComparisonReport;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RandomTitleResponse {
    pub title: String,
}

/// A finished comparison plus the record the reviewer submits feedback against.
#[derive(Serialize, Debug, Clone)]
pub struct CompareResponse {
    pub report: ComparisonReport,
    pub record: FeedbackRecord,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FeedbackRequest {
    pub record: FeedbackRecord,
    pub feedback: FeedbackValue,
}
