//! Classification and arbitration.
//!
//! Two classifier prompts judge the same pair of texts independently; an
//! arbiter reads both rationales and gives the final verdict; the
//! [`confidence`] function labels how well the three agree.

pub mod confidence;
pub mod engine;
pub mod error;
pub mod mode;
pub mod prompts;
pub mod schema;


pub use confidence::{ConfidenceLabel, confidence};
pub use engine::DecisionEngine;
pub use error::{DecisionError, DecisionResult};
pub use mode::{AlignmentMode, PromptStyle};
pub use schema::{
    ARBITER_SCHEMA, ArbiterVerdict, CLASSIFIER_SCHEMA, ClassifierVerdict, noteworthy_label,
};
