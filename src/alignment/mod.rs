//! Versioned arbiter guidance ("alignment rounds").
//!
//! Round `n` is written once from round `n - 1` plus reviewer feedback and is
//! never overwritten. The arbiter reads the highest round unless one is pinned.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod repository;
pub mod updater;


pub use error::{AlignmentError, AlignmentResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::InMemoryAlignmentRepository;
pub use repository::{
    AlignmentRepository, FileAlignmentRepository, parse_round_file_name, round_file_name,
};
pub use updater::{AlignmentUpdater, ground_truth, training_example};
