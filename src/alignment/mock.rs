use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::{AlignmentError, AlignmentResult};
use super::repository::AlignmentRepository;

/// [`AlignmentRepository`] backed by a map.
#[derive(Default)]
pub struct InMemoryAlignmentRepository {
    rounds: RwLock<BTreeMap<u32, String>>,
}

impl InMemoryAlignmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_round(self, round: u32, text: &str) -> Self {
        self.rounds.write().insert(round, text.to_string());
        self
    }

    pub fn rounds(&self) -> Vec<u32> {
        self.rounds.read().keys().copied().collect()
    }
}

#[async_trait]
impl AlignmentRepository for InMemoryAlignmentRepository {
    async fn latest(&self) -> AlignmentResult<Option<u32>> {
        Ok(self.rounds.read().keys().next_back().copied())
    }

    async fn get(&self, round: u32) -> AlignmentResult<String> {
        self.rounds
            .read()
            .get(&round)
            .cloned()
            .ok_or(AlignmentError::RoundNotFound(round))
    }

    async fn put(&self, round: u32, text: &str) -> AlignmentResult<()> {
        let mut rounds = self.rounds.write();
        if rounds.contains_key(&round) {
            return Err(AlignmentError::RoundExists(round));
        }
        rounds.insert(round, text.to_string());
        Ok(())
    }
}
