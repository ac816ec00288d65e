//! # ih-db-memory
//!
//! Process-local implementation of `IdeaRepo` and `InteractionRepo`.
//! Used as the fake in tests and as a zero-setup backend for development.
//! Nothing survives a restart.

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ih_core::error::{AppError, Result};
use ih_core::models::{timestamp_now, Idea, IdeaId, Interaction, Judgment, NewIdea, UserId};
use ih_core::traits::{IdeaRepo, InteractionRepo};
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    ideas: DashMap<IdeaId, Idea>,
    /// Keyed on the uniqueness constraint itself.
    interactions: DashMap<(UserId, IdeaId), Interaction>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interaction rows currently held.
    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    /// Stores a fully formed idea as-is, timestamp included.
    #[cfg(test)]
    fn insert_idea(&self, idea: Idea) {
        self.ideas.insert(idea.id, idea);
    }

    fn sorted(mut ideas: Vec<Idea>) -> Vec<Idea> {
        ideas.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        ideas
    }
}

#[async_trait]
impl IdeaRepo for MemoryStore {
    async fn create_idea(&self, idea: NewIdea) -> Result<Idea> {
        let idea = idea.into_idea(Uuid::now_v7(), timestamp_now());
        match self.ideas.entry(idea.id) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!("idea {} already exists", idea.id))),
            Entry::Vacant(slot) => {
                slot.insert(idea.clone());
                debug!(idea_id = %idea.id, "idea stored in memory");
                Ok(idea)
            }
        }
    }

    async fn get_idea(&self, id: IdeaId) -> Result<Option<Idea>> {
        Ok(self.ideas.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_excluding(&self, excluded: &HashSet<IdeaId>) -> Result<Vec<Idea>> {
        let ideas = self
            .ideas
            .iter()
            .filter(|entry| !excluded.contains(entry.key()))
            .map(|entry| entry.value().clone())
            .collect();
        Ok(Self::sorted(ideas))
    }

    async fn list_by_author(&self, author_id: &str) -> Result<Vec<Idea>> {
        let ideas = self
            .ideas
            .iter()
            .filter(|entry| entry.value().author_id == author_id)
            .map(|entry| entry.value().clone())
            .collect();
        Ok(Self::sorted(ideas))
    }
}

#[async_trait]
impl InteractionRepo for MemoryStore {
    /// The insert-or-update happens while holding the shard lock of the
    /// (user, idea) key, so concurrent judgments on one pair serialize.
    async fn upsert_interaction(&self, judgment: Judgment) -> Result<Interaction> {
        if !self.ideas.contains_key(&judgment.idea_id()) {
            return Err(AppError::idea_not_found(judgment.idea_id()));
        }

        let key = (judgment.user_id().to_string(), judgment.idea_id());
        let row = match self.interactions.entry(key) {
            Entry::Occupied(mut existing) => {
                judgment.apply_to(existing.get_mut());
                existing.get().clone()
            }
            Entry::Vacant(slot) => {
                let row = judgment.into_interaction(Uuid::now_v7(), timestamp_now());
                slot.insert(row.clone());
                row
            }
        };
        Ok(row)
    }

    async fn get_for_user(&self, idea_id: IdeaId, user_id: &str) -> Result<Option<Interaction>> {
        Ok(self
            .interactions
            .get(&(user_id.to_string(), idea_id))
            .map(|entry| entry.value().clone()))
    }

    async fn get_all_for_idea(&self, idea_id: IdeaId) -> Result<Vec<Interaction>> {
        let mut rows: Vec<Interaction> = self
            .interactions
            .iter()
            .filter(|entry| entry.key().1 == idea_id)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn idea_ids_for_user(&self, user_id: &str) -> Result<HashSet<IdeaId>> {
        Ok(self
            .interactions
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.key().1)
            .collect())
    }
}
