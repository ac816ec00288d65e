//! # Engine Facade
//!
//! The single entry point in front of the idea store, the interaction store,
//! the feed selector and the stats aggregator. Stores are injected, so tests
//! and dev setups can swap in the in-memory plugin or mocks.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::error::{AppError, Result};
use crate::feed::FeedSelector;
use crate::models::{
    normalize_user_id, Idea, IdeaDetail, IdeaDraft, IdeaFeedback, IdeaId, IdeaWithStats, Interaction, Judgment,
};
use crate::stats::{aggregate, IdeaStats};
use crate::traits::{IdeaRepo, InteractionRepo};

#[derive(Clone)]
pub struct Engine {
    ideas: Arc<dyn IdeaRepo>,
    interactions: Arc<dyn InteractionRepo>,
    feed: FeedSelector,
}

impl Engine {
    pub fn new(ideas: Arc<dyn IdeaRepo>, interactions: Arc<dyn InteractionRepo>) -> Self {
        let feed = FeedSelector::new(ideas.clone(), interactions.clone());
        Self {
            ideas,
            interactions,
            feed,
        }
    }

    /// Validates and persists a new idea. Nothing reaches the store when the
    /// draft is invalid.
    #[instrument(skip(self, draft), fields(author = %draft.author_id))]
    pub async fn submit_idea(&self, draft: IdeaDraft) -> Result<Idea> {
        let new_idea = draft.validate()?;
        let idea = self.ideas.create_idea(new_idea).await?;
        info!(idea_id = %idea.id, "idea submitted");
        Ok(idea)
    }

    /// Ideas the user has not judged yet, newest first.
    #[instrument(skip(self))]
    pub async fn get_feed(&self, user_id: &str) -> Result<Vec<Idea>> {
        self.feed.feed_for(&normalize_user_id(user_id)).await
    }

    /// Every idea, newest first.
    #[instrument(skip(self))]
    pub async fn list_ideas(&self) -> Result<Vec<Idea>> {
        self.ideas.list_excluding(&HashSet::new()).await
    }

    /// Records (or overwrites) the judgment of `user_id` on `idea_id`.
    ///
    /// Retrying with the same arguments is always safe: the store applies
    /// an idempotent overwrite.
    #[instrument(skip(self))]
    pub async fn record_interaction(
        &self,
        user_id: &str,
        idea_id: IdeaId,
        swipe: bool,
        rating: Option<i64>,
    ) -> Result<Interaction> {
        let judgment = Judgment::new(user_id, idea_id, swipe, rating)?;
        let interaction = self.interactions.upsert_interaction(judgment).await?;
        debug!(interaction_id = %interaction.id, "interaction recorded");
        Ok(interaction)
    }

    /// Recomputes feedback for one idea from its current interaction rows.
    /// An idea nobody has judged (or an unknown id) yields empty stats.
    #[instrument(skip(self))]
    pub async fn get_stats(&self, idea_id: IdeaId) -> Result<IdeaStats> {
        let rows = self.interactions.get_all_for_idea(idea_id).await?;
        Ok(aggregate(&rows))
    }

    /// Stats together with the rows they were computed from, read once.
    #[instrument(skip(self))]
    pub async fn get_feedback(&self, idea_id: IdeaId) -> Result<IdeaFeedback> {
        let interactions = self.interactions.get_all_for_idea(idea_id).await?;
        let stats = aggregate(&interactions);
        Ok(IdeaFeedback { interactions, stats })
    }

    #[instrument(skip(self))]
    pub async fn get_user_interaction(&self, idea_id: IdeaId, user_id: &str) -> Result<Option<Interaction>> {
        self.interactions
            .get_for_user(idea_id, &normalize_user_id(user_id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_idea(&self, idea_id: IdeaId) -> Result<IdeaDetail> {
        let idea = self
            .ideas
            .get_idea(idea_id)
            .await?
            .ok_or_else(|| AppError::idea_not_found(idea_id))?;
        let stats = self.get_stats(idea_id).await?;
        Ok(IdeaDetail { idea, stats })
    }

    /// An author's own ideas with their feedback, newest first.
    #[instrument(skip(self))]
    pub async fn list_author_ideas(&self, author_id: &str) -> Result<Vec<IdeaWithStats>> {
        let ideas = self.ideas.list_by_author(&normalize_user_id(author_id)).await?;
        let mut out = Vec::with_capacity(ideas.len());
        for idea in ideas {
            let stats = self.get_stats(idea.id).await?;
            out.push(IdeaWithStats { idea, stats });
        }
        Ok(out)
    }
}
