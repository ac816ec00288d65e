//! # Feed Selector
//!
//! The feed of a user is every idea they have not judged yet, newest first.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::models::Idea;
use crate::traits::{IdeaRepo, InteractionRepo};

#[derive(Clone)]
pub struct FeedSelector {
    ideas: Arc<dyn IdeaRepo>,
    interactions: Arc<dyn InteractionRepo>,
}

impl FeedSelector {
    pub fn new(ideas: Arc<dyn IdeaRepo>, interactions: Arc<dyn InteractionRepo>) -> Self {
        Self { ideas, interactions }
    }

    /// The subtraction itself runs inside the idea store so that a SQL
    /// backend can answer it with an index.
    pub async fn feed_for(&self, user_id: &str) -> Result<Vec<Idea>> {
        let judged = self.interactions.idea_ids_for_user(user_id).await?;
        debug!(judged = judged.len(), "excluding judged ideas from feed");
        self.ideas.list_excluding(&judged).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::traits::{MockIdeaRepo, MockInteractionRepo};
    use std::collections::HashSet;
    use uuid::Uuid;

    #[tokio::test]
    async fn passes_judged_ids_to_the_idea_store() {
        let judged_id = Uuid::now_v7();

        let mut interactions = MockInteractionRepo::new();
        interactions
            .expect_idea_ids_for_user()
            .withf(|user| user == "alice")
            .times(1)
            .returning(move |_| Ok(HashSet::from([judged_id])));

        let mut ideas = MockIdeaRepo::new();
        ideas
            .expect_list_excluding()
            .withf(move |excluded| excluded.len() == 1 && excluded.contains(&judged_id))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let feed = FeedSelector::new(Arc::new(ideas), Arc::new(interactions));
        assert!(feed.feed_for("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn interaction_store_failure_stops_the_read() {
        let mut interactions = MockInteractionRepo::new();
        interactions
            .expect_idea_ids_for_user()
            .returning(|_| Err(AppError::StoreUnavailable("connection reset".into())));

        let mut ideas = MockIdeaRepo::new();
        ideas.expect_list_excluding().times(0);

        let feed = FeedSelector::new(Arc::new(ideas), Arc::new(interactions));
        let err = feed.feed_for("alice").await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }
}
