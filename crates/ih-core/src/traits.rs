//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Idea, IdeaId, Interaction, Judgment, NewIdea, UserId};

/// Durable storage of idea postings.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdeaRepo: Send + Sync {
    /// Persists a validated idea, assigning its `id` and `created_at`.
    async fn create_idea(&self, idea: NewIdea) -> Result<Idea>;

    async fn get_idea(&self, id: IdeaId) -> Result<Option<Idea>>;

    /// Every idea whose id is not in `excluded`, newest first, ties broken
    /// by id ascending.
    async fn list_excluding(&self, excluded: &HashSet<IdeaId>) -> Result<Vec<Idea>>;

    /// Same ordering as `list_excluding`.
    async fn list_by_author(&self, author_id: &str) -> Result<Vec<Idea>>;
}

/// Durable storage of judgments, at most one row per (user, idea).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait InteractionRepo: Send + Sync {
    /// Atomic insert-or-update keyed on (user_id, idea_id).
    ///
    /// An existing row gets the new `swipe`; its rating is only replaced
    /// when the judgment carries one. Fails with `NotFound` when the idea
    /// does not exist. Must be a single store operation, never a read
    /// followed by a write.
    async fn upsert_interaction(&self, judgment: Judgment) -> Result<Interaction>;

    async fn get_for_user(&self, idea_id: IdeaId, user_id: &str) -> Result<Option<Interaction>>;

    async fn get_all_for_idea(&self, idea_id: IdeaId) -> Result<Vec<Interaction>>;

    async fn idea_ids_for_user(&self, user_id: &str) -> Result<HashSet<IdeaId>>;
}

/// Binary storage for idea images.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Saves an uploaded image and returns the reference to keep on `Idea.image_ref`.
    async fn put_image(&self, owner_id: &str, data: Vec<u8>, content_type: &str) -> Result<String>;

    /// Returns the URL or path under which the image is served.
    fn public_url(&self, image_ref: &str) -> String;
}

/// Identity contract: turns a bearer credential into a user id.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Authenticator: Send + Sync {
    /// `None` when the credential is malformed, forged or unknown.
    fn authenticate(&self, token: &str) -> Option<UserId>;
}
