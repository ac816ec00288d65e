//! # Domain Models
//!
//! These structs represent the core entities of Idea Hub.
//! We use UUID v7 for time-ordered, globally unique identification.
//!
//! Input types (`IdeaDraft`, raw ratings) only become store-ready values
//! (`NewIdea`, `Judgment`) through validation, so a store can never be
//! handed an over-long title or a rating of 11.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::stats::IdeaStats;

pub type IdeaId = Uuid;
pub type InteractionId = Uuid;
/// Opaque identifier handed out by the Authenticator.
pub type UserId = String;

pub const MAX_TITLE_CHARS: usize = 100;
pub const MIN_DESCRIPTION_CHARS: usize = 20;
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

/// Current time truncated to the microsecond precision the stores persist.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A startup idea posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub id: IdeaId,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub author_id: UserId,
    /// Reference returned by the BlobStore, if an image was attached
    pub image_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Unvalidated idea as submitted by an author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaDraft {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub author_id: UserId,
    pub image_ref: Option<String>,
}

impl IdeaDraft {
    /// Checks every field constraint and normalizes the draft.
    ///
    /// Title and description are trimmed before their length is measured
    /// (in chars, not bytes). Tags are trimmed, empties dropped, and
    /// duplicates removed keeping the first occurrence.
    pub fn validate(self) -> Result<NewIdea> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::validation("title must not be empty"));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(AppError::validation(format!(
                "title must be at most {MAX_TITLE_CHARS} characters"
            )));
        }

        let description = self.description.trim().to_string();
        if description.chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(AppError::validation(format!(
                "description must be at least {MIN_DESCRIPTION_CHARS} characters"
            )));
        }

        let tags = normalize_tags(self.tags);
        if tags.is_empty() {
            return Err(AppError::validation("at least one tag is required"));
        }

        let author_id = normalize_user_id(&self.author_id);
        if author_id.is_empty() {
            return Err(AppError::validation("author_id must not be empty"));
        }

        let image_ref = self
            .image_ref
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        Ok(NewIdea {
            title,
            description,
            tags,
            author_id,
            image_ref,
        })
    }
}

fn normalize_tags(raw: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// User ids are compared after trimming on every path, writes and reads.
pub fn normalize_user_id(raw: &str) -> UserId {
    raw.trim().to_string()
}

/// Splits the authoring form's "a, b, c" tag field.
pub fn split_tags(input: &str) -> Vec<String> {
    input.split(',').map(|t| t.trim().to_string()).collect()
}

/// A validated idea, ready to be persisted by an `IdeaRepo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdea {
    title: String,
    description: String,
    tags: Vec<String>,
    author_id: UserId,
    image_ref: Option<String>,
}

impl NewIdea {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }

    /// Stamps the store-assigned identity onto the validated fields.
    pub fn into_idea(self, id: IdeaId, created_at: DateTime<Utc>) -> Idea {
        Idea {
            id,
            title: self.title,
            description: self.description,
            tags: self.tags,
            author_id: self.author_id,
            image_ref: self.image_ref,
            created_at,
        }
    }
}

/// A desirability rating, always within `MIN_RATING..=MAX_RATING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: i64) -> Result<Self> {
        if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(AppError::validation(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {value}"
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.0
    }
}

/// One user's validated judgment on one idea, the input of an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgment {
    user_id: UserId,
    idea_id: IdeaId,
    swipe: bool,
    rating: Option<Rating>,
}

impl Judgment {
    pub fn new(
        user_id: impl Into<UserId>,
        idea_id: IdeaId,
        swipe: bool,
        rating: Option<i64>,
    ) -> Result<Self> {
        let user_id = normalize_user_id(&user_id.into());
        if user_id.is_empty() {
            return Err(AppError::validation("user_id must not be empty"));
        }
        let rating = rating.map(Rating::new).transpose()?;
        Ok(Self {
            user_id,
            idea_id,
            swipe,
            rating,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn idea_id(&self) -> IdeaId {
        self.idea_id
    }

    pub fn swipe(&self) -> bool {
        self.swipe
    }

    pub fn rating(&self) -> Option<Rating> {
        self.rating
    }

    /// Row for a pair that has never been judged before.
    pub fn into_interaction(self, id: InteractionId, created_at: DateTime<Utc>) -> Interaction {
        Interaction {
            id,
            user_id: self.user_id,
            idea_id: self.idea_id,
            swipe: self.swipe,
            rating: self.rating,
            created_at,
        }
    }

    /// Applies this judgment over an existing row. A missing rating keeps
    /// whatever rating was recorded before.
    pub fn apply_to(&self, existing: &mut Interaction) {
        existing.swipe = self.swipe;
        if let Some(rating) = self.rating {
            existing.rating = Some(rating);
        }
    }
}

/// The single recorded judgment of one user on one idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub user_id: UserId,
    pub idea_id: IdeaId,
    /// true = "would use", false = pass
    pub swipe: bool,
    pub rating: Option<Rating>,
    pub created_at: DateTime<Utc>,
}

/// An idea together with its recomputed feedback (author profile listing).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdeaWithStats {
    #[serde(flatten)]
    pub idea: Idea,
    pub stats: IdeaStats,
}

/// The interaction rows of one idea and the stats computed from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdeaFeedback {
    pub interactions: Vec<Interaction>,
    pub stats: IdeaStats,
}

/// Everything the idea detail view needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdeaDetail {
    pub idea: Idea,
    pub stats: IdeaStats,
}
