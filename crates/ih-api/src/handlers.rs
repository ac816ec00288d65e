//! # ih-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the engine.
//! Handlers only parse, resolve identity and shape responses; every rule
//! lives in `ih-core`.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ih_core::error::AppError;
use ih_core::models::{
    split_tags, Idea, IdeaDetail, IdeaDraft, IdeaFeedback, IdeaId, IdeaWithStats, Interaction,
};
use ih_core::stats::IdeaStats;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::AppState;

type ApiResult<T> = Result<T, ApiError>;

fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::validation(format!("missing required field: {field}")))
}

fn parse_idea_id(raw: &str) -> Result<IdeaId, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::validation(format!("invalid idea id: {raw}")))
}

/// Tags arrive either as a JSON array or as the authoring form's
/// comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

impl TagsInput {
    fn into_tags(self) -> Vec<String> {
        match self {
            TagsInput::List(tags) => tags,
            TagsInput::Csv(raw) => split_tags(&raw),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateIdeaRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<TagsInput>,
    pub author_id: Option<String>,
    pub image_ref: Option<String>,
}

/// POST /ideas
pub async fn create_idea(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(req): ApiJson<CreateIdeaRequest>,
) -> ApiResult<(StatusCode, Json<Idea>)> {
    let draft = IdeaDraft {
        title: required(req.title, "title")?,
        description: required(req.description, "description")?,
        tags: required(req.tags, "tags")?.into_tags(),
        author_id: user.resolve(req.author_id, "author_id")?,
        image_ref: req.image_ref,
    };

    let idea = state.engine.submit_idea(draft).await?;
    Ok((StatusCode::CREATED, Json(idea)))
}

#[derive(Debug, Deserialize)]
pub struct ListIdeasQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// GET /ideas?userId=
///
/// With a user, the feed of ideas that user has not judged; without one,
/// every idea. Both newest first.
pub async fn list_ideas(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<ListIdeasQuery>,
) -> ApiResult<Json<Vec<Idea>>> {
    let ideas = match query.user_id.filter(|u| !u.trim().is_empty()) {
        Some(user_id) => {
            user.ensure_matches(&user_id)?;
            state.engine.get_feed(&user_id).await?
        }
        None => state.engine.list_ideas().await?,
    };
    debug!(count = ideas.len(), "listing ideas");
    Ok(Json(ideas))
}

/// GET /ideas/{id}
pub async fn get_idea(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<IdeaDetail>> {
    let idea_id = parse_idea_id(&id)?;
    Ok(Json(state.engine.get_idea(idea_id).await?))
}

/// GET /users/{user_id}/ideas
pub async fn author_ideas(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<IdeaWithStats>>> {
    Ok(Json(state.engine.list_author_ideas(&user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct RecordInteractionRequest {
    pub user_id: Option<String>,
    pub idea_id: Option<String>,
    pub swipe: Option<bool>,
    pub rating: Option<i64>,
}

/// POST /interactions
pub async fn record_interaction(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(req): ApiJson<RecordInteractionRequest>,
) -> ApiResult<Json<Interaction>> {
    let user_id = user.resolve(req.user_id, "user_id")?;
    let idea_id = parse_idea_id(&required(req.idea_id, "idea_id")?)?;
    let swipe = required(req.swipe, "swipe")?;

    let interaction = state
        .engine
        .record_interaction(&user_id, idea_id, swipe, req.rating)
        .await?;
    Ok(Json(interaction))
}

#[derive(Debug, Deserialize)]
pub struct InteractionsQuery {
    #[serde(rename = "ideaId")]
    pub idea_id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub idea_id: IdeaId,
    #[serde(flatten)]
    pub stats: IdeaStats,
    pub would_use_percentage: u32,
    pub interactions: Vec<Interaction>,
}

/// GET /interactions?ideaId=&userId=
///
/// With `userId`, that user's interaction (or `null`); otherwise the
/// idea's stats along with its interaction rows.
pub async fn get_interactions(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<InteractionsQuery>,
) -> ApiResult<Response> {
    let raw_id = required(query.idea_id.filter(|i| !i.trim().is_empty()), "ideaId")?;
    let idea_id = parse_idea_id(&raw_id)?;

    if let Some(user_id) = query.user_id.filter(|u| !u.trim().is_empty()) {
        user.ensure_matches(&user_id)?;
        let interaction = state.engine.get_user_interaction(idea_id, &user_id).await?;
        return Ok(Json(interaction).into_response());
    }

    let IdeaFeedback { interactions, stats } = state.engine.get_feedback(idea_id).await?;
    Ok(Json(StatsResponse {
        idea_id,
        would_use_percentage: stats.accept_percentage(),
        stats,
        interactions,
    })
    .into_response())
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub image_ref: String,
    pub url: String,
}

/// POST /images (multipart, field `file`)
pub async fn upload_image(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let owner_id = user
        .0
        .ok_or_else(|| AppError::Unauthorized("sign in to upload images".into()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("malformed upload: {e}")))?;

        let image_ref = state.blobs.put_image(&owner_id, data.to_vec(), &content_type).await?;
        let url = state.blobs.public_url(&image_ref);
        return Ok((StatusCode::CREATED, Json(UploadResponse { image_ref, url })));
    }

    Err(AppError::validation("missing required field: file").into())
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    "OK"
}
