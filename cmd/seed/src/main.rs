//! Populates the configured SQLite database with sample ideas.
//!
//! Usage: `seed [AUTHOR_ID]` (defaults to `seed-author`). Prints a bearer
//! token for the author so the seeded ideas can be inspected through the API.

mod catalogue;

use std::sync::Arc;

use anyhow::Context;
use configs::Settings;
use ih_auth_simple::SimpleAuthenticator;
use ih_core::engine::Engine;
use ih_core::models::IdeaDraft;
use ih_core::traits::{IdeaRepo, InteractionRepo};
use ih_db_sqlite::SqliteStore;
use tracing::info;

const DEFAULT_AUTHOR: &str = "seed-author";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .init();

    let author = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

    let Settings { database, auth, .. } = Settings::load().context("failed to load configuration")?;

    let store = Arc::new(
        SqliteStore::connect(&database.url, database.max_connections)
            .await
            .with_context(|| format!("failed to open {}", database.url))?,
    );
    let ideas: Arc<dyn IdeaRepo> = store.clone();
    let interactions: Arc<dyn InteractionRepo> = store;
    let engine = Engine::new(ideas, interactions);

    for (title, description, tags) in catalogue::SAMPLE_IDEAS {
        let draft = IdeaDraft {
            title: title.to_string(),
            description: description.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            author_id: author.clone(),
            image_ref: None,
        };
        let idea = engine
            .submit_idea(draft)
            .await
            .with_context(|| format!("failed to seed {title}"))?;
        info!(id = %idea.id, "seeded {title}");
    }

    info!("seeded {} ideas for {author}", catalogue::SAMPLE_IDEAS.len());

    let token = SimpleAuthenticator::new(auth.secret).issue_token(&author);
    println!("Bearer token for {author}: {token}");
    Ok(())
}
