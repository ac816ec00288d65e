//! # ih-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `ih-core` domain models, for both the idea store and the
//! interaction store.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ih_core::error::{AppError, Result};
use ih_core::models::{timestamp_now, Idea, IdeaId, Interaction, Judgment, NewIdea, Rating};
use ih_core::traits::{IdeaRepo, InteractionRepo};
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;

const IDEA_COLUMNS: &str = "SELECT id, title, description, tags, author_id, image_ref, created_at FROM ideas";
const IDEA_ORDER: &str = " ORDER BY created_at DESC, id ASC";
const INTERACTION_COLUMNS: &str = "SELECT id, user_id, idea_id, swipe, rating, created_at FROM interactions";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn new(url: &str) -> Result<Self> {
        Self::connect(url, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Opens (creating if needed) the database at `url` and applies the
    /// embedded migrations.
    ///
    /// An in-memory database lives inside a single connection, so the pool
    /// is pinned to one connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(url)
            .map_err(store_err)?
            .create_if_missing(true)
            .foreign_keys(true);
        if !in_memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5));
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { max_connections.max(1) })
            .min_connections(if in_memory { 1 } else { 0 })
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(store_err)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("migration failed: {e}")))?;

        info!(url, in_memory, "sqlite store ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn store_err(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        match db.kind() {
            ErrorKind::UniqueViolation => return AppError::Conflict(db.message().to_string()),
            ErrorKind::CheckViolation => return AppError::ValidationError(db.message().to_string()),
            _ => {}
        }
    }
    AppError::StoreUnavailable(err.to_string())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if matches!(db.kind(), ErrorKind::ForeignKeyViolation))
}

fn to_micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_micros(micros)
        .ok_or_else(|| AppError::StoreUnavailable(format!("corrupt timestamp {micros}")))
}

fn idea_from_row(row: &SqliteRow) -> Result<Idea> {
    let tags: String = row.try_get("tags").map_err(store_err)?;
    Ok(Idea {
        id: row.try_get("id").map_err(store_err)?,
        title: row.try_get("title").map_err(store_err)?,
        description: row.try_get("description").map_err(store_err)?,
        tags: serde_json::from_str(&tags)
            .map_err(|e| AppError::StoreUnavailable(format!("corrupt tags column: {e}")))?,
        author_id: row.try_get("author_id").map_err(store_err)?,
        image_ref: row.try_get("image_ref").map_err(store_err)?,
        created_at: from_micros(row.try_get("created_at").map_err(store_err)?)?,
    })
}

fn interaction_from_row(row: &SqliteRow) -> Result<Interaction> {
    let rating: Option<i64> = row.try_get("rating").map_err(store_err)?;
    Ok(Interaction {
        id: row.try_get("id").map_err(store_err)?,
        user_id: row.try_get("user_id").map_err(store_err)?,
        idea_id: row.try_get("idea_id").map_err(store_err)?,
        swipe: row.try_get("swipe").map_err(store_err)?,
        rating: rating.map(Rating::new).transpose()?,
        created_at: from_micros(row.try_get("created_at").map_err(store_err)?)?,
    })
}

#[async_trait]
impl IdeaRepo for SqliteStore {
    async fn create_idea(&self, idea: NewIdea) -> Result<Idea> {
        let idea = idea.into_idea(Uuid::now_v7(), timestamp_now());
        let tags = serde_json::to_string(&idea.tags)
            .map_err(|e| AppError::validation(format!("unencodable tags: {e}")))?;

        sqlx::query(
            "INSERT INTO ideas (id, title, description, tags, author_id, image_ref, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(idea.id)
        .bind(&idea.title)
        .bind(&idea.description)
        .bind(tags)
        .bind(&idea.author_id)
        .bind(&idea.image_ref)
        .bind(to_micros(idea.created_at))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        debug!(idea_id = %idea.id, "idea row inserted");
        Ok(idea)
    }

    async fn get_idea(&self, id: IdeaId) -> Result<Option<Idea>> {
        let row = sqlx::query(&format!("{IDEA_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        row.as_ref().map(idea_from_row).transpose()
    }

    /// The exclusion runs inside SQLite rather than in application memory.
    /// The whole set travels as one JSON parameter, so its size is not
    /// bounded by SQLite's host-parameter limit.
    async fn list_excluding(&self, excluded: &HashSet<IdeaId>) -> Result<Vec<Idea>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(IDEA_COLUMNS);
        if !excluded.is_empty() {
            // hex() yields upper-case digits for the 16-byte id blob.
            let ids: Vec<String> = excluded
                .iter()
                .map(|id| id.simple().to_string().to_uppercase())
                .collect();
            let ids = serde_json::to_string(&ids)
                .map_err(|e| AppError::StoreUnavailable(format!("unencodable id set: {e}")))?;
            qb.push(" WHERE hex(id) NOT IN (SELECT value FROM json_each(");
            qb.push_bind(ids);
            qb.push("))");
        }
        qb.push(IDEA_ORDER);

        let rows = qb.build().fetch_all(&self.pool).await.map_err(store_err)?;
        rows.iter().map(idea_from_row).collect()
    }

    async fn list_by_author(&self, author_id: &str) -> Result<Vec<Idea>> {
        let rows = sqlx::query(&format!("{IDEA_COLUMNS} WHERE author_id = ?{IDEA_ORDER}"))
            .bind(author_id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        rows.iter().map(idea_from_row).collect()
    }
}

#[async_trait]
impl InteractionRepo for SqliteStore {
    /// One statement: the unique (user_id, idea_id) key turns a second
    /// insert into an update, and `COALESCE` keeps the old rating when none
    /// was given.
    async fn upsert_interaction(&self, judgment: Judgment) -> Result<Interaction> {
        let idea_id = judgment.idea_id();
        let row = sqlx::query(
            "INSERT INTO interactions (id, user_id, idea_id, swipe, rating, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (user_id, idea_id) DO UPDATE SET
                 swipe = excluded.swipe,
                 rating = COALESCE(excluded.rating, interactions.rating)
             RETURNING id, user_id, idea_id, swipe, rating, created_at",
        )
        .bind(Uuid::now_v7())
        .bind(judgment.user_id())
        .bind(idea_id)
        .bind(judgment.swipe())
        .bind(judgment.rating().map(|r| i64::from(r.get())))
        .bind(to_micros(timestamp_now()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::idea_not_found(idea_id)
            } else {
                store_err(e)
            }
        })?;

        interaction_from_row(&row)
    }

    async fn get_for_user(&self, idea_id: IdeaId, user_id: &str) -> Result<Option<Interaction>> {
        let row = sqlx::query(&format!("{INTERACTION_COLUMNS} WHERE idea_id = ? AND user_id = ?"))
            .bind(idea_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        row.as_ref().map(interaction_from_row).transpose()
    }

    async fn get_all_for_idea(&self, idea_id: IdeaId) -> Result<Vec<Interaction>> {
        let rows = sqlx::query(&format!("{INTERACTION_COLUMNS} WHERE idea_id = ? ORDER BY created_at ASC, id ASC"))
            .bind(idea_id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        rows.iter().map(interaction_from_row).collect()
    }

    async fn idea_ids_for_user(&self, user_id: &str) -> Result<HashSet<IdeaId>> {
        let rows = sqlx::query("SELECT idea_id FROM interactions WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        rows.iter()
            .map(|row| row.try_get::<Uuid, _>("idea_id").map_err(store_err))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ih_core::engine::Engine;
    use ih_core::models::IdeaDraft;
    use std::sync::Arc;

    async fn store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.expect("in-memory sqlite")
    }

    fn draft(title: &str) -> NewIdea {
        IdeaDraft {
            title: title.into(),
            description: "A platform connecting local farms to consumers.".into(),
            tags: vec!["food".into(), "subscription".into()],
            author_id: "farmer".into(),
            image_ref: Some("farmer/abc.png".into()),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn create_and_get_idea_round_trips() {
        let repo = store().await;
        let created = repo.create_idea(draft("LocalEats")).await.unwrap();

        let fetched = repo.get_idea(created.id).await.unwrap().expect("stored idea");
        assert_eq!(fetched, created);
        assert!(repo.get_idea(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_and_preserves_rating() {
        let repo = store().await;
        let idea = repo.create_idea(draft("SkillSwap")).await.unwrap();

        let first = repo
            .upsert_interaction(Judgment::new("u1", idea.id, true, Some(7)).unwrap())
            .await
            .unwrap();
        let second = repo
            .upsert_interaction(Judgment::new("u1", idea.id, false, None).unwrap())
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(!second.swipe);
        assert_eq!(second.rating.map(Rating::get), Some(7));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM interactions")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn upsert_on_unknown_idea_is_not_found() {
        let repo = store().await;
        let missing = Uuid::now_v7();
        let err = repo
            .upsert_interaction(Judgment::new("u1", missing, true, None).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, AppError::idea_not_found(missing));
    }

    #[tokio::test]
    async fn list_excluding_filters_in_sql() {
        let repo = store().await;
        let a = repo.create_idea(draft("A")).await.unwrap();
        let b = repo.create_idea(draft("B")).await.unwrap();

        let listed = repo.list_excluding(&HashSet::from([a.id])).await.unwrap();
        assert_eq!(listed.iter().map(|i| i.id).collect::<Vec<_>>(), vec![b.id]);
    }

    #[tokio::test]
    async fn feed_survives_more_judgments_than_sqlite_host_parameters() {
        let repo = Arc::new(store().await);

        // 33 000 judged ideas, past SQLite's 32 766 host-parameter cap.
        sqlx::query(
            "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 33000)
             INSERT INTO ideas (id, title, description, tags, author_id, image_ref, created_at)
             SELECT randomblob(16), 'bulk ' || i, 'bulk idea that fills the store', '[\"bulk\"]', 'farmer', NULL, i FROM n",
        )
        .execute(repo.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO interactions (id, user_id, idea_id, swipe, rating, created_at)
             SELECT randomblob(16), 'heavy', id, 0, NULL, created_at FROM ideas",
        )
        .execute(repo.pool())
        .await
        .unwrap();

        let fresh = repo.create_idea(draft("Fresh")).await.unwrap();
        let engine = Engine::new(repo.clone(), repo.clone());

        let feed = engine.get_feed("heavy").await.unwrap();
        assert_eq!(feed.iter().map(|i| i.id).collect::<Vec<_>>(), vec![fresh.id]);
        assert_eq!(engine.get_feed("light").await.unwrap().len(), 33_001);
    }

    async fn insert_at(repo: &SqliteStore, id: Uuid, micros: i64) {
        sqlx::query(
            "INSERT INTO ideas (id, title, description, tags, author_id, image_ref, created_at)
             VALUES (?, 'Same instant', 'two ideas stamped with one timestamp', '[\"tie\"]', 'farmer', NULL, ?)",
        )
        .bind(id)
        .bind(micros)
        .execute(repo.pool())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn equal_timestamps_order_by_id_ascending() {
        let repo = store().await;
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        let newest = Uuid::from_u128(0);
        insert_at(&repo, high, 1_000).await;
        insert_at(&repo, low, 1_000).await;
        insert_at(&repo, newest, 2_000).await;

        let order: Vec<_> = repo
            .list_excluding(&HashSet::new())
            .await
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(order, vec![newest, low, high]);

        let by_author: Vec<_> = repo
            .list_by_author("farmer")
            .await
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(by_author, order);
    }
}
