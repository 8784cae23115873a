use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde_json::Value;

use crate::entities::{cached_responses, prelude::CachedResponses};

/// Repository for cached upstream catalog responses.
///
/// Rows are keyed by the upstream request descriptor (path and query, with
/// credentials elided). Expired or unreadable rows are removed the next time
/// their key is looked up.
pub struct CacheRepository {
    conn: DatabaseConnection,
}

impl CacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns the cached body for `cache_key` if present and still fresh.
    pub async fn get(&self, cache_key: &str) -> Result<Option<Value>> {
        let row = CachedResponses::find()
            .filter(cached_responses::Column::CacheKey.eq(cache_key))
            .one(&self.conn)
            .await
            .context("failed to query response cache")?;

        let Some(row) = row else {
            return Ok(None);
        };

        if is_expired(&row.expires_at) {
            self.remove(row.id).await?;
            return Ok(None);
        }

        match serde_json::from_str::<Value>(&row.body_json) {
            Ok(body) => Ok(Some(body)),
            Err(err) => {
                tracing::debug!("Discarding unreadable cache row for {cache_key}: {err}");
                self.remove(row.id).await?;
                Ok(None)
            }
        }
    }

    /// Stores `body` under `cache_key` for `ttl_seconds`, replacing any
    /// previous entry for the same key.
    pub async fn put(&self, cache_key: &str, body: &Value, ttl_seconds: u64) -> Result<()> {
        let now = Utc::now();
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        let expires_at = now + Duration::seconds(ttl);

        let active = cached_responses::ActiveModel {
            cache_key: Set(cache_key.to_owned()),
            body_json: Set(body.to_string()),
            created_at: Set(now.to_rfc3339()),
            expires_at: Set(expires_at.to_rfc3339()),
            ..Default::default()
        };

        CachedResponses::insert(active)
            .on_conflict(
                OnConflict::column(cached_responses::Column::CacheKey)
                    .update_columns([
                        cached_responses::Column::BodyJson,
                        cached_responses::Column::CreatedAt,
                        cached_responses::Column::ExpiresAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("failed to store response cache entry")?;

        Ok(())
    }

    async fn remove(&self, id: i32) -> Result<()> {
        CachedResponses::delete_many()
            .filter(cached_responses::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("failed to remove stale cache row")?;
        Ok(())
    }
}

/// Timestamps that fail to parse count as expired.
fn is_expired(expires_at: &str) -> bool {
    DateTime::parse_from_rfc3339(expires_at).map_or(true, |expires| expires <= Utc::now())
}
