//! SqlSessionStore
//! ---------------
//! sqlx-backed implementation of [`SessionStore`] over an `AnyPool`, so the
//! same code serves PostgreSQL in production and SQLite in development and
//! tests. Queries use `$n` placeholders, which both drivers accept.
//!
//! Usernames are resolved to `users.id` with a separate lookup before every
//! write, and the store never creates users.
use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use common::logger::{store_span, warn_if_slow};
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};
use tracing::{Instrument, debug};
use uuid::Uuid;

use super::SessionStore;
use crate::error::{SessionError, SessionResult};
use crate::model::{SessionRecord, UserId};

const SLOW_QUERY: Duration = Duration::from_millis(100);

pub struct SqlSessionStore {
    pool: AnyPool,
}

impl SqlSessionStore {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Map a username onto the internal user id, if the user exists.
    async fn user_id(&self, username: &str) -> anyhow::Result<Option<UserId>> {
        let row = sqlx::query("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("user lookup failed")?;

        match row {
            Some(r) => Ok(Some(r.try_get::<String, _>("id")?)),
            None => Ok(None),
        }
    }

    async fn require_user_id(&self, username: &str) -> SessionResult<UserId> {
        self.user_id(username)
            .await?
            .ok_or_else(|| SessionError::UnknownUser(username.to_string()))
    }

    async fn count(&self, sql: &'static str, username: &str) -> anyhow::Result<i64> {
        let row = sqlx::query(sql)
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get::<i64, _>("n")?)
    }
}

/// Time and trace a single store operation.
async fn observed<F, T>(op: &'static str, username: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    warn_if_slow(op, SLOW_QUERY, fut)
        .instrument(store_span(op, username))
        .await
}

#[async_trait]
impl SessionStore for SqlSessionStore {
    async fn is_user(&self, username: &str) -> SessionResult<bool> {
        let n = observed(
            "is_user",
            username,
            self.count("SELECT COUNT(*) AS n FROM users WHERE username = $1", username),
        )
        .await
        .context("is_user query failed")?;

        Ok(n > 0)
    }

    async fn has_session(&self, username: &str) -> SessionResult<bool> {
        let n = observed(
            "has_session",
            username,
            self.count(
                r#"
SELECT COUNT(s.id) AS n
FROM user_sessions s
JOIN users u ON s.user_id = u.id
WHERE u.username = $1 AND s.session <> '';
"#,
                username,
            ),
        )
        .await
        .context("has_session query failed")?;

        Ok(n > 0)
    }

    async fn get_sessions(&self, username: &str) -> SessionResult<Vec<SessionRecord>> {
        let rows = observed(
            "get_sessions",
            username,
            sqlx::query(
                r#"
SELECT s.id AS id, s.user_id AS user_id, s.session AS session, s.updated_at_ms AS updated_at_ms
FROM user_sessions s
JOIN users u ON s.user_id = u.id
WHERE u.username = $1
ORDER BY s.updated_at_ms DESC;
"#,
            )
            .bind(username)
            .fetch_all(&self.pool),
        )
        .await
        .context("get_sessions query failed")?;

        let records = rows
            .iter()
            .map(row_to_record)
            .collect::<anyhow::Result<Vec<_>>>()
            .context("get_sessions row decode failed")?;

        Ok(records)
    }

    async fn insert_session(&self, username: &str, session: &str) -> SessionResult<()> {
        let user_id = self.require_user_id(username).await?;
        let id = Uuid::new_v4().to_string();

        // Upsert on the unique user_id index: a concurrent first write for the
        // same user overwrites instead of adding a second row.
        observed(
            "insert_session",
            username,
            sqlx::query(
                r#"
INSERT INTO user_sessions (id, user_id, session, updated_at_ms)
VALUES ($1, $2, $3, $4)
ON CONFLICT (user_id) DO UPDATE SET
  session = excluded.session,
  updated_at_ms = excluded.updated_at_ms;
"#,
            )
            .bind(&id)
            .bind(&user_id)
            .bind(session)
            .bind(now_ms())
            .execute(&self.pool),
        )
        .await
        .context("insert_session failed")?;

        debug!(%id, user_id = %user_id, "session inserted");
        Ok(())
    }

    async fn update_session(&self, username: &str, session: &str) -> SessionResult<()> {
        let user_id = self.require_user_id(username).await?;

        let res = observed(
            "update_session",
            username,
            sqlx::query(
                r#"
UPDATE user_sessions
SET session = $1, updated_at_ms = $2
WHERE user_id = $3;
"#,
            )
            .bind(session)
            .bind(now_ms())
            .bind(&user_id)
            .execute(&self.pool),
        )
        .await
        .context("update_session failed")?;

        if res.rows_affected() == 0 {
            debug!(user_id = %user_id, "update touched no rows");
        }
        Ok(())
    }

    async fn delete_session(&self, username: &str) -> SessionResult<()> {
        let Some(user_id) = self.user_id(username).await? else {
            debug!(username, "delete for unknown user is a no-op");
            return Ok(());
        };

        let res = observed(
            "delete_session",
            username,
            sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
                .bind(&user_id)
                .execute(&self.pool),
        )
        .await
        .context("delete_session failed")?;

        debug!(user_id = %user_id, removed = res.rows_affected(), "sessions deleted");
        Ok(())
    }
}

fn row_to_record(r: &AnyRow) -> anyhow::Result<SessionRecord> {
    Ok(SessionRecord {
        id: r.try_get("id")?,
        user_id: r.try_get("user_id")?,
        session: r.try_get("session")?,
        updated_at_ms: r.try_get("updated_at_ms")?,
    })
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
