use sqlx::AnyPool;

/// Create the users and user_sessions tables when they are missing.
///
/// Development and test databases only; existing tables are never altered.
/// The unique index on `user_sessions.user_id` is what lets
/// `insert_session` upsert instead of duplicating rows.
pub async fn bootstrap(pool: &AnyPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS users (
  id TEXT PRIMARY KEY,
  username TEXT NOT NULL UNIQUE
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS user_sessions (
  id TEXT PRIMARY KEY,
  user_id TEXT NOT NULL REFERENCES users(id),
  session TEXT NOT NULL,
  updated_at_ms BIGINT NOT NULL
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_user_sessions_user ON user_sessions(user_id);"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
