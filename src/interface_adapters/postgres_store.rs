use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entities::PlaySession;
use crate::domain::ports::{PlaySessionStore, SessionLookup};

// PostgreSQL-backed playback session store. Each call is a single statement,
// so per-row atomicity comes from the database.
#[derive(Clone)]
pub struct PostgresSessionStore {
    pub db: PgPool,
}

#[async_trait]
impl PlaySessionStore for PostgresSessionStore {
    async fn upsert(&self, session: PlaySession) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO play_sessions (session_id, episode_id, user_id, started_at, last_heartbeat_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (session_id) DO UPDATE SET
                episode_id = EXCLUDED.episode_id,
                user_id = EXCLUDED.user_id,
                started_at = EXCLUDED.started_at,
                last_heartbeat_at = EXCLUDED.last_heartbeat_at
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.episode_id)
        .bind(&session.user_id)
        .bind(to_db_seconds(session.started_at))
        .bind(to_db_seconds(session.last_heartbeat_at))
        .execute(&self.db)
        .await
        .map_err(|err| err.to_string())?;

        Ok(())
    }

    async fn touch(&self, session_id: &str, at: u64) -> Result<SessionLookup, String> {
        let result = sqlx::query(
            r#"
            UPDATE play_sessions
            SET last_heartbeat_at = $2
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .bind(to_db_seconds(at))
        .execute(&self.db)
        .await
        .map_err(|err| err.to_string())?;

        if result.rows_affected() == 0 {
            Ok(SessionLookup::NotFound)
        } else {
            Ok(SessionLookup::Found)
        }
    }

    async fn remove(&self, session_id: &str) -> Result<bool, String> {
        let result = sqlx::query("DELETE FROM play_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.db)
            .await
            .map_err(|err| err.to_string())?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_stale(&self, cutoff: u64) -> Result<u64, String> {
        let result = sqlx::query("DELETE FROM play_sessions WHERE last_heartbeat_at < $1")
            .bind(to_db_seconds(cutoff))
            .execute(&self.db)
            .await
            .map_err(|err| err.to_string())?;

        Ok(result.rows_affected())
    }
}

// Epoch seconds are stored as BIGINT.
fn to_db_seconds(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
