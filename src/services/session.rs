//! Per-session state kept in Redis.
//!
//! Keys are scoped by the session id carried in the JWT (`sid`), so two logins
//! of the same user never share state.

use redis::{aio::ConnectionManager, AsyncCommands, Client};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct SessionStore {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

fn visits_key(sid: &Uuid) -> String {
    format!("session:{}:visits", sid)
}

impl SessionStore {
    /// Connect to Redis and check the connection
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Session(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Session(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Session(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { conn, ttl_seconds })
    }

    /// Count a visit and return how many visits the session had before this one
    pub async fn record_visit(&self, sid: &Uuid) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let key = visits_key(sid);

        let (visits,): (u64,) = redis::pipe()
            .atomic()
            .incr(&key, 1u64)
            .expire(&key, self.ttl_seconds as i64)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Session(format!("Failed to record visit: {}", e)))?;

        Ok(visits.saturating_sub(1))
    }

    /// Visits recorded so far for the session
    pub async fn visits(&self, sid: &Uuid) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let visits: Option<u64> = conn
            .get(visits_key(sid))
            .await
            .map_err(|e| AppError::Session(format!("Failed to read session: {}", e)))?;
        Ok(visits.unwrap_or(0))
    }

    /// Drop all state of a session
    pub async fn clear(&self, sid: &Uuid) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(visits_key(sid))
            .await
            .map_err(|e| AppError::Session(format!("Failed to clear session: {}", e)))?;
        Ok(())
    }
}
