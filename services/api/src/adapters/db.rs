//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the durable implementation of the
//! `CounterStore`, `SessionStore` and `UserStore` ports. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kpi_counter_core::domain::{AuthSession, CounterField, CounterPatch, Counters, User};
use kpi_counter_core::ports::{CounterStore, PortError, PortResult, SessionStore, UserStore};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn to_u64(value: i64, column: &str) -> PortResult<u64> {
    u64::try_from(value)
        .map_err(|_| PortError::Unexpected(format!("{} holds negative value {}", column, value)))
}

fn to_i64(value: u64, column: &str) -> PortResult<i64> {
    i64::try_from(value)
        .map_err(|_| PortError::Unexpected(format!("{} value {} is out of range", column, value)))
}

/// The column backing each counter. Only ever interpolated from this fixed set.
fn column(field: CounterField) -> &'static str {
    match field {
        CounterField::Total => "total_calls",
        CounterField::Deal => "deal_calls",
        CounterField::NoDeal => "no_deal_calls",
        CounterField::PositiveSentiment => "positive_sentiment_calls",
        CounterField::NegativeSentiment => "negative_sentiment_calls",
    }
}

const COUNTER_COLUMNS: &str =
    "total_calls, deal_calls, no_deal_calls, positive_sentiment_calls, negative_sentiment_calls";

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CounterRecord {
    total_calls: i64,
    deal_calls: i64,
    no_deal_calls: i64,
    positive_sentiment_calls: i64,
    negative_sentiment_calls: i64,
}
impl CounterRecord {
    fn to_domain(self) -> PortResult<Counters> {
        Ok(Counters {
            total_calls: to_u64(self.total_calls, "total_calls")?,
            deal_calls: to_u64(self.deal_calls, "deal_calls")?,
            no_deal_calls: to_u64(self.no_deal_calls, "no_deal_calls")?,
            positive_sentiment_calls: to_u64(
                self.positive_sentiment_calls,
                "positive_sentiment_calls",
            )?,
            negative_sentiment_calls: to_u64(
                self.negative_sentiment_calls,
                "negative_sentiment_calls",
            )?,
        })
    }
}

#[derive(FromRow)]
struct SessionRecord {
    expires_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    password_hash: String,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        Ok(User {
            id: to_u64(self.id, "users.id")?,
            username: self.username,
            password_hash: self.password_hash,
        })
    }
}

//=========================================================================================
// `CounterStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CounterStore for DbAdapter {
    async fn read(&self) -> PortResult<Counters> {
        let sql = format!("SELECT {} FROM kpi_counters WHERE id = 1", COUNTER_COLUMNS);
        let record = sqlx::query_as::<_, CounterRecord>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => PortError::NotFound("Counter row missing".to_string()),
                _ => unexpected(e),
            })?;
        record.to_domain()
    }

    async fn increment(&self, field: CounterField) -> PortResult<Counters> {
        // A single UPDATE keeps the increment atomic under concurrent writers.
        let col = column(field);
        let sql = format!(
            "UPDATE kpi_counters SET {col} = {col} + 1 WHERE id = 1 RETURNING {}",
            COUNTER_COLUMNS
        );
        let record = sqlx::query_as::<_, CounterRecord>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        record.to_domain()
    }

    async fn update(&self, patch: CounterPatch) -> PortResult<Counters> {
        let bind = |value: Option<u64>, col: &str| value.map(|v| to_i64(v, col)).transpose();
        let sql = format!(
            "UPDATE kpi_counters SET \
                total_calls = COALESCE($1, total_calls), \
                deal_calls = COALESCE($2, deal_calls), \
                no_deal_calls = COALESCE($3, no_deal_calls), \
                positive_sentiment_calls = COALESCE($4, positive_sentiment_calls), \
                negative_sentiment_calls = COALESCE($5, negative_sentiment_calls) \
             WHERE id = 1 RETURNING {}",
            COUNTER_COLUMNS
        );
        let record = sqlx::query_as::<_, CounterRecord>(&sql)
            .bind(bind(patch.total_calls, "total_calls")?)
            .bind(bind(patch.deal_calls, "deal_calls")?)
            .bind(bind(patch.no_deal_calls, "no_deal_calls")?)
            .bind(bind(patch.positive_sentiment_calls, "positive_sentiment_calls")?)
            .bind(bind(patch.negative_sentiment_calls, "negative_sentiment_calls")?)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        record.to_domain()
    }
}

//=========================================================================================
// `SessionStore` Trait Implementation
//=========================================================================================

/// Drops every session past its absolute expiry. Served by `auth_sessions_expires_at_idx`.
const PURGE_EXPIRED_SESSIONS: &str = "DELETE FROM auth_sessions WHERE expires_at <= $1";

#[async_trait]
impl SessionStore for DbAdapter {
    async fn create(&self, session: &AuthSession) -> PortResult<()> {
        sqlx::query(PURGE_EXPIRED_SESSIONS)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        sqlx::query(
            "INSERT INTO auth_sessions (id, user_id, created_at, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.id)
        .bind(to_i64(session.user_id, "auth_sessions.user_id")?)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict(format!("Session {} already exists", session.id))
            } else {
                unexpected(e)
            }
        })?;
        Ok(())
    }

    async fn is_authenticated(&self, session_id: &str) -> PortResult<bool> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT expires_at FROM auth_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        match record {
            Some(r) if r.expires_at > Utc::now() => Ok(true),
            Some(_) => {
                self.destroy(session_id).await?;
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn destroy(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `UserStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserStore for DbAdapter {
    async fn get_user(&self, id: u64) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash FROM users WHERE id = $1",
        )
        .bind(to_i64(id, "users.id")?)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(UserRecord::to_domain).transpose()
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(UserRecord::to_domain).transpose()
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) \
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict(format!("Username {} is taken", username))
            } else {
                unexpected(e)
            }
        })?;
        record.to_domain()
    }
}
