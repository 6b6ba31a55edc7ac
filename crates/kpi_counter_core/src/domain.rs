//! crates/kpi_counter_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Counters
//=========================================================================================

/// A snapshot of the five KPI counters.
///
/// Values only ever grow while the process is alive. The counters are independent
/// event streams: nothing ties `deal_calls + no_deal_calls` to `total_calls`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub total_calls: u64,
    pub deal_calls: u64,
    pub no_deal_calls: u64,
    pub positive_sentiment_calls: u64,
    pub negative_sentiment_calls: u64,
}

impl Counters {
    /// Adds one to `field`. Saturates so the value never goes backwards.
    pub fn increment(&mut self, field: CounterField) {
        let slot = match field {
            CounterField::Total => &mut self.total_calls,
            CounterField::Deal => &mut self.deal_calls,
            CounterField::NoDeal => &mut self.no_deal_calls,
            CounterField::PositiveSentiment => &mut self.positive_sentiment_calls,
            CounterField::NegativeSentiment => &mut self.negative_sentiment_calls,
        };
        *slot = slot.saturating_add(1);
    }

    /// Merges every field present in `patch` verbatim.
    pub fn apply(&mut self, patch: &CounterPatch) {
        if let Some(v) = patch.total_calls {
            self.total_calls = v;
        }
        if let Some(v) = patch.deal_calls {
            self.deal_calls = v;
        }
        if let Some(v) = patch.no_deal_calls {
            self.no_deal_calls = v;
        }
        if let Some(v) = patch.positive_sentiment_calls {
            self.positive_sentiment_calls = v;
        }
        if let Some(v) = patch.negative_sentiment_calls {
            self.negative_sentiment_calls = v;
        }
    }
}

/// Names one of the five counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterField {
    Total,
    Deal,
    NoDeal,
    PositiveSentiment,
    NegativeSentiment,
}

impl CounterField {
    pub const ALL: [CounterField; 5] = [
        CounterField::Total,
        CounterField::Deal,
        CounterField::NoDeal,
        CounterField::PositiveSentiment,
        CounterField::NegativeSentiment,
    ];

    /// The wire name used in JSON payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterField::Total => "totalCalls",
            CounterField::Deal => "dealCalls",
            CounterField::NoDeal => "noDealCalls",
            CounterField::PositiveSentiment => "positiveSentimentCalls",
            CounterField::NegativeSentiment => "negativeSentimentCalls",
        }
    }
}

impl fmt::Display for CounterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a counter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown counter field: {0}")]
pub struct UnknownCounterField(pub String);

impl FromStr for CounterField {
    type Err = UnknownCounterField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CounterField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownCounterField(s.to_string()))
    }
}

/// A partial update: every `Some` field replaces the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterPatch {
    pub total_calls: Option<u64>,
    pub deal_calls: Option<u64>,
    pub no_deal_calls: Option<u64>,
    pub positive_sentiment_calls: Option<u64>,
    pub negative_sentiment_calls: Option<u64>,
}

//=========================================================================================
// Users and Sessions
//=========================================================================================

/// A stored user. Only used by the optional user-store credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password_hash: String,
}

/// Represents a dashboard login session (auth cookie).
///
/// A session that exists and has not reached `expires_at` is authenticated;
/// there is no other state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub id: String,
    pub user_id: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Creates a session expiring `ttl` after `created_at` (absolute, not sliding).
    pub fn new(id: String, user_id: u64, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id,
            user_id,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
