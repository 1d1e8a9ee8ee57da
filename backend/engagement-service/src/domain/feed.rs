use serde::{Deserialize, Serialize};

use super::models::UserId;

/// Kind of entity an activity event concerns.
///
/// Persisted as the numeric codes of the historical schema; do not renumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeedEventType {
    Like,
    Review,
    Friend,
}

impl FeedEventType {
    pub fn code(&self) -> i16 {
        match self {
            Self::Like => 1,
            Self::Review => 2,
            Self::Friend => 3,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(Self::Like),
            2 => Some(Self::Review),
            3 => Some(Self::Friend),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Like => "LIKE",
            Self::Review => "REVIEW",
            Self::Friend => "FRIEND",
        }
    }
}

impl std::fmt::Display for FeedEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened to the entity. Same numbering caveat as `FeedEventType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeedOperation {
    Remove,
    Add,
    Update,
}

impl FeedOperation {
    pub fn code(&self) -> i16 {
        match self {
            Self::Remove => 1,
            Self::Add => 2,
            Self::Update => 3,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(Self::Remove),
            2 => Some(Self::Add),
            3 => Some(Self::Update),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Remove => "REMOVE",
            Self::Add => "ADD",
            Self::Update => "UPDATE",
        }
    }
}

impl std::fmt::Display for FeedOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One append-only activity log entry. Never mutated after insertion.
/// Ordering key is `event_ts` (wall-clock milliseconds), ties broken by
/// `event_id`, which is insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEvent {
    pub event_id: i64,
    pub event_ts: i64,
    pub user_id: UserId,
    pub event_type: FeedEventType,
    pub operation: FeedOperation,
    pub entity_id: i64,
}
