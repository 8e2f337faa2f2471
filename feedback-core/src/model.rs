use crate::validation::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Opaque identifier of a reviewed entity, e.g. a restaurant. Never blank once constructed through
/// [`EntityId::parse`]; storage backends rebuild ids they persisted with [`EntityId::new`].
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Boundary check for ids coming from callers. `field` names the input in the error message.
    /// Ids are opaque: a non-blank id is kept exactly as sent.
    pub fn parse(raw: Option<&str>, field: &'static str) -> Result<Self, ValidationError> {
        match raw {
            Some(id) if !id.trim().is_empty() => Ok(Self(id.to_string())),
            _ => Err(ValidationError::Missing { field }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Active,
    Blocked,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Active => "active",
            EntityStatus::Blocked => "blocked",
        }
    }
}

impl Display for EntityStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityStatus {
    type Err = ValidationError;

    /// Exact match only, `"Active"` or `" active"` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EntityStatus::Active),
            "blocked" => Ok(EntityStatus::Blocked),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub status: EntityStatus,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl Entity {
    pub fn is_active(&self) -> bool {
        self.status == EntityStatus::Active
    }
}

#[derive(Debug, Clone)]
pub struct NewEntity {
    pub id: EntityId,
    pub name: String,
}

impl NewEntity {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Entities always start out active.
    pub fn into_entity(self, created: DateTime<Utc>) -> Entity {
        Entity {
            id: self.id,
            name: self.name,
            status: EntityStatus::Active,
            created,
            updated: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash, Copy, Clone)]
#[serde(transparent)]
pub struct FeedbackId(Uuid);

impl FeedbackId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn new_with(id: Uuid) -> Self {
        Self(id)
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for FeedbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for FeedbackId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single submitted review. Append-only: nothing in this workspace mutates a record after
/// it has been stored.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: FeedbackId,
    pub entity_id: EntityId,
    pub rating: u8,
    pub comment: Option<String>,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    pub id: FeedbackId,
    pub entity_id: EntityId,
    pub rating: u8,
    pub comment: Option<String>,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewFeedback {
    pub fn into_record(self) -> FeedbackRecord {
        FeedbackRecord {
            id: self.id,
            entity_id: self.entity_id,
            rating: self.rating,
            comment: self.comment,
            author: self.author,
            created_at: self.created_at,
        }
    }
}

/// Orders records most recent first. The sort is stable, so records sharing a timestamp keep
/// the order storage returned them in.
pub fn order_newest_first(records: &mut [FeedbackRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub entity_id: EntityId,
    pub count: usize,
    pub average_rating: Option<f64>,
    pub latest: Option<DateTime<Utc>>,
}

impl FeedbackSummary {
    pub fn from_records(entity_id: EntityId, records: &[FeedbackRecord]) -> Self {
        let count = records.len();
        let total: u64 = records.iter().map(|r| u64::from(r.rating)).sum();
        let average_rating = (count > 0).then(|| total as f64 / count as f64);
        let latest = records.iter().map(|r| r.created_at).max();

        Self {
            entity_id,
            count,
            average_rating,
            latest,
        }
    }
}
