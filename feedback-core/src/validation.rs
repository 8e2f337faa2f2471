//! Input checks run at the edge of the system, before anything reaches storage.
//! A value of one of these types is proof its inputs were accepted.

use crate::model::{EntityId, EntityStatus};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MAX_TEXT_LEN: usize = 2000;

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum ValidationError {
    #[error("`{field}` is required")]
    Missing { field: &'static str },
    #[error("invalid status '{0}', expected one of: active, blocked")]
    UnknownStatus(String),
    #[error("`rating` must be between 1 and 5, got {0}")]
    RatingOutOfRange(i64),
    #[error("`{field}` must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub entity_id: EntityId,
    pub status: EntityStatus,
}

impl StatusChange {
    pub fn new(entity_id: EntityId, status: EntityStatus) -> Self {
        Self { entity_id, status }
    }

    pub fn parse(
        entity_id: Option<&str>,
        status: Option<&str>,
        entity_field: &'static str,
    ) -> Result<Self, ValidationError> {
        let entity_id = EntityId::parse(entity_id, entity_field)?;
        let status = status
            .ok_or(ValidationError::Missing { field: "status" })?
            .parse()?;

        Ok(Self { entity_id, status })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSubmission {
    pub entity_id: EntityId,
    pub rating: u8,
    pub comment: Option<String>,
    pub author: Option<String>,
}

impl FeedbackSubmission {
    pub fn parse(
        entity_id: Option<&str>,
        rating: Option<i64>,
        comment: Option<String>,
        author: Option<String>,
        entity_field: &'static str,
    ) -> Result<Self, ValidationError> {
        let entity_id = EntityId::parse(entity_id, entity_field)?;
        let rating = rating.ok_or(ValidationError::Missing { field: "rating" })?;
        let rating = u8::try_from(rating)
            .ok()
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
            .ok_or(ValidationError::RatingOutOfRange(rating))?;

        Ok(Self {
            entity_id,
            rating,
            comment: optional_text(comment, "comment")?,
            author: optional_text(author, "author")?,
        })
    }
}

pub fn entity_name(name: Option<&str>) -> Result<String, ValidationError> {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => {
            check_len(name, "name")?;
            Ok(name.to_string())
        }
        _ => Err(ValidationError::Missing { field: "name" }),
    }
}

/// Blank text is the same as no text.
fn optional_text(
    text: Option<String>,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match text.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => {
            check_len(t, field)?;
            Ok(Some(t.to_string()))
        }
        _ => Ok(None),
    }
}

fn check_len(text: &str, field: &'static str) -> Result<(), ValidationError> {
    if text.chars().count() > MAX_TEXT_LEN {
        Err(ValidationError::TooLong {
            field,
            max: MAX_TEXT_LEN,
        })
    } else {
        Ok(())
    }
}
