use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::now_iso8601;

/// A crowd-submitted idea as returned by the store.
///
/// Treated as an immutable value once fetched for a render cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub submitter_name: Option<String>,
    /// Lightning payment address shown next to the idea.
    pub lightning_address: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// ISO-8601 UTC, fixed width (see [`crate::time`]).
    pub created_at: String,
    /// Vote counter, incremented by the score collaborator.
    pub score: u32,
    #[serde(default)]
    pub exclude_from_display: bool,
}

impl Idea {
    /// Build a fresh idea from validated input: new id, score 0, created now.
    pub fn from_new(new: ValidIdea) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            submitter_name: new.submitter_name,
            lightning_address: new.lightning_address,
            tags: new.tags,
            created_at: now_iso8601(),
            score: 0,
            exclude_from_display: false,
        }
    }
}

/// Raw submission, exactly as a form or CLI hands it over.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewIdea {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub submitter_name: Option<String>,
    #[serde(default)]
    pub lightning_address: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Submission that passed [`NewIdea::validate`]: text fields trimmed,
/// blank optionals and blank tags dropped. Kept tags are stored verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidIdea {
    pub title: String,
    pub description: String,
    pub submitter_name: Option<String>,
    pub lightning_address: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdeaValidationError {
    EmptyTitle,
    EmptyDescription,
}

impl fmt::Display for IdeaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "headline is required and cannot be empty"),
            Self::EmptyDescription => write!(f, "description is required and cannot be empty"),
        }
    }
}

impl std::error::Error for IdeaValidationError {}

fn non_empty_trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl NewIdea {
    pub fn validate(&self) -> Result<ValidIdea, IdeaValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(IdeaValidationError::EmptyTitle);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(IdeaValidationError::EmptyDescription);
        }

        let tags = self
            .tags
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect();

        Ok(ValidIdea {
            title: title.to_string(),
            description: description.to_string(),
            submitter_name: non_empty_trimmed(self.submitter_name.as_deref()),
            lightning_address: non_empty_trimmed(self.lightning_address.as_deref()),
            tags,
        })
    }
}
