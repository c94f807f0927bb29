use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque job identity, stable across a session.
pub type JobId = Uuid;

/// A lane on the board: the freeform preparation list, one slot per
/// weekday (weekend slots are optional, see `order::column_sequence`),
/// and the terminal completed lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardColumn {
    Prepare,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
    Completed,
}

impl BoardColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
            Self::Completed => "completed",
        }
    }

    /// Whether this column is an ordered freeform list rather than a
    /// weekday slot. Only the preparation lane qualifies.
    pub fn is_freeform(&self) -> bool {
        matches!(self, Self::Prepare)
    }
}

impl Default for BoardColumn {
    fn default() -> Self {
        Self::Prepare
    }
}

impl std::fmt::Display for BoardColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prepare" => Ok(Self::Prepare),
            "monday" => Ok(Self::Monday),
            "tuesday" => Ok(Self::Tuesday),
            "wednesday" => Ok(Self::Wednesday),
            "thursday" => Ok(Self::Thursday),
            "friday" => Ok(Self::Friday),
            "saturday" => Ok(Self::Saturday),
            "sunday" => Ok(Self::Sunday),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid column: {}", s)),
        }
    }
}

/// Active jobs appear on the board; archived jobs are excluded entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Active,
    Archived,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

/// Geocoded position derived from a job's address.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A work item on the board.
///
/// The ordering engine only ever reassigns `column` and `sort_key`;
/// everything else is payload owned by the CRUD collaborator. Sort keys
/// are unique by convention within a column, not globally — rendering
/// falls back to `created_at`, then `id`, on ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub column: BoardColumn,
    #[serde(default = "default_sort_key")]
    pub sort_key: f64,
    pub title: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

fn default_sort_key() -> f64 {
    crate::board::order::BASE_KEY
}

/// Field-level partial update sent to the jobs API. Only set fields are
/// serialized, so unrelated concurrent edits are not clobbered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
}

impl JobPatch {
    pub fn coordinates(coordinates: Coordinates, formatted_address: String) -> Self {
        Self {
            coordinates: Some(coordinates),
            formatted_address: Some(formatted_address),
            paid: None,
        }
    }

    pub fn paid(paid: bool) -> Self {
        Self {
            paid: Some(paid),
            ..Self::default()
        }
    }
}
