use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

lazy_static! {
    static ref HTML_TAG_REGEX: Regex = Regex::new(r"<[^>]*>").unwrap();
}

const DEFAULT_PAGE_LIMIT: i64 = 100;
const TASK_INFO_MIN_LEN: usize = 3;
const TASK_INFO_MAX_LEN: usize = 1000;

/// Represents a task as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Server-assigned identifier.
    pub id: i32,
    /// What has to be done.
    pub task_info: String,
    /// When it has to be done.
    pub datetime_to_do: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
    pub is_completed: bool,
    /// Owner of the task.
    pub user_id: i32,
}

/// Payload for `POST /tasks/create`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTask {
    #[validate(custom = "validate_task_info")]
    pub task_info: String,
    #[serde(deserialize_with = "deserialize_datetime")]
    pub datetime_to_do: DateTime<Utc>,
}

/// Payload for `PUT /tasks/{task_id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TaskUpdate {
    #[serde(default)]
    #[validate(custom = "validate_task_info")]
    pub task_info: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub datetime_to_do: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.task_info.is_none() && self.datetime_to_do.is_none() && self.is_completed.is_none()
    }
}

/// Query string for `GET /tasks/`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TaskListQuery {
    #[validate(range(min = 0))]
    pub skip: Option<i64>,
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<i64>,
}

impl TaskListQuery {
    pub fn skip(&self) -> i64 {
        self.skip.unwrap_or(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }
}

/// Checks the description as it will be stored, i.e. trimmed.
fn validate_task_info(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Task description cannot be empty".into());
        return Err(err);
    }
    let len = trimmed.chars().count();
    if !(TASK_INFO_MIN_LEN..=TASK_INFO_MAX_LEN).contains(&len) {
        let mut err = ValidationError::new("length");
        err.message = Some(
            format!(
                "Task description must be between {} and {} characters",
                TASK_INFO_MIN_LEN, TASK_INFO_MAX_LEN
            )
            .into(),
        );
        return Err(err);
    }
    if HTML_TAG_REGEX.is_match(value) {
        let mut err = ValidationError::new("html");
        err.message = Some("Task description cannot contain HTML tags".into());
        return Err(err);
    }
    Ok(())
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an RFC 3339 timestamp, or a naive ISO timestamp taken to be UTC.
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| {
            format!(
                "invalid datetime `{}`: use ISO format (YYYY-MM-DDTHH:MM:SS)",
                raw
            )
        })
}

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_datetime(&raw).map_err(serde::de::Error::custom))
        .transpose()
}
