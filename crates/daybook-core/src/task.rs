use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use daybook_shared::TaskDto;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("task name must not be empty")]
    EmptyName,
    #[error("task description must not be empty")]
    EmptyBody,
    #[error("priority {0} is outside 0..=5")]
    PriorityOutOfRange(i64),
    #[error("invalid task date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("task key must not be empty")]
    EmptyKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskKey(String);

impl TaskKey {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyKey);
        }
        Ok(Self(value))
    }
}

impl FromStr for TaskKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl From<TaskKey> for String {
    fn from(value: TaskKey) -> Self {
        value.0
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task priority. Lower is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: Priority = Priority(0);
    pub const MAX: Priority = Priority(5);

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match u8::try_from(value) {
            Ok(v) if v <= Self::MAX.0 => Ok(Self(v)),
            _ => Err(ValidationError::PriorityOutOfRange(value)),
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Next selector position; wraps from 5 back to 0.
    pub fn cycle(self) -> Self {
        if self.0 >= Self::MAX.0 {
            Self::MIN
        } else {
            Self(self.0 + 1)
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<i64> for Priority {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub key: TaskKey,
    pub name: String,
    pub body: String,
    pub priority: Priority,
    date: NaiveDate,
    pub completed: bool,
}

impl Task {
    /// Builds a fresh, not yet completed task with a newly generated key.
    /// Name and body are trimmed and must be non-empty afterwards.
    pub fn new_pending(
        name: &str,
        body: &str,
        priority: Priority,
        date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        let body = body.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if body.is_empty() {
            return Err(ValidationError::EmptyBody);
        }

        Ok(Self {
            key: TaskKey::generate(),
            name: name.to_string(),
            body: body.to_string(),
            priority,
            date,
            completed: false,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn to_dto(&self) -> TaskDto {
        TaskDto {
            key: self.key.to_string(),
            name: self.name.clone(),
            body: self.body.clone(),
            priority: i8::try_from(self.priority.value()).unwrap_or(i8::MAX),
            date: format_date(self.date),
            completed: self.completed,
        }
    }
}

impl TryFrom<TaskDto> for Task {
    type Error = ValidationError;

    fn try_from(dto: TaskDto) -> Result<Self, Self::Error> {
        if dto.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            key: TaskKey::try_from(dto.key)?,
            name: dto.name,
            body: dto.body,
            priority: Priority::new(i64::from(dto.priority))?,
            date: parse_date(&dto.date)?,
            completed: dto.completed,
        })
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}
