use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use super::targeting::{TargetingFilter, ALL_DEPARTMENTS};
use crate::workflows::roster::domain::{is_known_department, Level};
use crate::workflows::validation::{required, ValidationErrors};

/// Store-assigned identifier. Increases with creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A scheduled class announcement.
///
/// `students_notified` is the audience size at creation time and is never refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNotification {
    pub id: NotificationId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "hm_time")]
    pub time: NaiveTime,
    pub location: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub target_level: Option<Level>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub students_notified: usize,
}

impl ClassNotification {
    /// Local wall-clock instant the class starts.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn targeting(&self) -> TargetingFilter {
        TargetingFilter {
            level: self.target_level,
            department: self.department.clone(),
        }
    }
}

/// Admin scheduling form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "hm_time")]
    pub time: NaiveTime,
    pub location: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub target_level: Option<Level>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub department: Option<String>,
}

impl ScheduleRequest {
    /// Targeting as it will be stored once the form is accepted.
    pub fn targeting(&self) -> TargetingFilter {
        TargetingFilter {
            level: self.target_level,
            department: normalized_department(self.department.as_deref()),
        }
    }

    /// Validate and normalize the form. `students_notified` starts at zero; the caller
    /// stamps it from the returned record's own targeting.
    pub fn into_new(
        self,
        created_at: DateTime<Utc>,
    ) -> Result<NewClassNotification, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = required(&mut errors, "title", &self.title, "Class title is required");
        let location = required(
            &mut errors,
            "location",
            &self.location,
            "Location is required",
        );

        let department = normalized_department(self.department.as_deref());
        if let Some(department) = department.as_deref() {
            if department != ALL_DEPARTMENTS && !is_known_department(department) {
                errors.add("department", format!("Unknown department '{department}'"));
            }
        }

        let description = self
            .description
            .map(|description| description.trim().to_string())
            .filter(|description| !description.is_empty());

        errors.into_result(NewClassNotification {
            title,
            description,
            date: self.date,
            time: self.time,
            location,
            target_level: self.target_level,
            department,
            created_at,
            students_notified: 0,
        })
    }
}

fn normalized_department(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|department| !department.is_empty())
        .map(str::to_string)
}

/// Validated notification awaiting an identifier from the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClassNotification {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub target_level: Option<Level>,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub students_notified: usize,
}

impl NewClassNotification {
    pub fn targeting(&self) -> TargetingFilter {
        TargetingFilter {
            level: self.target_level,
            department: self.department.clone(),
        }
    }

    pub fn into_notification(self, id: NotificationId) -> ClassNotification {
        ClassNotification {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            time: self.time,
            location: self.location,
            target_level: self.target_level,
            department: self.department,
            created_at: self.created_at,
            students_notified: self.students_notified,
        }
    }
}

/// Parse a local timestamp such as `2025-10-01T09:30` (seconds optional).
pub fn parse_local_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    let trimmed = raw.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| format!("failed to parse '{raw}' as YYYY-MM-DDTHH:MM[:SS]"))
}

pub(crate) fn deserialize_optional_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_local_datetime(&value).map_err(de::Error::custom))
        .transpose()
}

/// Blank strings mean "no constraint" for targeting fields.
pub(crate) fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt {
        Some(value) if !value.trim().is_empty() => {
            value.parse().map(Some).map_err(de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// `HH:MM` on the wire, seconds accepted on input.
pub(crate) mod hm_time {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map_err(|err| de::Error::custom(format!("failed to parse '{raw}' as HH:MM ({err})")))
    }
}
