use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Departments students and admins register against.
pub const DEPARTMENTS: [&str; 10] = [
    "Computer Science",
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Engineering",
    "Business Administration",
    "Economics",
    "Psychology",
    "English Literature",
];

pub fn is_known_department(value: &str) -> bool {
    DEPARTMENTS.contains(&value)
}

/// Academic level. Serialized as its bare code, e.g. `"200"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "100")]
    L100,
    #[serde(rename = "200")]
    L200,
    #[serde(rename = "300")]
    L300,
    #[serde(rename = "400")]
    L400,
}

impl Level {
    pub const fn ordered() -> [Self; 4] {
        [Self::L100, Self::L200, Self::L300, Self::L400]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::L100 => "100",
            Self::L200 => "200",
            Self::L300 => "300",
            Self::L400 => "400",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::L100 => "100 Level",
            Self::L200 => "200 Level",
            Self::L300 => "300 Level",
            Self::L400 => "400 Level",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown academic level '{0}' (expected 100, 200, 300 or 400)")]
pub struct UnknownLevel(pub String);

impl FromStr for Level {
    type Err = UnknownLevel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|level| level.code() == value)
            .ok_or_else(|| UnknownLevel(value.to_string()))
    }
}

/// Channel a student asked to be reached on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPreference {
    #[default]
    Email,
    Sms,
    Both,
}

impl NotificationPreference {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Sms => "SMS",
            Self::Both => "Email & SMS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notification preference '{0}' (expected email, sms or both)")]
pub struct UnknownPreference(pub String);

impl FromStr for NotificationPreference {
    type Err = UnknownPreference;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "both" => Ok(Self::Both),
            _ => Err(UnknownPreference(value.to_string())),
        }
    }
}

/// Identifier assigned by the record store on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

/// A registered student. Never mutated after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub level: Level,
    pub department: String,
    pub notification_preference: NotificationPreference,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub registration_date: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Raw registration form as submitted. Level and department stay strings until the
/// intake guard has checked them so each problem can be reported against its field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub level: String,
    pub department: String,
    #[serde(default)]
    pub notification_preference: NotificationPreference,
    #[serde(default = "default_true")]
    pub email_notifications: bool,
    #[serde(default)]
    pub sms_notifications: bool,
}

fn default_true() -> bool {
    true
}

/// Validated student awaiting an identifier from the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub level: Level,
    pub department: String,
    pub notification_preference: NotificationPreference,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub registration_date: DateTime<Utc>,
}

impl NewStudent {
    pub fn into_student(self, id: StudentId) -> Student {
        Student {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            level: self.level,
            department: self.department,
            notification_preference: self.notification_preference,
            email_notifications: self.email_notifications,
            sms_notifications: self.sms_notifications,
            registration_date: self.registration_date,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Lecturer,
    StudentRepresentative,
    #[default]
    Admin,
    SuperAdmin,
}

impl AdminRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lecturer => "Lecturer",
            Self::StudentRepresentative => "Class Representative",
            Self::Admin => "Admin",
            Self::SuperAdmin => "Super Admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdminId(pub String);

/// Staff account allowed to schedule class notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: AdminId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRegistration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    #[serde(default)]
    pub role: AdminRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}

impl NewAdmin {
    pub fn into_profile(self, id: AdminId) -> AdminProfile {
        AdminProfile {
            id,
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            department: self.department,
            role: self.role,
            created_at: self.created_at,
        }
    }
}
