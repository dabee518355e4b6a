use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::domain::ClassNotification;

/// Window ahead of a class inside which it counts as due soon.
pub const DUE_SOON_WINDOW_HOURS: i64 = 24;

/// Lifecycle state of a notification relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Past,
    DueSoon,
    Upcoming,
}

impl NotificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Past => "Past",
            Self::DueSoon => "Due Soon",
            Self::Upcoming => "Upcoming",
        }
    }
}

/// Classify a notification's start time against `now`.
///
/// A class starting exactly at `now` is due soon, not past. A class exactly 24 hours
/// away is upcoming, not due soon.
pub fn status_of(notification: &ClassNotification, now: NaiveDateTime) -> NotificationStatus {
    status_at(notification.starts_at(), now)
}

pub(crate) fn status_at(starts_at: NaiveDateTime, now: NaiveDateTime) -> NotificationStatus {
    if starts_at < now {
        NotificationStatus::Past
    } else if starts_at - now < Duration::hours(DUE_SOON_WINDOW_HOURS) {
        NotificationStatus::DueSoon
    } else {
        NotificationStatus::Upcoming
    }
}

/// A notification annotated with its status at the time of viewing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: ClassNotification,
    pub status: NotificationStatus,
    pub status_label: &'static str,
}

impl NotificationView {
    pub fn at(notification: &ClassNotification, now: NaiveDateTime) -> Self {
        let status = status_of(notification, now);
        Self {
            notification: notification.clone(),
            status,
            status_label: status.label(),
        }
    }
}
