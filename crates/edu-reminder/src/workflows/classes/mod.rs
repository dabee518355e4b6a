//! Notification targeting and lifecycle status.
//!
//! Everything here is a pure function over in-memory snapshots handed in by the caller.

pub mod domain;
pub mod status;
pub mod targeting;

pub use domain::{
    parse_local_datetime, ClassNotification, NewClassNotification, NotificationId,
    ScheduleRequest,
};
pub use status::{status_of, NotificationStatus, NotificationView};
pub use targeting::{
    find_student_by_email, resolve_audience, resolve_relevant_notifications, same_email,
    TargetingFilter, ALL_DEPARTMENTS,
};
