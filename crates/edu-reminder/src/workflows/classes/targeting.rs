use serde::{Deserialize, Serialize};

use super::domain::{blank_as_none, ClassNotification};
use crate::workflows::roster::domain::{Level, Student};

/// Department value that addresses every department.
pub const ALL_DEPARTMENTS: &str = "All Departments";

/// The (level, department) predicate pair deciding who a notification is for.
///
/// A missing level matches every level. A missing department or [`ALL_DEPARTMENTS`]
/// matches every department. Present values compare by exact equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingFilter {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub level: Option<Level>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub department: Option<String>,
}

impl TargetingFilter {
    pub fn everyone() -> Self {
        Self::default()
    }

    pub fn includes(&self, student: &Student) -> bool {
        let level_match = self.level.map_or(true, |level| level == student.level);
        let department_match = match self.department.as_deref() {
            None | Some("") | Some(ALL_DEPARTMENTS) => true,
            Some(department) => department == student.department,
        };
        level_match && department_match
    }
}

/// Students addressed by `filter`, in roster order.
pub fn resolve_audience<'a>(students: &'a [Student], filter: &TargetingFilter) -> Vec<&'a Student> {
    students
        .iter()
        .filter(|student| filter.includes(student))
        .collect()
}

/// Notifications addressed to `student`, newest `created_at` first.
///
/// Uses the same predicate as [`resolve_audience`], so a notification shows up here
/// exactly when the student is part of that notification's audience.
pub fn resolve_relevant_notifications<'a>(
    notifications: &'a [ClassNotification],
    student: &Student,
) -> Vec<&'a ClassNotification> {
    let mut relevant: Vec<&ClassNotification> = notifications
        .iter()
        .filter(|notification| notification.targeting().includes(student))
        .collect();
    // stable: equal timestamps keep input order
    relevant.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    relevant
}

/// Case-insensitive exact match on the whole address; first match wins.
pub fn find_student_by_email<'a>(students: &'a [Student], email: &str) -> Option<&'a Student> {
    students
        .iter()
        .find(|student| same_email(&student.email, email))
}

/// Address equality used for lookups and uniqueness: whole value, case-insensitive.
pub fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::classes::domain::NotificationId;
    use crate::workflows::roster::domain::{NotificationPreference, StudentId};
    use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn student(id: &str, level: Level, department: &str, email: &str) -> Student {
        Student {
            id: StudentId(id.to_string()),
            first_name: "Test".to_string(),
            last_name: id.to_string(),
            email: email.to_string(),
            phone: "0803 555 0101".to_string(),
            level,
            department: department.to_string(),
            notification_preference: NotificationPreference::Email,
            email_notifications: true,
            sms_notifications: false,
            registration_date: epoch(),
        }
    }

    fn notification(
        id: u64,
        level: Option<Level>,
        department: Option<&str>,
        created_minutes: i64,
    ) -> ClassNotification {
        ClassNotification {
            id: NotificationId(id),
            title: format!("Class {id}"),
            description: None,
            date: NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date"),
            time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            location: "LT 1".to_string(),
            target_level: level,
            department: department.map(str::to_string),
            created_at: epoch() + Duration::minutes(created_minutes),
            students_notified: 0,
        }
    }

    fn roster() -> Vec<Student> {
        vec![
            student("s1", Level::L200, "Computer Science", "ada@uni.edu"),
            student("s2", Level::L300, "Physics", "tunde@uni.edu"),
            student("s3", Level::L100, "Computer Science", "ngozi@uni.edu"),
            student("s4", Level::L200, "Mathematics", "emeka@uni.edu"),
        ]
    }

    fn ids<'a>(students: impl IntoIterator<Item = &'a Student>) -> Vec<&'a str> {
        students.into_iter().map(|s| s.id.0.as_str()).collect()
    }

    #[test]
    fn student_sees_level_match_and_all_department_notices() {
        let ada = student("s1", Level::L200, "Computer Science", "ada@uni.edu");
        let notifications = vec![
            notification(1, Some(Level::L200), None, 0),
            notification(2, Some(Level::L300), None, 1),
            notification(3, None, Some(ALL_DEPARTMENTS), 2),
        ];

        let relevant = resolve_relevant_notifications(&notifications, &ada);
        let relevant_ids: Vec<u64> = relevant.iter().map(|n| n.id.0).collect();
        assert_eq!(relevant_ids, vec![3, 1]);
    }

    #[test]
    fn everyone_filter_keeps_the_whole_roster_in_order() {
        let students = roster();
        let filter = TargetingFilter {
            level: None,
            department: Some(ALL_DEPARTMENTS.to_string()),
        };
        assert_eq!(ids(resolve_audience(&students, &filter)), vec!["s1", "s2", "s3", "s4"]);
        assert_eq!(resolve_audience(&students, &TargetingFilter::everyone()).len(), 4);
    }

    #[test]
    fn audience_requires_both_predicates() {
        let students = roster();
        let filter = TargetingFilter {
            level: Some(Level::L200),
            department: Some("Computer Science".to_string()),
        };
        assert_eq!(ids(resolve_audience(&students, &filter)), vec!["s1"]);

        let department_only = TargetingFilter {
            level: None,
            department: Some("Computer Science".to_string()),
        };
        assert_eq!(ids(resolve_audience(&students, &department_only)), vec!["s1", "s3"]);
    }

    #[test]
    fn department_matching_is_case_sensitive() {
        let students = roster();
        let filter = TargetingFilter {
            level: None,
            department: Some("computer science".to_string()),
        };
        assert!(resolve_audience(&students, &filter).is_empty());
    }

    #[test]
    fn relevance_and_audience_agree_for_every_pair() {
        let students = roster();
        let departments = [None, Some(""), Some(ALL_DEPARTMENTS), Some("Computer Science"), Some("Physics")];
        let levels = [None, Some(Level::L100), Some(Level::L200), Some(Level::L300)];

        let mut notifications = Vec::new();
        let mut next_id = 0;
        for level in levels {
            for department in departments {
                next_id += 1;
                notifications.push(notification(next_id, level, department, next_id as i64));
            }
        }

        for student in &students {
            let relevant = resolve_relevant_notifications(&notifications, student);
            for notification in &notifications {
                let audience = resolve_audience(&students, &notification.targeting());
                let in_audience = audience.iter().any(|s| s.id == student.id);
                let in_feed = relevant.iter().any(|n| n.id == notification.id);
                assert_eq!(
                    in_audience, in_feed,
                    "student {} / notification {}",
                    student.id.0, notification.id
                );
            }
        }
    }

    #[test]
    fn relevance_is_newest_first_with_stable_ties() {
        let ada = student("s1", Level::L200, "Computer Science", "ada@uni.edu");
        let notifications = vec![
            notification(1, None, None, 5),
            notification(2, None, None, 30),
            notification(3, None, None, 5),
            notification(4, None, None, 10),
        ];

        let relevant = resolve_relevant_notifications(&notifications, &ada);
        let relevant_ids: Vec<u64> = relevant.iter().map(|n| n.id.0).collect();
        assert_eq!(relevant_ids, vec![2, 4, 1, 3]);
        assert!(relevant
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[test]
    fn email_lookup_ignores_case_but_not_whitespace() {
        let mut students = roster();
        students.push(student("s5", Level::L400, "Economics", "A@B.com"));

        let found = find_student_by_email(&students, "a@b.com").expect("case-insensitive match");
        assert_eq!(found.id.0, "s5");
        assert!(find_student_by_email(&students, " a@b.com").is_none());
        assert!(find_student_by_email(&students, "a@b.co").is_none());
    }

    #[test]
    fn email_lookup_returns_first_duplicate() {
        let mut students = roster();
        students.push(student("s6", Level::L100, "Physics", "ADA@uni.edu"));
        let found = find_student_by_email(&students, "Ada@Uni.Edu").expect("match");
        assert_eq!(found.id.0, "s1");
    }

    #[test]
    fn blank_strings_deserialize_as_wildcards() {
        let filter: TargetingFilter =
            serde_json::from_str(r#"{"level":"","department":""}"#).expect("filter parses");
        assert_eq!(filter, TargetingFilter::everyone());

        let filter: TargetingFilter =
            serde_json::from_str(r#"{"level":"300"}"#).expect("filter parses");
        assert_eq!(filter.level, Some(Level::L300));
        assert_eq!(filter.department, None);
    }
}
