use crate::infra::{seed_roster, LogMailer};
use chrono::{Duration, Local, NaiveDateTime};
use clap::Args;
use edu_reminder::error::AppError;
use edu_reminder::workflows::classes::{parse_local_datetime, ScheduleRequest, ALL_DEPARTMENTS};
use edu_reminder::workflows::portal::{
    MemoryRecordStore, PortalError, PortalService, RecordStore, StudentFeed,
};
use edu_reminder::workflows::roster::Level;
use std::path::PathBuf;
use std::sync::Arc;

const SAMPLE_ROSTER: &str = "\
first_name,last_name,email,phone,level,department,notification_preference
Adaeze,Okafor,adaeze.okafor@uni.edu,+234 803 555 0101,200,Computer Science,email
Babatunde,Adeyemi,b.adeyemi@uni.edu,+234 803 555 0102,300,Physics,both
Chiamaka,Nwosu,chiamaka.nwosu@uni.edu,+234 803 555 0103,200,Mathematics,sms
Damilola,Bello,d.bello@uni.edu,+234 803 555 0104,400,Computer Science,email
";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Roster CSV to register instead of the built-in sample.
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Student whose feed is printed. Defaults to the first registered student.
    #[arg(long)]
    pub(crate) email: Option<String>,
    /// Evaluate statuses at this local time (YYYY-MM-DDTHH:MM). Defaults to now.
    #[arg(long, value_parser = parse_local_datetime)]
    pub(crate) now: Option<NaiveDateTime>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { roster, email, now } = args;
    let now = now.unwrap_or_else(|| Local::now().naive_local());

    let store = Arc::new(MemoryRecordStore::new());
    let service = PortalService::new(store.clone(), Arc::new(LogMailer::default()));

    println!("EduReminder demo (evaluated {})", now.format("%Y-%m-%d %H:%M"));
    let report = match roster {
        Some(path) => seed_roster(&service, &path)?,
        None => service.import_roster(SAMPLE_ROSTER.as_bytes())?,
    };
    println!(
        "- Roster: {} registered, {} rejected",
        report.imported,
        report.rejected.len()
    );
    for row in &report.rejected {
        println!("  - line {} ({}): {}", row.line, row.email, row.reason);
    }

    println!("\nScheduled classes");
    for request in sample_schedule(now) {
        let notification = service.schedule_class(request)?;
        println!(
            "- #{} {} on {} at {} -> {} students notified",
            notification.id,
            notification.title,
            notification.date,
            notification.time.format("%H:%M"),
            notification.students_notified
        );
    }

    let email = match email {
        Some(email) => email,
        None => match store
            .list_students()
            .map_err(PortalError::from)?
            .into_iter()
            .next()
        {
            Some(student) => student.email,
            None => {
                println!("\nNo students registered; nothing to show");
                return Ok(());
            }
        },
    };

    match service.student_feed(&email, now) {
        Ok(feed) => render_feed(&feed),
        Err(PortalError::Validation(errors)) => println!("\nLookup rejected: {errors}"),
        Err(PortalError::StudentNotFound { email }) => {
            println!("\nNo student found with email \"{email}\"")
        }
        Err(other) => return Err(other.into()),
    }

    Ok(())
}

fn sample_schedule(now: NaiveDateTime) -> Vec<ScheduleRequest> {
    let entries = [
        (
            "Data Structures",
            Duration::hours(3),
            Some(Level::L200),
            Some("Computer Science"),
            "LT 1",
        ),
        (
            "Faculty Town Hall",
            Duration::days(3),
            None,
            Some(ALL_DEPARTMENTS),
            "Main Auditorium",
        ),
        (
            "Quantum Mechanics",
            Duration::hours(20),
            Some(Level::L300),
            Some("Physics"),
            "Physics Lab 2",
        ),
        (
            "Calculus Revision",
            Duration::days(-1),
            Some(Level::L200),
            None,
            "LT 4",
        ),
    ];

    entries
        .into_iter()
        .map(|(title, offset, target_level, department, location)| {
            let starts = now + offset;
            ScheduleRequest {
                title: title.to_string(),
                description: None,
                date: starts.date(),
                time: starts.time(),
                location: location.to_string(),
                target_level,
                department: department.map(str::to_string),
            }
        })
        .collect()
}

fn render_feed(feed: &StudentFeed) {
    let student = &feed.student;
    println!(
        "\nFeed for {} <{}> ({}, {})",
        student.full_name(),
        student.email,
        student.level.label(),
        student.department
    );
    if feed.notifications.is_empty() {
        println!("- No class notifications target this student");
        return;
    }
    for view in &feed.notifications {
        let notification = &view.notification;
        println!(
            "- [{}] {} on {} at {} ({})",
            view.status_label,
            notification.title,
            notification.date,
            notification.time.format("%H:%M"),
            notification.location
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edu_reminder::workflows::classes::{resolve_audience, NotificationStatus};

    fn fixed_now() -> NaiveDateTime {
        parse_local_datetime("2025-10-01T08:00").expect("valid now")
    }

    #[test]
    fn sample_schedule_spans_every_status() {
        let service = PortalService::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(LogMailer::default()),
        );
        let report = service
            .import_roster(SAMPLE_ROSTER.as_bytes())
            .expect("sample roster imports");
        assert_eq!(report.imported, 4);
        assert!(report.rejected.is_empty());

        for request in sample_schedule(fixed_now()) {
            service.schedule_class(request).expect("sample class schedules");
        }

        let statuses: Vec<_> = service
            .list_classes(fixed_now())
            .expect("list")
            .into_iter()
            .map(|view| view.status)
            .collect();
        assert!(statuses.contains(&NotificationStatus::Past));
        assert!(statuses.contains(&NotificationStatus::DueSoon));
        assert!(statuses.contains(&NotificationStatus::Upcoming));

        let feed = service
            .student_feed("ADAEZE.okafor@uni.edu", fixed_now())
            .expect("sample student");
        let titles: Vec<_> = feed
            .notifications
            .iter()
            .map(|view| view.notification.title.as_str())
            .collect();
        assert_eq!(titles.len(), 3);
        assert!(!titles.contains(&"Quantum Mechanics"));
    }

    #[test]
    fn town_hall_reaches_the_whole_sample_roster() {
        let service = PortalService::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(LogMailer::default()),
        );
        service
            .import_roster(SAMPLE_ROSTER.as_bytes())
            .expect("sample roster imports");
        let students = service.store().list_students().expect("list");

        let town_hall = sample_schedule(fixed_now())
            .into_iter()
            .find(|request| request.title == "Faculty Town Hall")
            .expect("town hall scheduled");
        assert_eq!(resolve_audience(&students, &town_hall.targeting()).len(), 4);
    }

    #[test]
    fn demo_runs_for_an_unknown_email() {
        let args = DemoArgs {
            roster: None,
            email: Some("nobody@uni.edu".to_string()),
            now: Some(fixed_now()),
        };
        assert!(run_demo(args).is_ok());
    }
}
