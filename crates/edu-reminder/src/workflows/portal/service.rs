use std::io::Read;
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::mailer::{UserType, WelcomeEmail, WelcomeMailer};
use super::repository::{RecordStore, RepositoryError};
use crate::workflows::classes::{
    find_student_by_email, resolve_audience, resolve_relevant_notifications, same_email,
    ClassNotification, NotificationId, NotificationView, ScheduleRequest, TargetingFilter,
};
use crate::workflows::roster::intake::{DUPLICATE_EMAIL_MESSAGE, DUPLICATE_USERNAME_MESSAGE};
use crate::workflows::roster::{
    lookup_email, AdminProfile, AdminRegistration, RegistrationGuard, RejectedRow,
    RosterImportError, RosterImporter, Student, StudentRegistration,
};
use crate::workflows::validation::ValidationErrors;

/// Students a targeting filter reaches right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudiencePreview {
    pub count: usize,
    pub students: Vec<Student>,
}

/// A student together with the notifications addressed to them, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentFeed {
    pub student: Student,
    pub notifications: Vec<NotificationView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterImportReport {
    pub imported: usize,
    pub rejected: Vec<RejectedRow>,
}

/// Orchestrates registration, scheduling, and lookups over an injected record store.
pub struct PortalService<S, M> {
    guard: RegistrationGuard,
    store: Arc<S>,
    mailer: Arc<M>,
}

impl<S, M> PortalService<S, M>
where
    S: RecordStore + 'static,
    M: WelcomeMailer + 'static,
{
    pub fn new(store: Arc<S>, mailer: Arc<M>) -> Self {
        Self {
            guard: RegistrationGuard::new(),
            store,
            mailer,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Validate and persist a student, then hand off a welcome email.
    pub fn register_student(
        &self,
        registration: StudentRegistration,
    ) -> Result<Student, PortalError> {
        let candidate = self.guard.student(registration, Utc::now())?;

        let students = self.store.list_students()?;
        if find_student_by_email(&students, &candidate.email).is_some() {
            return Err(RepositoryError::DuplicateKey { field: "email" }.into());
        }

        let student = self.store.insert_student(candidate)?;
        info!(
            student_id = %student.id.0,
            level = %student.level,
            department = %student.department,
            "student registered"
        );

        self.send_welcome(WelcomeEmail {
            email: student.email.clone(),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            user_type: UserType::Student,
        });
        Ok(student)
    }

    pub fn register_admin(
        &self,
        registration: AdminRegistration,
    ) -> Result<AdminProfile, PortalError> {
        let candidate = self.guard.admin(registration, Utc::now())?;

        let admins = self.store.list_admins()?;
        if admins
            .iter()
            .any(|admin| same_email(&admin.email, &candidate.email))
        {
            return Err(RepositoryError::DuplicateKey { field: "email" }.into());
        }
        if admins
            .iter()
            .any(|admin| admin.username == candidate.username)
        {
            return Err(RepositoryError::DuplicateKey { field: "username" }.into());
        }

        let admin = self.store.insert_admin(candidate)?;
        info!(admin_id = %admin.id.0, role = admin.role.label(), "admin registered");

        self.send_welcome(WelcomeEmail {
            email: admin.email.clone(),
            first_name: admin.first_name.clone(),
            last_name: admin.last_name.clone(),
            user_type: UserType::Admin,
        });
        Ok(admin)
    }

    pub fn preview_audience(
        &self,
        filter: &TargetingFilter,
    ) -> Result<AudiencePreview, PortalError> {
        let students = self.store.list_students()?;
        let audience: Vec<Student> = resolve_audience(&students, filter)
            .into_iter()
            .cloned()
            .collect();
        Ok(AudiencePreview {
            count: audience.len(),
            students: audience,
        })
    }

    /// Persist a class notification stamped with the audience size at this moment.
    pub fn schedule_class(
        &self,
        request: ScheduleRequest,
    ) -> Result<ClassNotification, PortalError> {
        let mut candidate = request.into_new(Utc::now())?;
        let students = self.store.list_students()?;
        candidate.students_notified = resolve_audience(&students, &candidate.targeting()).len();

        let notification = self.store.insert_notification(candidate)?;
        info!(
            notification_id = %notification.id,
            students_notified = notification.students_notified,
            "class notification scheduled"
        );
        Ok(notification)
    }

    pub fn delete_class(&self, id: NotificationId) -> Result<(), PortalError> {
        self.store.delete_notification(id)?;
        info!(notification_id = %id, "class notification deleted");
        Ok(())
    }

    /// Every notification, newest first, with its status at `now`.
    pub fn list_classes(&self, now: NaiveDateTime) -> Result<Vec<NotificationView>, PortalError> {
        let mut notifications = self.store.list_notifications()?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications
            .iter()
            .map(|notification| NotificationView::at(notification, now))
            .collect())
    }

    pub fn student_feed(&self, email: &str, now: NaiveDateTime) -> Result<StudentFeed, PortalError> {
        let email = lookup_email(email)?;
        let students = self.store.list_students()?;
        let student = find_student_by_email(&students, email)
            .cloned()
            .ok_or_else(|| PortalError::StudentNotFound {
                email: email.to_string(),
            })?;

        let notifications = self.store.list_notifications()?;
        let feed = resolve_relevant_notifications(&notifications, &student)
            .into_iter()
            .map(|notification| NotificationView::at(notification, now))
            .collect();
        Ok(StudentFeed {
            student,
            notifications: feed,
        })
    }

    /// Register every roster row. Field problems and duplicates reject the row; a
    /// malformed file or an unavailable store aborts the import.
    pub fn import_roster<R: Read>(&self, reader: R) -> Result<RosterImportReport, PortalError> {
        let (entries, mut rejected) = RosterImporter::from_reader(reader)?;
        let mut imported = 0;

        for entry in entries {
            let email = entry.registration.email.trim().to_string();
            match self.register_student(entry.registration) {
                Ok(_) => imported += 1,
                Err(PortalError::Validation(errors)) => rejected.push(RejectedRow {
                    line: entry.line,
                    email,
                    reason: errors.to_string(),
                }),
                Err(PortalError::Repository(RepositoryError::DuplicateKey { .. })) => {
                    rejected.push(RejectedRow {
                        line: entry.line,
                        email,
                        reason: DUPLICATE_EMAIL_MESSAGE.to_string(),
                    })
                }
                Err(other) => return Err(other),
            }
        }

        rejected.sort_by_key(|row| row.line);
        info!(imported, rejected = rejected.len(), "roster import finished");
        Ok(RosterImportReport { imported, rejected })
    }

    fn send_welcome(&self, email: WelcomeEmail) {
        let recipient = email.email.clone();
        match self.mailer.send(email) {
            Ok(receipt) => debug!(%recipient, ?receipt, "welcome email dispatched"),
            Err(err) => warn!(%recipient, error = %err, "welcome email not dispatched"),
        }
    }
}

/// Error raised by the portal service.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Roster(#[from] RosterImportError),
    #[error("No student found with email \"{email}\"")]
    StudentNotFound { email: String },
}

impl PortalError {
    /// Field-keyed messages for errors a form can display next to its inputs.
    pub fn field_errors(&self) -> Option<ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors.clone()),
            Self::Repository(RepositoryError::DuplicateKey { field }) => {
                let message = if *field == "username" {
                    DUPLICATE_USERNAME_MESSAGE
                } else {
                    DUPLICATE_EMAIL_MESSAGE
                };
                Some(ValidationErrors::single(*field, message))
            }
            _ => None,
        }
    }
}
