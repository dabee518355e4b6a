use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::workflows::classes::{
    ClassNotification, NewClassNotification, NotificationId, ScheduleRequest,
};
use crate::workflows::portal::mailer::{DeliveryReceipt, MailerError, WelcomeEmail, WelcomeMailer};
use crate::workflows::portal::repository::{RecordStore, RepositoryError};
use crate::workflows::portal::{portal_router, MemoryRecordStore, PortalService};
use crate::workflows::roster::{
    AdminProfile, AdminRegistration, AdminRole, Level, NewAdmin, NewStudent,
    NotificationPreference, Student, StudentRegistration,
};

pub(super) fn student_registration(
    first_name: &str,
    email: &str,
    level: &str,
    department: &str,
) -> StudentRegistration {
    StudentRegistration {
        first_name: first_name.to_string(),
        last_name: "Okafor".to_string(),
        email: email.to_string(),
        phone: "+234 803 555 0101".to_string(),
        level: level.to_string(),
        department: department.to_string(),
        notification_preference: NotificationPreference::Email,
        email_notifications: true,
        sms_notifications: false,
    }
}

pub(super) fn admin_registration(username: &str, email: &str) -> AdminRegistration {
    AdminRegistration {
        username: username.to_string(),
        email: email.to_string(),
        first_name: "Grace".to_string(),
        last_name: "Eze".to_string(),
        department: "Computer Science".to_string(),
        role: AdminRole::Lecturer,
    }
}

pub(super) fn schedule_request(
    title: &str,
    target_level: Option<Level>,
    department: Option<&str>,
) -> ScheduleRequest {
    ScheduleRequest {
        title: title.to_string(),
        description: Some("Bring your lab notebook".to_string()),
        date: NaiveDate::from_ymd_opt(2025, 10, 2).expect("valid date"),
        time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
        location: "LT 1".to_string(),
        target_level,
        department: department.map(str::to_string),
    }
}

/// One hour before the scheduled fixture class.
pub(super) fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 2)
        .and_then(|date| date.and_hms_opt(8, 0, 0))
        .expect("valid now")
}

pub(super) fn build_service() -> (
    PortalService<MemoryRecordStore, RecordingMailer>,
    Arc<MemoryRecordStore>,
    Arc<RecordingMailer>,
) {
    let store = Arc::new(MemoryRecordStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let service = PortalService::new(store.clone(), mailer.clone());
    (service, store, mailer)
}

pub(super) fn portal_router_with_service(
    service: PortalService<MemoryRecordStore, RecordingMailer>,
) -> axum::Router {
    portal_router(Arc::new(service))
}

#[derive(Default)]
pub(super) struct RecordingMailer {
    sent: Mutex<Vec<WelcomeEmail>>,
}

impl RecordingMailer {
    pub(super) fn sent(&self) -> Vec<WelcomeEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

impl WelcomeMailer for RecordingMailer {
    fn send(&self, email: WelcomeEmail) -> Result<DeliveryReceipt, MailerError> {
        let message_id = format!("msg-{}", email.email);
        self.sent.lock().expect("mailer mutex poisoned").push(email);
        Ok(DeliveryReceipt::Delivered { message_id })
    }
}

pub(super) struct FailingMailer;

impl WelcomeMailer for FailingMailer {
    fn send(&self, _email: WelcomeEmail) -> Result<DeliveryReceipt, MailerError> {
        Err(MailerError::Transport("smtp relay refused connection".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl RecordStore for UnavailableStore {
    fn insert_student(&self, _student: NewStudent) -> Result<Student, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_admin(&self, _admin: NewAdmin) -> Result<AdminProfile, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_notification(
        &self,
        _notification: NewClassNotification,
    ) -> Result<ClassNotification, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_notification(&self, _id: NotificationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_students(&self) -> Result<Vec<Student>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_admins(&self) -> Result<Vec<AdminProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_notifications(&self) -> Result<Vec<ClassNotification>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
