use crate::workflows::classes::domain::{ClassNotification, NewClassNotification, NotificationId};
use crate::workflows::roster::domain::{AdminProfile, NewAdmin, NewStudent, Student};

/// Storage abstraction over the student, admin, and notification collections.
///
/// Implementations own uniqueness: `insert_student` must refuse an email that is
/// already registered (case-insensitively) in the same atomic step as the insert, and
/// `insert_admin` likewise for email and username. Callers may pre-check, but the
/// store is the authority.
pub trait RecordStore: Send + Sync {
    fn insert_student(&self, student: NewStudent) -> Result<Student, RepositoryError>;
    fn insert_admin(&self, admin: NewAdmin) -> Result<AdminProfile, RepositoryError>;
    fn insert_notification(
        &self,
        notification: NewClassNotification,
    ) -> Result<ClassNotification, RepositoryError>;
    fn delete_notification(&self, id: NotificationId) -> Result<(), RepositoryError>;
    fn list_students(&self) -> Result<Vec<Student>, RepositoryError>;
    fn list_admins(&self) -> Result<Vec<AdminProfile>, RepositoryError>;
    fn list_notifications(&self) -> Result<Vec<ClassNotification>, RepositoryError>;
}

/// Error enumeration for record store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("a record with this {field} already exists")]
    DuplicateKey { field: &'static str },
    #[error("record not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}
