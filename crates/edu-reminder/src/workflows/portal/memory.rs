use std::sync::{Mutex, MutexGuard};

use super::repository::{RecordStore, RepositoryError};
use crate::workflows::classes::domain::{ClassNotification, NewClassNotification, NotificationId};
use crate::workflows::classes::targeting::same_email;
use crate::workflows::roster::domain::{
    AdminId, AdminProfile, NewAdmin, NewStudent, Student, StudentId,
};

/// Process-local record store. Uniqueness checks and inserts happen under one lock.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    students: Vec<Student>,
    admins: Vec<AdminProfile>,
    notifications: Vec<ClassNotification>,
    student_sequence: u64,
    admin_sequence: u64,
    notification_sequence: u64,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("record store lock poisoned".to_string()))
    }
}

impl RecordStore for MemoryRecordStore {
    fn insert_student(&self, student: NewStudent) -> Result<Student, RepositoryError> {
        let mut state = self.state()?;
        if state
            .students
            .iter()
            .any(|existing| same_email(&existing.email, &student.email))
        {
            return Err(RepositoryError::DuplicateKey { field: "email" });
        }

        state.student_sequence += 1;
        let id = StudentId(format!("stu-{:06}", state.student_sequence));
        let stored = student.into_student(id);
        state.students.push(stored.clone());
        Ok(stored)
    }

    fn insert_admin(&self, admin: NewAdmin) -> Result<AdminProfile, RepositoryError> {
        let mut state = self.state()?;
        if state
            .admins
            .iter()
            .any(|existing| same_email(&existing.email, &admin.email))
        {
            return Err(RepositoryError::DuplicateKey { field: "email" });
        }
        if state
            .admins
            .iter()
            .any(|existing| existing.username == admin.username)
        {
            return Err(RepositoryError::DuplicateKey { field: "username" });
        }

        state.admin_sequence += 1;
        let id = AdminId(format!("adm-{:06}", state.admin_sequence));
        let stored = admin.into_profile(id);
        state.admins.push(stored.clone());
        Ok(stored)
    }

    fn insert_notification(
        &self,
        notification: NewClassNotification,
    ) -> Result<ClassNotification, RepositoryError> {
        let mut state = self.state()?;
        state.notification_sequence += 1;
        let stored = notification.into_notification(NotificationId(state.notification_sequence));
        state.notifications.push(stored.clone());
        Ok(stored)
    }

    fn delete_notification(&self, id: NotificationId) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let before = state.notifications.len();
        state.notifications.retain(|notification| notification.id != id);
        if state.notifications.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn list_students(&self) -> Result<Vec<Student>, RepositoryError> {
        Ok(self.state()?.students.clone())
    }

    fn list_admins(&self) -> Result<Vec<AdminProfile>, RepositoryError> {
        Ok(self.state()?.admins.clone())
    }

    fn list_notifications(&self) -> Result<Vec<ClassNotification>, RepositoryError> {
        Ok(self.state()?.notifications.clone())
    }
}
