//! Student and admin registration records, intake validation, and roster import.

pub mod domain;
pub mod import;
pub mod intake;

pub use domain::{
    is_known_department, AdminId, AdminProfile, AdminRegistration, AdminRole, Level, NewAdmin,
    NewStudent, NotificationPreference, Student, StudentId, StudentRegistration, DEPARTMENTS,
};
pub use import::{RejectedRow, RosterEntry, RosterImportError, RosterImporter};
pub use intake::{lookup_email, RegistrationGuard};
