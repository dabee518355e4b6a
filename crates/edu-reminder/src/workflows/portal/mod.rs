//! Registration, scheduling, and student feed workflows over an injected record store.
//!
//! The service is synchronous. Welcome mail is the one outbound side effect and never
//! fails the operation that triggered it.

pub mod mailer;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use mailer::{
    BackgroundMailer, DeliveryReceipt, DeliveryStatus, EmailNotificationRecord, MailerError,
    UserType, WelcomeEmail, WelcomeMailer,
};
pub use memory::MemoryRecordStore;
pub use repository::{RecordStore, RepositoryError};
pub use router::portal_router;
pub use service::{AudiencePreview, PortalError, PortalService, RosterImportReport, StudentFeed};
