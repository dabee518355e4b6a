//! Class notification targeting, scheduling, and student registration workflows.
//!
//! The `workflows::classes` module holds the pure targeting and status engine. The
//! `workflows::portal` module composes it with a record store and a best-effort welcome
//! mailer, and exposes the HTTP router used by the API service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
