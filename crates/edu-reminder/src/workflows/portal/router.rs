use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::mailer::WelcomeMailer;
use super::repository::{RecordStore, RepositoryError};
use super::service::{PortalError, PortalService};
use crate::workflows::classes::domain::deserialize_optional_datetime;
use crate::workflows::classes::{NotificationId, ScheduleRequest, TargetingFilter};
use crate::workflows::roster::{AdminRegistration, StudentRegistration};

/// Query parameters for the student feed. `now` overrides the wall clock.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FeedQuery {
    #[serde(default)]
    pub(crate) email: String,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub(crate) now: Option<NaiveDateTime>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub(crate) now: Option<NaiveDateTime>,
}

/// Router builder exposing registration, scheduling, and feed endpoints.
pub fn portal_router<S, M>(service: Arc<PortalService<S, M>>) -> Router
where
    S: RecordStore + 'static,
    M: WelcomeMailer + 'static,
{
    Router::new()
        .route("/api/v1/students", post(register_student_handler::<S, M>))
        .route("/api/v1/students/feed", get(student_feed_handler::<S, M>))
        .route("/api/v1/admins", post(register_admin_handler::<S, M>))
        .route(
            "/api/v1/classes",
            get(list_classes_handler::<S, M>).post(schedule_class_handler::<S, M>),
        )
        .route(
            "/api/v1/classes/audience",
            post(preview_audience_handler::<S, M>),
        )
        .route("/api/v1/classes/:id", delete(delete_class_handler::<S, M>))
        .with_state(service)
}

fn local_now(requested: Option<NaiveDateTime>) -> NaiveDateTime {
    requested.unwrap_or_else(|| Local::now().naive_local())
}

/// HTTP mapping for portal failures. Field errors carry an `errors` object keyed by
/// input name; everything else carries a single `error` message.
pub(crate) fn error_response(err: PortalError) -> Response {
    if let Some(errors) = err.field_errors() {
        let status = match err {
            PortalError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::CONFLICT,
        };
        return (status, axum::Json(json!({ "errors": errors }))).into_response();
    }

    let status = match &err {
        PortalError::StudentNotFound { .. } | PortalError::Repository(RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        PortalError::Repository(RepositoryError::Unavailable(_)) => {
            error!(error = %err, "record store unavailable");
            StatusCode::SERVICE_UNAVAILABLE
        }
        PortalError::Roster(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn register_student_handler<S, M>(
    State(service): State<Arc<PortalService<S, M>>>,
    axum::Json(registration): axum::Json<StudentRegistration>,
) -> Response
where
    S: RecordStore + 'static,
    M: WelcomeMailer + 'static,
{
    match service.register_student(registration) {
        Ok(student) => (StatusCode::CREATED, axum::Json(student)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn student_feed_handler<S, M>(
    State(service): State<Arc<PortalService<S, M>>>,
    Query(query): Query<FeedQuery>,
) -> Response
where
    S: RecordStore + 'static,
    M: WelcomeMailer + 'static,
{
    match service.student_feed(&query.email, local_now(query.now)) {
        Ok(feed) => (StatusCode::OK, axum::Json(feed)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn register_admin_handler<S, M>(
    State(service): State<Arc<PortalService<S, M>>>,
    axum::Json(registration): axum::Json<AdminRegistration>,
) -> Response
where
    S: RecordStore + 'static,
    M: WelcomeMailer + 'static,
{
    match service.register_admin(registration) {
        Ok(admin) => (StatusCode::CREATED, axum::Json(admin)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_classes_handler<S, M>(
    State(service): State<Arc<PortalService<S, M>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: RecordStore + 'static,
    M: WelcomeMailer + 'static,
{
    match service.list_classes(local_now(query.now)) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn schedule_class_handler<S, M>(
    State(service): State<Arc<PortalService<S, M>>>,
    axum::Json(request): axum::Json<ScheduleRequest>,
) -> Response
where
    S: RecordStore + 'static,
    M: WelcomeMailer + 'static,
{
    match service.schedule_class(request) {
        Ok(notification) => (StatusCode::CREATED, axum::Json(notification)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn preview_audience_handler<S, M>(
    State(service): State<Arc<PortalService<S, M>>>,
    axum::Json(filter): axum::Json<TargetingFilter>,
) -> Response
where
    S: RecordStore + 'static,
    M: WelcomeMailer + 'static,
{
    match service.preview_audience(&filter) {
        Ok(preview) => (StatusCode::OK, axum::Json(preview)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_class_handler<S, M>(
    State(service): State<Arc<PortalService<S, M>>>,
    Path(id): Path<u64>,
) -> Response
where
    S: RecordStore + 'static,
    M: WelcomeMailer + 'static,
{
    match service.delete_class(NotificationId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}
