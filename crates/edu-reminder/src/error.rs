use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::portal::router::error_response;
use crate::workflows::portal::PortalError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Portal(PortalError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Portal(err) => write!(f, "portal error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Portal(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Portal(err) => error_response(err),
            other => {
                let body = Json(json!({ "error": other.to_string() }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<PortalError> for AppError {
    fn from(value: PortalError) -> Self {
        Self::Portal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::portal::RepositoryError;
    use crate::workflows::validation::ValidationErrors;

    #[test]
    fn portal_errors_share_the_router_status_mapping() {
        let cases = [
            (
                AppError::from(PortalError::Validation(ValidationErrors::single(
                    "email",
                    "Please enter a valid email address",
                ))),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(PortalError::StudentNotFound {
                    email: "ghost@uni.edu".to_string(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(PortalError::Repository(RepositoryError::DuplicateKey {
                    field: "email",
                })),
                StatusCode::CONFLICT,
            ),
            (
                AppError::from(PortalError::Repository(RepositoryError::Unavailable(
                    "offline".to_string(),
                ))),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn display_prefixes_the_error_source() {
        let error = AppError::from(PortalError::StudentNotFound {
            email: "ghost@uni.edu".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "portal error: No student found with email \"ghost@uni.edu\""
        );
    }
}
