use crate::calculations::pvls::{CalculationError, ImportError};
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
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
    Import(ImportError),
    Calculation(CalculationError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Calculation(err) => write!(f, "calculation error: {}", err),
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
            AppError::Import(err) => Some(err),
            AppError::Calculation(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Calculation(CalculationError::Provider(_)) => StatusCode::BAD_GATEWAY,
            AppError::Calculation(CalculationError::Window(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
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

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<CalculationError> for AppError {
    fn from(value: CalculationError) -> Self {
        Self::Calculation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::pvls::{ProviderError, WindowError};

    #[test]
    fn maps_errors_to_http_status() {
        let cases = [
            (
                AppError::Import(ImportError::InvalidDate {
                    file: "observations",
                    row: 3,
                    value: "yesterday".to_string(),
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Calculation(CalculationError::Provider(ProviderError::Unavailable(
                    "lab system offline".to_string(),
                ))),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Calculation(CalculationError::Window(WindowError::OutOfRange {
                    months: 12,
                })),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Config(ConfigError::InvalidPort),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn display_prefixes_layer() {
        let error = AppError::Calculation(CalculationError::Provider(
            ProviderError::MissingMetadata("viral load concept".to_string()),
        ));
        assert_eq!(
            error.to_string(),
            "calculation error: metadata not resolvable: viral load concept"
        );
    }
}
