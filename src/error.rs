//! Error types and handling for the TrafficPulse dashboard

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Which end of a route a location query belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEndpoint {
    Origin,
    Destination,
}

impl std::fmt::Display for RouteEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteEndpoint::Origin => f.write_str("origin"),
            RouteEndpoint::Destination => f.write_str("destination"),
        }
    }
}

/// Main error type for the TrafficPulse dashboard
#[derive(Error, Debug)]
pub enum TrafficPulseError {
    /// Geocoding returned no match for a route endpoint
    #[error("Could not find {endpoint} location")]
    LocationNotFound { endpoint: RouteEndpoint },

    /// The routing service answered with a non-success status
    #[error("Route calculation failed (status {status})")]
    RouteCalculationFailed { status: u16 },

    /// The routing service answered successfully but without routes
    #[error("No routes found")]
    NoRoutesFound,

    /// No map/routing API key is available
    #[error("TomTom API key is not configured")]
    NotConfigured,

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Transport or decoding failures talking to the provider
    #[error("API error: {message}")]
    Api { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TrafficPulseError {
    pub fn location_not_found(endpoint: RouteEndpoint) -> Self {
        Self::LocationNotFound { endpoint }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TrafficPulseError::LocationNotFound { .. } | TrafficPulseError::NoRoutesFound => {
                self.to_string()
            }
            TrafficPulseError::RouteCalculationFailed { .. } => {
                "Route calculation failed".to_string()
            }
            TrafficPulseError::NotConfigured => {
                "Map and routing are not configured. Set TOMTOM_API_KEY to enable them."
                    .to_string()
            }
            TrafficPulseError::Validation { message } => format!("Invalid input: {message}"),
            TrafficPulseError::Api { .. } => {
                "Unable to reach the routing service. Please try again.".to_string()
            }
            TrafficPulseError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TrafficPulseError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }

    /// HTTP status the error is reported with
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            TrafficPulseError::LocationNotFound { .. } | TrafficPulseError::NoRoutesFound => {
                StatusCode::NOT_FOUND
            }
            TrafficPulseError::RouteCalculationFailed { .. } | TrafficPulseError::Api { .. } => {
                StatusCode::BAD_GATEWAY
            }
            TrafficPulseError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            TrafficPulseError::Validation { .. } => StatusCode::BAD_REQUEST,
            TrafficPulseError::Config { .. } | TrafficPulseError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code for API clients
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            TrafficPulseError::LocationNotFound { .. } => "location_not_found",
            TrafficPulseError::RouteCalculationFailed { .. } => "route_calculation_failed",
            TrafficPulseError::NoRoutesFound => "no_routes_found",
            TrafficPulseError::NotConfigured => "not_configured",
            TrafficPulseError::Validation { .. } => "invalid_input",
            TrafficPulseError::Api { .. } => "upstream_error",
            TrafficPulseError::Config { .. } => "config_error",
            TrafficPulseError::Io { .. } => "io_error",
        }
    }
}

// Request URLs carry the API key, so they never reach the message

impl From<reqwest::Error> for TrafficPulseError {
    fn from(err: reqwest::Error) -> Self {
        Self::api(err.without_url().to_string())
    }
}

impl From<reqwest_middleware::Error> for TrafficPulseError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            reqwest_middleware::Error::Middleware(err) => Self::api(err.to_string()),
        }
    }
}

impl IntoResponse for TrafficPulseError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = Json(json!({
            "code": self.code(),
            "error": self.user_message(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TrafficPulseError::location_not_found(RouteEndpoint::Origin);
        assert!(matches!(err, TrafficPulseError::LocationNotFound { .. }));

        let api_err = TrafficPulseError::api("connection failed");
        assert!(matches!(api_err, TrafficPulseError::Api { .. }));

        let validation_err = TrafficPulseError::validation("empty origin");
        assert!(matches!(validation_err, TrafficPulseError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let origin = TrafficPulseError::location_not_found(RouteEndpoint::Origin);
        assert_eq!(origin.user_message(), "Could not find origin location");

        let destination = TrafficPulseError::location_not_found(RouteEndpoint::Destination);
        assert_eq!(destination.user_message(), "Could not find destination location");

        let failed = TrafficPulseError::RouteCalculationFailed { status: 500 };
        assert_eq!(failed.user_message(), "Route calculation failed");

        assert_eq!(TrafficPulseError::NoRoutesFound.user_message(), "No routes found");
        assert!(TrafficPulseError::NotConfigured.user_message().contains("not configured"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TrafficPulseError::NotConfigured.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(TrafficPulseError::NoRoutesFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            TrafficPulseError::RouteCalculationFailed { status: 403 }.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(TrafficPulseError::validation("x").status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TrafficPulseError = io_err.into();
        assert!(matches!(err, TrafficPulseError::Io { .. }));
    }
}
