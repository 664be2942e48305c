use crate::error::LoggerError;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub const SUCCESS_MESSAGE: &str = "IPs logged successfully";
pub const FAILURE_MESSAGE: &str = "Error logging IP";
pub const BAD_INPUT_MESSAGE: &str = "Invalid request body";

pub fn success(logged: &str) -> Response {
    with_cors(
        StatusCode::OK,
        Json(json!({
            "message": SUCCESS_MESSAGE,
            "logged": logged,
        })),
    )
}

/// Details stay in the server log; callers only see a generic message.
pub fn failure(err: &LoggerError) -> Response {
    let status = err.status_code();
    let message = if status == StatusCode::BAD_REQUEST {
        BAD_INPUT_MESSAGE
    } else {
        FAILURE_MESSAGE
    };

    with_cors(status, Json(json!({ "message": message })))
}

pub fn preflight() -> Response {
    with_cors(StatusCode::NO_CONTENT, ())
}

fn with_cors(status: StatusCode, body: impl IntoResponse) -> Response {
    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}
