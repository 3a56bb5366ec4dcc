use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use authgate_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `authgate_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                // Every refusal looks the same to the client; the reason stays in the log.
                CoreError::Unauthorized(reason) => {
                    tracing::debug!(reason = %reason, "Responding 401");
                    (
                        StatusCode::UNAUTHORIZED,
                        "UNAUTHORIZED",
                        "unauthorized".to_string(),
                    )
                }
                CoreError::Persistence(_) | CoreError::Issuance(_) | CoreError::Rotation(_) => {
                    tracing::error!(error = %core, "Internal core error");
                    internal()
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use authgate_core::error::UnauthorizedReason;
    use authgate_core::StoreError;
    use http_body_util::BodyExt;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unauthorized_reasons_share_one_body() {
        let (status_a, body_a) =
            render(CoreError::Unauthorized(UnauthorizedReason::Expired).into()).await;
        let (status_b, body_b) =
            render(CoreError::Unauthorized(UnauthorizedReason::UserAgentMismatch).into()).await;

        assert_eq!(status_a, StatusCode::UNAUTHORIZED);
        assert_eq!(status_b, StatusCode::UNAUTHORIZED);
        assert_eq!(body_a, body_b);
        assert_eq!(body_a["error"], "unauthorized");
    }

    #[tokio::test]
    async fn store_failure_hides_detail() {
        let err = CoreError::Persistence(StoreError::Unavailable("connection refused".into()));
        let (status, body) = render(err.into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(!body.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn validation_is_bad_request() {
        let (status, body) =
            render(CoreError::Validation("user_id is required".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"], "user_id is required");
    }
}
