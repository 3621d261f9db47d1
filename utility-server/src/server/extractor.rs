//! JSON body extractor
//!
//! Same as `axum::Json`, but a body that fails to parse is answered with the
//! `ApiResponse` error envelope (400, `ValidationFailed`) instead of axum's
//! plain-text rejection.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::utils::AppError;

/// JSON request body with envelope-formatted rejections
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(status = %rejection.status(), "Rejected request body");
                Err(rejection_to_error(rejection))
            }
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    let reason = match &rejection {
        JsonRejection::JsonDataError(_) => "invalid_data",
        JsonRejection::JsonSyntaxError(_) => "invalid_syntax",
        JsonRejection::MissingJsonContentType(_) => "missing_content_type",
        _ => "unreadable_body",
    };
    AppError::validation(rejection.body_text()).with_detail("reason", reason)
}
