//! # Common API Types
//!
//! Response envelope, pagination parameters and request validation helpers
//! shared by every handler module.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, missing_fields};

/// Default page size for paginated list endpoints.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;
/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Envelope wrapping every successful response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[schema(example = "Guest registered successfully")]
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
        })
    }
}

/// Envelope for responses that carry no payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    #[schema(example = "Signed out successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

/// `limit`/`offset` query parameters.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page size (default 10, clamped to 1..=100)
    pub limit: Option<u64>,
    /// Rows to skip (default 0)
    pub offset: Option<u64>,
}

impl PageParams {
    pub fn limit(&self) -> u64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

/// Unwraps a JSON body, turning extractor rejections into problem+json.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(ApiError::from)
}

/// Like [`json_body`], but a request sent without a JSON body yields
/// `T::default()`.
pub fn optional_json_body<T: Default>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

/// Rejects blank required string fields, naming all of them at once.
pub fn reject_blank(fields: &[(&str, &str)]) -> Result<(), ApiError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing_fields(&missing))
    }
}

/// Trims an optional field, treating blank strings as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_default_and_clamp() {
        let params = PageParams::default();
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);

        let params = PageParams {
            limit: Some(0),
            offset: Some(5),
        };
        assert_eq!(params.limit(), 1);
        assert_eq!(params.offset(), 5);

        let params = PageParams {
            limit: Some(10_000),
            offset: None,
        };
        assert_eq!(params.limit(), 100);
    }

    #[test]
    fn reject_blank_lists_every_missing_field() {
        assert!(reject_blank(&[("name", "Ana"), ("email", "a@b.c")]).is_ok());

        let err = reject_blank(&[("name", "  "), ("email", ""), ("phone", "1")]).unwrap_err();
        assert_eq!(err.code.as_ref(), "VALIDATION_FAILED");
        let details = err.details.unwrap();
        assert!(details.get("name").is_some());
        assert!(details.get("email").is_some());
        assert!(details.get("phone").is_none());
    }

    #[test]
    fn non_blank_trims_and_drops_empty() {
        assert_eq!(non_blank(Some("  x ".into())), Some("x".to_string()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
