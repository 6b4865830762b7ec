//! Validated JSON extractor.

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use studyhub_application::Validatable;

/// JSON extractor that runs the request type's validation rules
///
/// Bodies that do not parse are a 400; bodies that parse but break a rule
/// are a 422 listing every failing field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validatable,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e.body_text())))?;

        let result = value.validate_all();
        if !result.valid {
            return Err(ApiError::Validation(result));
        }

        Ok(ValidatedJson(value))
    }
}

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};
    use studyhub_application::validation::FeedbackRequest;

    fn request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_accepts_valid_body() {
        let ValidatedJson(req) =
            ValidatedJson::<FeedbackRequest>::from_request(request(r#"{"body":"nice"}"#), &())
                .await
                .unwrap();
        assert_eq!(req.body, "nice");
    }

    #[tokio::test]
    async fn test_malformed_is_bad_request() {
        let err = ValidatedJson::<FeedbackRequest>::from_request(request("{"), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_rule_violation_is_validation_error() {
        let err = ValidatedJson::<FeedbackRequest>::from_request(request(r#"{"body":"  "}"#), &())
            .await
            .unwrap_err();
        match err {
            ApiError::Validation(result) => assert!(result.field_errors.contains_key("body")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
