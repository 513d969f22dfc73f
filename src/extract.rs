use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// `axum::Json` with the rejection routed through `ApiError`: a missing or
/// malformed field answers 406 with an `{"error": ...}` body like every
/// other input failure, instead of axum's plain-text 422.
#[derive(Debug)]
pub struct Json<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(ApiError::InvalidInput(rejection.body_text())),
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};

    #[derive(Debug, serde::Deserialize)]
    struct Demo {
        #[allow(dead_code)]
        name: String,
        #[allow(dead_code)]
        phone_number: i64,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn missing_field_maps_to_invalid_input() {
        let req = json_request(r#"{"name":"Alice"}"#);
        let err = Json::<Demo>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_ACCEPTABLE);
        assert!(err.to_string().contains("phone_number"));
    }

    #[tokio::test]
    async fn malformed_body_maps_to_invalid_input() {
        let req = json_request("{not json");
        let err = Json::<Demo>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_ACCEPTABLE);
    }

    #[tokio::test]
    async fn missing_content_type_maps_to_invalid_input() {
        let req = Request::builder()
            .method("POST")
            .body(Body::from(r#"{"name":"Alice","phone_number":1}"#))
            .unwrap();
        let err = Json::<Demo>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_ACCEPTABLE);
    }

    #[tokio::test]
    async fn well_formed_body_passes_through() {
        let req = json_request(r#"{"name":"Alice","phone_number":5550001}"#);
        let Json(demo) = Json::<Demo>::from_request(req, &()).await.unwrap();
        assert_eq!(demo.phone_number, 5550001);
    }
}
