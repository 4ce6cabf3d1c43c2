#[cfg(test)]
mod tests {
    use crate::error::{error_body, AppError, AppResult, OptionExt};
    use crate::middleware::RequestId;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn json_of(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let error = AppError::BadRequest("Invalid input".to_string());
        assert_eq!(format!("{}", error), "Bad request: Invalid input");

        let error = AppError::NotFound("Resource not found".to_string());
        assert_eq!(format!("{}", error), "Not found: Resource not found");

        let error = AppError::ValidationError { field: "name".to_string(), message: "empty".to_string() };
        assert_eq!(format!("{}", error), "Validation error on field 'name': empty");
    }

    #[test]
    fn test_app_error_into_response() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::MethodNotAllowed("x".into()), StatusCode::METHOD_NOT_ALLOWED),
            (AppError::Internal(anyhow::anyhow!("x")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let body = json_of(
            AppError::ValidationError { field: "name".into(), message: "must not be empty".into() }.into_response(),
        )
        .await;

        assert_eq!(body["status"], 400);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"]["field"], "name");
        assert!(body["timestamp"].is_string());
        assert!(body.get("request_id").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let body = json_of(AppError::Internal(anyhow::anyhow!("secret dsn")).into_response()).await;
        assert_eq!(body["error"]["message"], "An internal server error occurred");
        assert!(body["error"]["details"]["error_id"].is_string());
        assert!(!body.to_string().contains("secret dsn"));
    }

    #[tokio::test]
    async fn test_error_body_with_request_id() {
        let id = RequestId::parse("req-123").unwrap();
        let body = json_of(error_body(StatusCode::NOT_FOUND, "NOT_FOUND", "gone", None, Some(&id))).await;
        assert_eq!(body["request_id"], "req-123");
        assert_eq!(body["error"]["message"], "gone");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_method_not_allowed_envelope() {
        let body = json_of(AppError::MethodNotAllowed("DELETE is not served at /x".into()).into_response()).await;
        assert_eq!(body["status"], 405);
        assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
        assert_eq!(body["error"]["message"], "DELETE is not served at /x");
    }

    #[test]
    fn test_from_anyhow_error() {
        let app_error: AppError = anyhow::anyhow!("boom").into();
        assert!(matches!(app_error, AppError::Internal(_)));
        assert!(std::error::Error::source(&app_error).is_some());
    }

    #[test]
    fn test_option_ext() {
        let some_value: Option<i32> = Some(42);
        let result: AppResult<i32> = some_value.ok_or_not_found("test entity");
        assert_eq!(result.unwrap(), 42);

        let none_value: Option<i32> = None;
        match none_value.ok_or_not_found("user") {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "user not found"),
            _ => panic!("Expected NotFound"),
        }
    }
}
