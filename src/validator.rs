use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use warehouse_core::AppError;

/// Joins every field message into one line, including those raised inside
/// nested structs and list items.
fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages(errors, &mut messages);
    messages.join(", ")
}

fn collect_messages(errors: &ValidationErrors, out: &mut Vec<String>) {
    out.extend(errors.field_errors().iter().flat_map(|(field, errors)| {
        errors.iter().filter_map(move |error| {
            error
                .message
                .as_ref()
                .map(|msg| msg.to_string())
                .or_else(|| Some(format!("{} is invalid", field)))
        })
    }));

    for kind in errors.errors().values() {
        match kind {
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect_messages(inner, out);
                }
            }
            ValidationErrorsKind::Field(_) => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let error_msg = rejection.body_text();

                if error_msg.contains("missing field") {
                    let field = error_msg
                        .split("missing field `")
                        .nth(1)
                        .and_then(|s| s.split('`').next())
                        .unwrap_or("unknown");
                    return AppError::new(
                        StatusCode::BAD_REQUEST,
                        anyhow!("{} is required", field),
                    );
                }

                if error_msg.contains("invalid type") {
                    return AppError::new(
                        StatusCode::BAD_REQUEST,
                        anyhow!("Invalid field type in request"),
                    );
                }

                if matches!(rejection, JsonRejection::JsonDataError(_)) {
                    let detail = error_msg
                        .rsplit(": ")
                        .next()
                        .unwrap_or("invalid value")
                        .split(" at line")
                        .next()
                        .unwrap_or("invalid value")
                        .to_string();
                    return AppError::new(StatusCode::BAD_REQUEST, anyhow!(detail));
                }

                if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
                    return AppError::new(
                        StatusCode::BAD_REQUEST,
                        anyhow!("Missing 'Content-Type: application/json' header"),
                    );
                }

                AppError::new(StatusCode::BAD_REQUEST, anyhow!("Invalid request body"))
            })?;

        value.validate().map_err(|errors| {
            AppError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                anyhow!("{}", format_errors(&errors)),
            )
        })?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Line {
        #[validate(range(min = 1, message = "quantity must be greater than 0"))]
        quantity: i32,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Form {
        #[validate(length(min = 1, message = "code is required"))]
        code: String,
        #[validate(nested)]
        lines: Vec<Line>,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let req = json_request(r#"{"code":"IN-1","lines":[{"quantity":2}]}"#);
        let ValidatedJson(form) = ValidatedJson::<Form>::from_request(req, &()).await.unwrap();
        assert_eq!(form.code, "IN-1");
        assert_eq!(form.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let req = json_request(r#"{"lines":[]}"#);
        let err = ValidatedJson::<Form>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "code is required");
    }

    #[tokio::test]
    async fn test_nested_rule_is_unprocessable() {
        let req = json_request(r#"{"code":"IN-1","lines":[{"quantity":0}]}"#);
        let err = ValidatedJson::<Form>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.error.to_string().contains("quantity must be greater than 0"));
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("{}"))
            .unwrap();
        let err = ValidatedJson::<Form>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
