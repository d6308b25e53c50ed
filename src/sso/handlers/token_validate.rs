use crate::{
    auth::Auth,
    sso::handlers::{error_response, missing_payload},
};
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Default)]
#[serde(default)]
pub struct ValidateRequest {
    token: String,
    app_id: i32,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ValidateResponse {
    pub user_id: i64,
    pub email: String,
    pub app_id: i32,
    /// Expiry as unix milliseconds.
    pub exp: i64,
}

#[utoipa::path(
    post,
    path= "/validate",
    request_body = ValidateRequest,
    responses (
        (status = 200, description = "Token is valid for the application", body = ValidateResponse, content_type = "application/json"),
        (status = 400, description = "Missing field or unknown app_id"),
        (status = 401, description = "Invalid or expired token"),
    ),
    tag= "auth"
)]
#[instrument(skip_all)]
pub async fn validate(
    auth: Extension<Arc<Auth>>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return missing_payload().into_response();
    };

    if req.token.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "token is required".to_string()).into_response();
    }
    if req.app_id == 0 {
        return (StatusCode::BAD_REQUEST, "app_id is required".to_string()).into_response();
    }

    match auth.validate_token(req.token.trim(), req.app_id).await {
        Ok(claims) => Json(ValidateResponse {
            user_id: claims.uid,
            email: claims.email,
            app_id: claims.app_id,
            exp: claims.exp,
        })
        .into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}
