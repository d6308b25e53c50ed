use crate::{
    auth::Auth,
    sso::handlers::{error_response, missing_payload, validate_email_password},
};
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    email: String,
    password: String,
    app_id: i32,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
}

fn validate_login(req: &LoginRequest) -> Result<(), (StatusCode, String)> {
    validate_email_password(&req.email, &req.password)?;
    if req.app_id == 0 {
        return Err((StatusCode::BAD_REQUEST, "app_id is required".to_string()));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path= "/login",
    request_body = LoginRequest,
    responses (
        (status = 200, description = "Login successful", body = LoginResponse, content_type = "application/json"),
        (status = 400, description = "Missing field or unknown app_id"),
        (status = 401, description = "Invalid email or password"),
    ),
    tag= "auth"
)]
// axum handler for login
#[instrument(skip_all)]
pub async fn login(
    auth: Extension<Arc<Auth>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return missing_payload().into_response();
    };

    if let Err(rejection) = validate_login(&req) {
        debug!("login rejected: {}", rejection.1);
        return rejection.into_response();
    }

    match auth.login(&req.email, &req.password, req.app_id).await {
        Ok(token) => (StatusCode::OK, Json(LoginResponse { token })).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}
