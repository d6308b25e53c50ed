use crate::{
    auth::Auth,
    sso::handlers::{error_response, missing_payload, valid_email, validate_email_password},
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
pub struct RegisterRequest {
    email: String,
    password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub user_id: i64,
}

#[utoipa::path(
    post,
    path= "/register",
    request_body = RegisterRequest,
    responses (
        (status = 201, description = "Registration successful", body = RegisterResponse, content_type = "application/json"),
        (status = 400, description = "Missing field or malformed email"),
        (status = 409, description = "User with the specified email already exists"),
    ),
    tag= "auth"
)]
// axum handler for register
#[instrument(skip_all)]
pub async fn register(
    auth: Extension<Arc<Auth>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return missing_payload().into_response();
    };

    if let Err(rejection) = validate_email_password(&req.email, &req.password) {
        debug!("register rejected: {}", rejection.1);
        return rejection.into_response();
    }

    if !valid_email(&req.email) {
        debug!("register rejected: invalid email");
        return (StatusCode::BAD_REQUEST, "invalid email".to_string()).into_response();
    }

    match auth.register_new_user(&req.email, &req.password).await {
        Ok(user_id) => (StatusCode::CREATED, Json(RegisterResponse { user_id })).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}
