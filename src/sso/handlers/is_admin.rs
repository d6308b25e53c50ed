use crate::{
    auth::Auth,
    sso::handlers::{error_response, missing_payload, EMPTY_ID},
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

#[derive(ToSchema, Deserialize, Debug, Default)]
#[serde(default)]
pub struct IsAdminRequest {
    user_id: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct IsAdminResponse {
    pub is_admin: bool,
}

#[utoipa::path(
    post,
    path= "/is_admin",
    request_body = IsAdminRequest,
    responses (
        (status = 200, description = "Admin flag of the user", body = IsAdminResponse, content_type = "application/json"),
        (status = 400, description = "Missing user_id"),
        (status = 404, description = "User not found"),
    ),
    tag= "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn is_admin(
    auth: Extension<Arc<Auth>>,
    payload: Result<Json<IsAdminRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return missing_payload().into_response();
    };

    if req.user_id == EMPTY_ID {
        return (StatusCode::BAD_REQUEST, "user_id is required".to_string()).into_response();
    }

    match auth.is_admin(req.user_id).await {
        Ok(is_admin) => Json(IsAdminResponse { is_admin }).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}
