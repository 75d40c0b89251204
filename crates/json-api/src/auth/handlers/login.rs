//! Login Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use agora_app::users::Secret;

use crate::{auth::errors::into_status_error, extensions::*, state::State};

/// Login Request
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SessionResponse {
    pub user_id: i64,
}

/// Login Handler
///
/// Verifies the credential and sets the session cookie.
#[endpoint(
    tags("auth"),
    summary = "Log in",
    responses(
        (status_code = StatusCode::OK, description = "Session started"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid email or password"),
        (status_code = StatusCode::FORBIDDEN, description = "Account not activated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<SessionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let LoginRequest { email, password } = json.into_inner();
    let secret = Secret::new(password);

    let session = state
        .auth
        .login(&email, &secret)
        .await
        .map_err(into_status_error)?;

    info!(user_id = %session.user.id, "session started");

    res.add_cookie(state.cookie.issue(&session.token));

    Ok(Json(SessionResponse {
        user_id: session.user.id.into_inner(),
    }))
}
