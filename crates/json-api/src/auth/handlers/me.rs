//! Current User Handler

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use agora_app::users::User;

use crate::extensions::*;

/// User Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.into_inner(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            created_at: user.created_at.to_string(),
        }
    }
}

/// Current User Handler
///
/// Returns the account behind the session cookie.
#[endpoint(
    tags("auth"),
    summary = "Current user",
    security(("session_cookie" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Signed-in user"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Not signed in"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<UserResponse>, StatusError> {
    let user = depot.current_user_or_401()?;

    Ok(Json(user.into()))
}
