//! Logout Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{extensions::*, state::State};

/// Logout Handler
///
/// Revokes the presented session, if any, and clears the cookie.
#[endpoint(
    tags("auth"),
    summary = "Log out",
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Session ended"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    if let Some(token) = state.cookie.read(req) {
        state.auth.revoke(token).await;
    }

    res.add_cookie(state.cookie.expire());

    Ok(StatusCode::NO_CONTENT)
}
