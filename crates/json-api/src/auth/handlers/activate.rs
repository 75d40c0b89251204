//! Activate Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{auth::errors::into_status_error, extensions::*, state::State};

/// Activated Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ActivatedResponse {
    pub user_id: i64,
    pub activated: bool,
}

/// Activate Handler
///
/// Consumes a single-use activation token from an emailed link.
#[endpoint(
    tags("auth"),
    summary = "Activate account",
    responses(
        (status_code = StatusCode::OK, description = "Account activated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid or expired token"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    token: QueryParam<String, true>,
    depot: &mut Depot,
) -> Result<Json<ActivatedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let user = state
        .auth
        .consume_activation_token(&token.into_inner())
        .await
        .map_err(into_status_error)?;

    info!(user_id = %user, "account activated");

    Ok(Json(ActivatedResponse {
        user_id: user.into_inner(),
        activated: true,
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use agora_app::{
        auth::{AuthServiceError, MockAuthService},
        users::UserId,
    };

    use crate::test_helpers::auth_service;

    use super::*;

    fn make_service(auth: MockAuthService) -> Service {
        auth_service(auth, Router::with_path("activate").get(handler))
    }

    #[tokio::test]
    async fn test_activate_consumes_token() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_consume_activation_token()
            .once()
            .withf(|token| token == "activation-token")
            .return_once(|_| Ok(UserId::new(7)));

        let mut res = TestClient::get("http://example.com/activate?token=activation-token")
            .send(&make_service(auth))
            .await;

        let activated: ActivatedResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(activated.user_id, 7);
        assert!(activated.activated);

        Ok(())
    }

    #[tokio::test]
    async fn test_activate_spent_token_returns_400() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_consume_activation_token()
            .once()
            .return_once(|_| Err(AuthServiceError::TokenNotFound));

        let res = TestClient::get("http://example.com/activate?token=spent")
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_activate_without_token_returns_400() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_consume_activation_token().never();

        let res = TestClient::get("http://example.com/activate")
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
