//! Register Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use agora_app::users::{NewUser, Secret};

use crate::{auth::errors::into_status_error, extensions::*, state::State};

/// Register Request
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl From<RegisterRequest> for NewUser {
    fn from(request: RegisterRequest) -> Self {
        NewUser {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password: Secret::new(request.password),
        }
    }
}

/// Registered Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisteredResponse {
    /// Identifier of the new, not yet activated, user
    pub user_id: i64,
}

/// Register Handler
///
/// Creates an inactive account and sends its activation link.
#[endpoint(
    tags("auth"),
    summary = "Register",
    responses(
        (status_code = StatusCode::CREATED, description = "User registered"),
        (status_code = StatusCode::CONFLICT, description = "Email already registered"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<RegisterRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<RegisteredResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let user = state
        .auth
        .register(json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(RegisteredResponse {
        user_id: user.id.into_inner(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use agora_app::auth::{AuthServiceError, MockAuthService};

    use crate::test_helpers::{auth_service, make_user};

    use super::*;

    fn make_service(auth: MockAuthService) -> Service {
        auth_service(auth, Router::with_path("register").post(handler))
    }

    fn body() -> serde_json::Value {
        json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@example.com",
            "password": "hunter2",
        })
    }

    #[tokio::test]
    async fn test_register_success_returns_201() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_register()
            .once()
            .withf(|user| {
                user.first_name == "Jane"
                    && user.last_name == "Doe"
                    && user.email == "jane@example.com"
                    && user.password.expose() == "hunter2"
            })
            .return_once(|_| Ok(make_user(7, false)));

        let mut res = TestClient::post("http://example.com/register")
            .json(&body())
            .send(&make_service(auth))
            .await;

        let created: RegisteredResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(created.user_id, 7);

        Ok(())
    }

    #[tokio::test]
    async fn test_register_taken_email_returns_409() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_register()
            .once()
            .return_once(|_| Err(AuthServiceError::EmailTaken));

        let res = TestClient::post("http://example.com/register")
            .json(&body())
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_incomplete_returns_400() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_register()
            .once()
            .return_once(|_| Err(AuthServiceError::InvalidRegistration));

        let res = TestClient::post("http://example.com/register")
            .json(&json!({
                "first_name": "",
                "last_name": "Doe",
                "email": "jane@example.com",
                "password": "hunter2",
            }))
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_malformed_body_returns_400() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_register().never();

        let res = TestClient::post("http://example.com/register")
            .json(&json!({ "email": "jane@example.com" }))
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
