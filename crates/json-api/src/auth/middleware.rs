//! Session middleware.

use std::sync::Arc;

use salvo::prelude::*;
use tracing::debug;

use crate::{extensions::*, state::State};

/// Reject the request unless its session cookie resolves to a user.
///
/// The resolved user is placed in the depot for downstream handlers.
#[salvo::handler]
pub(crate) async fn require_session(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let state = match depot.obtain::<Arc<State>>() {
        Ok(state) => Arc::clone(state),
        Err(_error) => {
            res.render(StatusError::internal_server_error());
            ctrl.skip_rest();

            return;
        }
    };

    let Some(token) = state.cookie.read(req) else {
        res.render(StatusError::unauthorized().brief("Not signed in"));
        ctrl.skip_rest();

        return;
    };

    let Some(user) = state.auth.current_user(token).await else {
        debug!("session cookie did not resolve");

        res.render(StatusError::unauthorized().brief("Not signed in"));
        ctrl.skip_rest();

        return;
    };

    depot.insert_current_user(user);

    ctrl.call_next(req, depot, res).await;
}

#[cfg(test)]
mod tests {
    use agora_app::{auth::MockAuthService, users::User};
    use salvo::{
        affix_state::inject,
        http::header::COOKIE,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use crate::test_helpers::{TEST_COOKIE, make_user, state_with_auth};

    use super::*;

    #[salvo::handler]
    async fn echo_user(depot: &mut Depot, res: &mut Response) {
        let email = depot
            .current_user_or_401()
            .ok()
            .map_or_else(|| "missing".to_string(), |user: &User| user.email.clone());

        res.render(email);
    }

    fn make_service(auth: MockAuthService) -> Service {
        let router = Router::new()
            .hoop(inject(state_with_auth(auth)))
            .hoop(require_session)
            .push(Router::new().get(echo_user));

        Service::new(router)
    }

    #[tokio::test]
    async fn test_missing_cookie_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_current_user().never();

        let res = TestClient::get("http://example.com")
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_cookie_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_current_user().never();

        let res = TestClient::get("http://example.com")
            .add_header(COOKIE, format!("{TEST_COOKIE}="), true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_unresolved_token_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_current_user()
            .once()
            .withf(|token| token == "revoked")
            .return_once(|_| None);

        let res = TestClient::get("http://example.com")
            .add_header(COOKIE, format!("{TEST_COOKIE}=revoked"), true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_valid_session_injects_user() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_current_user()
            .once()
            .withf(|token| token == "raw-session-token")
            .return_once(|_| Some(make_user(7, true)));

        let mut res = TestClient::get("http://example.com")
            .add_header(COOKIE, format!("{TEST_COOKIE}=raw-session-token"), true)
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, "jane@example.com");

        Ok(())
    }
}
