//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use agora_app::{
    auth::MockAuthService,
    users::{User, UserId},
};

use crate::{session::SessionCookie, state::State};

pub(crate) const TEST_COOKIE: &str = "session_token";

pub(crate) fn make_user(id: i64, is_active: bool) -> User {
    User {
        id: UserId::new(id),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        email: "jane@example.com".to_string(),
        is_active,
        created_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    Arc::new(State::new(Arc::new(auth), SessionCookie::new(TEST_COOKIE)))
}

pub(crate) fn auth_service(auth: MockAuthService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_auth(auth)))
            .push(route),
    )
}
