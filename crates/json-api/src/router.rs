//! App Router

use salvo::Router;

use crate::auth::{self, middleware::require_session};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("register").post(auth::register::handler))
        .push(Router::with_path("login").post(auth::login::handler))
        .push(Router::with_path("activate").get(auth::activate::handler))
        .push(Router::with_path("logout").post(auth::logout::handler))
        .push(
            Router::with_path("me")
                .hoop(require_session)
                .get(auth::me::handler),
        )
}
