//! State

use std::sync::Arc;

use agora_app::{auth::AuthService, context::AppContext};

use crate::session::SessionCookie;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) auth: Arc<dyn AuthService>,
    pub(crate) cookie: SessionCookie,
}

impl State {
    #[must_use]
    pub(crate) fn new(auth: Arc<dyn AuthService>, cookie: SessionCookie) -> Self {
        Self { auth, cookie }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext, cookie: SessionCookie) -> Arc<Self> {
        Arc::new(Self::new(app.auth, cookie))
    }
}
