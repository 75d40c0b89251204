//! Agora JSON API Server

use std::process;

use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tokio::sync::broadcast;
use tracing::{error, info};

use agora_app::{
    auth::spawn_expiry_sweeper,
    context::{AppContext, AppSettings},
};

use crate::{config::ServerConfig, session::SessionCookie, state::State};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod auth;
mod config;
mod extensions;
mod healthcheck;
mod observability;
mod router;
mod session;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// Agora JSON API Server entry point
#[tokio::main]
pub async fn main() {
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    if let Err(init_error) = observability::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "the subscriber failed to install, so there is nowhere else to report"
        )]
        {
            eprintln!("Logging error: {init_error}");
        }

        process::exit(1);
    }

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;

    let settings = AppSettings {
        database_url: config.database.database_url.clone(),
        store_timeout: config.database.timeout(),
        activation_base_url: config.session.public_base_url.clone(),
    };

    let app = match AppContext::from_settings(&settings).await {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            process::exit(1);
        }
    };

    let (background, sweeper_shutdown) = broadcast::channel(1);

    let sweeper = spawn_expiry_sweeper(
        app.auth.clone(),
        config.session.sweep_interval(),
        sweeper_shutdown,
    );

    let cookie = SessionCookie::new(config.session.cookie_name.clone());

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(inject(State::from_app_context(app, cookie)))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(router::app_router());

    let doc = OpenApi::new("Agora API", env!("CARGO_PKG_VERSION"))
        .add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                config.session.cookie_name.clone(),
            ))),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, background).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    server.serve(router).await;

    if let Err(join_error) = sweeper.await {
        error!("expiry sweeper ended abnormally: {join_error}");
    }
}
