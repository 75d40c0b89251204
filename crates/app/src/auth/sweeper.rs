//! Periodic removal of expired tokens.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

use crate::auth::AuthService;

/// Run [`AuthService::sweep_expired`] every `every` until `shutdown` fires.
///
/// Failed sweeps are logged and retried on the next tick.
pub fn spawn_expiry_sweeper(
    auth: Arc<dyn AuthService>,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);

        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match auth.sweep_expired().await {
                        Ok(0) => {}
                        Ok(removed) => info!(removed, "expired tokens swept"),
                        Err(error) => warn!(error = %error, "expired token sweep failed"),
                    }
                }
                _ = shutdown.recv() => {
                    debug!("expiry sweeper shutting down");
                    break;
                }
            }
        }
    })
}
