//! Activation link delivery.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tracing::{debug, info};

use crate::users::User;

/// Delivery failure reported by an [`ActivationNotifier`].
#[derive(Debug, Error)]
#[error("failed to deliver activation link: {0}")]
pub struct NotifyError(pub String);

/// Delivers activation links to newly registered users.
///
/// Delivery is best-effort; callers log failures and carry on.
#[automock]
#[async_trait]
pub trait ActivationNotifier: Send + Sync {
    async fn notify(&self, recipient: &User, activation_link: &str) -> Result<(), NotifyError>;
}

/// Writes activation links to the application log instead of sending mail.
///
/// The link carries a raw token, so it is only written at `debug` level;
/// `agora-app users activation-link` reissues one otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl ActivationNotifier for LogNotifier {
    async fn notify(&self, recipient: &User, activation_link: &str) -> Result<(), NotifyError> {
        info!(
            user_id = %recipient.id,
            name = %recipient.full_name(),
            email = %recipient.email,
            "activation required"
        );

        debug!(user_id = %recipient.id, activation_link, "activation link issued");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{io, sync::Arc};

    use jiff::Timestamp;
    use parking_lot::Mutex;
    use testresult::TestResult;
    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;

    use crate::users::UserId;

    use super::*;

    const LINK: &str = "https://agora.test/activate?token=raw-activation-token";

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn jane() -> User {
        User {
            id: UserId::new(7),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            is_active: false,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    async fn notify_at(level: Level) -> Result<String, NotifyError> {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(level)
            .with_ansi(false)
            .finish();

        let _guard = tracing::subscriber::set_default(subscriber);

        LogNotifier.notify(&jane(), LINK).await?;

        Ok(captured.text())
    }

    #[tokio::test]
    async fn info_output_omits_the_raw_token() -> TestResult {
        let output = notify_at(Level::INFO).await?;

        assert!(output.contains("activation required"), "got {output}");
        assert!(!output.contains("raw-activation-token"), "got {output}");

        Ok(())
    }

    #[tokio::test]
    async fn debug_output_carries_the_link() -> TestResult {
        let output = notify_at(Level::DEBUG).await?;

        assert!(output.contains(LINK), "got {output}");

        Ok(())
    }
}
