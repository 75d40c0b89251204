//! Auth service.

use std::{fmt, future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tokio::time::{error::Elapsed, timeout};
use tracing::{debug, info, warn};

use crate::{
    auth::{
        ActivationNotifier, AuthServiceError, SessionCache, SessionToken, TokenRecord, TokenScope,
        TokenStore, TokenStoreError, ValidToken, fingerprint, generate_token, is_well_formed,
        tombstones::Tombstones,
    },
    clock::{Clock, SystemClock},
    users::{NewUser, Secret, User, UserDirectory, UserDirectoryError, UserId},
};

/// Token generation attempts before a fingerprint collision is fatal.
const ISSUE_ATTEMPTS: usize = 2;

/// Default bound on a single store or directory call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default origin used to build activation links.
pub const DEFAULT_ACTIVATION_BASE_URL: &str = "http://localhost:8698";

/// A freshly authenticated user and the session token issued to them.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// The signed-in user.
    pub user: User,

    /// Raw token to hand to the client.
    pub token: SessionToken,
}

/// Session orchestration over a [`TokenStore`], a [`SessionCache`] and a
/// [`UserDirectory`].
pub struct SessionService {
    tokens: Arc<dyn TokenStore>,
    users: Arc<dyn UserDirectory>,
    notifier: Arc<dyn ActivationNotifier>,
    cache: Arc<SessionCache>,
    tombstones: Arc<Tombstones>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
    activation_base_url: String,
}

impl fmt::Debug for SessionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionService")
            .field("cache", &self.cache)
            .field("clock", &self.clock)
            .field("store_timeout", &self.store_timeout)
            .field("activation_base_url", &self.activation_base_url)
            .finish_non_exhaustive()
    }
}

impl SessionService {
    /// Service on the system clock with default timeout and link origin.
    #[must_use]
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        users: Arc<dyn UserDirectory>,
        cache: Arc<SessionCache>,
        notifier: Arc<dyn ActivationNotifier>,
    ) -> Self {
        Self {
            tokens,
            users,
            notifier,
            cache,
            tombstones: Arc::default(),
            clock: Arc::new(SystemClock),
            store_timeout: DEFAULT_STORE_TIMEOUT,
            activation_base_url: DEFAULT_ACTIVATION_BASE_URL.to_string(),
        }
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Bound every store and directory call by `store_timeout`.
    #[must_use]
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Origin prefixed to activation links.
    #[must_use]
    pub fn with_activation_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.activation_base_url = base_url.into();
        self
    }

    /// Link a user follows to consume `token`.
    #[must_use]
    pub fn activation_link(&self, token: &SessionToken) -> String {
        format!(
            "{}/activate?token={}",
            self.activation_base_url.trim_end_matches('/'),
            token.as_str()
        )
    }

    /// Generate and persist a token, regenerating once on a fingerprint collision.
    async fn issue(
        &self,
        user: UserId,
        scope: TokenScope,
    ) -> Result<(SessionToken, TokenRecord), AuthServiceError> {
        for attempt in 1..=ISSUE_ATTEMPTS {
            let token = generate_token();
            let record = TokenRecord::issue(token.fingerprint(), user, scope, self.clock.now());

            match bounded(self.store_timeout, self.tokens.insert(record.clone())).await {
                Ok(()) => {
                    debug!(user_id = %user, %scope, "token issued");

                    return Ok((token, record));
                }
                Err(TokenStoreError::DuplicateKey) => {
                    warn!(user_id = %user, %scope, attempt, "token fingerprint collided");
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(AuthServiceError::DuplicateKey)
    }

    /// Issue an authentication token and seed the cache once it is persisted.
    async fn issue_session(&self, user: UserId) -> Result<SessionToken, AuthServiceError> {
        let (token, record) = self.issue(user, TokenScope::Authentication).await?;

        self.cache.insert(token.as_str(), ValidToken::from(&record));

        Ok(token)
    }

    async fn send_activation(&self, user: &User) {
        let token = match self.issue(user.id, TokenScope::Activation).await {
            Ok((token, _record)) => token,
            Err(error) => {
                warn!(
                    user_id = %user.id,
                    error = %error,
                    "failed to issue activation token; registration continues without one"
                );

                return;
            }
        };

        let link = self.activation_link(&token);

        if let Err(error) = self.notifier.notify(user, &link).await {
            warn!(user_id = %user.id, error = %error, "failed to deliver activation link");
        }
    }
}

#[async_trait]
impl AuthService for SessionService {
    async fn register(&self, registration: NewUser) -> Result<User, AuthServiceError> {
        if !registration.is_complete() {
            return Err(AuthServiceError::InvalidRegistration);
        }

        let user = bounded(self.store_timeout, self.users.create_user(registration)).await?;

        info!(user_id = %user.id, "user registered");

        self.send_activation(&user).await;

        Ok(user)
    }

    async fn login(&self, email: &str, secret: &Secret) -> Result<IssuedSession, AuthServiceError> {
        let user = bounded(self.store_timeout, self.users.verify_credential(email, secret))
            .await?
            .ok_or(AuthServiceError::InvalidCredential)?;

        if !user.is_active {
            return Err(AuthServiceError::NotActivated);
        }

        let token = self.issue_session(user.id).await?;

        info!(user_id = %user.id, "login succeeded");

        Ok(IssuedSession { user, token })
    }

    async fn issue_authentication_token(
        &self,
        user: UserId,
    ) -> Result<SessionToken, AuthServiceError> {
        match bounded(self.store_timeout, self.users.is_activated(user)).await {
            Ok(true) => {}
            Ok(false) => return Err(AuthServiceError::NotActivated),
            Err(UserDirectoryError::NotFound) => {
                return Err(AuthServiceError::InvalidCredential);
            }
            Err(error) => return Err(error.into()),
        }

        self.issue_session(user).await
    }

    async fn issue_activation_token(
        &self,
        user: UserId,
    ) -> Result<SessionToken, AuthServiceError> {
        self.issue(user, TokenScope::Activation)
            .await
            .map(|(token, _record)| token)
    }

    async fn resolve(&self, token: &str) -> Option<UserId> {
        let now = self.clock.now();

        if let Some(user) = self.cache.get(token, now) {
            return Some(user);
        }

        if !is_well_formed(token) {
            return None;
        }

        let fingerprint = fingerprint(token);

        // Snapshot before the tombstone check: a revoke either bumps the epoch
        // after this point or has already tombstoned the fingerprint.
        let observed = self.cache.epoch();

        if self.tombstones.contains(&fingerprint, now) {
            return None;
        }

        let lookup = self
            .tokens
            .find_valid(fingerprint, TokenScope::Authentication, now);

        match bounded(self.store_timeout, lookup).await {
            Ok(Some(session)) => {
                self.cache
                    .insert_unless_removed_since(token, session, observed);

                Some(session.user)
            }
            Ok(None) => None,
            Err(error) => {
                warn!(error = %error, "session lookup failed; treating as unauthenticated");

                None
            }
        }
    }

    async fn current_user(&self, token: &str) -> Option<User> {
        let user = self.resolve(token).await?;

        match bounded(self.store_timeout, self.users.get_user(user)).await {
            Ok(user) if user.is_active => Some(user),
            Ok(user) => {
                debug!(user_id = %user.id, "session belongs to an inactive user");

                None
            }
            Err(error) => {
                warn!(user_id = %user, error = %error, "failed to load session user");

                None
            }
        }
    }

    async fn consume_activation_token(&self, token: &str) -> Result<UserId, AuthServiceError> {
        if !is_well_formed(token) {
            return Err(AuthServiceError::TokenNotFound);
        }

        let fingerprint = fingerprint(token);
        let now = self.clock.now();

        if self.tombstones.contains(&fingerprint, now) {
            return Err(AuthServiceError::TokenNotFound);
        }

        let lookup = self
            .tokens
            .find_valid(fingerprint, TokenScope::Activation, now);

        let Some(activation) = bounded(self.store_timeout, lookup).await? else {
            return Err(AuthServiceError::TokenNotFound);
        };

        bounded(self.store_timeout, self.users.set_activated(activation.user)).await?;

        let deleted = bounded(
            self.store_timeout,
            self.tokens.delete(fingerprint, TokenScope::Activation),
        )
        .await;

        match deleted {
            Ok(true) => {}
            // A concurrent consumer removed the row first.
            Ok(false) => return Err(AuthServiceError::TokenNotFound),
            Err(error) => {
                warn!(
                    user_id = %activation.user,
                    error = %error,
                    "failed to delete consumed activation token"
                );

                self.tombstones.insert(fingerprint, activation.expires_at);
            }
        }

        info!(user_id = %activation.user, "account activated");

        Ok(activation.user)
    }

    async fn revoke(&self, token: &str) {
        // Cleared up front so a caller that stops waiting still loses the session.
        self.cache.remove(token);

        let revocation = Revocation {
            token: token.to_owned(),
            tokens: Arc::clone(&self.tokens),
            cache: Arc::clone(&self.cache),
            tombstones: Arc::clone(&self.tombstones),
            store_timeout: self.store_timeout,
            tombstone_until: self.clock.now() + TokenScope::Authentication.ttl(),
        };

        if let Err(error) = tokio::spawn(revocation.run()).await {
            warn!(error = %error, "revocation task failed");
        }
    }

    async fn sweep_expired(&self) -> Result<u64, AuthServiceError> {
        let now = self.clock.now();
        let removed = bounded(self.store_timeout, self.tokens.sweep_expired(now)).await?;
        let purged = self.cache.purge_expired(now);
        let pruned = self.tombstones.prune(now);

        debug!(removed, purged, pruned, "expired sessions swept");

        Ok(removed)
    }
}

/// Store side of a revoke, detached from the caller so it runs to completion.
struct Revocation {
    token: String,
    tokens: Arc<dyn TokenStore>,
    cache: Arc<SessionCache>,
    tombstones: Arc<Tombstones>,
    store_timeout: Duration,
    tombstone_until: Timestamp,
}

impl Revocation {
    async fn run(self) {
        if is_well_formed(&self.token) {
            let fingerprint = fingerprint(&self.token);
            let deleted = bounded(
                self.store_timeout,
                self.tokens.delete(fingerprint, TokenScope::Authentication),
            )
            .await;

            if let Err(error) = deleted {
                warn!(error = %error, "failed to delete revoked session");

                self.tombstones.insert(fingerprint, self.tombstone_until);
            }
        }

        // A resolve that read the row before the delete may have refilled the entry.
        self.cache.remove(&self.token);
    }
}

/// Run `operation`, failing with the operation's timeout error once `limit` elapses.
async fn bounded<T, E, F>(limit: Duration, operation: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<Elapsed>,
{
    timeout(limit, operation).await?
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an inactive user and send them an activation link.
    async fn register(&self, registration: NewUser) -> Result<User, AuthServiceError>;

    /// Verify a credential and open a session for an activated user.
    async fn login(&self, email: &str, secret: &Secret) -> Result<IssuedSession, AuthServiceError>;

    /// Open a session for an activated user without checking a credential.
    async fn issue_authentication_token(
        &self,
        user: UserId,
    ) -> Result<SessionToken, AuthServiceError>;

    /// Issue a single-use activation token; never cached.
    async fn issue_activation_token(&self, user: UserId)
    -> Result<SessionToken, AuthServiceError>;

    /// Resolve a presented session token to its user.
    ///
    /// Absent, expired, wrong-scope and malformed tokens and store failures all
    /// resolve to `None`.
    async fn resolve(&self, token: &str) -> Option<UserId>;

    /// [`AuthService::resolve`] followed by a profile load; inactive users
    /// resolve to `None`.
    async fn current_user(&self, token: &str) -> Option<User>;

    /// Activate the token's user and spend the token.
    async fn consume_activation_token(&self, token: &str) -> Result<UserId, AuthServiceError>;

    /// Invalidate a session token. Idempotent; never fails.
    async fn revoke(&self, token: &str);

    /// Remove expired tokens from the store and the in-memory tiers.
    async fn sweep_expired(&self) -> Result<u64, AuthServiceError>;
}
