use std::sync::Arc;

use shared::{LoginRequest, RegisterRequest, TokenPair, User};
use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::services::ledger::{hash_token, LedgerError, RefreshTokenLedger};
use crate::services::password;
use crate::services::tokens::{new_jti, TokenError, TokenIssuer};
use crate::services::users::{UserError, UserRepository};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation Error")]
    Validation(Vec<String>),
    #[error("Email already exists")]
    UserAlreadyExists,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Password hashing error")]
    HashingError,
    #[error("Failed to generate token")]
    TokenGeneration(#[source] TokenError),
}

impl From<UserError> for AuthError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::EmailTaken => AuthError::UserAlreadyExists,
            UserError::DatabaseError(e) => AuthError::DatabaseError(e),
        }
    }
}

impl From<LedgerError> for AuthError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::NotFound => AuthError::InvalidRefreshToken,
            LedgerError::DatabaseError(e) => AuthError::DatabaseError(e),
        }
    }
}

/// Tokens and ledger entry produced by one successful login, registration
/// or rotation.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user_id: Uuid,
    pub jti: String,
    pub tokens: TokenPair,
}

/// Registration, login, refresh rotation and logout.
///
/// Each session is a jti shared by one access and one refresh token, plus a
/// ledger row for the refresh token. All session state lives in the
/// database, so concurrent requests need no in-process locking.
#[derive(Clone)]
pub struct SessionAuthority {
    users: UserRepository,
    ledger: RefreshTokenLedger,
    tokens: Arc<TokenIssuer>,
    clock: Arc<dyn Clock>,
}

impl SessionAuthority {
    pub fn new(
        users: UserRepository,
        ledger: RefreshTokenLedger,
        tokens: Arc<TokenIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            ledger,
            tokens,
            clock,
        }
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(User, IssuedSession), AuthError> {
        let errors = shared::validate_register(request);
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        if self.users.email_exists(&request.email).await? {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_off_thread(request.password.clone()).await?;
        let row = self
            .users
            .create(request.name.trim(), &request.email, &password_hash)
            .await?;
        let user = row.to_shared()?;

        let session = self.start_session(&user.id, &user.email).await?;
        log::info!("Registered user {} (session {})", user.id, session.jti);

        Ok((user, session))
    }

    /// Every login opens an independent session; earlier ones stay valid.
    pub async fn login(&self, request: &LoginRequest) -> Result<IssuedSession, AuthError> {
        let errors = shared::validate_login(request);
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_off_thread(user.password_hash.clone(), request.password.clone()).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let user = user.to_shared()?;
        let session = self.start_session(&user.id, &user.email).await?;
        log::info!("User {} logged in (session {})", user.id, session.jti);

        Ok(session)
    }

    /// Exchange a refresh token for a new pair and retire the old one.
    ///
    /// The old jti is revoked before anything new is issued. If issuance then
    /// fails the caller is logged out rather than left holding a live token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedSession, AuthError> {
        let claims = self.tokens.validate_refresh(refresh_token).map_err(|e| {
            log::debug!("Rejected refresh token: {}", e);
            AuthError::InvalidRefreshToken
        })?;

        let stored = match self
            .ledger
            .find_active_by_jti(&claims.jti, self.clock.now())
            .await
        {
            Ok(stored) => stored,
            Err(LedgerError::NotFound) => {
                log::warn!(
                    "Refresh token reuse or revoked session: user {} jti {}",
                    claims.user_id,
                    claims.jti
                );
                return Err(AuthError::InvalidRefreshToken);
            }
            Err(LedgerError::DatabaseError(e)) => return Err(e.into()),
        };

        if stored.token_hash != hash_token(refresh_token) || stored.user_id != claims.user_id.to_string() {
            log::warn!(
                "Refresh token does not match ledger entry: user {} jti {}",
                claims.user_id,
                claims.jti
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        if self.ledger.revoke_by_jti(&claims.jti).await? == 0 {
            log::warn!(
                "Concurrent refresh lost the rotation race: user {} jti {}",
                claims.user_id,
                claims.jti
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        let user = self
            .users
            .find_by_id(&claims.user_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?
            .to_shared()?;

        let session = self.start_session(&user.id, &user.email).await?;
        log::info!(
            "Rotated session {} -> {} for user {}",
            claims.jti,
            session.jti,
            user.id
        );

        Ok(session)
    }

    /// Revoke the refresh chain named by `jti`. Returns how many ledger rows
    /// changed; zero means the session was already gone.
    pub async fn logout(&self, jti: &str) -> Result<u64, AuthError> {
        let revoked = self.ledger.revoke_by_jti(jti).await?;
        log::info!("Logout for session {} revoked {} token(s)", jti, revoked);
        Ok(revoked)
    }

    async fn start_session(&self, user_id: &Uuid, email: &str) -> Result<IssuedSession, AuthError> {
        let jti = new_jti();

        let access = self
            .tokens
            .issue_access(user_id, email, &jti)
            .map_err(AuthError::TokenGeneration)?;
        let refresh = self
            .tokens
            .issue_refresh(user_id, email, &jti)
            .map_err(AuthError::TokenGeneration)?;

        self.ledger
            .record(user_id, &jti, &refresh.token, refresh.expires_at)
            .await?;

        Ok(IssuedSession {
            user_id: *user_id,
            jti,
            tokens: TokenPair {
                token: access.token,
                refresh_token: refresh.token,
            },
        })
    }
}

async fn hash_off_thread(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|_| AuthError::HashingError)?
        .map_err(|_| AuthError::HashingError)
}

async fn verify_off_thread(hash: String, password: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || password::verify_password(&hash, &password))
        .await
        .map_err(|_| AuthError::HashingError)
}
