//! Authentication facade.
//!
//! Composes identity verification (external), the user directory (external),
//! the rotation engine, and the access-token issuer into the four operations
//! a transport needs: login, refresh, logout, who-am-i. Transport wiring,
//! cookies, and request shaping are out of scope.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::models::{IdentityClaim, TokenPair, User, UserProfile};
use crate::security::AccessTokenIssuer;
use crate::services::SessionManager;

/// External collaborator: validates a third-party identity assertion and
/// produces a verified claim.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, assertion: &str) -> Result<IdentityClaim>;
}

/// External collaborator: resolves subject identifiers to internal user
/// records and caches profile fields.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve `subject` to a user record, creating one on first sight.
    async fn find_or_create(&self, subject: &str) -> Result<User>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    /// Overwrite cached profile fields. `None` leaves the stored value
    /// untouched.
    async fn update_profile(
        &self,
        user_id: Uuid,
        display_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<()>;
}

pub struct AuthService {
    verifier: Arc<dyn IdentityVerifier>,
    directory: Arc<dyn UserDirectory>,
    sessions: SessionManager,
    tokens: AccessTokenIssuer,
}

impl AuthService {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        directory: Arc<dyn UserDirectory>,
        sessions: SessionManager,
        tokens: AccessTokenIssuer,
    ) -> Self {
        Self {
            verifier,
            directory,
            sessions,
            tokens,
        }
    }

    /// Verify the assertion, resolve the user, open a new rotation chain, and
    /// mint the first access token.
    ///
    /// Cached profile fields are refreshed on every login so stale fallback
    /// values do not stick: the display name is always rewritten with the
    /// resolved value, the avatar only when the provider sent a non-blank one.
    pub async fn login(&self, assertion: &str) -> Result<TokenPair> {
        let claim = self.verifier.verify(assertion).await?;
        let user = self.directory.find_or_create(&claim.subject).await?;

        let display_name = claim.resolve_display_name();
        let avatar_url = claim.resolve_avatar_url();
        self.directory
            .update_profile(user.id, Some(&display_name), avatar_url.as_deref())
            .await?;

        let record = self.sessions.start_session(user.id).await?;
        self.issue_pair(user.id, record.token)
    }

    /// Rotate the refresh token and mint a fresh access token for its owner.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let record = self.sessions.rotate(refresh_token).await?;
        self.issue_pair(record.user_id, record.token)
    }

    /// Revoke the token's whole family. Unknown tokens succeed silently.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        self.sessions.end_session(refresh_token).await
    }

    /// Resolve an access token to the stored profile of its subject.
    pub async fn who_am_i(&self, access_token: &str) -> Result<UserProfile> {
        let user_id = self.tokens.verify(access_token)?;
        let user = self
            .directory
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let display_name = match user.display_name.filter(|n| !n.trim().is_empty()) {
            Some(name) => name,
            None => user.subject.clone(),
        };

        Ok(UserProfile {
            subject: user.subject,
            display_name,
            avatar_url: user.avatar_url,
        })
    }

    fn issue_pair(&self, user_id: Uuid, refresh_token: String) -> Result<TokenPair> {
        let access_token = self.tokens.issue(user_id)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.tokens.ttl_seconds(),
        })
    }
}
