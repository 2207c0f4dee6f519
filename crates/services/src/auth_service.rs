use std::sync::Arc;

use academy_core::model::{Email, Identity, RegistrationDraft, User};
use storage::repository::{AccessTokenRepository, NewUserRecord, StorageError, UserRepository};
use tracing::{info, warn};

use crate::Clock;
use crate::credentials::{
    generate_token, hash_password, token_digest, verify_password, verify_unknown_account,
};
use crate::error::AuthServiceError;

const TOKEN_NAME: &str = "auth_token";

/// A user together with a freshly issued plaintext bearer token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub user: User,
    pub token: String,
}

/// Accounts, logins and bearer-token resolution.
#[derive(Clone)]
pub struct AuthService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn AccessTokenRepository>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        clock: Clock,
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn AccessTokenRepository>,
    ) -> Self {
        Self {
            clock,
            users,
            tokens,
        }
    }

    /// Create a learner account and log it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::User` for validation failures.
    /// Returns `AuthServiceError::EmailTaken` if the email is registered.
    /// Returns `AuthServiceError::Storage` if persistence fails.
    pub async fn register(&self, draft: RegistrationDraft) -> Result<IssuedToken, AuthServiceError> {
        let user = self.create_user(&draft, false).await?;
        let token = self.issue_token(&user).await?;
        Ok(IssuedToken { user, token })
    }

    /// Create an administrator account without issuing a token.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::register`].
    pub async fn create_admin(&self, draft: RegistrationDraft) -> Result<User, AuthServiceError> {
        self.create_user(&draft, true).await
    }

    /// Check credentials and issue a new token.
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::InvalidCredentials` for an unknown email or
    /// a wrong password.
    /// Returns `AuthServiceError::Storage` if repository access fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthServiceError> {
        let email = Email::new(email).map_err(|_| AuthServiceError::InvalidCredentials)?;
        let Some(stored) = self.users.find_credentials(&email).await? else {
            verify_unknown_account(password);
            warn!("login rejected: unknown email");
            return Err(AuthServiceError::InvalidCredentials);
        };
        if !verify_password(password, &stored.password_hash) {
            warn!(user_id = stored.user.id().value(), "login rejected: wrong password");
            return Err(AuthServiceError::InvalidCredentials);
        }
        let token = self.issue_token(&stored.user).await?;
        info!(user_id = stored.user.id().value(), "user logged in");
        Ok(IssuedToken {
            user: stored.user,
            token,
        })
    }

    /// Revoke the presented token. Other tokens of the user stay valid.
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::Unauthenticated` if the token is unknown.
    /// Returns `AuthServiceError::Storage` if repository access fails.
    pub async fn logout(&self, token: &str) -> Result<(), AuthServiceError> {
        if self.tokens.revoke_token(&token_digest(token)).await? {
            Ok(())
        } else {
            Err(AuthServiceError::Unauthenticated)
        }
    }

    /// Resolve a plaintext bearer token to the caller's identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::Unauthenticated` for empty, unknown or
    /// revoked tokens.
    /// Returns `AuthServiceError::Storage` if repository access fails.
    pub async fn authenticate(&self, token: &str) -> Result<Identity, AuthServiceError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthServiceError::Unauthenticated);
        }
        match self.tokens.find_user_by_token(&token_digest(token)).await? {
            Some(user) => Ok(user.identity()),
            None => {
                warn!("bearer token rejected");
                Err(AuthServiceError::Unauthenticated)
            }
        }
    }

    /// Profile of the authenticated caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::Unauthenticated` if the account no longer
    /// exists.
    /// Returns `AuthServiceError::Storage` if repository access fails.
    pub async fn current_user(&self, identity: Identity) -> Result<User, AuthServiceError> {
        self.users
            .get_user(identity.user_id)
            .await?
            .ok_or(AuthServiceError::Unauthenticated)
    }

    async fn create_user(
        &self,
        draft: &RegistrationDraft,
        is_admin: bool,
    ) -> Result<User, AuthServiceError> {
        let (name, email) = draft.validate()?;
        let password_hash =
            hash_password(&draft.password).map_err(AuthServiceError::PasswordHash)?;
        let user_id = self
            .users
            .insert_user(NewUserRecord {
                name,
                email,
                password_hash,
                is_admin,
                created_at: self.clock.now(),
            })
            .await
            .map_err(|err| match err {
                StorageError::Conflict => AuthServiceError::EmailTaken,
                other => other.into(),
            })?;
        info!(user_id = user_id.value(), is_admin, "user registered");
        self.users
            .get_user(user_id)
            .await?
            .ok_or(AuthServiceError::Storage(StorageError::NotFound))
    }

    async fn issue_token(&self, user: &User) -> Result<String, AuthServiceError> {
        let token = generate_token();
        self.tokens
            .insert_token(user.id(), &token_digest(&token), TOKEN_NAME, self.clock.now())
            .await?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use academy_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn service() -> AuthService {
        let repo = Arc::new(InMemoryRepository::new());
        AuthService::new(Clock::fixed(fixed_now()), repo.clone(), repo)
    }

    fn draft(email: &str) -> RegistrationDraft {
        RegistrationDraft {
            name: "Ada".into(),
            email: email.into(),
            password: "password123".into(),
            password_confirmation: "password123".into(),
        }
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let service = service();
        let issued = service.register(draft("ada@example.com")).await.unwrap();
        assert!(!issued.user.is_admin());

        let identity = service.authenticate(&issued.token).await.unwrap();
        assert_eq!(identity.user_id, issued.user.id());
        assert!(!identity.is_admin);
    }

    #[tokio::test]
    async fn duplicate_email_is_taken_case_insensitively() {
        let service = service();
        service.register(draft("ada@example.com")).await.unwrap();
        let err = service.register(draft("ADA@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthServiceError::EmailTaken));
        assert_eq!(err.field(), Some("email"));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email_alike() {
        let service = service();
        service.register(draft("ada@example.com")).await.unwrap();

        let wrong = service
            .login("ada@example.com", "password124")
            .await
            .unwrap_err();
        let unknown = service
            .login("bob@example.com", "password123")
            .await
            .unwrap_err();
        assert_eq!(wrong.to_string(), "The provided credentials are incorrect.");
        assert_eq!(wrong.to_string(), unknown.to_string());

        let ok = service.login(" Ada@Example.com ", "password123").await.unwrap();
        assert_eq!(ok.user.email().as_str(), "ada@example.com");
    }

    #[tokio::test]
    async fn logout_revokes_only_that_token() {
        let service = service();
        let first = service.register(draft("ada@example.com")).await.unwrap();
        let second = service.login("ada@example.com", "password123").await.unwrap();

        service.logout(&first.token).await.unwrap();
        assert!(matches!(
            service.authenticate(&first.token).await.unwrap_err(),
            AuthServiceError::Unauthenticated
        ));
        service.authenticate(&second.token).await.unwrap();
    }

    #[tokio::test]
    async fn admin_accounts_carry_admin_identity() {
        let service = service();
        service.create_admin(draft("admin@example.com")).await.unwrap();
        let issued = service.login("admin@example.com", "password123").await.unwrap();
        let identity = service.authenticate(&issued.token).await.unwrap();
        assert!(identity.is_admin);
        let user = service.current_user(identity).await.unwrap();
        assert_eq!(user.name(), "Ada");
    }

    #[tokio::test]
    async fn stored_password_is_an_argon2_phc_string() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = AuthService::new(Clock::fixed(fixed_now()), repo.clone(), repo.clone());
        service.register(draft("ada@example.com")).await.unwrap();

        let email = Email::new("ada@example.com").unwrap();
        let stored = repo.find_credentials(&email).await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$argon2id$"));
        assert!(!stored.password_hash.contains("password123"));
        assert!(verify_password("password123", &stored.password_hash));
    }

    #[tokio::test]
    async fn blank_token_is_rejected_without_lookup() {
        let err = service().authenticate("  ").await.unwrap_err();
        assert!(matches!(err, AuthServiceError::Unauthenticated));
    }
}
