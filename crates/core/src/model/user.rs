use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::UserId;
use crate::model::slug::{MAX_FIELD_LEN, required};

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("name must be at most 255 characters")]
    NameTooLong,

    #[error("email address is not valid")]
    InvalidEmail,

    #[error("password must be at least 8 characters")]
    PasswordTooShort,

    #[error("password confirmation does not match")]
    PasswordMismatch,
}

impl UserError {
    /// Input field the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            UserError::EmptyName | UserError::NameTooLong => "name",
            UserError::InvalidEmail => "email",
            UserError::PasswordTooShort | UserError::PasswordMismatch => "password",
        }
    }
}

/// Lower-cased, trimmed email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// # Errors
    ///
    /// Returns `UserError::InvalidEmail` unless the address has exactly one
    /// `@` with non-empty local and domain parts.
    pub fn new(raw: &str) -> Result<Self, UserError> {
        let email = raw.trim().to_lowercase();
        let mut parts = email.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(UserError::InvalidEmail);
        };
        if local.is_empty()
            || domain.is_empty()
            || email.chars().any(char::is_whitespace)
            || email.len() > MAX_FIELD_LEN
        {
            return Err(UserError::InvalidEmail);
        }
        Ok(Self(email))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A learner or administrator account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    email: Email,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: Email,
        is_admin: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email,
            is_admin,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            is_admin: self.is_admin,
        }
    }
}

/// Submitted registration form.
#[derive(Debug, Clone)]
pub struct RegistrationDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl RegistrationDraft {
    /// Validate the form, returning the normalized name and email.
    ///
    /// # Errors
    ///
    /// Returns the first `UserError` encountered.
    pub fn validate(&self) -> Result<(String, Email), UserError> {
        let name = required(&self.name).ok_or(UserError::EmptyName)?;
        if name.chars().count() > MAX_FIELD_LEN {
            return Err(UserError::NameTooLong);
        }
        let email = Email::new(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UserError::PasswordTooShort);
        }
        if self.password != self.password_confirmation {
            return Err(UserError::PasswordMismatch);
        }
        Ok((name, email))
    }
}

/// Authenticated caller, resolved per request and passed explicitly into
/// every progress operation. The user id here is the only one a caller can
/// act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Identity {
    /// Catalog visibility this caller is entitled to.
    #[must_use]
    pub fn audience(&self) -> Audience {
        if self.is_admin {
            Audience::Admin
        } else {
            Audience::Public
        }
    }
}

/// Which catalog entries a read may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Published modules, and published lessons of published modules.
    Public,
    /// Everything, including drafts.
    Admin,
}

impl Audience {
    #[must_use]
    pub fn sees_unpublished(self) -> bool {
        matches!(self, Audience::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegistrationDraft {
        RegistrationDraft {
            name: "Satoshi".into(),
            email: " Satoshi@Example.COM ".into(),
            password: "hodl-forever".into(),
            password_confirmation: "hodl-forever".into(),
        }
    }

    #[test]
    fn email_is_normalized() {
        let email = Email::new(" Alice@Example.com ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn email_requires_single_at() {
        assert!(Email::new("no-at-sign").is_err());
        assert!(Email::new("a@b@c").is_err());
        assert!(Email::new("@example.com").is_err());
        assert!(Email::new("alice@").is_err());
    }

    #[test]
    fn registration_normalizes_fields() {
        let (name, email) = registration().validate().unwrap();
        assert_eq!(name, "Satoshi");
        assert_eq!(email.as_str(), "satoshi@example.com");
    }

    #[test]
    fn registration_rejects_short_or_mismatched_password() {
        let mut short = registration();
        short.password = "short".into();
        short.password_confirmation = "short".into();
        assert_eq!(short.validate().unwrap_err(), UserError::PasswordTooShort);

        let mut mismatch = registration();
        mismatch.password_confirmation = "something-else".into();
        let err = mismatch.validate().unwrap_err();
        assert_eq!(err, UserError::PasswordMismatch);
        assert_eq!(err.field(), "password");
    }

    #[test]
    fn identity_audience_follows_admin_flag() {
        let learner = Identity {
            user_id: UserId::new(1),
            is_admin: false,
        };
        assert_eq!(learner.audience(), Audience::Public);
        assert!(!learner.audience().sees_unpublished());
    }
}
