//! Caller identity as asserted by the external identity provider.

use serde::{Deserialize, Serialize};

/// Opaque user identifier mirrored from the identity provider's subject.
///
/// ## Invariants
/// - Non-empty and free of surrounding whitespace.
///
/// # Examples
/// ```
/// use survey_backend::domain::UserId;
///
/// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
/// assert_eq!(id.as_str(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// assert!(UserId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserIdValidationError {
    /// The identifier was blank.
    #[error("user id must not be empty")]
    Empty,
    /// The identifier had leading or trailing whitespace.
    #[error("user id must not contain surrounding whitespace")]
    SurroundingWhitespace,
    /// The identifier exceeded the stored column width.
    #[error("user id must be at most {max} characters")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

impl UserId {
    /// Maximum accepted identifier length.
    pub const MAX_LEN: usize = 255;

    /// Validate and wrap an identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserIdValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserIdValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(UserIdValidationError::SurroundingWhitespace);
        }
        if raw.chars().count() > Self::MAX_LEN {
            return Err(UserIdValidationError::TooLong { max: Self::MAX_LEN });
        }
        Ok(Self(raw))
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Verified caller: the token subject and its email claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    id: UserId,
    email: String,
}

impl CallerIdentity {
    /// Bundle an identifier with its email address.
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }

    /// Identity provider subject.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Email claim from the token.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Display name used when a profile is created implicitly.
    ///
    /// # Examples
    /// ```
    /// use survey_backend::domain::{CallerIdentity, UserId};
    ///
    /// let caller = CallerIdentity::new(UserId::new("u1").expect("id"), "ana.ruiz@obra.mx");
    /// assert_eq!(caller.default_display_name(), "ana.ruiz");
    /// ```
    pub fn default_display_name(&self) -> &str {
        self.email
            .split_once('@')
            .map(|(local, _)| local)
            .filter(|local| !local.trim().is_empty())
            .unwrap_or(self.email.as_str())
    }
}
