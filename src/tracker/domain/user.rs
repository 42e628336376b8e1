//! Users and the acting identity behind each mutation.

use super::{ParseTrackerValueError, UserId};
use serde::{Deserialize, Serialize};

/// Authorization role of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Administrator; receives system event notifications.
    Admin,
    /// Regular user.
    User,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseTrackerValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            _ => Err(ParseTrackerValueError::new("role", value)),
        }
    }
}

/// Registered user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Optional display name.
    pub name: Option<String>,
    /// Optional e-mail address.
    pub email: Option<String>,
    /// Authorization role.
    pub role: Role,
}

impl User {
    /// Creates a user with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            name: Some(name.into()),
            email: Some(email.into()),
            role,
        }
    }

    /// Returns the identity this user acts under.
    #[must_use]
    pub fn as_actor(&self) -> Actor {
        Actor::resolve(self.id, self.name.as_deref(), self.email.as_deref())
    }
}

/// Authenticated caller of a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Caller identifier.
    pub id: UserId,
    /// Name recorded on audit events.
    pub display_name: String,
}

impl Actor {
    /// Label used when the caller has neither a name nor an e-mail address.
    pub const UNKNOWN_NAME: &'static str = "Unknown";

    /// Creates an actor with an explicit display name.
    #[must_use]
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    /// Resolves the display name from the session's name, then e-mail.
    #[must_use]
    pub fn resolve(id: UserId, name: Option<&str>, email: Option<&str>) -> Self {
        let display_name = name
            .filter(|value| !value.trim().is_empty())
            .or(email)
            .unwrap_or(Self::UNKNOWN_NAME);
        Self::new(id, display_name)
    }
}
