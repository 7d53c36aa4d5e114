//! Session data model
//!
//! A Session is the single persisted record behind the client: bearer
//! token, user profile, and the role the user is currently acting as.

use serde::{Deserialize, Serialize};

/// A permission scope an account may hold one or more of.
///
/// The server sends roles as plain strings. The four roles the UI knows
/// about get variants; anything else is carried verbatim so new roles
/// degrade gracefully instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Student,
    Professor,
    Revisor,
    Admin,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Student => "Student",
            Role::Professor => "Professor",
            Role::Revisor => "Revisor",
            Role::Admin => "Admin",
            Role::Other(name) => name,
        }
    }

    /// Human-readable label for menus and the role-selection dialog.
    pub fn display_name(&self) -> &str {
        match self {
            Role::Student => "Student",
            Role::Professor => "Professor",
            Role::Revisor => "Reviewer",
            Role::Admin => "Administrator",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Student" => Role::Student,
            "Professor" => Role::Professor,
            "Revisor" => Role::Revisor,
            "Admin" => Role::Admin,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile data returned by the authentication endpoint. Unknown fields
/// from the server are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: String,
    /// Roles available to this account
    #[serde(default)]
    pub groups: Vec<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer credential; carries an `exp` claim
    pub token: String,
    pub user: UserProfile,
    /// The role the user is acting as; absent until chosen
    #[serde(default)]
    pub role: Option<Role>,
}

impl Session {
    /// A session counts as authenticated only once both the token and an
    /// active role are present. Token-without-role is the intermediate
    /// state while a multi-role account picks a profile.
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty() && self.role.is_some()
    }

    /// Whether the account can act as the given role.
    pub fn permits(&self, role: &Role) -> bool {
        self.user.groups.contains(role)
    }

    /// Multi-role accounts get a "switch profile" entry in the header menu.
    pub fn is_multi_role(&self) -> bool {
        self.user.groups.len() > 1
    }
}
