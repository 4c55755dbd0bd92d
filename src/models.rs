use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// --- Identity Schemas ---

/// Profile
///
/// The canonical identity record served by the profile directory.
/// `role` is the RBAC field: anything other than "admin" is a regular editor/reader.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// SessionUser
///
/// The part of a resolved identity that pages may display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

impl From<&Profile> for SessionUser {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
        }
    }
}

/// Readiness
///
/// Whether the identity source has finished its current resolution round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Pending,
    Settled,
}

/// Presence
///
/// Whether a user is signed in. Only meaningful once the session is settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Absent,
    Present(SessionUser),
}

/// Session
///
/// The resolved authentication/authorization snapshot for the current viewer.
/// Owned by the identity source and replaced wholesale on every identity change;
/// guards only ever read it.
///
/// The fields are public so collaborators can publish any combination, including
/// invalid ones (e.g. `is_admin` with an absent user). Guards treat `presence`
/// as authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub readiness: Readiness,
    pub presence: Presence,
    pub is_admin: bool,
}

impl Session {
    /// The session before the identity source has resolved anything.
    pub fn pending() -> Self {
        Self {
            readiness: Readiness::Pending,
            presence: Presence::Absent,
            is_admin: false,
        }
    }

    /// A settled session with nobody signed in.
    pub fn anonymous() -> Self {
        Self {
            readiness: Readiness::Settled,
            presence: Presence::Absent,
            is_admin: false,
        }
    }

    /// A settled session for a signed-in user.
    pub fn signed_in(user: SessionUser, is_admin: bool) -> Self {
        Self {
            readiness: Readiness::Settled,
            presence: Presence::Present(user),
            is_admin,
        }
    }

    pub fn for_profile(profile: &Profile) -> Self {
        Self::signed_in(SessionUser::from(profile), profile.is_admin())
    }

    pub fn is_pending(&self) -> bool {
        self.readiness == Readiness::Pending
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match &self.presence {
            Presence::Present(user) => Some(user),
            Presence::Absent => None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::pending()
    }
}

// --- Access Declarations ---

/// Policy
///
/// The access requirement attached to one layout boundary. Immutable once declared.
/// `require_admin` always implies `require_authentication`; the constructors are the
/// only way to build one so the implication cannot be broken.
///
/// Page authors declare it as `{ "requireAdmin": bool }`, where the default `false`
/// means "require authentication only".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "PolicyDeclaration")]
pub struct Policy {
    require_authentication: bool,
    require_admin: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyDeclaration {
    #[serde(default)]
    require_admin: bool,
}

impl From<PolicyDeclaration> for Policy {
    fn from(declaration: PolicyDeclaration) -> Self {
        Policy::new(declaration.require_admin)
    }
}

impl Policy {
    /// An authenticated policy, additionally requiring an administrator when `require_admin`.
    pub const fn new(require_admin: bool) -> Self {
        Self {
            require_authentication: true,
            require_admin,
        }
    }

    /// No requirement at all; the session is never consulted.
    pub const fn public() -> Self {
        Self {
            require_authentication: false,
            require_admin: false,
        }
    }

    pub const fn authenticated() -> Self {
        Self::new(false)
    }

    pub const fn admin() -> Self {
        Self::new(true)
    }

    pub fn require_authentication(&self) -> bool {
        self.require_authentication
    }

    pub fn require_admin(&self) -> bool {
        self.require_admin
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::authenticated()
    }
}

/// Location
///
/// A navigable path within the front end (e.g. "/" or "/library/welcome").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
