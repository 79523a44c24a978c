//! User entity and related types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_role, validate_user_id, UserValidationError};

/// Opaque user identifier assigned by the repository on creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a UserId from an existing value after validation
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account role
///
/// `admin` and `user` are built in; any other lowercase category name
/// (for example `student` or `mentor`) is accepted as an applicant role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UserRole {
    Admin,
    User,
    Applicant(String),
}

impl UserRole {
    /// Parse a role name, normalising surrounding whitespace and case
    pub fn parse(value: &str) -> Result<Self, UserValidationError> {
        let normalized = value.trim().to_ascii_lowercase();
        validate_role(&normalized)?;

        Ok(match normalized.as_str() {
            "admin" => Self::Admin,
            "user" => Self::User,
            _ => Self::Applicant(normalized),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Applicant(name) => name,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl TryFrom<String> for UserRole {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity fields that must stay unique across accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentityField {
    Email,
    MobileNo,
    /// Unique together with the role
    Username,
}

impl IdentityField {
    /// Human-readable label used in duplicate messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::MobileNo => "mobile number",
            Self::Username => "username",
        }
    }

    /// True for fields that are unique regardless of role
    pub fn is_global(&self) -> bool {
        !matches!(self, Self::Username)
    }
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Optional academic profile attached to an account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

/// Account data for a record that has not been stored yet
#[derive(Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub mobile_no: String,
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    pub profile: UserProfile,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("mobile_no", &self.mobile_no)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .field("profile", &self.profile)
            .finish()
    }
}

/// Partial set of field updates for an existing account
///
/// `password_hash` is always a digest; plaintext never reaches a repository.
#[derive(Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile_no: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub department: Option<String>,
    pub academic_year: Option<String>,
    pub gpa: Option<f64>,
    pub skills: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
    pub achievements: Option<Vec<String>>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Debug for UserChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserChanges")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("mobile_no", &self.mobile_no)
            .field("username", &self.username)
            .field(
                "password_hash",
                &self.password_hash.as_ref().map(|_| "[REDACTED]"),
            )
            .field("department", &self.department)
            .field("academic_year", &self.academic_year)
            .field("gpa", &self.gpa)
            .field("skills", &self.skills)
            .field("interests", &self.interests)
            .field("achievements", &self.achievements)
            .finish()
    }
}

/// Identity fields to probe before creating an account
///
/// A record matches when ANY supplied field matches. `username` is
/// compared together with `role` when both are given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniqueFieldsQuery {
    pub email: Option<String>,
    pub mobile_no: Option<String>,
    pub username: Option<String>,
    pub role: Option<UserRole>,
}

impl UniqueFieldsQuery {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.mobile_no.is_none() && self.username.is_none()
    }

    /// Check whether a stored user matches this query
    pub fn matches(&self, user: &User) -> bool {
        let email = self.email.as_deref() == Some(user.email());
        let mobile_no = self.mobile_no.as_deref() == Some(user.mobile_no());
        let username = match (&self.username, &self.role) {
            (Some(username), Some(role)) => username == user.username() && role == user.role(),
            (Some(username), None) => username == user.username(),
            (None, _) => false,
        };

        email || mobile_no || username
    }
}

/// User entity
///
/// Deliberately not `Serialize`: the only way out to a caller is through
/// [`PublicUser`] or [`UserDetails`].
#[derive(Clone, PartialEq)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    mobile_no: String,
    username: String,
    password_hash: String,
    role: UserRole,
    profile: UserProfile,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user from new account data, stamped with the current time
    pub fn new(id: UserId, data: NewUser) -> Self {
        let now = Utc::now();
        Self::restore(id, data, now, now)
    }

    /// Rebuild a user from stored state
    pub fn restore(
        id: UserId,
        data: NewUser,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: data.name,
            email: data.email,
            mobile_no: data.mobile_no,
            username: data.username,
            password_hash: data.password_hash,
            role: data.role,
            profile: data.profile,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn mobile_no(&self) -> &str {
        &self.mobile_no
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn role(&self) -> &UserRole {
        &self.role
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Identity fields this user shares with the query, in report order
    pub fn colliding_fields(&self, query: &UniqueFieldsQuery) -> Vec<IdentityField> {
        let mut fields = Vec::new();

        if query.email.as_deref() == Some(self.email()) {
            fields.push(IdentityField::Email);
        }

        if query.mobile_no.as_deref() == Some(self.mobile_no()) {
            fields.push(IdentityField::MobileNo);
        }

        if query.username.as_deref() == Some(self.username()) {
            fields.push(IdentityField::Username);
        }

        fields
    }

    // Mutators

    /// Apply a set of changes; role, id and creation time never change
    pub fn apply(&mut self, changes: UserChanges) {
        if changes.is_empty() {
            return;
        }

        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(mobile_no) = changes.mobile_no {
            self.mobile_no = mobile_no;
        }
        if let Some(username) = changes.username {
            self.username = username;
        }
        if let Some(password_hash) = changes.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(department) = changes.department {
            self.profile.department = Some(department);
        }
        if let Some(academic_year) = changes.academic_year {
            self.profile.academic_year = Some(academic_year);
        }
        if let Some(gpa) = changes.gpa {
            self.profile.gpa = Some(gpa);
        }
        if let Some(skills) = changes.skills {
            self.profile.skills = skills;
        }
        if let Some(interests) = changes.interests {
            self.profile.interests = interests;
        }
        if let Some(achievements) = changes.achievements {
            self.profile.achievements = achievements;
        }

        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("mobile_no", &self.mobile_no)
            .field("role", &self.role)
            .field("password_hash", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Password-free view of a user, the only shape returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub mobile_no: String,
    pub username: String,
    pub role: UserRole,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            mobile_no: user.mobile_no.clone(),
            username: user.username.clone(),
            role: user.role.clone(),
            profile: user.profile.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Profile subset returned by the details lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub mobile_no: String,
    pub username: String,
    pub role: UserRole,
    #[serde(flatten)]
    pub profile: UserProfile,
}

impl From<&User> for UserDetails {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            mobile_no: user.mobile_no.clone(),
            username: user.username.clone(),
            role: user.role.clone(),
            profile: user.profile.clone(),
        }
    }
}
