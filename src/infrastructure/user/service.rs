//! Account service: registration, login and profile lifecycle

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AdminConfig;
use crate::domain::user::{
    validate_email, validate_gpa, validate_mobile_no, validate_name, validate_password,
    validate_required, validate_username, IdentityField, NewUser, PublicUser, UniqueFieldsQuery,
    User, UserChanges, UserDetails, UserId, UserProfile, UserRepository, UserRole,
    UserValidationError,
};
use crate::domain::{AuthFailure, DomainError};
use crate::infrastructure::observability::{record_account_event, AccountEvent};

use super::password::PasswordHasher;

/// Request for registering a new account
#[derive(Clone, Default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub mobile_no: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub profile: UserProfile,
}

/// Request for logging in
#[derive(Clone, Default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// Partial profile update; absent fields are left untouched
#[derive(Clone, Default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile_no: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub academic_year: Option<String>,
    pub gpa: Option<f64>,
    pub skills: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
    pub achievements: Option<Vec<String>>,
}

/// Acknowledgement returned by operations with no record to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub message: String,
}

/// Identity of the well-known admin account
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub mobile_no: String,
    pub username: String,
    pub password: String,
}

impl From<&AdminConfig> for BootstrapAdmin {
    fn from(config: &AdminConfig) -> Self {
        Self {
            name: config.name.clone(),
            email: config.email.clone(),
            mobile_no: config.mobile_no.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self::from(&AdminConfig::default())
    }
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

fn invalid(error: UserValidationError) -> DomainError {
    DomainError::validation(error.to_string())
}

fn parse_id(id: &str) -> Result<UserId, DomainError> {
    UserId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))
}

/// An id that can never have been issued names no record
fn lookup_id(id: &str) -> Result<UserId, DomainError> {
    UserId::new(id).map_err(|_| DomainError::not_found("User not found"))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn not_found(id: &UserId) -> DomainError {
    DomainError::not_found(format!("User '{}' not found", id))
}

/// Build the duplicate message from the submitted values, e.g.
/// `User already exists with: email a@b.co, mobile number 0123456789`
fn duplicate_error(fields: Vec<IdentityField>, query: &UniqueFieldsQuery) -> DomainError {
    let details: Vec<String> = fields
        .iter()
        .filter_map(|field| {
            let value = match field {
                IdentityField::Email => query.email.as_deref(),
                IdentityField::MobileNo => query.mobile_no.as_deref(),
                IdentityField::Username => query.username.as_deref(),
            };
            value.map(|v| format!("{} {}", field.label(), v))
        })
        .collect();

    let message = format!("User already exists with: {}", details.join(", "));
    DomainError::duplicate_identity(fields, message)
}

/// Turn a repository unique violation into a caller-facing duplicate error
fn resolve_duplicate_key(error: DomainError, query: &UniqueFieldsQuery) -> DomainError {
    match error {
        DomainError::DuplicateKey { field } => {
            record_account_event(AccountEvent::DuplicateRejected);
            duplicate_error(vec![field], query)
        }
        other => other,
    }
}

fn validate_profile(profile: &UserProfile) -> Result<(), DomainError> {
    if let Some(gpa) = profile.gpa {
        validate_gpa(gpa).map_err(invalid)?;
    }

    Ok(())
}

/// Account service over a repository and a password hasher
#[derive(Debug)]
pub struct UserAccountService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
    admin: BootstrapAdmin,
}

impl<R: UserRepository, H: PasswordHasher + 'static> UserAccountService<R, H> {
    /// Create a new account service with the default admin identity
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self {
            repository,
            hasher,
            admin: BootstrapAdmin::default(),
        }
    }

    /// Override the identity used by [`Self::bootstrap_admin`]
    pub fn with_admin(mut self, admin: BootstrapAdmin) -> Self {
        self.admin = admin;
        self
    }

    /// Register a new account
    pub async fn register(&self, request: RegisterRequest) -> Result<PublicUser, DomainError> {
        validate_name(&request.name).map_err(invalid)?;
        validate_email(&request.email).map_err(invalid)?;
        validate_mobile_no(&request.mobile_no).map_err(invalid)?;
        validate_username(&request.username).map_err(invalid)?;
        validate_password(&request.password).map_err(invalid)?;
        validate_required("role", &request.role).map_err(invalid)?;
        let role = UserRole::parse(&request.role).map_err(invalid)?;
        validate_profile(&request.profile)?;

        let query = UniqueFieldsQuery {
            email: Some(normalize_email(&request.email)),
            mobile_no: Some(request.mobile_no.trim().to_string()),
            username: Some(request.username.trim().to_string()),
            role: Some(role.clone()),
        };

        if let Some(existing) = self.repository.find_by_unique_fields(&query).await? {
            let mut fields = existing.colliding_fields(&query);

            // A username is only taken within its own role
            if existing.role() != &role {
                fields.retain(IdentityField::is_global);
            }

            if !fields.is_empty() {
                warn!(
                    fields = ?fields,
                    role = %role,
                    "Registration rejected: identity already in use"
                );
                record_account_event(AccountEvent::DuplicateRejected);
                return Err(duplicate_error(fields, &query));
            }
        }

        let password_hash = self.hash_password(request.password).await?;

        let new_user = NewUser {
            name: request.name.trim().to_string(),
            email: query.email.clone().unwrap_or_default(),
            mobile_no: query.mobile_no.clone().unwrap_or_default(),
            username: query.username.clone().unwrap_or_default(),
            password_hash,
            role,
            profile: request.profile,
        };

        let user = self
            .repository
            .create(new_user)
            .await
            .map_err(|e| resolve_duplicate_key(e, &query))?;

        info!(user_id = %user.id(), role = %user.role(), "User registered");
        record_account_event(AccountEvent::Registered);

        Ok(PublicUser::from(&user))
    }

    /// Authenticate a username/password pair within a role
    ///
    /// Both failure kinds surface as `Authentication`; callers should not
    /// reveal which one occurred.
    pub async fn login(&self, request: LoginRequest) -> Result<PublicUser, DomainError> {
        validate_required("username", &request.username).map_err(invalid)?;
        validate_password(&request.password).map_err(invalid)?;
        validate_required("role", &request.role).map_err(invalid)?;
        let role = UserRole::parse(&request.role).map_err(invalid)?;

        let username = request.username.trim();

        let user = match self.repository.find_by_credentials(username, &role).await? {
            Some(user) => user,
            None => {
                warn!(username, role = %role, "Login failed: {}", AuthFailure::UserNotFound);
                record_account_event(AccountEvent::LoginFailed);
                return Err(DomainError::authentication(AuthFailure::UserNotFound));
            }
        };

        let verified = self
            .verify_password(request.password, user.password_hash().to_string())
            .await?;

        if !verified {
            warn!(
                user_id = %user.id(),
                "Login failed: {}",
                AuthFailure::InvalidCredentials
            );
            record_account_event(AccountEvent::LoginFailed);
            return Err(DomainError::authentication(AuthFailure::InvalidCredentials));
        }

        info!(user_id = %user.id(), "User logged in");
        record_account_event(AccountEvent::LoginSucceeded);

        Ok(PublicUser::from(&user))
    }

    /// Apply a partial profile update
    pub async fn update_profile(
        &self,
        id: &str,
        request: UpdateProfileRequest,
    ) -> Result<PublicUser, DomainError> {
        let user_id = parse_id(id)?;

        let current = self
            .repository
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| not_found(&user_id))?;

        if let Some(role) = &request.role {
            let requested = UserRole::parse(role).map_err(invalid)?;
            if &requested != current.role() {
                return Err(DomainError::validation("Role cannot be changed"));
            }
        }

        let mut changes = UserChanges::default();

        if let Some(name) = &request.name {
            validate_name(name).map_err(invalid)?;
            changes.name = Some(name.trim().to_string());
        }

        if let Some(email) = &request.email {
            validate_email(email).map_err(invalid)?;
            changes.email = Some(normalize_email(email));
        }

        if let Some(mobile_no) = &request.mobile_no {
            validate_mobile_no(mobile_no).map_err(invalid)?;
            changes.mobile_no = Some(mobile_no.trim().to_string());
        }

        if let Some(username) = &request.username {
            validate_username(username).map_err(invalid)?;
            changes.username = Some(username.trim().to_string());
        }

        if let Some(gpa) = request.gpa {
            validate_gpa(gpa).map_err(invalid)?;
            changes.gpa = Some(gpa);
        }

        changes.department = request.department;
        changes.academic_year = request.academic_year;
        changes.skills = request.skills;
        changes.interests = request.interests;
        changes.achievements = request.achievements;

        if let Some(password) = request.password {
            validate_password(&password).map_err(invalid)?;
            changes.password_hash = Some(self.hash_password(password).await?);
        }

        if changes.is_empty() {
            return Ok(PublicUser::from(&current));
        }

        let query = UniqueFieldsQuery {
            email: changes.email.clone(),
            mobile_no: changes.mobile_no.clone(),
            username: changes.username.clone(),
            role: Some(current.role().clone()),
        };

        let user = self
            .repository
            .update(&user_id, changes)
            .await
            .map_err(|e| resolve_duplicate_key(e, &query))?;

        info!(user_id = %user.id(), "User profile updated");
        record_account_event(AccountEvent::ProfileUpdated);

        Ok(PublicUser::from(&user))
    }

    /// Permanently delete an account
    pub async fn delete_profile(&self, id: &str) -> Result<Confirmation, DomainError> {
        let user_id = lookup_id(id)?;

        if self.repository.find_by_id(&user_id).await?.is_none() {
            return Err(not_found(&user_id));
        }

        self.repository.delete(&user_id).await?;

        info!(user_id = %user_id, "User deleted");
        record_account_event(AccountEvent::ProfileDeleted);

        Ok(Confirmation {
            message: "User deleted successfully".to_string(),
        })
    }

    /// List non-admin accounts, optionally restricted to one role
    pub async fn list_users(&self, role: Option<&str>) -> Result<Vec<PublicUser>, DomainError> {
        let role = match role.map(str::trim).filter(|r| !r.is_empty()) {
            Some(role) => Some(UserRole::parse(role).map_err(invalid)?),
            None => None,
        };

        let users = self.repository.list(role).await?;

        Ok(users
            .iter()
            .filter(|u| !u.role().is_admin())
            .map(PublicUser::from)
            .collect())
    }

    /// Look up the profile subset for one account
    pub async fn get_user_details(&self, id: &str) -> Result<UserDetails, DomainError> {
        let user_id = lookup_id(id)?;

        self.repository
            .find_by_id(&user_id)
            .await?
            .map(|user| UserDetails::from(&user))
            .ok_or_else(|| not_found(&user_id))
    }

    /// Create the well-known admin account once
    pub async fn bootstrap_admin(&self) -> Result<PublicUser, DomainError> {
        let admin = &self.admin;

        let query = UniqueFieldsQuery {
            email: Some(normalize_email(&admin.email)),
            mobile_no: Some(admin.mobile_no.trim().to_string()),
            username: Some(admin.username.trim().to_string()),
            role: Some(UserRole::Admin),
        };

        let existing: Option<User> = self
            .repository
            .find_by_credentials(admin.username.trim(), &UserRole::Admin)
            .await?;

        if existing.is_some() {
            info!(username = %admin.username, "Admin already exists, skipping bootstrap");
            return Err(duplicate_error(vec![IdentityField::Username], &query));
        }

        validate_password(&admin.password).map_err(invalid)?;
        let password_hash = self.hash_password(admin.password.clone()).await?;

        let new_admin = NewUser {
            name: admin.name.trim().to_string(),
            email: query.email.clone().unwrap_or_default(),
            mobile_no: query.mobile_no.clone().unwrap_or_default(),
            username: query.username.clone().unwrap_or_default(),
            password_hash,
            role: UserRole::Admin,
            profile: UserProfile::default(),
        };

        let user = self
            .repository
            .create(new_admin)
            .await
            .map_err(|e| resolve_duplicate_key(e, &query))?;

        info!(user_id = %user.id(), "Admin account bootstrapped");
        record_account_event(AccountEvent::AdminBootstrapped);

        Ok(PublicUser::from(&user))
    }

    /// Verify the backing store answers
    pub async fn check_store(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }

    async fn hash_password(&self, password: String) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, digest: String) -> Result<bool, DomainError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| DomainError::internal(format!("Password verification task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashingConfig;
    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::user::password::Argon2Hasher;
    use crate::infrastructure::user::repository::InMemoryUserRepository;

    fn cheap_hasher() -> Arc<Argon2Hasher> {
        Arc::new(
            Argon2Hasher::from_config(&HashingConfig {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
            })
            .unwrap(),
        )
    }

    fn create_service() -> UserAccountService<InMemoryUserRepository, Argon2Hasher> {
        UserAccountService::new(Arc::new(InMemoryUserRepository::new()), cheap_hasher())
    }

    fn mock_service(repo: MockUserRepository) -> UserAccountService<MockUserRepository, Argon2Hasher> {
        UserAccountService::new(Arc::new(repo), cheap_hasher())
    }

    fn register_request(username: &str, email: &str, mobile_no: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Alice".to_string(),
            email: email.to_string(),
            mobile_no: mobile_no.to_string(),
            username: username.to_string(),
            password: "correct-pw".to_string(),
            role: role.to_string(),
            profile: UserProfile::default(),
        }
    }

    fn alice() -> RegisterRequest {
        register_request("alice", "alice@example.com", "9876543210", "user")
    }

    fn login_request(username: &str, password: &str, role: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            role: role.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_returns_public_user() {
        let service = create_service();

        let user = service.register(alice()).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, UserRole::User);

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[tokio::test]
    async fn test_register_normalizes_email() {
        let service = create_service();

        let mut request = alice();
        request.email = "  Alice@Example.COM ".to_string();

        let user = service.register(request).await.unwrap();
        assert_eq!(user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_register_missing_field() {
        let service = create_service();

        let mut request = alice();
        request.mobile_no = String::new();

        let result = service.register(request).await;
        match result {
            Err(DomainError::Validation { message }) => assert_eq!(message, "mobileNo is required"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_fields() {
        let service = create_service();

        let mut bad_email = alice();
        bad_email.email = "not-an-email".to_string();
        assert!(matches!(
            service.register(bad_email).await,
            Err(DomainError::Validation { .. })
        ));

        let mut bad_gpa = alice();
        bad_gpa.profile.gpa = Some(12.0);
        assert!(matches!(
            service.register(bad_gpa).await,
            Err(DomainError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_register_same_payload_twice_is_duplicate() {
        let service = create_service();
        service.register(alice()).await.unwrap();

        for _ in 0..2 {
            match service.register(alice()).await {
                Err(DomainError::DuplicateIdentity { fields, message }) => {
                    assert_eq!(
                        fields,
                        vec![
                            IdentityField::Email,
                            IdentityField::MobileNo,
                            IdentityField::Username
                        ]
                    );
                    assert_eq!(
                        message,
                        "User already exists with: email alice@example.com, mobile number 9876543210, username alice"
                    );
                }
                other => panic!("expected duplicate error, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_register_same_username_other_role_allowed() {
        let service = create_service();
        service.register(alice()).await.unwrap();

        let student = service
            .register(register_request(
                "alice",
                "alice.student@example.com",
                "1112223334",
                "student",
            ))
            .await
            .unwrap();

        assert_eq!(student.username, "alice");
        assert_eq!(student.role.as_str(), "student");
    }

    #[tokio::test]
    async fn test_register_other_role_with_taken_email_names_only_email() {
        let service = create_service();
        service.register(alice()).await.unwrap();

        let result = service
            .register(register_request(
                "alice",
                "alice@example.com",
                "1112223334",
                "student",
            ))
            .await;

        match result {
            Err(DomainError::DuplicateIdentity { fields, message }) => {
                assert_eq!(fields, vec![IdentityField::Email]);
                assert_eq!(message, "User already exists with: email alice@example.com");
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_other_role_with_taken_mobile_names_only_mobile() {
        let service = create_service();
        service.register(alice()).await.unwrap();

        let result = service
            .register(register_request(
                "alice",
                "alice.student@example.com",
                "9876543210",
                "student",
            ))
            .await;

        match result {
            Err(DomainError::DuplicateIdentity { fields, message }) => {
                assert_eq!(fields, vec![IdentityField::MobileNo]);
                assert_eq!(message, "User already exists with: mobile number 9876543210");
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_lost_race_maps_duplicate_key() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_unique_fields().returning(|_| Ok(None));
        repo.expect_create()
            .returning(|_| Err(DomainError::duplicate_key(IdentityField::MobileNo)));

        let service = mock_service(repo);

        match service.register(alice()).await {
            Err(DomainError::DuplicateIdentity { fields, message }) => {
                assert_eq!(fields, vec![IdentityField::MobileNo]);
                assert_eq!(message, "User already exists with: mobile number 9876543210");
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_storage_failure_propagates() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_unique_fields()
            .returning(|_| Err(DomainError::storage("connection refused")));
        repo.expect_create().never();

        let service = mock_service(repo);

        let result = service.register(alice()).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_login_success_and_wrong_password() {
        let service = create_service();
        let registered = service.register(alice()).await.unwrap();

        let user = service
            .login(login_request("alice", "correct-pw", "user"))
            .await
            .unwrap();
        assert_eq!(user.id, registered.id);
        assert_eq!(user.email, "alice@example.com");

        let result = service.login(login_request("alice", "wrong-pw", "user")).await;
        assert!(matches!(
            result,
            Err(DomainError::Authentication {
                kind: AuthFailure::InvalidCredentials
            })
        ));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let service = create_service();
        service.register(alice()).await.unwrap();

        let unknown = service.login(login_request("bob", "correct-pw", "user")).await;
        assert!(matches!(
            unknown,
            Err(DomainError::Authentication {
                kind: AuthFailure::UserNotFound
            })
        ));

        let wrong_role = service
            .login(login_request("alice", "correct-pw", "admin"))
            .await;
        assert!(matches!(
            wrong_role,
            Err(DomainError::Authentication {
                kind: AuthFailure::UserNotFound
            })
        ));
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let service = create_service();

        let result = service.login(login_request("alice", "", "user")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        let result = service.login(login_request("alice", "pw", " ")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_update_password_then_login() {
        let service = create_service();
        let user = service.register(alice()).await.unwrap();

        service
            .update_profile(
                user.id.as_str(),
                UpdateProfileRequest {
                    password: Some("new".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(service
            .login(login_request("alice", "new", "user"))
            .await
            .is_ok());
        assert!(service
            .login(login_request("alice", "correct-pw", "user"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_update_profile_fields() {
        let service = create_service();
        let user = service.register(alice()).await.unwrap();

        let updated = service
            .update_profile(
                user.id.as_str(),
                UpdateProfileRequest {
                    name: Some("Alice Smith".to_string()),
                    department: Some("Computer Science".to_string()),
                    gpa: Some(9.2),
                    skills: Some(vec!["rust".to_string(), "sql".to_string()]),
                    role: Some("user".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Alice Smith");
        assert_eq!(updated.profile.department.as_deref(), Some("Computer Science"));
        assert_eq!(updated.profile.gpa, Some(9.2));
        assert_eq!(updated.profile.skills.len(), 2);
        assert_eq!(updated.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_update_profile_rejects_role_change() {
        let service = create_service();
        let user = service.register(alice()).await.unwrap();

        let result = service
            .update_profile(
                user.id.as_str(),
                UpdateProfileRequest {
                    role: Some("admin".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_update_profile_empty_changes_returns_current() {
        let service = create_service();
        let user = service.register(alice()).await.unwrap();

        let same = service
            .update_profile(user.id.as_str(), UpdateProfileRequest::default())
            .await
            .unwrap();

        assert_eq!(same, user);
    }

    #[tokio::test]
    async fn test_update_profile_missing_user() {
        let service = create_service();

        let result = service
            .update_profile(
                "does-not-exist",
                UpdateProfileRequest {
                    name: Some("Ghost".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_profile_taken_email_is_duplicate() {
        let service = create_service();
        service.register(alice()).await.unwrap();
        let bob = service
            .register(register_request("bob", "bob@example.com", "1231231234", "user"))
            .await
            .unwrap();

        let result = service
            .update_profile(
                bob.id.as_str(),
                UpdateProfileRequest {
                    email: Some("alice@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;

        match result {
            Err(DomainError::DuplicateIdentity { fields, .. }) => {
                assert_eq!(fields, vec![IdentityField::Email]);
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_then_details_and_second_delete_not_found() {
        let service = create_service();
        let user = service.register(alice()).await.unwrap();

        let confirmation = service.delete_profile(user.id.as_str()).await.unwrap();
        assert_eq!(confirmation.message, "User deleted successfully");

        assert!(matches!(
            service.get_user_details(user.id.as_str()).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete_profile(user.id.as_str()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_lookups_with_unissuable_id_are_not_found() {
        let service = create_service();
        let oversized = "x".repeat(65);

        assert!(matches!(
            service.get_user_details(&oversized).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete_profile(&oversized).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_check_store_reports_repository_failure() {
        let mut repo = MockUserRepository::new();
        repo.expect_ping()
            .returning(|| Err(DomainError::storage("connection refused")));

        let service = mock_service(repo);

        assert!(matches!(
            service.check_store().await,
            Err(DomainError::Storage { .. })
        ));
        assert!(create_service().check_store().await.is_ok());
    }

    #[tokio::test]
    async fn test_get_user_details() {
        let service = create_service();
        let user = service.register(alice()).await.unwrap();

        let details = service.get_user_details(user.id.as_str()).await.unwrap();
        assert_eq!(details.username, "alice");
        assert_eq!(details.mobile_no, "9876543210");
    }

    #[tokio::test]
    async fn test_list_users_never_includes_admin() {
        let service = create_service();
        service.register(alice()).await.unwrap();
        service
            .register(register_request("carol", "carol@example.com", "5556667778", "student"))
            .await
            .unwrap();
        service.bootstrap_admin().await.unwrap();

        let all = service.list_users(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|u| !u.role.is_admin()));

        let students = service.list_users(Some("student")).await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].username, "carol");

        assert!(service.list_users(Some("admin")).await.unwrap().is_empty());
        assert_eq!(service.list_users(Some("")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_users_filters_admin_from_repository() {
        let mut repo = MockUserRepository::new();
        repo.expect_list().returning(|_| {
            let admin = NewUser {
                name: "Admin".to_string(),
                email: "admin@gmail.com".to_string(),
                mobile_no: "1234568753".to_string(),
                username: "admin".to_string(),
                password_hash: "digest".to_string(),
                role: UserRole::Admin,
                profile: UserProfile::default(),
            };
            Ok(vec![User::new(UserId::generate(), admin)])
        });

        let service = mock_service(repo);
        assert!(service.list_users(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bootstrap_admin_twice_yields_one_admin() {
        let service = create_service();

        let admin = service.bootstrap_admin().await.unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.email, "admin@gmail.com");
        assert!(admin.role.is_admin());

        let second = service.bootstrap_admin().await;
        assert!(matches!(second, Err(DomainError::DuplicateIdentity { .. })));

        let logged_in = service
            .login(login_request("admin", "Admin@123", "admin"))
            .await
            .unwrap();
        assert_eq!(logged_in.id, admin.id);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_concurrent_calls() {
        let service = Arc::new(create_service());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.bootstrap_admin().await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(DomainError::DuplicateIdentity { .. }) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_custom_identity() {
        let service = create_service().with_admin(BootstrapAdmin {
            name: "Root".to_string(),
            email: "root@example.com".to_string(),
            mobile_no: "9998887776".to_string(),
            username: "root".to_string(),
            password: "s3cret!".to_string(),
        });

        let admin = service.bootstrap_admin().await.unwrap();
        assert_eq!(admin.username, "root");

        assert!(service
            .login(login_request("root", "s3cret!", "admin"))
            .await
            .is_ok());
    }
}
