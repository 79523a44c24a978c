//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::domain::user::{
    IdentityField, NewUser, UniqueFieldsQuery, User, UserChanges, UserId, UserProfile,
    UserRepository, UserRole,
};
use crate::domain::DomainError;

const USER_COLUMNS: &str = "id, name, email, mobile_no, username, password_hash, role, \
     department, academic_year, gpa, skills, interests, achievements, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
///
/// Uniqueness is enforced by the `users_email_key`, `users_mobile_no_key`
/// and `users_username_role_key` indexes created by the migrations.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_unique_fields(
        &self,
        query: &UniqueFieldsQuery,
    ) -> Result<Option<User>, DomainError> {
        if query.is_empty() {
            return Ok(None);
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM users WHERE ", USER_COLUMNS));

        {
            let mut conditions = builder.separated(" OR ");

            if let Some(email) = &query.email {
                conditions.push("email = ").push_bind_unseparated(email.clone());
            }

            if let Some(mobile_no) = &query.mobile_no {
                conditions
                    .push("mobile_no = ")
                    .push_bind_unseparated(mobile_no.clone());
            }

            match (&query.username, &query.role) {
                (Some(username), Some(role)) => {
                    conditions
                        .push("(username = ")
                        .push_bind_unseparated(username.clone())
                        .push_unseparated(" AND role = ")
                        .push_bind_unseparated(role.as_str().to_string())
                        .push_unseparated(")");
                }
                (Some(username), None) => {
                    conditions
                        .push("username = ")
                        .push_bind_unseparated(username.clone());
                }
                (None, _) => {}
            }
        }

        builder.push(" ORDER BY created_at LIMIT 1");

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to find user by identity: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_credentials(
        &self,
        username: &str,
        role: &UserRole,
    ) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = $1 AND role = $2",
            USER_COLUMNS
        ))
        .bind(username)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to find user by credentials: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn list(&self, role: Option<UserRole>) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM users
            WHERE role <> 'admin' AND ($1::TEXT IS NULL OR role = $1)
            ORDER BY created_at, id
            "#,
            USER_COLUMNS
        ))
        .bind(role.as_ref().map(|r| r.as_str().to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let user = User::new(UserId::generate(), user);
        let profile = user.profile();

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, mobile_no, username, password_hash, role,
                               department, academic_year, gpa, skills, interests, achievements,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(user.id().as_str())
        .bind(user.name())
        .bind(user.email())
        .bind(user.mobile_no())
        .bind(user.username())
        .bind(user.password_hash())
        .bind(user.role().as_str())
        .bind(profile.department.as_deref())
        .bind(profile.academic_year.as_deref())
        .bind(profile.gpa)
        .bind(&profile.skills)
        .bind(&profile.interests)
        .bind(&profile.achievements)
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "create user"))?;

        Ok(user)
    }

    async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, DomainError> {
        if changes.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)));
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET updated_at = ");
        builder.push_bind(Utc::now());

        push_assignment(&mut builder, "name", changes.name);
        push_assignment(&mut builder, "email", changes.email);
        push_assignment(&mut builder, "mobile_no", changes.mobile_no);
        push_assignment(&mut builder, "username", changes.username);
        push_assignment(&mut builder, "password_hash", changes.password_hash);
        push_assignment(&mut builder, "department", changes.department);
        push_assignment(&mut builder, "academic_year", changes.academic_year);
        push_assignment(&mut builder, "gpa", changes.gpa);
        push_assignment(&mut builder, "skills", changes.skills);
        push_assignment(&mut builder, "interests", changes.interests);
        push_assignment(&mut builder, "achievements", changes.achievements);

        builder.push(" WHERE id = ");
        builder.push_bind(id.as_str().to_string());
        builder.push(" RETURNING ");
        builder.push(USER_COLUMNS);

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "update user"))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(DomainError::not_found(format!("User '{}' not found", id))),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Database ping failed: {}", e)))?;

        Ok(())
    }
}

fn push_assignment<'args, T>(
    builder: &mut QueryBuilder<'args, Postgres>,
    column: &str,
    value: Option<T>,
) where
    T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres> + Send,
{
    if let Some(value) = value {
        builder.push(", ");
        builder.push(column);
        builder.push(" = ");
        builder.push_bind(value);
    }
}

/// Translate a write failure, surfacing unique violations as DuplicateKey
fn map_write_error(error: sqlx::Error, action: &str) -> DomainError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            if let Some(field) = db_error.constraint().and_then(constraint_field) {
                return DomainError::duplicate_key(field);
            }
        }
    }

    DomainError::storage(format!("Failed to {}: {}", action, error))
}

fn constraint_field(constraint: &str) -> Option<IdentityField> {
    match constraint {
        "users_email_key" => Some(IdentityField::Email),
        "users_mobile_no_key" => Some(IdentityField::MobileNo),
        "users_username_role_key" => Some(IdentityField::Username),
        _ => None,
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::storage(format!("Failed to read column '{}': {}", name, e)))
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    let id: String = column(row, "id")?;
    let role: String = column(row, "role")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    let updated_at: DateTime<Utc> = column(row, "updated_at")?;

    let id = UserId::new(id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;
    let role = UserRole::parse(&role)
        .map_err(|e| DomainError::storage(format!("Invalid role in database: {}", e)))?;

    let data = NewUser {
        name: column(row, "name")?,
        email: column(row, "email")?,
        mobile_no: column(row, "mobile_no")?,
        username: column(row, "username")?,
        password_hash: column(row, "password_hash")?,
        role,
        profile: UserProfile {
            department: column(row, "department")?,
            academic_year: column(row, "academic_year")?,
            gpa: column(row, "gpa")?,
            skills: column(row, "skills")?,
            interests: column(row, "interests")?,
            achievements: column(row, "achievements")?,
        },
    };

    Ok(User::restore(id, data, created_at, updated_at))
}
