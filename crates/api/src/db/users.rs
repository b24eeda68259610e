//! User repository.
//!
//! The password hash never rides along on the [`User`] domain type; login is
//! the only code path that sees it, through [`UserRepository::get_with_hash`].

use sqlx::PgPool;

use cartwheel_core::{Email, UserId};

use super::RepositoryError;
use crate::models::User;

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    phone: String,
    is_admin: bool,
    street: String,
    apartment: String,
    city: String,
    zip: String,
    country: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            is_admin: row.is_admin,
            street: row.street,
            apartment: row.apartment,
            city: row.city,
            zip: row.zip,
            country: row.country,
        })
    }
}

const USER_SELECT: &str = r"
    SELECT id, name, email, phone, is_admin, street, apartment, city, zip, country
    FROM users
";

/// Fields accepted when creating or updating a user.
///
/// `password_hash` is `None` on updates that keep the existing password.
#[derive(Debug, Clone)]
pub struct UserFields {
    pub name: String,
    pub email: Email,
    pub password_hash: Option<String>,
    pub phone: String,
    pub is_admin: bool,
    pub street: String,
    pub apartment: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all users (password hashes excluded by construction).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} ORDER BY id"))
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user and their password hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_with_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct UserHashRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, UserHashRow>(
            r"
            SELECT id, name, email, phone, is_admin, street, apartment, city,
                   zip, country, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((r.user.try_into()?, r.password_hash)))
            .transpose()
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    /// Returns `RepositoryError::Database` for other failures, or
    /// `RepositoryError::DataCorruption` if `fields.password_hash` is `None`
    /// (creation always requires a password).
    pub async fn create(&self, fields: &UserFields) -> Result<User, RepositoryError> {
        let Some(password_hash) = &fields.password_hash else {
            return Err(RepositoryError::DataCorruption(
                "user creation requires a password hash".to_string(),
            ));
        };

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users
                (name, email, password_hash, phone, is_admin, street,
                 apartment, city, zip, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, name, email, phone, is_admin, street, apartment,
                      city, zip, country
            ",
        )
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(password_hash)
        .bind(&fields.phone)
        .bind(fields.is_admin)
        .bind(&fields.street)
        .bind(&fields.apartment)
        .bind(&fields.city)
        .bind(&fields.zip)
        .bind(&fields.country)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict("email already registered".to_string())
            }
            _ => RepositoryError::Database(e),
        })?;

        row.try_into()
    }

    /// Update a user. Returns `None` if the user does not exist.
    ///
    /// When `fields.password_hash` is `None` the stored hash is kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: UserId,
        fields: &UserFields,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET name = $2, email = $3,
                password_hash = COALESCE($4, password_hash),
                phone = $5, is_admin = $6, street = $7, apartment = $8,
                city = $9, zip = $10, country = $11
            WHERE id = $1
            RETURNING id, name, email, phone, is_admin, street, apartment,
                      city, zip, country
            ",
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.password_hash)
        .bind(&fields.phone)
        .bind(fields.is_admin)
        .bind(&fields.street)
        .bind(&fields.apartment)
        .bind(&fields.city)
        .bind(&fields.zip)
        .bind(&fields.country)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Delete a user. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all users. Zero is a valid answer, not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}
