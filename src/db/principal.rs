//! Principal records and the per-role credential store.
//!
//! Students, instructors and admins share the same record shape but live in
//! separate tables. A `PrincipalStore` is bound to exactly one role; the
//! table is resolved by an exhaustive match on `Role`, so there is no
//! "unmapped role" case at runtime.

use sqlx::sqlite::SqlitePool;

/// Account role. Closed set - adding a role requires touching every match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }

    /// Table backing this role's collection.
    pub(crate) fn table(&self) -> &'static str {
        match self {
            Role::Student => "students",
            Role::Instructor => "instructors",
            Role::Admin => "admins",
        }
    }
}

/// A stored account record. `password_hash` and `refresh_token` never leave
/// the server; response projections use `CurrentPrincipal` instead.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub avatar: String,
    /// The single currently valid refresh token, or None after logout.
    pub refresh_token: Option<String>,
}

#[derive(sqlx::FromRow)]
struct PrincipalRow {
    id: String,
    first_name: String,
    last_name: String,
    username: String,
    email: String,
    phone: String,
    password_hash: String,
    avatar: String,
    refresh_token: Option<String>,
}

impl PrincipalRow {
    fn into_principal(self, role: Role) -> Principal {
        Principal {
            id: self.id,
            role,
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            email: self.email,
            phone: self.phone,
            password_hash: self.password_hash,
            avatar: self.avatar,
            refresh_token: self.refresh_token,
        }
    }
}

/// Fields required to create an account. The password arrives here already
/// hashed; stores never see plaintext.
#[derive(Debug)]
pub struct NewPrincipal {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

const SELECT_COLUMNS: &str =
    "id, first_name, last_name, username, email, phone, password_hash, avatar, refresh_token";

/// Store for one role's account collection.
#[derive(Clone)]
pub struct PrincipalStore {
    pool: SqlitePool,
    role: Role,
}

impl PrincipalStore {
    pub fn new(pool: SqlitePool, role: Role) -> Self {
        Self { pool, role }
    }

    /// Insert a new account. Returns the generated id. Fails on a username,
    /// email or phone collision within this role's table.
    pub async fn create(&self, new: &NewPrincipal) -> Result<String, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(&format!(
            "INSERT INTO {} (id, first_name, last_name, username, email, phone, password_hash) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            self.role.table()
        ))
        .bind(&id)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.password_hash)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    /// Get an account by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Principal>, sqlx::Error> {
        let row: Option<PrincipalRow> = sqlx::query_as(&format!(
            "SELECT {} FROM {} WHERE id = ?",
            SELECT_COLUMNS,
            self.role.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.into_principal(self.role)))
    }

    /// Get an account by username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Principal>, sqlx::Error> {
        let row: Option<PrincipalRow> = sqlx::query_as(&format!(
            "SELECT {} FROM {} WHERE username = ?",
            SELECT_COLUMNS,
            self.role.table()
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.into_principal(self.role)))
    }

    /// Check whether any account already claims one of the identity fields.
    pub async fn exists_by_identity(
        &self,
        username: &str,
        email: &str,
        phone: &str,
    ) -> Result<bool, sqlx::Error> {
        let count: (i32,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM {} WHERE username = ? OR email = ? OR phone = ?",
            self.role.table()
        ))
        .bind(username)
        .bind(email)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0 > 0)
    }

    /// Persist the rotated refresh token. Overwrites any previous value,
    /// which is what invalidates older sessions (last login wins).
    pub async fn set_refresh_token(&self, id: &str, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET refresh_token = ?, updated_at = datetime('now') WHERE id = ?",
            self.role.table()
        ))
        .bind(token)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear the stored refresh token. Clearing an already-empty field is
    /// not an error, so logout stays idempotent.
    pub async fn clear_refresh_token(&self, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query(&format!(
            "UPDATE {} SET refresh_token = NULL, updated_at = datetime('now') WHERE id = ?",
            self.role.table()
        ))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Replace the stored password hash (password change flows).
    pub async fn update_password_hash(&self, id: &str, hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET password_hash = ?, updated_at = datetime('now') WHERE id = ?",
            self.role.table()
        ))
        .bind(hash)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
