mod principal;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub use principal::{NewPrincipal, Principal, PrincipalStore, Role};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open or create a database at the given path.
    /// Use ":memory:" for an in-memory database.
    pub async fn open(path: &str) -> Result<Self, sqlx::Error> {
        let url = if path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{}?mode=rwc", path)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get the current schema version.
    async fn get_version(&self) -> Result<i32, sqlx::Error> {
        let result: Option<(i32,)> = sqlx::query_as("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(result.map(|r| r.0).unwrap_or(0))
    }

    /// Set the schema version within a transaction.
    async fn set_version(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        version: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM schema_version")
            .execute(&mut **tx)
            .await?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(version)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Run database migrations.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
            .execute(&self.pool)
            .await?;

        let version = self.get_version().await?;

        if version < 1 {
            self.migrate_v1().await?;
        }

        Ok(())
    }

    /// Execute a list of queries in a transaction, then set the version.
    async fn run_migration(
        &self,
        version: i32,
        queries: &[&'static str],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for query in queries {
            sqlx::query(*query).execute(&mut *tx).await?;
        }
        Self::set_version(&mut tx, version).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn migrate_v1(&self) -> Result<(), sqlx::Error> {
        // One table per role collection, all with the same shape.
        // username/email/phone are unique within a role, not across roles.
        self.run_migration(
            1,
            &[
                "CREATE TABLE students (
                    id TEXT PRIMARY KEY,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    username TEXT UNIQUE NOT NULL COLLATE NOCASE,
                    email TEXT UNIQUE NOT NULL COLLATE NOCASE,
                    phone TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    avatar TEXT NOT NULL DEFAULT 'avatar.webp',
                    refresh_token TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE TABLE instructors (
                    id TEXT PRIMARY KEY,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    username TEXT UNIQUE NOT NULL COLLATE NOCASE,
                    email TEXT UNIQUE NOT NULL COLLATE NOCASE,
                    phone TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    avatar TEXT NOT NULL DEFAULT 'avatar.webp',
                    refresh_token TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE TABLE admins (
                    id TEXT PRIMARY KEY,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    username TEXT UNIQUE NOT NULL COLLATE NOCASE,
                    email TEXT UNIQUE NOT NULL COLLATE NOCASE,
                    phone TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    avatar TEXT NOT NULL DEFAULT 'avatar.webp',
                    refresh_token TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
            ],
        )
        .await
    }

    /// Get the store for the given role's collection.
    pub fn principals(&self, role: Role) -> PrincipalStore {
        PrincipalStore::new(self.pool.clone(), role)
    }

    /// Get the underlying connection pool (for tests that need raw SQL access).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(username: &str) -> NewPrincipal {
        NewPrincipal {
            first_name: "Alice".into(),
            last_name: "Doe".into(),
            username: username.into(),
            email: format!("{}@example.com", username),
            phone: format!("555000{:04}", username.len()),
            password_hash: "$argon2id$stub".into(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_principal() {
        let db = Database::open(":memory:").await.unwrap();
        let store = db.principals(Role::Student);

        let id = store.create(&sample("alice")).await.unwrap();

        let p = store.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(p.id, id);
        assert_eq!(p.role, Role::Student);
        assert_eq!(p.email, "alice@example.com");
        assert_eq!(p.avatar, "avatar.webp");
        assert!(p.refresh_token.is_none());

        let p = store.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(p.username, "alice");
    }

    #[tokio::test]
    async fn test_duplicate_identity_fails() {
        let db = Database::open(":memory:").await.unwrap();
        let store = db.principals(Role::Student);

        store.create(&sample("alice")).await.unwrap();

        // Same username, different everything else
        let mut dup = sample("alice");
        dup.email = "other@example.com".into();
        dup.phone = "5559999999".into();
        assert!(store.create(&dup).await.is_err());

        // Same email only
        let mut dup = sample("bob");
        dup.email = "alice@example.com".into();
        assert!(store.create(&dup).await.is_err());
    }

    #[tokio::test]
    async fn test_roles_are_separate_collections() {
        let db = Database::open(":memory:").await.unwrap();

        db.principals(Role::Student)
            .create(&sample("alice"))
            .await
            .unwrap();
        // Same identity fields in another role's table are fine
        db.principals(Role::Instructor)
            .create(&sample("alice"))
            .await
            .unwrap();

        assert!(
            db.principals(Role::Admin)
                .get_by_username("alice")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_exists_by_identity() {
        let db = Database::open(":memory:").await.unwrap();
        let store = db.principals(Role::Instructor);

        assert!(
            !store
                .exists_by_identity("alice", "alice@example.com", "5550000000")
                .await
                .unwrap()
        );

        store.create(&sample("alice")).await.unwrap();

        // Any single matching field counts
        assert!(
            store
                .exists_by_identity("alice", "nope@example.com", "nope")
                .await
                .unwrap()
        );
        assert!(
            store
                .exists_by_identity("nope", "alice@example.com", "nope")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_refresh_token_roundtrip() {
        let db = Database::open(":memory:").await.unwrap();
        let store = db.principals(Role::Admin);
        let id = store.create(&sample("root")).await.unwrap();

        assert!(store.set_refresh_token(&id, "token-1").await.unwrap());
        assert_eq!(
            store.get_by_id(&id).await.unwrap().unwrap().refresh_token,
            Some("token-1".to_string())
        );

        // Overwrite supersedes the previous value
        assert!(store.set_refresh_token(&id, "token-2").await.unwrap());
        assert_eq!(
            store.get_by_id(&id).await.unwrap().unwrap().refresh_token,
            Some("token-2".to_string())
        );

        store.clear_refresh_token(&id).await.unwrap();
        assert!(
            store
                .get_by_id(&id)
                .await
                .unwrap()
                .unwrap()
                .refresh_token
                .is_none()
        );

        // Clearing again is not an error
        store.clear_refresh_token(&id).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_password_hash() {
        let db = Database::open(":memory:").await.unwrap();
        let store = db.principals(Role::Student);
        let id = store.create(&sample("alice")).await.unwrap();

        assert!(
            store
                .update_password_hash(&id, "$argon2id$new")
                .await
                .unwrap()
        );
        assert_eq!(
            store.get_by_id(&id).await.unwrap().unwrap().password_hash,
            "$argon2id$new"
        );

        assert!(!store.update_password_hash("missing", "x").await.unwrap());
    }
}
