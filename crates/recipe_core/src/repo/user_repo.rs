//! User/token repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist account rows and API tokens.
//!
//! # Invariants
//! - Emails are stored exactly as given; callers normalize first.
//! - Each user owns at most one token; token lookup ignores inactive users.

use crate::model::user::{NewUser, User, UserId};
use crate::repo::{bool_to_int, ensure_tables, int_to_bool, map_unique_violation};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    id,
    email,
    name,
    password_hash,
    is_active,
    is_staff,
    is_superuser
FROM users";

/// Repository interface for users and their API tokens.
pub trait UserRepository {
    /// Inserts one user and returns the stored row.
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    /// Gets one user by id.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Gets one user by exact (normalized) email.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Rewrites email, name, password hash and flags.
    fn update_user(&self, user: &User) -> RepoResult<()>;
    /// Returns the user's token, creating one on first use.
    fn get_or_create_token(&self, user_id: UserId) -> RepoResult<String>;
    /// Resolves an active user from a token.
    fn user_for_token(&self, token: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users", "auth_tokens"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        self.conn
            .execute(
                "INSERT INTO users (
                    email,
                    name,
                    password_hash,
                    is_staff,
                    is_superuser
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    user.email.as_str(),
                    user.name.as_str(),
                    user.password_hash.as_str(),
                    bool_to_int(user.is_staff),
                    bool_to_int(user.is_superuser),
                ],
            )
            .map_err(|err| map_unique_violation(err, "user with this email already exists"))?;

        let id = self.conn.last_insert_rowid();
        self.get_user(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("user {id} missing after insert")))
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE email = ?1;"))?;
        let mut rows = stmt.query([email])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET
                    email = ?1,
                    name = ?2,
                    password_hash = ?3,
                    is_active = ?4,
                    is_staff = ?5,
                    is_superuser = ?6
                 WHERE id = ?7;",
                params![
                    user.email.as_str(),
                    user.name.as_str(),
                    user.password_hash.as_str(),
                    bool_to_int(user.is_active),
                    bool_to_int(user.is_staff),
                    bool_to_int(user.is_superuser),
                    user.id,
                ],
            )
            .map_err(|err| map_unique_violation(err, "user with this email already exists"))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: user.id,
            });
        }
        Ok(())
    }

    fn get_or_create_token(&self, user_id: UserId) -> RepoResult<String> {
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT token FROM auth_tokens WHERE user_id = ?1;",
                [user_id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(token) = existing {
            return Ok(token);
        }

        let token = Uuid::new_v4().simple().to_string();
        self.conn.execute(
            "INSERT INTO auth_tokens (token, user_id) VALUES (?1, ?2);",
            params![token.as_str(), user_id],
        )?;
        Ok(token)
    }

    fn user_for_token(&self, token: &str) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                u.id AS id,
                u.email AS email,
                u.name AS name,
                u.password_hash AS password_hash,
                u.is_active AS is_active,
                u.is_staff AS is_staff,
                u.is_superuser AS is_superuser
             FROM auth_tokens t
             INNER JOIN users u ON u.id = t.user_id
             WHERE t.token = ?1
               AND u.is_active = 1;",
        )?;
        let mut rows = stmt.query([token])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row)?)),
            None => Ok(None),
        }
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        name: row.get("name")?,
        password_hash: row.get("password_hash")?,
        is_active: int_to_bool(row.get("is_active")?, "users.is_active")?,
        is_staff: int_to_bool(row.get("is_staff")?, "users.is_staff")?,
        is_superuser: int_to_bool(row.get("is_superuser")?, "users.is_superuser")?,
    })
}
