use sha2::{Digest, Sha256};

use crate::db::Database;
use crate::errors::{Error, Result};
use crate::models::{Registration, User};
use crate::session::Session;

/// One-way digest of the plaintext password; comparison is exact digest
/// equality.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Looks the user up and checks the password digest. Unknown username and
/// wrong password are indistinguishable to the caller.
pub fn authenticate(db: &Database, username: &str, password: &str) -> Result<User> {
    let conn = db.lock()?;

    let user = conn
        .query_row(
            "SELECT id, username, password_hash, full_name, email, role, created_at
             FROM users
             WHERE username = ?1",
            [username],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                    full_name: row.get(3)?,
                    email: row.get(4)?,
                    role: row.get(5)?,
                    created_at: row.get(6)?,
                })
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::Authentication("invalid credentials".to_string())
            }
            // An unrecognized role string fails the row mapping and lands
            // here, surfacing to the operator instead of defaulting.
            other => Error::from(other),
        })?;

    if user.password_hash != hash_password(password) {
        return Err(Error::Authentication("invalid credentials".to_string()));
    }

    tracing::info!(user_id = user.id, role = %user.role, "login");
    Ok(user)
}

/// Authenticates and opens a fresh session with an empty cart.
pub fn login(db: &Database, username: &str, password: &str) -> Result<Session> {
    let user = authenticate(db, username, password)?;
    Ok(Session::new(user))
}

/// Registration always creates a customer account.
pub fn register(db: &Database, registration: Registration) -> Result<User> {
    if registration.username.trim().is_empty() || registration.password.is_empty() {
        return Err(Error::Validation(
            "username and password are required".to_string(),
        ));
    }

    let conn = db.lock()?;

    conn.execute(
        "INSERT INTO users (username, password_hash, full_name, email, role)
         VALUES (?1, ?2, ?3, ?4, 'customer')",
        rusqlite::params![
            registration.username,
            hash_password(&registration.password),
            registration.full_name,
            registration.email,
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::DuplicateUsername(registration.username.clone())
        }
        other => Error::from(other),
    })?;

    let id = conn.last_insert_rowid();

    let user = conn.query_row(
        "SELECT id, username, password_hash, full_name, email, role, created_at
         FROM users
         WHERE id = ?1",
        [id],
        |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                full_name: row.get(3)?,
                email: row.get(4)?,
                role: row.get(5)?,
                created_at: row.get(6)?,
            })
        },
    )?;

    tracing::info!(user_id = user.id, "customer registered");
    Ok(user)
}
