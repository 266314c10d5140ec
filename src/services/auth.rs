// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Registration and login.
//!
//! Passwords are stored as Argon2id PHC strings, each with its own random salt.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{is_unique_violation, LedgerError, Result};
use crate::models::User;

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| LedgerError::Integrity(format!("failed to hash password: {}", e)))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub fn register(conn: &Connection, username: &str, password: &str) -> Result<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(LedgerError::Validation("Username must not be empty".into()));
    }
    if password.is_empty() {
        return Err(LedgerError::Validation("Password must not be empty".into()));
    }
    if find_by_username(conn, username)?.is_some() {
        return Err(LedgerError::Duplicate(format!("user '{}'", username)));
    }

    let digest = hash_password(password)?;
    conn.execute(
        "INSERT INTO users(username, password_hash) VALUES (?1, ?2)",
        params![username, digest],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            LedgerError::Duplicate(format!("user '{}'", username))
        } else {
            e.into()
        }
    })?;
    let user = User {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
    };
    tracing::info!(user_id = user.id, "registered user");
    Ok(user)
}

/// Unknown usernames and wrong passwords both fail with [`LedgerError::Auth`].
pub fn login(conn: &Connection, username: &str, password: &str) -> Result<User> {
    let row: Option<(i64, String, String)> = conn
        .query_row(
            "SELECT id, username, password_hash FROM users WHERE username=?1",
            params![username.trim()],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    match row {
        Some((id, username, stored)) if verify_password(password, &stored) => {
            tracing::info!(user_id = id, "login succeeded");
            Ok(User { id, username })
        }
        _ => {
            tracing::warn!("login rejected");
            Err(LedgerError::Auth)
        }
    }
}

pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    Ok(conn
        .query_row(
            "SELECT id, username FROM users WHERE username=?1",
            params![username.trim()],
            |r| {
                Ok(User {
                    id: r.get(0)?,
                    username: r.get(1)?,
                })
            },
        )
        .optional()?)
}

pub fn get(conn: &Connection, id: i64) -> Result<User> {
    conn.query_row(
        "SELECT id, username FROM users WHERE id=?1",
        params![id],
        |r| {
            Ok(User {
                id: r.get(0)?,
                username: r.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| LedgerError::NotFound(format!("user {}", id)))
}
