// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{is_unique_violation, LedgerError, Result};
use crate::models::{Category, CategoryKind};

/// Seeded on first login when a user has no categories at all.
pub const DEFAULT_CATEGORIES: [(&str, CategoryKind); 9] = [
    ("Salary", CategoryKind::Income),
    ("Investments", CategoryKind::Income),
    ("Gifts", CategoryKind::Income),
    ("Groceries", CategoryKind::Expense),
    ("Transport", CategoryKind::Expense),
    ("Housing", CategoryKind::Expense),
    ("Entertainment", CategoryKind::Expense),
    ("Health", CategoryKind::Expense),
    ("Clothing", CategoryKind::Expense),
];

fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    let kind: String = r.get(3)?;
    let kind = kind.parse::<CategoryKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Category {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        kind,
    })
}

pub fn create(conn: &Connection, user_id: i64, name: &str, kind: CategoryKind) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::Validation("Category name must not be empty".into()));
    }
    conn.execute(
        "INSERT INTO categories(user_id, name, type) VALUES (?1, ?2, ?3)",
        params![user_id, name, kind.as_str()],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            LedgerError::Duplicate(format!("{} category '{}'", kind, name))
        } else {
            e.into()
        }
    })?;
    Ok(Category {
        id: conn.last_insert_rowid(),
        user_id,
        name: name.to_string(),
        kind,
    })
}

pub fn list(conn: &Connection, user_id: i64, kind: Option<CategoryKind>) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, type FROM categories
         WHERE user_id=?1 AND (?2 IS NULL OR type=?2)
         ORDER BY type, name",
    )?;
    let rows = stmt.query_map(params![user_id, kind.map(|k| k.as_str())], from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn find(conn: &Connection, id: i64) -> Result<Option<Category>> {
    Ok(conn
        .query_row(
            "SELECT id, user_id, name, type FROM categories WHERE id=?1",
            params![id],
            from_row,
        )
        .optional()?)
}

pub fn get(conn: &Connection, id: i64) -> Result<Category> {
    find(conn, id)?.ok_or_else(|| LedgerError::NotFound(format!("category {}", id)))
}

/// Historical transactions keep their rows; their category becomes null.
pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::NotFound(format!("category {}", id)));
    }
    Ok(())
}

/// Creates [`DEFAULT_CATEGORIES`] for a user that has none. Collisions count
/// as success; any other failure is returned. Yields how many were created.
pub fn seed_defaults(conn: &Connection, user_id: i64) -> Result<usize> {
    if !list(conn, user_id, None)?.is_empty() {
        return Ok(0);
    }
    let mut created = 0;
    for (name, kind) in DEFAULT_CATEGORIES {
        match create(conn, user_id, name, kind) {
            Ok(_) => created += 1,
            Err(e) if e.is_duplicate() => {}
            Err(e) => return Err(e),
        }
    }
    tracing::debug!(user_id, created, "seeded default categories");
    Ok(created)
}
