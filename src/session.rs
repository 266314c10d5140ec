// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The logged-in user, passed explicitly to whatever needs it.

use rusqlite::Connection;

use crate::error::{LedgerError, Result};
use crate::models::{Account, Category, Transaction, User};
use crate::services::{accounts, auth, categories, transactions};
use crate::utils::{clear_setting, get_setting, set_setting};

const ACTIVE_USER_KEY: &str = "active_user";

#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    /// Logs in, seeds default categories on first use and remembers the user
    /// for later invocations.
    pub fn login(conn: &Connection, username: &str, password: &str) -> Result<Self> {
        let user = auth::login(conn, username, password)?;
        categories::seed_defaults(conn, user.id)?;
        set_setting(conn, ACTIVE_USER_KEY, &user.username)?;
        Ok(Self::new(user))
    }

    /// Restores the session persisted by the last [`Session::login`].
    pub fn resume(conn: &Connection) -> Result<Option<Self>> {
        let Some(username) = get_setting(conn, ACTIVE_USER_KEY)? else {
            return Ok(None);
        };
        Ok(auth::find_by_username(conn, &username)?.map(Self::new))
    }

    pub fn logout(conn: &Connection) -> Result<()> {
        clear_setting(conn, ACTIVE_USER_KEY)
    }

    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    /// Entities owned by someone else look missing.
    pub fn account(&self, conn: &Connection, id: i64) -> Result<Account> {
        match accounts::find(conn, id)? {
            Some(a) if a.user_id == self.user.id => Ok(a),
            _ => Err(LedgerError::NotFound(format!("account {}", id))),
        }
    }

    pub fn category(&self, conn: &Connection, id: i64) -> Result<Category> {
        match categories::find(conn, id)? {
            Some(c) if c.user_id == self.user.id => Ok(c),
            _ => Err(LedgerError::NotFound(format!("category {}", id))),
        }
    }

    pub fn transaction(&self, conn: &Connection, id: i64) -> Result<Transaction> {
        match transactions::find(conn, id)? {
            Some(t) if t.user_id == self.user.id => Ok(t),
            _ => Err(LedgerError::NotFound(format!("transaction {}", id))),
        }
    }
}
