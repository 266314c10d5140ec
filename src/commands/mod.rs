// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod auth;
pub mod categories;
pub mod transactions;
pub mod reports;
pub mod exporter;
pub mod settings;
pub mod doctor;

use anyhow::{anyhow, Result};
use rusqlite::Connection;

use crate::session::Session;

/// The remembered user, or an error telling the caller to log in.
pub fn require_session(conn: &Connection) -> Result<Session> {
    Session::resume(conn)?.ok_or_else(|| anyhow!("Not logged in; run `pennywise login` first"))
}
