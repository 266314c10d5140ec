// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::services::auth;
use crate::session::Session;

pub fn register(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let username = sub.get_one::<String>("username").unwrap();
    let password = sub.get_one::<String>("password").unwrap();
    let user = auth::register(conn, username, password)
        .with_context(|| format!("Could not register '{}'", username.trim()))?;
    println!("Registered user '{}' (id {})", user.username, user.id);
    Ok(())
}

pub fn login(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let username = sub.get_one::<String>("username").unwrap();
    let password = sub.get_one::<String>("password").unwrap();
    let session = Session::login(conn, username, password).context("Login failed")?;
    println!("Logged in as '{}'", session.user.username);
    Ok(())
}

pub fn logout(conn: &Connection) -> Result<()> {
    Session::logout(conn)?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(conn: &Connection) -> Result<()> {
    match Session::resume(conn)? {
        Some(s) => println!("{} (id {})", s.user.username, s.user.id),
        None => println!("Not logged in"),
    }
    Ok(())
}
