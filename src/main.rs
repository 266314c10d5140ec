// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use pennywise::{cli, commands, db, logging};

fn main() -> Result<()> {
    logging::init();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("register", sub)) => commands::auth::register(&conn, sub)?,
        Some(("login", sub)) => commands::auth::login(&conn, sub)?,
        Some(("logout", _)) => commands::auth::logout(&conn)?,
        Some(("whoami", _)) => commands::auth::whoami(&conn)?,
        Some(("settings", sub)) => commands::settings::handle(&conn, sub)?,
        Some((name, sub)) => {
            let session = commands::require_session(&conn)?;
            match name {
                "account" => commands::accounts::handle(&conn, &session, sub)?,
                "category" => commands::categories::handle(&conn, &session, sub)?,
                "tx" => commands::transactions::handle(&mut conn, &session, sub)?,
                "report" => commands::reports::handle(&conn, &session, sub)?,
                "export" => commands::exporter::handle(&conn, &session, sub)?,
                "doctor" => commands::doctor::handle(&conn, &session)?,
                _ => {
                    cli::build_cli().print_help()?;
                    println!();
                }
            }
        }
        None => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
