// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

fn id_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .required(true)
        .value_parser(value_parser!(i64))
        .help(help)
}

fn posting_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("amount").long("amount").required(true).help("Positive amount"))
        .arg(Arg::new("description").long("description").short('d'))
        .arg(Arg::new("date").long("date").help("YYYY-MM-DD (default: now)"))
}

pub fn build_cli() -> Command {
    Command::new("pennywise")
        .about("Personal finance ledger: accounts, categories, income, expenses, transfers")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Create the database if missing"))
        .subcommand(
            Command::new("register")
                .about("Create a user")
                .arg(Arg::new("username").long("username").short('u').required(true))
                .arg(Arg::new("password").long("password").short('p').required(true)),
        )
        .subcommand(
            Command::new("login")
                .about("Log in and remember the user")
                .arg(Arg::new("username").long("username").short('u').required(true))
                .arg(Arg::new("password").long("password").short('p').required(true)),
        )
        .subcommand(Command::new("logout").about("Forget the remembered user"))
        .subcommand(Command::new("whoami").about("Show the remembered user"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("balance")
                                .long("balance")
                                .default_value("0")
                                .help("Opening balance"),
                        )
                        .arg(Arg::new("currency").long("currency")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(id_arg("id", "Account id"))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("kind")
                            .long("kind")
                            .value_parser(["income", "expense"]),
                    ),
                ))
                .subcommand(Command::new("rm").arg(id_arg("id", "Category id"))),
        )
        .subcommand(
            Command::new("tx")
                .about("Record, edit and list transactions")
                .subcommand(posting_args(
                    Command::new("income")
                        .arg(id_arg("to", "Destination account id"))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .value_parser(value_parser!(i64)),
                        ),
                ))
                .subcommand(posting_args(
                    Command::new("expense")
                        .arg(id_arg("from", "Source account id"))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .value_parser(value_parser!(i64)),
                        ),
                ))
                .subcommand(posting_args(
                    Command::new("transfer")
                        .arg(id_arg("from", "Source account id"))
                        .arg(id_arg("to", "Destination account id")),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg("id", "Transaction id"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("description").long("description").short('d')),
                )
                .subcommand(Command::new("rm").arg(id_arg("id", "Transaction id")))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .value_parser(["income", "expense", "transfer"]),
                        )
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("account")
                                .long("account")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("since").long("since").help("YYYY-MM-DD, inclusive"))
                        .arg(Arg::new("until").long("until").help("YYYY-MM-DD, inclusive"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Dashboards and summaries")
                .subcommand(json_flags(
                    Command::new("summary")
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM")),
                ))
                .subcommand(json_flags(Command::new("dashboard")))
                .subcommand(json_flags(
                    Command::new("by-category")
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM")),
                )),
        )
        .subcommand(
            Command::new("settings").about("Persistent preferences").subcommand(
                Command::new("currency")
                    .about("Show or set the default currency for new accounts")
                    .arg(Arg::new("code")),
            ),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .required(true)
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Check balances against transaction history"))
}
