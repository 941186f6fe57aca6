// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn consult_filter_args(cmd: Command) -> Command {
    json_flags(cmd)
        .arg(
            Arg::new("type")
                .long("type")
                .value_parser(["SPENDING", "REVENUE"])
                .help("Filter by record type"),
        )
        .arg(
            Arg::new("category")
                .long("category")
                .help("Filter by exact category"),
        )
        .arg(
            Arg::new("date")
                .long("date")
                .help("Date token: YYYY, YYYY-MM, or YYYY-MM-DD"),
        )
        .arg(
            Arg::new("project")
                .long("project")
                .help("Restrict to the named project's spendings"),
        )
        .arg(
            Arg::new("detail")
                .long("detail")
                .action(ArgAction::SetTrue)
                .help("Show every installment instead of plan parents only"),
        )
}

pub fn build_cli() -> Command {
    Command::new("billfold")
        .about("Personal-finance ledger: installment plans, savings projects, fixed bills, monthly summaries")
        .version(crate_version!())
        .arg(
            Arg::new("user")
                .long("user")
                .short('u')
                .global(true)
                .default_value("default")
                .help("User the operation is scoped to"),
        )
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("spend")
                .about("Record, remove, and consult ledger spendings")
                .subcommand(
                    Command::new("add")
                        .about("Record a spending or revenue, optionally split into installments")
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(Arg::new("value").long("value").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["SPENDING", "REVENUE"])
                                .default_value("SPENDING"),
                        )
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .required(true)
                                .help("YYYY-MM-DD"),
                        )
                        .arg(
                            Arg::new("installments")
                                .long("installments")
                                .value_parser(clap::value_parser!(u32))
                                .default_value("1"),
                        )
                        .arg(
                            Arg::new("project")
                                .long("project")
                                .help("Link the full purchase value to the named project"),
                        )
                        .arg(
                            Arg::new("create-project")
                                .long("create-project")
                                .action(ArgAction::SetTrue)
                                .help("Create the project if the name does not resolve"),
                        ),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Remove a spending; removing a plan parent removes its installments")
                        .arg(Arg::new("id").required(true).value_parser(clap::value_parser!(i64))),
                )
                .subcommand(consult_filter_args(
                    Command::new("list").about("List matching spendings (newest first)"),
                ))
                .subcommand(consult_filter_args(
                    Command::new("max").about("Single highest-value matching record"),
                ))
                .subcommand(consult_filter_args(
                    Command::new("min").about("Single lowest-value matching record"),
                ))
                .subcommand(consult_filter_args(
                    Command::new("by-category")
                        .about("Per-category totals, highest spending first"),
                ))
                .subcommand(json_flags(
                    Command::new("compare")
                        .about("Month-over-month totals for an inclusive date range")
                        .arg(Arg::new("from").long("from").required(true).help("YYYY-MM-DD"))
                        .arg(Arg::new("to").long("to").required(true).help("YYYY-MM-DD")),
                )),
        )
        .subcommand(
            Command::new("project")
                .about("Savings/spending projects linked to ledger records")
                .subcommand(
                    Command::new("add")
                        .about("Create a project")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("description").long("description").default_value(""))
                        .arg(Arg::new("target").long("target").help("Target value")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List projects")
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .value_parser(["ACTIVE", "COMPLETED", "PAUSED"]),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("show")
                        .about("Project details, expense history, and linked spendings")
                        .arg(Arg::new("name").required(true)),
                ))
                .subcommand(
                    Command::new("update")
                        .about("Rename, retarget, or change status of a project")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("rename").long("rename"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("target").long("target"))
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .value_parser(["ACTIVE", "COMPLETED", "PAUSED"]),
                        ),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Remove a project; linked spendings are kept")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("bill")
                .about("Recurring fixed bills and their monthly payments")
                .subcommand(
                    Command::new("add")
                        .about("Create a fixed bill")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("due-day")
                                .long("due-day")
                                .required(true)
                                .value_parser(clap::value_parser!(u32))
                                .help("Day of month the bill is due (1-31)"),
                        )
                        .arg(Arg::new("category").long("category").default_value("OTHER"))
                        .arg(Arg::new("description").long("description").default_value(""))
                        .arg(
                            Arg::new("autopay")
                                .long("autopay")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(
                            Arg::new("no-reminder")
                                .long("no-reminder")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List bills")
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .value_parser(["ACTIVE", "PAUSED", "CANCELLED"]),
                        ),
                ))
                .subcommand(
                    Command::new("pay")
                        .about("Mark a bill paid for a month (replaces any prior payment)")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM"))
                        .arg(Arg::new("amount").long("amount").help("Defaults to the bill amount")),
                )
                .subcommand(
                    Command::new("unpay")
                        .about("Remove the payment record for a month")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM")),
                )
                .subcommand(json_flags(
                    Command::new("history")
                        .about("Stored payments for a bill, newest first")
                        .arg(Arg::new("name").required(true)),
                ))
                .subcommand(json_flags(
                    Command::new("summary")
                        .about("Month overview of ACTIVE bills, unpaid first")
                        .arg(Arg::new("month").required(true).help("YYYY-MM")),
                ))
                .subcommand(
                    Command::new("cancel")
                        .about("Cancel a bill (kept with status CANCELLED)")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(json_flags(
            Command::new("summary")
                .about("Monthly dashboard: variable spending, fixed bills, limit, alerts")
                .arg(Arg::new("month").required(true).help("YYYY-MM")),
        ))
        .subcommand(
            Command::new("config")
                .about("Per-user budget configuration")
                .subcommand(
                    Command::new("set")
                        .about("Set monthly income and/or spending limit")
                        .arg(Arg::new("income").long("income"))
                        .arg(Arg::new("limit").long("limit")),
                )
                .subcommand(json_flags(Command::new("show").about("Show the configuration"))),
        )
}
