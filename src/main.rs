// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use billfold::{cli, commands, db};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();
    let user = matches
        .get_one::<String>("user")
        .map(String::as_str)
        .unwrap_or("default");

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("spend", sub)) => commands::spend::handle(&mut conn, user, sub)?,
        Some(("project", sub)) => commands::project::handle(&mut conn, user, sub)?,
        Some(("bill", sub)) => commands::bill::handle(&mut conn, user, sub)?,
        Some(("summary", sub)) => commands::summary::handle(&mut conn, user, sub)?,
        Some(("config", sub)) => commands::config::handle(&mut conn, user, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
