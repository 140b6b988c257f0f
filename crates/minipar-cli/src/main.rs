mod cli;
mod commands;

#[cfg(test)]
mod cli_tests;

use std::path::PathBuf;

fn main() {
    let matches = cli::build_cli().get_matches();

    match matches.subcommand() {
        Some(("tokens", m)) => {
            let file = m.get_one::<PathBuf>("file").expect("file is required");
            commands::tokens::run(file);
        }
        Some(("ast", m)) => {
            let file = m.get_one::<PathBuf>("file").expect("file is required");
            let json = m.get_flag("json");
            let color = commands::use_color(
                m.get_one::<String>("color").map_or("auto", String::as_str),
            );
            commands::ast::run(file, json, color);
        }
        Some(("run", m)) => {
            let file = m.get_one::<PathBuf>("file").expect("file is required");
            let color = commands::use_color(
                m.get_one::<String>("color").map_or("auto", String::as_str),
            );
            commands::run::run(file, color);
        }
        _ => unreachable!("clap should have caught this"),
    }
}
