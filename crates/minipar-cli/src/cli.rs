//! Command-line definition for the `minipar` binary.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};

pub fn build_cli() -> Command {
    Command::new("minipar")
        .about("Interpreter for the MiniPar language")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tokens")
                .about("Tokenize a source file and print each token with its line")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("ast")
                .about("Parse and check a source file, then print the syntax tree")
                .arg(file_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Emit the tree as JSON"),
                )
                .arg(color_arg()),
        )
        .subcommand(
            Command::new("run")
                .about("Run a source file through the full pipeline")
                .arg(file_arg())
                .arg(color_arg()),
        )
}

/// Source file (positional).
fn file_arg() -> Arg {
    Arg::new("file")
        .value_name("FILE")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Source file to interpret")
}

/// Color output control (--color).
fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize diagnostics")
}
