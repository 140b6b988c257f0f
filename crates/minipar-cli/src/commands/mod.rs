//! Command implementations and shared helpers.

pub mod ast;
pub mod run;
pub mod tokens;

use std::io::IsTerminal;
use std::path::Path;

pub fn read_source(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read {}: {err}", path.display());
            std::process::exit(1);
        }
    }
}

pub fn use_color(when: &str) -> bool {
    match when {
        "always" => true,
        "never" => false,
        _ => std::io::stderr().is_terminal(),
    }
}
