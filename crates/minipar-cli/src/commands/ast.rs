//! `minipar ast`: parse and check a source file, then print the tree.

use std::path::Path;
use std::process;

use minipar_compiler::{RenderOptions, analyze, format_ast, parse, render_syntax_error};

pub fn run(path: &Path, json: bool, color: bool) {
    let source = super::read_source(path);

    let module = match parse(&source) {
        Ok(module) => module,
        Err(err) => {
            let options = if color {
                RenderOptions::colored()
            } else {
                RenderOptions::plain()
            };
            eprintln!("{}", render_syntax_error(&source, path.to_str(), &err, options));
            process::exit(1);
        }
    };

    if let Err(err) = analyze(&module) {
        eprintln!("{err}");
        process::exit(1);
    }

    if json {
        match serde_json::to_string_pretty(&module) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("error: cannot serialize tree: {err}");
                process::exit(1);
            }
        }
    } else {
        print!("{}", format_ast(&module));
    }
}
