//! `minipar run`: execute a source file (the default workflow).

use std::path::Path;
use std::process;

use minipar_compiler::{RenderOptions, analyze, parse, render_syntax_error};
use minipar_runtime::Executor;

pub fn run(path: &Path, color: bool) {
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

    if let Err(err) = Executor::new().run(&module) {
        eprintln!("{err}");
        process::exit(1);
    }
}
