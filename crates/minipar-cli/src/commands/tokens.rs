//! `minipar tokens`: print the token stream of a source file.

use std::path::Path;

use minipar_compiler::TokenStream;

pub fn run(path: &Path) {
    let source = super::read_source(path);
    for token in TokenStream::new(&source) {
        println!("{token} | line {}", token.line);
    }
}
