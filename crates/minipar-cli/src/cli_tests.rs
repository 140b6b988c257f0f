use std::path::PathBuf;

use crate::cli::build_cli;

#[test]
fn cli_definition_is_consistent() {
    build_cli().debug_assert();
}

#[test]
fn run_takes_a_source_file() {
    let matches = build_cli()
        .try_get_matches_from(["minipar", "run", "examples.minipar"])
        .expect("valid invocation");
    let (name, sub) = matches.subcommand().expect("subcommand is required");
    assert_eq!(name, "run");
    assert_eq!(
        sub.get_one::<PathBuf>("file"),
        Some(&PathBuf::from("examples.minipar"))
    );
}

#[test]
fn ast_accepts_the_json_flag() {
    let matches = build_cli()
        .try_get_matches_from(["minipar", "ast", "--json", "x.minipar"])
        .expect("valid invocation");
    let (name, sub) = matches.subcommand().expect("subcommand is required");
    assert_eq!(name, "ast");
    assert!(sub.get_flag("json"));
}

#[test]
fn missing_file_is_rejected() {
    assert!(build_cli().try_get_matches_from(["minipar", "tokens"]).is_err());
    assert!(build_cli().try_get_matches_from(["minipar"]).is_err());
}

#[test]
fn color_defaults_to_auto() {
    let matches = build_cli()
        .try_get_matches_from(["minipar", "run", "x.minipar"])
        .expect("valid invocation");
    let (_, sub) = matches.subcommand().expect("subcommand is required");
    assert_eq!(sub.get_one::<String>("color").map(String::as_str), Some("auto"));
}
