use minipar_compiler::ast::{Expr, Module, Stmt, Type};
use minipar_compiler::{analyze, parse};

use crate::error::RuntimeError;
use crate::interp::{Executor, Output};

fn run_source(source: &str) -> Result<String, RuntimeError> {
    let module = parse(source).expect("valid source");
    analyze(&module).expect("well-typed source");
    let (out, buffer) = Output::capture();
    Executor::with_output(out).run(&module)?;
    let buffer = buffer.lock().expect("capture buffer");
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[test]
fn arithmetic_and_print() {
    let output = run_source("x : number = 2 + 3 * 4\nprint(x)").unwrap();
    assert_eq!(output, "14\n");
}

#[test]
fn recursion() {
    let source = concat!(
        "func fact(n: number) -> number {\n",
        "    if (n <= 1) { return 1 }\n",
        "    return n * fact(n - 1)\n",
        "}\n",
        "print(fact(5))\n",
    );
    assert_eq!(run_source(source).unwrap(), "120\n");
}

#[test]
fn loop_with_break() {
    let source = concat!(
        "i : number = 0\n",
        "while (i < 10) {\n",
        "    if (i == 3) { break }\n",
        "    i = i + 1\n",
        "}\n",
        "print(i)\n",
    );
    assert_eq!(run_source(source).unwrap(), "3\n");
}

#[test]
fn loop_with_continue() {
    let source = concat!(
        "i : number = 0\n",
        "n : number = 0\n",
        "while (i < 5) {\n",
        "    i = i + 1\n",
        "    if (i % 2 == 0) { continue }\n",
        "    n = n + 1\n",
        "}\n",
        "print(n)\n",
    );
    assert_eq!(run_source(source).unwrap(), "3\n");
}

#[test]
fn and_short_circuits() {
    let source = concat!(
        "func bad() -> bool { print(\"X\") return true }\n",
        "if (false && bad()) { print(\"Y\") } else { print(\"Z\") }\n",
    );
    assert_eq!(run_source(source).unwrap(), "Z\n");
}

#[test]
fn or_short_circuits() {
    let source = concat!(
        "func bad() -> bool { print(\"X\") return false }\n",
        "if (true || bad()) { print(\"Y\") }\n",
    );
    assert_eq!(run_source(source).unwrap(), "Y\n");
}

#[test]
fn par_runs_every_branch() {
    let output = run_source("par { print(\"A\") print(\"B\") }").unwrap();
    let mut lines: Vec<&str> = output.lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["A", "B"]);
}

#[test]
fn par_branches_see_a_frozen_snapshot() {
    let source = concat!(
        "x : number = 0\n",
        "func set() -> void { x = 99 }\n",
        "par { set() }\n",
        "print(x)\n",
    );
    assert_eq!(run_source(source).unwrap(), "0\n");
}

#[test]
fn par_error_propagates_after_join() {
    let source = concat!(
        "func boom() -> number { return 1 / 0 }\n",
        "par { boom() print(\"ok\") }\n",
    );
    let err = run_source(source).unwrap_err();
    assert_eq!(err.message, "division by zero");
}

#[test]
fn seq_blocks_run_in_order() {
    let output = run_source("seq { print(\"a\") print(\"b\") }").unwrap();
    assert_eq!(output, "a\nb\n");
}

#[test]
fn empty_module_produces_no_output() {
    assert_eq!(run_source("").unwrap(), "");
}

#[test]
fn defaults_bind_when_arguments_are_missing() {
    let source = concat!(
        "func greet(name: string = \"world\") -> string { return \"hi \" + name }\n",
        "print(greet())\n",
        "print(greet(\"bob\"))\n",
    );
    assert_eq!(run_source(source).unwrap(), "hi world\nhi bob\n");
}

#[test]
fn positional_arguments_override_defaults_in_order() {
    let source = concat!(
        "func pair(a: number = 1, b: number = 2) -> number { return a * 10 + b }\n",
        "print(pair())\n",
        "print(pair(7))\n",
        "print(pair(7, 8))\n",
    );
    assert_eq!(run_source(source).unwrap(), "12\n72\n78\n");
}

#[test]
fn return_unwinds_through_loops() {
    let source = concat!(
        "func find(limit: number) -> number {\n",
        "    i : number = 0\n",
        "    while (true) {\n",
        "        if (i >= limit) { return i }\n",
        "        i = i + 1\n",
        "    }\n",
        "    return 0\n",
        "}\n",
        "print(find(4))\n",
    );
    assert_eq!(run_source(source).unwrap(), "4\n");
}

#[test]
fn assignments_in_loops_reach_the_outer_frame() {
    let source = concat!(
        "i : number = 0\n",
        "while (i < 2) { i = i + 1 }\n",
        "print(i)\n",
    );
    assert_eq!(run_source(source).unwrap(), "2\n");
}

#[test]
fn division_prints_as_float_result() {
    assert_eq!(run_source("print(5 / 2)").unwrap(), "2.5\n");
    assert_eq!(run_source("print(4 / 2)").unwrap(), "2\n");
}

#[test]
fn string_intrinsics() {
    let source = concat!(
        "s : string = \"abc\"\n",
        "print(len(s))\n",
        "print(s[1])\n",
        "print(isalpha(s))\n",
        "print(isnum(\"123\"))\n",
        "print(isnum(s))\n",
        "print(to_number(\"7\") + 1)\n",
        "print(to_string(12) + \"!\")\n",
    );
    assert_eq!(
        run_source(source).unwrap(),
        "3\nb\ntrue\ntrue\nfalse\n8\n12!\n"
    );
}

#[test]
fn booleans_print_as_literals() {
    assert_eq!(run_source("print(true, false)").unwrap(), "true false\n");
    assert_eq!(run_source("print(1 == 1.0)").unwrap(), "true\n");
}

#[test]
fn false_literal_is_falsy() {
    let source = "if (false) { print(\"then\") } else { print(\"else\") }";
    assert_eq!(run_source(source).unwrap(), "else\n");
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let err = run_source("print(1 / 0)").unwrap_err();
    assert_eq!(err.message, "division by zero");
}

#[test]
fn conversion_failure_is_a_runtime_error() {
    let err = run_source("print(to_number(\"seven\"))").unwrap_err();
    assert!(err.message.contains("cannot convert"), "{}", err.message);
}

#[test]
fn string_index_out_of_range() {
    let err = run_source("s : string = \"ab\"\nprint(s[5])").unwrap_err();
    assert!(err.message.contains("out of range"), "{}", err.message);
}

#[test]
fn reading_a_declaration_before_init_fails() {
    // `x : number = x` parses (the binding exists) but the frame has no
    // value for `x` while the right-hand side evaluates.
    let err = run_source("x : number = x").unwrap_err();
    assert!(err.message.contains("`x` is not defined"), "{}", err.message);
}

#[test]
fn assert_statement_raises_with_its_message() {
    let module = Module {
        stmts: vec![Stmt::Assert {
            condition: Expr::Constant {
                ty: Type::Bool,
                lexeme: "false".to_owned(),
                line: 1,
            },
            message: Some(Expr::Constant {
                ty: Type::String,
                lexeme: "boom".to_owned(),
                line: 1,
            }),
        }],
    };
    let (out, _) = Output::capture();
    let err = Executor::with_output(out).run(&module).unwrap_err();
    assert_eq!(err.message, "boom");
}

#[test]
fn passing_assert_and_noop_do_nothing() {
    let module = Module {
        stmts: vec![
            Stmt::NoOp,
            Stmt::Assert {
                condition: Expr::Constant {
                    ty: Type::Bool,
                    lexeme: "true".to_owned(),
                    line: 1,
                },
                message: None,
            },
        ],
    };
    let (out, buffer) = Output::capture();
    Executor::with_output(out).run(&module).unwrap();
    assert!(buffer.lock().expect("capture buffer").is_empty());
}

#[test]
fn cast_nodes_convert_values() {
    let module = Module {
        stmts: vec![Stmt::Expr(Expr::Call {
            ty: Type::Void,
            callee: "print".to_owned(),
            method: None,
            args: vec![Expr::Cast {
                target: Type::Number,
                expr: Box::new(Expr::Constant {
                    ty: Type::String,
                    lexeme: "41".to_owned(),
                    line: 1,
                }),
                line: 1,
            }],
            line: 1,
        })],
    };
    let (out, buffer) = Output::capture();
    Executor::with_output(out).run(&module).unwrap();
    assert_eq!(
        String::from_utf8_lossy(&buffer.lock().expect("capture buffer")),
        "41\n"
    );
}

#[test]
fn if_scopes_are_pushed_and_popped() {
    let source = concat!(
        "x : number = 1\n",
        "b : bool = true\n",
        "if (b) { x : number = 99 print(x) }\n",
        "print(x)\n",
    );
    assert_eq!(run_source(source).unwrap(), "99\n1\n");
}
