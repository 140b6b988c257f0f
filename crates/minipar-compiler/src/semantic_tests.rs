use crate::ast::{Expr, Module, Stmt, Type};
use crate::error::SemanticError;
use crate::parser::parse;
use crate::semantic::analyze;

fn check(source: &str) -> Result<(), SemanticError> {
    let module = parse(source).expect("valid source");
    analyze(&module)
}

#[test]
fn well_typed_program_passes() {
    let source = concat!(
        "func fact(n: number) -> number {\n",
        "    if (n <= 1) { return 1 }\n",
        "    return n * fact(n - 1)\n",
        "}\n",
        "x : number = fact(5)\n",
        "s : string = \"a\" + \"b\"\n",
        "b : bool = x > 10 && s == \"ab\"\n",
        "while (b) { b = false }\n",
        "print(x, s, b)\n",
    );
    check(source).expect("program is well-typed");
}

#[test]
fn assignment_types_must_match() {
    let err = check("x : number = \"a\"").expect_err("NUMBER vs STRING");
    assert!(err.message.contains("expects NUMBER"), "{}", err.message);
}

#[test]
fn condition_must_be_bool() {
    let err = check("if (1) { }").expect_err("NUMBER condition");
    assert!(err.message.contains("expected BOOL"), "{}", err.message);

    let err = check("while (\"a\") { }").expect_err("STRING condition");
    assert!(err.message.contains("expected BOOL"), "{}", err.message);
}

#[test]
fn return_outside_a_function_is_rejected() {
    let err = check("return 1").expect_err("module-level return");
    assert!(err.message.contains("outside of a function"), "{}", err.message);
}

#[test]
fn return_type_must_match_the_signature() {
    let err = check("func f() -> number { return \"a\" }").expect_err("STRING vs NUMBER");
    assert!(err.message.contains("return in `f`"), "{}", err.message);
}

#[test]
fn return_matches_the_nearest_function() {
    check("func f() -> number { if (true) { return 1 } return 2 }")
        .expect("return inside a conditional still sees the function");
}

#[test]
fn break_and_continue_require_a_loop() {
    assert!(check("break").is_err());
    assert!(check("continue").is_err());
    assert!(check("if (true) { break }").is_err());
    check("while (true) { if (true) { break } continue }").expect("loop ancestors are fine");
}

#[test]
fn functions_only_at_module_level() {
    let err = check("if (true) { func f() -> void { } }").expect_err("nested definition");
    assert!(err.message.contains("local scopes"), "{}", err.message);
    assert!(check("while (true) { func g() -> void { } }").is_err());
    // A seq block is transparent grouping, not a local scope.
    check("seq { func h() -> void { } }").expect("seq does not nest definitions");
}

#[test]
fn par_bodies_are_calls_only() {
    let err = check("par { x : number = 1 }").expect_err("assignment in par");
    assert!(err.message.contains("par block"), "{}", err.message);
    check("func f() -> void { }\npar { f() print(\"x\") }").expect("calls are fine");
}

#[test]
fn call_arity_checks_non_default_parameters() {
    let source = "func f(a: number, b: number = 2) -> number { return a + b }\n";
    check(&format!("{source}x : number = f(1)")).expect("default fills in");
    check(&format!("{source}x : number = f(1, 5)")).expect("positional override");
    let err = check(&format!("{source}x : number = f()")).expect_err("missing argument");
    assert!(err.message.contains("at least 1"), "{}", err.message);
}

#[test]
fn all_defaulted_function_accepts_zero_arguments() {
    check("func f(a: number = 1) -> number { return a }\nx : number = f()")
        .expect("zero arguments with full defaults");
}

#[test]
fn default_must_match_the_parameter_type() {
    let err = check("func f(a: number = \"x\") -> void { }").expect_err("STRING default");
    assert!(err.message.contains("default for parameter"), "{}", err.message);
}

#[test]
fn indexing_a_number_is_rejected() {
    let err = check("n : number = 1\nx : string = n[0]").expect_err("NUMBER access");
    assert!(err.message.contains("only valid on strings"), "{}", err.message);
}

#[test]
fn equality_requires_equal_types() {
    let err = check("b : bool = 1 == \"a\"").expect_err("NUMBER vs STRING");
    assert!(err.message.contains("equal types"), "{}", err.message);
}

#[test]
fn ordering_requires_numbers() {
    let err = check("b : bool = \"a\" < \"b\"").expect_err("STRING ordering");
    assert!(err.message.contains("NUMBER"), "{}", err.message);
}

#[test]
fn plus_allows_matching_types_only() {
    check("s : string = \"a\" + \"b\"").expect("string concatenation");
    let err = check("x : number = 1 + true").expect_err("NUMBER + BOOL");
    assert!(err.message.contains("equal types"), "{}", err.message);
}

#[test]
fn logical_operands_must_be_bool() {
    let err = check("b : bool = 1 && true").expect_err("NUMBER operand");
    assert!(err.message.contains("BOOL"), "{}", err.message);
}

#[test]
fn unary_operand_types() {
    check("x : number = -1\nb : bool = !true").expect("well-typed unaries");
    assert!(check("x : number = -\"a\"").is_err());
    assert!(check("b : bool = !1").is_err());
}

#[test]
fn s_channel_function_must_be_string_to_string() {
    let good = concat!(
        "func echo(s: string) -> string { return s }\n",
        "s_channel srv { echo, \"d\", \"h\", 1 }\n",
    );
    check(good).expect("(string) -> string qualifies");

    let wrong_return = concat!(
        "func nope(s: string) -> number { return 1 }\n",
        "s_channel srv { nope, \"d\", \"h\", 1 }\n",
    );
    let err = check(wrong_return).expect_err("return type");
    assert!(err.message.contains("must return STRING"), "{}", err.message);

    let wrong_params = concat!(
        "func nope(a: string, b: string) -> string { return a }\n",
        "s_channel srv { nope, \"d\", \"h\", 1 }\n",
    );
    let err = check(wrong_params).expect_err("parameter count");
    assert!(
        err.message.contains("exactly one STRING parameter"),
        "{}",
        err.message
    );
}

#[test]
fn channel_host_and_port_types() {
    let err = check("c_channel cli { 1, 2 }").expect_err("NUMBER host");
    assert!(err.message.contains("must be STRING"), "{}", err.message);

    let err = check("c_channel cli { \"h\", \"p\" }").expect_err("STRING port");
    assert!(err.message.contains("must be NUMBER"), "{}", err.message);
}

#[test]
fn assert_condition_must_be_bool() {
    let good = Module {
        stmts: vec![Stmt::Assert {
            condition: Expr::Constant {
                ty: Type::Bool,
                lexeme: "true".to_owned(),
                line: 1,
            },
            message: None,
        }],
    };
    analyze(&good).expect("BOOL condition");

    let bad = Module {
        stmts: vec![Stmt::Assert {
            condition: Expr::Constant {
                ty: Type::Number,
                lexeme: "1".to_owned(),
                line: 1,
            },
            message: None,
        }],
    };
    let err = analyze(&bad).expect_err("NUMBER condition");
    assert!(err.message.contains("BOOL"), "{}", err.message);
}

#[test]
fn cast_takes_the_target_type() {
    let module = Module {
        stmts: vec![Stmt::Assign {
            left: Expr::Id {
                ty: Type::String,
                name: "s".to_owned(),
                decl: true,
                line: 1,
            },
            right: Expr::Cast {
                target: Type::String,
                expr: Box::new(Expr::Constant {
                    ty: Type::Number,
                    lexeme: "42".to_owned(),
                    line: 1,
                }),
                line: 1,
            },
        }],
    };
    analyze(&module).expect("cast result matches the declared type");
}

#[test]
fn noop_always_passes() {
    analyze(&Module {
        stmts: vec![Stmt::NoOp],
    })
    .expect("no-op has nothing to check");
}
