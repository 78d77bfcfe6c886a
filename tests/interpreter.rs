use pretty_assertions::assert_eq;

use tern::error::RuntimeError;
use tern::interpreter::Interpreter;
use tern::parser::Parser;
use tern::scanner::Scanner;
use tern::token::Token;
use tern::value::Value;

/// Scan, parse, and interpret `source`, capturing everything `print` wrote
/// and the runtime error (if any) that ended the run.
fn run(source: &str) -> (String, Option<RuntimeError>) {
    let tokens: Vec<Token<'_>> = Scanner::new(source.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .expect("source should lex cleanly");

    let mut parser = Parser::new(&tokens);
    let statements = parser.parse().expect("source should parse cleanly");

    let mut output: Vec<u8> = Vec::new();
    let error = {
        let mut interpreter = Interpreter::with_output(&mut output);
        interpreter.interpret(&statements).err()
    };

    (String::from_utf8(output).expect("output is UTF-8"), error)
}

/// Like [`run`] but asserts the program finished without a runtime error.
fn run_ok(source: &str) -> String {
    let (output, error) = run(source);
    assert!(error.is_none(), "unexpected runtime error: {:?}", error);
    output
}

// ── arithmetic and printing ─────────────────────────────────────────

#[test]
fn arithmetic_honors_precedence() {
    assert_eq!(run_ok("print 1 + 2 * 3;"), "7\n");
}

#[test]
fn grouping_is_transparent() {
    assert_eq!(run_ok("print (2 + 3) * 4;"), "20\n");
}

#[test]
fn numbers_print_in_default_decimal_form() {
    assert_eq!(run_ok("print 0.5; print 2.5 * 2; print -3;"), "0.5\n5\n-3\n");
}

#[test]
fn strings_booleans_and_nil_print_raw() {
    assert_eq!(
        run_ok("print \"hello\"; print true; print false; print nil;"),
        "hello\ntrue\nfalse\nnil\n"
    );
}

#[test]
fn callables_print_as_placeholders() {
    assert_eq!(
        run_ok("fun f() { return nil; } print f; print clock;"),
        "<fn f>\n<native fn clock>\n"
    );
}

// ── variables and scoping ───────────────────────────────────────────

#[test]
fn block_shadowing_restores_outer_binding() {
    assert_eq!(
        run_ok("var a = 1; { var a = 2; print a; } print a;"),
        "2\n1\n"
    );
}

#[test]
fn assignment_without_declaration_mutates_outer_scope() {
    assert_eq!(run_ok("var x = 1; { x = 2; } print x;"), "2\n");
}

#[test]
fn var_without_initializer_is_nil() {
    assert_eq!(run_ok("var x; print x;"), "nil\n");
}

#[test]
fn assignment_is_an_expression_yielding_the_value() {
    assert_eq!(run_ok("var a = 0; var b = 0; a = b = 7; print a; print b;"), "7\n7\n");
}

#[test]
fn undefined_variable_read_is_fatal() {
    let (output, error) = run("print missing;");

    assert_eq!(output, "");
    assert!(matches!(
        error,
        Some(RuntimeError::UndefinedVariable { ref name, .. }) if name == "missing"
    ));
}

#[test]
fn assignment_never_declares() {
    let (_, error) = run("missing = 1;");

    assert!(matches!(
        error,
        Some(RuntimeError::UndefinedVariable { ref name, .. }) if name == "missing"
    ));
}

// ── control flow ────────────────────────────────────────────────────

#[test]
fn if_executes_exactly_one_branch() {
    assert_eq!(
        run_ok("if (1 < 2) print \"then\"; else print \"else\";"),
        "then\n"
    );
    assert_eq!(
        run_ok("if (2 < 1) print \"then\"; else print \"else\";"),
        "else\n"
    );
}

#[test]
fn while_reevaluates_its_condition() {
    assert_eq!(run_ok("var i = 0; while (i < 3) { i = i + 1; } print i;"), "3\n");
}

#[test]
fn for_loop_prints_each_iteration() {
    assert_eq!(
        run_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
        "0\n1\n2\n"
    );
}

#[test]
fn conditions_must_be_boolean() {
    let (_, error) = run("if (1) print 1;");
    assert!(matches!(error, Some(RuntimeError::TypeMismatch { .. })));

    let (_, error) = run("while (1) print 1;");
    assert!(matches!(error, Some(RuntimeError::TypeMismatch { .. })));
}

// ── operators ───────────────────────────────────────────────────────

#[test]
fn arithmetic_requires_numbers() {
    let (_, error) = run("print \"a\" + \"b\";");
    assert!(matches!(error, Some(RuntimeError::TypeMismatch { .. })));

    let (_, error) = run("print -\"a\";");
    assert!(matches!(error, Some(RuntimeError::TypeMismatch { .. })));
}

#[test]
fn bang_requires_a_boolean() {
    assert_eq!(run_ok("print !true; print !!true;"), "false\ntrue\n");

    let (_, error) = run("print !0;");
    assert!(matches!(error, Some(RuntimeError::TypeMismatch { .. })));
}

#[test]
fn division_by_zero_is_fatal_not_infinite() {
    let (output, error) = run("print 5 / 0;");

    assert_eq!(output, "");
    assert!(matches!(error, Some(RuntimeError::DivisionByZero { .. })));
}

#[test]
fn equality_is_total_over_types() {
    assert_eq!(
        run_ok(
            "print 1 == 1; print 1 == \"1\"; print \"a\" == \"a\"; \
             print nil == nil; print true != false;"
        ),
        "true\nfalse\ntrue\ntrue\ntrue\n"
    );
}

#[test]
fn comparisons_require_numbers() {
    let (_, error) = run("print \"a\" < \"b\";");
    assert!(matches!(error, Some(RuntimeError::TypeMismatch { .. })));
}

// ── logical operators: no short-circuit ─────────────────────────────

#[test]
fn and_evaluates_right_operand_even_when_left_is_false() {
    let source = "\
        var hits = 0;\n\
        fun probe() { hits = hits + 1; return true; }\n\
        print false and probe();\n\
        print hits;";

    assert_eq!(run_ok(source), "false\n1\n");
}

#[test]
fn or_evaluates_right_operand_even_when_left_is_true() {
    let source = "\
        var hits = 0;\n\
        fun probe() { hits = hits + 1; return false; }\n\
        print true or probe();\n\
        print hits;";

    assert_eq!(run_ok(source), "true\n1\n");
}

#[test]
fn logical_operands_must_be_boolean_on_both_sides() {
    let (_, error) = run("print false and 3;");
    assert!(matches!(error, Some(RuntimeError::TypeMismatch { .. })));
}

// ── functions, closures, return ─────────────────────────────────────

#[test]
fn function_call_returns_its_value() {
    assert_eq!(
        run_ok("fun add(a,b) { return a+b; } print add(2,3);"),
        "5\n"
    );
}

#[test]
fn function_without_return_yields_nil() {
    assert_eq!(run_ok("fun f() { 1 + 1; } print f();"), "nil\n");
    assert_eq!(run_ok("fun g() { return; } print g();"), "nil\n");
}

#[test]
fn recursion_sees_its_own_binding() {
    assert_eq!(
        run_ok("fun fib(n) { if (n < 2) { return n; } return fib(n - 1) + fib(n - 2); } print fib(10);"),
        "55\n"
    );
}

#[test]
fn return_unwinds_loops_and_blocks_but_stops_at_the_call() {
    let source = "\
        fun find() {\n\
          for (var i = 0; i < 10; i = i + 1) {\n\
            if (i == 3) { return i; }\n\
          }\n\
          return 0 - 1;\n\
        }\n\
        print find();";

    assert_eq!(run_ok(source), "3\n");
}

#[test]
fn closures_capture_their_defining_environment_by_reference() {
    let source = "\
        fun counter() {\n\
          var count = 0;\n\
          fun tick() {\n\
            count = count + 1;\n\
            return count;\n\
          }\n\
          return tick;\n\
        }\n\
        var c = counter();\n\
        print c();\n\
        print c();";

    assert_eq!(run_ok(source), "1\n2\n");
}

#[test]
fn sibling_closures_alias_the_same_bindings() {
    let source = "\
        var bump = nil;\n\
        var read = nil;\n\
        {\n\
          var shared = 10;\n\
          fun inc() { shared = shared + 1; return shared; }\n\
          fun get() { return shared; }\n\
          bump = inc;\n\
          read = get;\n\
        }\n\
        print bump();\n\
        print read();";

    assert_eq!(run_ok(source), "11\n11\n");
}

#[test]
fn call_frames_are_children_of_the_closure_not_the_caller() {
    // `shadow` must read the global `x`, not the caller's local one.
    let source = "\
        var x = \"global\";\n\
        fun shadow() { return x; }\n\
        fun caller() {\n\
          var x = \"local\";\n\
          return shadow();\n\
        }\n\
        print caller();";

    assert_eq!(run_ok(source), "global\n");
}

#[test]
fn calling_a_non_function_is_fatal() {
    let (output, error) = run("print 1; 2();");

    assert_eq!(output, "1\n", "no partial output from the call itself");
    assert!(matches!(error, Some(RuntimeError::NotCallable { .. })));
}

#[test]
fn arity_is_checked_before_the_body_runs() {
    let (_, error) = run("fun f(a) { return a; } f(1, 2);");

    assert!(matches!(
        error,
        Some(RuntimeError::ArityMismatch { expected: 1, got: 2, .. })
    ));
}

#[test]
fn return_at_top_level_is_a_stray_return() {
    let (_, error) = run("return 1;");
    assert!(matches!(error, Some(RuntimeError::StrayReturn { .. })));

    let (_, error) = run("{ return; }");
    assert!(matches!(error, Some(RuntimeError::StrayReturn { .. })));
}

// ── runtime error model ─────────────────────────────────────────────

#[test]
fn first_runtime_error_aborts_the_rest_of_the_run() {
    let (output, error) = run("print 1; print missing; print 2;");

    assert_eq!(output, "1\n");
    assert!(error.is_some());
}

#[test]
fn runtime_errors_carry_the_source_line() {
    let (_, error) = run("var a = 1;\nvar b = 2;\nprint a / 0;");

    match error {
        Some(RuntimeError::DivisionByZero { line }) => assert_eq!(line, 3),
        other => panic!("Expected DivisionByZero, got {:?}", other),
    }
}

// ── natives and the expression entry point ──────────────────────────

#[test]
fn clock_returns_a_positive_number_of_seconds() {
    assert_eq!(run_ok("print clock() > 0;"), "true\n");
}

#[test]
fn clock_checks_its_arity() {
    let (_, error) = run("clock(1);");

    assert!(matches!(
        error,
        Some(RuntimeError::ArityMismatch { expected: 0, got: 1, .. })
    ));
}

#[test]
fn evaluate_computes_a_single_expression() {
    let tokens: Vec<Token<'_>> = Scanner::new(b"1 + 2 * 3")
        .collect::<Result<Vec<_>, _>>()
        .expect("expression should lex");

    let mut parser = Parser::new(&tokens);
    let expr = parser.parse_expression().expect("expression should parse");

    let mut interpreter = Interpreter::new();
    let value = interpreter.evaluate(&expr).expect("expression should evaluate");

    assert_eq!(value, Value::Number(7.0));
}
