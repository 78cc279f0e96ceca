// Integration tests for the HypnoScript interpreter

use hypnoscript::checker::{DiagnosticCode, TypeChecker};
use hypnoscript::interpreter::{Interpreter, MockTerminal, RuntimeError, ScriptedInput};
use hypnoscript::parser::ast::Program;
use hypnoscript::parser::Parser;
use std::fs;

fn parse(source: &str) -> Program {
    Parser::new(source).parse_program().expect("Parsing failed")
}

fn run(source: &str) -> (Result<(), RuntimeError>, Vec<String>) {
    let program = parse(source);
    let terminal = MockTerminal::new();
    let mut interpreter = Interpreter::new().with_output(terminal.clone());
    let result = interpreter.execute(&program);
    (result, terminal.lines())
}

fn run_ok(source: &str) -> Vec<String> {
    let (result, lines) = run(source);
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    lines
}

#[test]
fn test_observe_sum() {
    let lines = run_ok("Focus induce x = 2 + 3; observe x; Relax");
    assert_eq!(lines, vec!["5"]);
}

#[test]
fn test_undefined_variable_fails_at_runtime_and_in_checker() {
    let source = "Focus observe ghost; Relax";

    let (result, _) = run(source);
    assert!(matches!(
        result,
        Err(RuntimeError::UndefinedVariable { ref name, .. }) if name == "ghost"
    ));

    let mut checker = TypeChecker::new();
    checker.check(&parse(source));
    let errors = checker.reporter().errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, DiagnosticCode::UndefinedVariable);
    assert!(errors[0].message.contains("ghost"));
}

#[test]
fn test_snap_ends_loop_on_first_iteration() {
    let source = r#"
        Focus
            induce i = 0;
            while (true) {
                i = i + 1;
                snap;
                observe "unreachable";
            }
            observe i;
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["1"]);
}

#[test]
fn test_forward_jump_skips_to_label() {
    let source = r#"
        Focus
            observe "a";
            sinkTo skip;
            observe "b";
            observe "also skipped";
            label skip;
            observe "c";
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["a", "c"]);
}

#[test]
fn test_failed_assertions_are_recorded_and_execution_continues() {
    let source = r#"
        Focus
            assert 1 == 2 "first";
            observe "still running";
            assert true;
            assert false;
            observe "end";
        Relax
    "#;
    let program = parse(source);
    let terminal = MockTerminal::new();
    let mut interpreter = Interpreter::new().with_output(terminal.clone());
    interpreter.execute(&program).expect("Execution failed");

    assert_eq!(terminal.lines(), vec!["still running", "end"]);
    let failures = interpreter.assertion_failures();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].message, "first");
    assert_eq!(failures[0].location.line, 3);
    assert_eq!(failures[1].message, "Assertion failed");
}

#[test]
fn test_backward_jump_from_nested_block() {
    let source = r#"
        Focus
            induce n = 0;
            label top;
            n = n + 1;
            if (n < 3) {
                sinkTo top;
            }
            observe n;
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["3"]);
}

#[test]
fn test_unresolved_label_is_an_error() {
    let (result, _) = run("Focus sinkTo nowhere; Relax");
    assert!(matches!(
        result,
        Err(RuntimeError::UnresolvedLabel { ref label, .. }) if label == "nowhere"
    ));
}

#[test]
fn test_snap_outside_loop_is_an_error() {
    let (result, _) = run("Focus observe 1; snap; Relax");
    assert!(matches!(
        result,
        Err(RuntimeError::JumpOutsideLoop { ref keyword, .. }) if keyword == "snap"
    ));
}

#[test]
fn test_counted_loop_with_sink() {
    let source = r#"
        Focus
            loop (induce i = 0; i < 5; i = i + 1) {
                if (i % 2 == 0) {
                    sink;
                }
                observe i;
            }
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["1", "3"]);
}

#[test]
fn test_else_if_chain_and_synonyms() {
    let source = r#"
        Focus
            induce a = 7;
            if (a fallUnderMySpell 5) {
                observe "small";
            } else if (a lookAtTheWatch 5 && a notSoDeep 8) {
                observe "medium";
            } else {
                observe "large";
            }
            if (a youAreFeelingVerySleepy 7) { observe "seven"; }
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["medium", "seven"]);
}

#[test]
fn test_suggestions_return_values_and_recurse() {
    let source = r#"
        Focus
            suggestion add(a: number, b: number): number {
                awaken a + b;
            }
            suggestion fact(n: number): number {
                if (n <= 1) {
                    awaken 1;
                }
                awaken n * fact(n - 1);
            }
            observe add(3, 4);
            observe fact(5);
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["7", "120"]);
}

#[test]
fn test_callee_does_not_see_caller_locals() {
    let source = r#"
        Focus
            suggestion peek(): number {
                awaken secret;
            }
            suggestion outer(): number {
                induce secret = 1;
                awaken peek();
            }
            observe outer();
        Relax
    "#;
    let (result, _) = run(source);
    assert!(matches!(
        result,
        Err(RuntimeError::UndefinedVariable { ref name, .. }) if name == "secret"
    ));
}

#[test]
fn test_argument_count_mismatch() {
    let source = r#"
        Focus
            suggestion one(a: number): number { awaken a; }
            observe one(1, 2);
        Relax
    "#;
    let (result, _) = run(source);
    assert!(matches!(
        result,
        Err(RuntimeError::ArgumentCountMismatch { expected: 1, got: 2, .. })
    ));
}

#[test]
fn test_call_depth_limit() {
    let source = r#"
        Focus
            suggestion forever(n: number): number {
                awaken forever(n + 1);
            }
            observe forever(0);
        Relax
    "#;
    let program = parse(source);
    let mut interpreter = Interpreter::new()
        .with_output(MockTerminal::new())
        .with_max_call_depth(16);
    let result = interpreter.execute(&program);
    assert!(matches!(
        result,
        Err(RuntimeError::CallDepthExceeded { limit: 16, .. })
    ));
}

#[test]
fn test_deep_recursion_under_default_limit() {
    let source = r#"
        Focus
            suggestion depth(n: number): number {
                if (n <= 0) {
                    awaken 0;
                }
                awaken 1 + depth(n - 1);
            }
            observe depth(250);
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["250"]);
}

#[test]
fn test_default_call_depth_limit() {
    let source = r#"
        Focus
            suggestion depth(n: number): number {
                if (n <= 0) {
                    awaken 0;
                }
                awaken 1 + depth(n - 1);
            }
            observe depth(1000);
        Relax
    "#;
    let (result, lines) = run(source);
    assert!(matches!(
        result,
        Err(RuntimeError::CallDepthExceeded { limit: 256, .. })
    ));
    assert!(lines.is_empty());
}

#[test]
fn test_recursive_field_initializer_hits_depth_limit() {
    let source = r#"
        Focus
            session Nest {
                expose induce inner = Nest();
            }
            induce n = Nest();
        Relax
    "#;
    let (result, _) = run(source);
    assert!(matches!(result, Err(RuntimeError::CallDepthExceeded { .. })));
}

#[test]
fn test_division_by_zero() {
    let (result, _) = run("Focus induce z = 0; observe 10 / z; Relax");
    assert!(matches!(result, Err(RuntimeError::DivisionByZero { .. })));
}

#[test]
fn test_hoisting_and_entrance_order() {
    let source = r#"
        Focus
            observe twice(2);
            entrance {
                observe "entrance";
            }
            suggestion twice(x: number): number {
                awaken x * 2;
            }
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["entrance", "4"]);
}

#[test]
fn test_top_level_awaken_ends_program() {
    assert_eq!(run_ok("Focus observe 1; awaken; observe 2; Relax"), vec!["1"]);
}

#[test]
fn test_session_instances_are_independent() {
    let source = r#"
        Focus
            session Counter {
                expose induce count: number = 0;
                suggestion increment() {
                    this.count = this.count + 1;
                }
            }
            induce a = Counter();
            induce b = Counter();
            a.increment();
            a.increment();
            b.increment();
            observe a.count;
            observe b.count;
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["2", "1"]);
}

#[test]
fn test_constructor_arguments_give_independent_instances() {
    let source = r#"
        Focus
            session Acc {
                expose induce total: number = 0;
                constructor(start: number) {
                    this.total = start;
                }
                suggestion add(n: number) {
                    this.total = this.total + n;
                }
            }
            induce a = Acc(1);
            induce b = Acc(10);
            a.add(5);
            observe a.total;
            observe b.total;
            b.add(100);
            observe a.total;
            observe b.total;
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["6", "10", "6", "110"]);
}

#[test]
fn test_session_constructor_and_concealed_member() {
    let source = r#"
        Focus
            session Greeter {
                conceal induce name: string = "";
                constructor(n: string) {
                    this.name = n;
                }
                suggestion greet(): string {
                    awaken "Hello, " + this.name;
                }
            }
            induce g = Greeter("Ada");
            observe g.greet();
            observe g.name;
        Relax
    "#;
    let (result, lines) = run(source);
    assert_eq!(lines, vec!["Hello, Ada"]);
    assert!(matches!(
        result,
        Err(RuntimeError::ConcealedMember { ref member, .. }) if member == "name"
    ));
}

#[test]
fn test_sessions_are_shared_by_reference() {
    let source = r#"
        Focus
            session Box {
                induce value: number = 1;
            }
            induce a = Box();
            induce b = a;
            b.value = 5;
            observe a.value;
            observe a == b;
            observe a == Box();
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["5", "true", "false"]);
}

#[test]
fn test_dominant_members_live_on_the_session() {
    let source = r#"
        Focus
            session Registry {
                dominant induce total: number = 0;
                dominant suggestion bump() {
                    Registry.total = Registry.total + 1;
                }
            }
            Registry.bump();
            Registry.bump();
            observe Registry.total;
            induce r = Registry();
            observe r.total;
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["2", "2"]);
}

#[test]
fn test_records_have_value_semantics() {
    let source = r#"
        Focus
            tranceify Person {
                name: string;
                age: number;
            }
            induce p = Person { name: "Alice", age: 30 };
            p.age = p.age + 1;
            induce q = p;
            q.name = "Bob";
            observe p;
            observe q.name;
        Relax
    "#;
    assert_eq!(
        run_ok(source),
        vec!["Person { name: Alice, age: 31 }", "Bob"]
    );
}

#[test]
fn test_record_missing_field_and_unknown_type() {
    let source = r#"
        Focus
            tranceify Point { x: number; y: number = 9; }
            induce p = Point { x: 1 };
            observe p.y;
            observe p.z;
        Relax
    "#;
    let (result, lines) = run(source);
    assert_eq!(lines, vec!["9"]);
    assert!(matches!(
        result,
        Err(RuntimeError::MissingMember { ref member, .. }) if member == "z"
    ));

    let (result, _) = run("Focus induce g = Ghost { a: 1 }; Relax");
    assert!(matches!(result, Err(RuntimeError::UnknownType { .. })));
}

#[test]
fn test_arrays_index_and_assign() {
    let source = r#"
        Focus
            induce xs = [1, 2, 3];
            xs[1] = 20;
            observe xs;
            observe xs[1] + xs[2];
            observe xs[3];
        Relax
    "#;
    let (result, lines) = run(source);
    assert_eq!(lines, vec!["[1, 20, 3]", "23"]);
    assert!(matches!(
        result,
        Err(RuntimeError::IndexOutOfBounds { index: 3, len: 3, .. })
    ));
}

#[test]
fn test_string_concatenation_and_intrinsics() {
    let source = r#"
        Focus
            induce name = "World";
            Observe("Hello, " + name + "!");
            drift(0);
            observe 1.5 + 1;
            observe !false;
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["Hello, World!", "2.5", "true"]);
}

#[test]
fn test_external_input() {
    let source = r#"
        Focus
            induce age: number from external;
            induce name from external;
            observe name + " is " + age;
        Relax
    "#;
    let program = parse(source);
    let terminal = MockTerminal::new();
    let mut interpreter = Interpreter::new()
        .with_output(terminal.clone())
        .with_input(ScriptedInput::new(["42", "Ada"]));
    interpreter.execute(&program).expect("Execution failed");
    assert_eq!(terminal.lines(), vec!["Ada is 42"]);

    let mut interpreter = Interpreter::new()
        .with_output(MockTerminal::new())
        .with_input(ScriptedInput::new(["forty-two"]));
    assert!(matches!(
        interpreter.execute(&program),
        Err(RuntimeError::InvalidInput { .. })
    ));

    let mut interpreter = Interpreter::new()
        .with_output(MockTerminal::new())
        .with_input(ScriptedInput::new(Vec::<String>::new()));
    assert!(matches!(
        interpreter.execute(&program),
        Err(RuntimeError::InputUnavailable { .. })
    ));
}

#[test]
fn test_execute_twice_starts_fresh() {
    let program = parse("Focus induce x = 1; observe x; assert false; Relax");
    let terminal = MockTerminal::new();
    let mut interpreter = Interpreter::new().with_output(terminal.clone());
    interpreter.execute(&program).expect("first run failed");
    interpreter.execute(&program).expect("second run failed");
    assert_eq!(terminal.lines(), vec!["1", "1"]);
    assert_eq!(interpreter.assertion_failures().len(), 1);
}

#[test]
fn test_redefinition_in_same_scope() {
    let (result, _) = run("Focus induce x = 1; induce x = 2; Relax");
    assert!(matches!(
        result,
        Err(RuntimeError::Redefinition { ref name, .. }) if name == "x"
    ));
}

#[test]
fn test_block_scopes_shadow_and_restore() {
    let source = r#"
        Focus
            induce x = 1;
            if (true) {
                induce x = 2;
                observe x;
            }
            observe x;
        Relax
    "#;
    assert_eq!(run_ok(source), vec!["2", "1"]);
}

// === mindLink ===

#[test]
fn test_mind_link_merges_declarations() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("lib.hyp"),
        r#"Focus
            suggestion double(x: number): number { awaken x * 2; }
            induce greeting = "hi";
            observe "not run";
        Relax"#,
    )
    .unwrap();

    let program = parse(r#"Focus mindLink "lib.hyp"; observe double(21); observe greeting; Relax"#);
    let terminal = MockTerminal::new();
    let mut interpreter = Interpreter::new()
        .with_output(terminal.clone())
        .with_base_dir(dir.path());
    interpreter.execute(&program).expect("Execution failed");
    assert_eq!(terminal.lines(), vec!["42", "hi"]);

    let mut checker = TypeChecker::new().with_base_dir(dir.path());
    checker.check(&program);
    assert!(
        !checker.reporter().has_errors(),
        "{:?}",
        checker.reporter().errors()
    );
}

#[test]
fn test_mind_link_collision_keeps_main_declaration() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("lib.hyp"),
        r#"Focus
            suggestion helper(): number { awaken 1; }
            suggestion extra(): number { awaken 2; }
        Relax"#,
    )
    .unwrap();

    let program = parse(
        r#"
        Focus
            mindLink "lib.hyp";
            suggestion helper(): number { awaken 3; }
            observe helper() + extra();
        Relax
    "#,
    );

    let mut checker = TypeChecker::new().with_base_dir(dir.path());
    checker.check(&program);
    assert!(!checker.reporter().has_errors());
    let warnings: Vec<_> = checker.reporter().warnings().iter().map(|d| d.code).collect();
    assert_eq!(warnings, vec![DiagnosticCode::LinkCollision]);

    let terminal = MockTerminal::new();
    let mut interpreter = Interpreter::new()
        .with_output(terminal.clone())
        .with_base_dir(dir.path());
    interpreter.execute(&program).expect("Execution failed");
    assert_eq!(terminal.lines(), vec!["5"]);
}

#[test]
fn test_mind_link_cycle_terminates() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("a.hyp"),
        r#"Focus mindLink "b.hyp"; induce fromA = 1; Relax"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("b.hyp"),
        r#"Focus mindLink "a.hyp"; induce fromB = 2; Relax"#,
    )
    .unwrap();

    let program = parse(r#"Focus mindLink "a.hyp"; observe fromA + fromB; Relax"#);
    let terminal = MockTerminal::new();
    let mut interpreter = Interpreter::new()
        .with_output(terminal.clone())
        .with_base_dir(dir.path());
    interpreter.execute(&program).expect("Execution failed");
    assert_eq!(terminal.lines(), vec!["3"]);
}

#[test]
fn test_mind_link_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let program = parse(r#"Focus mindLink "missing.hyp"; Relax"#);
    let mut interpreter = Interpreter::new()
        .with_output(MockTerminal::new())
        .with_base_dir(dir.path());
    assert!(matches!(
        interpreter.execute(&program),
        Err(RuntimeError::LinkFailure { ref path, .. }) if path == "missing.hyp"
    ));
}
