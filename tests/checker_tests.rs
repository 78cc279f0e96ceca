// Integration tests for the HypnoScript type checker

use hypnoscript::checker::{DiagnosticCode, TypeChecker};
use hypnoscript::parser::Parser;
use std::fs;

fn check(source: &str) -> TypeChecker {
    let program = Parser::new(source).parse_program().expect("Parsing failed");
    let mut checker = TypeChecker::new();
    checker.check(&program);
    checker
}

fn error_codes(checker: &TypeChecker) -> Vec<DiagnosticCode> {
    checker.reporter().errors().iter().map(|d| d.code).collect()
}

fn warning_codes(checker: &TypeChecker) -> Vec<DiagnosticCode> {
    checker.reporter().warnings().iter().map(|d| d.code).collect()
}

#[test]
fn test_well_typed_program_is_clean() {
    let source = r#"
        Focus
            suggestion add(a: number, b: number): number {
                awaken a + b;
            }
            session Counter {
                expose induce count: number = 0;
                suggestion increment() {
                    this.count = this.count + 1;
                }
            }
            tranceify Person {
                name: string;
                age: number;
            }
            induce total: number = add(1, 2);
            induce c = Counter();
            c.increment();
            induce p = Person { name: "Ada", age: 36 };
            observe p.name + " " + total;
            loop (induce i = 0; i < 3; i = i + 1) {
                if (i == 1) {
                    sink;
                }
                observe i;
            }
        Relax
    "#;
    let checker = check(source);
    assert!(
        checker.reporter().all().next().is_none(),
        "unexpected diagnostics: {:?}",
        checker.reporter().all().collect::<Vec<_>>()
    );
}

#[test]
fn test_declared_type_mismatch() {
    let checker = check(r#"Focus induce x: number = "five"; Relax"#);
    assert_eq!(error_codes(&checker), vec![DiagnosticCode::TypeMismatch]);
    let message = &checker.reporter().errors()[0].message;
    assert!(message.contains("'x'"), "{}", message);
    assert!(message.contains("number"), "{}", message);
    assert!(message.contains("string"), "{}", message);
}

#[test]
fn test_number_and_int_are_compatible() {
    let checker = check("Focus induce a: int = 3; induce b: number = a; Relax");
    assert!(!checker.reporter().has_errors());
}

#[test]
fn test_checking_continues_after_errors() {
    let checker = check("Focus observe ghost; observe phantom; Relax");
    assert_eq!(
        error_codes(&checker),
        vec![DiagnosticCode::UndefinedVariable, DiagnosticCode::UndefinedVariable]
    );
}

#[test]
fn test_redeclaration_in_same_scope() {
    let checker = check("Focus induce x = 1; induce x = 2; Relax");
    assert_eq!(error_codes(&checker), vec![DiagnosticCode::Redeclaration]);
}

#[test]
fn test_shadowing_in_nested_block_is_allowed() {
    let checker = check("Focus induce x = 1; if (true) { induce x = 2; observe x; } Relax");
    assert!(!checker.reporter().has_errors());
}

#[test]
fn test_concealed_member_outside_session() {
    let source = r#"
        Focus
            session Vault {
                conceal induce secret: number = 42;
                suggestion peek(): number {
                    awaken this.secret;
                }
            }
            induce v = Vault();
            observe v.peek();
            observe v.secret;
        Relax
    "#;
    let checker = check(source);
    assert_eq!(error_codes(&checker), vec![DiagnosticCode::ConcealedMember]);
}

#[test]
fn test_unknown_member() {
    let source = r#"
        Focus
            tranceify Point { x: number; y: number; }
            induce p = Point { x: 1, y: 2 };
            observe p.z;
        Relax
    "#;
    let checker = check(source);
    assert_eq!(error_codes(&checker), vec![DiagnosticCode::UnknownMember]);
}

#[test]
fn test_duplicate_tranceify_field() {
    let checker = check("Focus tranceify P { a: number; a: string; } Relax");
    assert_eq!(error_codes(&checker), vec![DiagnosticCode::DuplicateMember]);
}

#[test]
fn test_jumps_outside_loops_and_unknown_labels() {
    let checker = check("Focus snap; sinkTo nowhere; Relax");
    assert_eq!(
        error_codes(&checker),
        vec![DiagnosticCode::JumpOutsideLoop, DiagnosticCode::UnknownLabel]
    );
}

#[test]
fn test_forward_label_is_known() {
    let checker = check("Focus sinkTo done; observe 1; label done; Relax");
    assert!(!checker.reporter().has_errors());
}

#[test]
fn test_argument_count() {
    let source = r#"
        Focus
            suggestion one(a: number): number { awaken a; }
            observe one(1, 2);
        Relax
    "#;
    let checker = check(source);
    assert_eq!(error_codes(&checker), vec![DiagnosticCode::ArgumentCount]);
}

#[test]
fn test_imperative_suggestion_cannot_return_value() {
    let source = r#"
        Focus
            imperative suggestion log(msg: string) {
                awaken msg;
            }
        Relax
    "#;
    let checker = check(source);
    assert_eq!(error_codes(&checker), vec![DiagnosticCode::InvalidReturn]);
}

#[test]
fn test_unknown_function_only_warns() {
    let checker = check("Focus mystery(1); Relax");
    assert!(!checker.reporter().has_errors());
    assert_eq!(warning_codes(&checker), vec![DiagnosticCode::UnknownFunction]);
}

#[test]
fn test_non_boolean_condition_warns() {
    let checker = check("Focus induce n = 1; while (n) { snap; } Relax");
    assert!(!checker.reporter().has_errors());
    assert_eq!(warning_codes(&checker), vec![DiagnosticCode::NonBooleanCondition]);
}

#[test]
fn test_mind_link_collision_warns() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("lib.hyp"),
        r#"Focus
            suggestion helper(): number { awaken 1; }
            suggestion extra(): number { awaken 2; }
        Relax"#,
    )
    .unwrap();

    let source = r#"
        Focus
            mindLink "lib.hyp";
            suggestion helper(): number { awaken 3; }
            observe helper() + extra();
        Relax
    "#;
    let program = Parser::new(source).parse_program().unwrap();
    let mut checker = TypeChecker::new().with_base_dir(dir.path());
    checker.check(&program);

    assert!(
        !checker.reporter().has_errors(),
        "{:?}",
        checker.reporter().errors()
    );
    assert_eq!(warning_codes(&checker), vec![DiagnosticCode::LinkCollision]);
}

#[test]
fn test_mind_link_cycle_is_checked_once() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("a.hyp"),
        r#"Focus mindLink "b.hyp"; induce fromA: number = 1; Relax"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("b.hyp"),
        r#"Focus mindLink "a.hyp"; induce fromB: number = 2; Relax"#,
    )
    .unwrap();

    let program = Parser::new(r#"Focus mindLink "a.hyp"; observe fromA + fromB; Relax"#)
        .parse_program()
        .unwrap();
    let mut checker = TypeChecker::new().with_base_dir(dir.path());
    checker.check(&program);
    assert!(
        checker.reporter().all().next().is_none(),
        "{:?}",
        checker.reporter().all().collect::<Vec<_>>()
    );
}

#[test]
fn test_mind_link_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let program = Parser::new(r#"Focus mindLink "nope.hyp"; Relax"#)
        .parse_program()
        .unwrap();
    let mut checker = TypeChecker::new().with_base_dir(dir.path());
    checker.check(&program);
    assert_eq!(error_codes(&checker), vec![DiagnosticCode::LinkFailure]);
}
