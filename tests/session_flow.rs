use replay_debugger::debugger::SourceType;
use replay_debugger::demo;
use replay_debugger::host::Value;
use replay_debugger::{DebugSessionManager, DebuggerError, SessionState};
use serde_json::json;
use std::sync::Arc;

fn manager() -> DebugSessionManager {
    DebugSessionManager::new(Arc::new(demo::program().unwrap()))
}

#[test]
fn echo_long_records_coerced_argument_and_return() {
    let manager = manager();
    let session = manager
        .start("demo.util.Sample#echo(long)", Some(&json!(5)))
        .unwrap();

    let root = session.root_step();
    assert_eq!(root.arguments(), [Value::Long(5)]);
    assert_eq!(root.return_value(), Some(&Value::Long(5)));
    assert_eq!(root.error_text(), None);
    assert_eq!(root.display_name(), "demo.util.Sample#echo");
    assert_eq!(session.steps().len(), 1);
    assert_eq!(session.current_step_index(), 0);
    assert_eq!(session.state(), SessionState::CompletedSuccess);
}

#[test]
fn undeclared_types_pass_input_through() {
    let manager = manager();

    let with_input = manager
        .start("demo.util.Sample#describe", Some(&json!(7)))
        .unwrap();
    assert_eq!(with_input.root_step().arguments(), [Value::Int(7)]);
    assert_eq!(with_input.root_step().return_value(), Some(&Value::text("int 7")));

    let without_input = manager.start("demo.util.Sample#echo", None).unwrap();
    assert!(without_input.root_step().arguments().is_empty());
    // echo takes one argument, so the arity mismatch is recorded on the root.
    assert!(without_input.root_step().has_error());

    let null_input = manager
        .start("demo.util.Sample#echo", Some(&serde_json::Value::Null))
        .unwrap();
    assert!(null_input.root_step().arguments().is_empty());
}

#[test]
fn undeclared_types_do_not_widen() {
    let manager = manager();
    let session = manager
        .start("demo.util.Sample#echo", Some(&json!(7)))
        .unwrap();
    assert_eq!(session.root_step().arguments(), [Value::Int(7)]);
    assert!(session
        .root_step()
        .error_text()
        .unwrap()
        .contains("no overload"));
}

#[test]
fn enum_and_text_coercion() {
    let manager = manager();
    let session = manager
        .start("demo.util.Sample#parity(demo.util.Parity)", Some(&json!("EVEN")))
        .unwrap();
    assert_eq!(session.root_step().return_value(), Some(&Value::text("even")));

    let session = manager
        .start("demo.util.Sample#parity(demo.util.Parity)", Some(&json!("even")))
        .unwrap();
    assert_eq!(session.state(), SessionState::CompletedError);
    assert!(session
        .root_step()
        .error_text()
        .unwrap()
        .contains("No enum constant demo.util.Parity.even"));

    let session = manager
        .start("demo.util.Sample#greet(String)", Some(&json!(42)))
        .unwrap();
    assert_eq!(session.root_step().return_value(), Some(&Value::text("Hello, 42!")));
}

#[test]
fn target_failure_is_recorded_not_raised() {
    let manager = manager();
    let session = manager.start("demo.util.Sample#fail", None).unwrap();
    assert_eq!(session.state(), SessionState::CompletedError);
    assert_eq!(
        session.root_step().error_text(),
        Some("IllegalStateException: requested failure")
    );
    assert_eq!(session.root_step().return_value(), None);

    let session = manager.start("demo.util.Sample#crash", None).unwrap();
    assert_eq!(session.root_step().error_text(), Some("panic: sample crashed"));
    assert_eq!(manager.len(), 2);
}

#[test]
fn resolution_failures_create_no_session() {
    let manager = manager();
    assert!(matches!(
        manager.start("demo.util.Missing#echo", None),
        Err(DebuggerError::TypeNotFound(_))
    ));
    assert!(matches!(
        manager.start("demo.util.Sample#nothing", None),
        Err(DebuggerError::OperationNotFound { .. })
    ));
    assert!(matches!(
        manager.start("#echo", None),
        Err(DebuggerError::ParseError(_))
    ));
    assert!(manager.is_empty());
}

#[test]
fn container_path_records_nested_layers() {
    let manager = manager();
    let session = manager
        .start("demo.user.UserController#getUser(long)", Some(&json!(1)))
        .unwrap();

    let names: Vec<String> = session.steps().iter().map(|s| s.display_name()).collect();
    assert_eq!(
        names,
        [
            "demo.user.UserController#getUser",
            "demo.user.UserRepository#findById",
            "demo.user.UserServiceImpl#getUser",
        ]
    );
    let depths: Vec<usize> = session.steps().iter().map(|s| s.depth()).collect();
    assert_eq!(depths, [0, 2, 1]);
    assert!(session
        .steps()
        .iter()
        .all(|s| s.source_type() == SourceType::Project));

    let user = session.root_step().return_value().unwrap().to_json();
    assert_eq!(user["name"], "ada");
}

#[test]
fn root_record_is_kept_when_dedupe_is_off() {
    let manager = manager().with_dedupe_root(false);
    let session = manager
        .start("demo.user.UserController#getUser(long)", Some(&json!(2)))
        .unwrap();
    assert_eq!(session.steps().len(), 4);
    let last = session.steps().last().unwrap();
    assert_eq!(last.display_name(), "demo.user.UserController#getUser");
    assert_eq!(last.depth(), 0);
}

#[test]
fn nested_failure_propagates_to_root() {
    let manager = manager();
    let session = manager
        .start("demo.user.UserController#getUser(long)", Some(&json!(99)))
        .unwrap();
    assert_eq!(
        session.root_step().error_text(),
        Some("IllegalStateException: no user with id 99")
    );
    let service = &session.steps()[2];
    assert_eq!(service.display_name(), "demo.user.UserServiceImpl#getUser");
    assert!(service.has_error());
    assert!(!session.steps()[1].has_error());
}

#[test]
fn each_session_gets_a_fresh_container() {
    let manager = manager();
    let first = manager
        .start("demo.user.UserController#register(String)", Some(&json!("linus")))
        .unwrap();
    let second = manager
        .start("demo.user.UserController#register(String)", Some(&json!("ken")))
        .unwrap();
    let id_of = |s: &replay_debugger::DebugSession| s.root_step().return_value().unwrap().to_json()["id"].clone();
    assert_eq!(id_of(&first), json!(3));
    assert_eq!(id_of(&second), json!(3));
}

#[test]
fn next_is_idempotent_at_the_last_step() {
    let manager = manager();
    let session = manager
        .start("demo.user.UserController#getUser(long)", Some(&json!(1)))
        .unwrap();
    let last_index = session.steps().len() - 1;

    for _ in 0..last_index {
        manager.next(session.id()).unwrap();
    }
    let (at_end, last) = manager.next(session.id()).unwrap();
    assert_eq!(at_end.current_step_index(), last_index);
    for _ in 0..3 {
        let (again, step) = manager.next(session.id()).unwrap();
        assert_eq!(again.current_step_index(), last_index);
        assert_eq!(step.id(), last.id());
    }
}

#[test]
fn unknown_session_is_reported() {
    let manager = manager();
    let err = manager.next("no-such-session").unwrap_err();
    assert!(matches!(err, DebuggerError::SessionNotFound(_)));
    assert_eq!(err.to_string(), "session not found");
}

#[test]
fn concurrent_sessions_do_not_share_records() {
    let manager = Arc::new(manager());
    let targets = [
        ("demo.user.UserController#getUser(long)", json!(1)),
        ("demo.user.UserController#count", serde_json::Value::Null),
    ];

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = manager.clone();
            let (target, input) = targets[i % 2].clone();
            std::thread::spawn(move || {
                let input = (!input.is_null()).then_some(input);
                (target, manager.start(target, input.as_ref()).unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (target, session) = handle.join().unwrap();
        let nested: Vec<&str> = session.steps()[1..]
            .iter()
            .map(|s| s.operation_name())
            .collect();
        if target.ends_with("getUser(long)") {
            assert_eq!(nested, ["findById", "getUser"]);
        } else {
            assert_eq!(nested, ["count", "countUsers"]);
        }
    }
    assert_eq!(manager.len(), 8);
}
