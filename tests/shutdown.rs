//! End-of-process sequence: terminal faults, user and deferred callbacks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tripwire::config::ConfigError;
use tripwire::host::Host;
use tripwire::{Channel, Location, RawSignal, Severity};

mod common;

use common::{builder, config, descriptor, recording, with_fn, Calls};

fn out_of_memory() -> RawSignal {
    RawSignal::Terminal {
        code: Severity::FATAL,
        message: "out of memory".into(),
        location: Some(Location::new("src/alloc.rs", 12)),
    }
}

#[test]
fn test_terminal_fault_dispatched_on_shutdown_channel() {
    let calls = Calls::default();
    let (builder, host) = builder(config(Severity::ALL, vec![descriptor("rec")]));
    let seen = calls.clone();
    let interceptor = builder
        .notifier(
            "rec",
            with_fn(move |ctx| {
                seen.push(format!("{}:{}", ctx.fault().channel(), ctx.fault().message()));
                false
            }),
        )
        .build();

    host.record_terminal(out_of_memory());
    interceptor.capture_shutdown();

    assert_eq!(calls.entries(), vec!["shutdown:out of memory"]);
    assert!(!host.has_terminal_fault());
    assert_eq!(interceptor.last_fault().unwrap().channel(), Channel::Shutdown);
}

#[test]
fn test_terminal_fault_during_notify_goes_to_self_handler() {
    let calls = Calls::default();
    let (builder, host) = builder(config(Severity::ALL, vec![descriptor("dying"), descriptor("rec")]));
    let interceptor = builder
        .notifier(
            "dying",
            with_fn(|ctx| {
                let interceptor = ctx.interceptor();
                interceptor.host().record_terminal(out_of_memory());
                interceptor.capture_shutdown();
                false
            }),
        )
        .notifier("rec", recording(&calls, false))
        .build();

    interceptor.trigger(Severity::WARNING, "while rendering");

    assert_eq!(calls.entries(), vec!["rec:WARNING:while rendering"]);
    let diagnostics = host.diagnostics();
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics[0].contains("while rendering"));
    assert_eq!(
        diagnostics[1],
        "[tripwire] self fault FATAL: out of memory at src/alloc.rs:12"
    );
}

#[test]
fn test_nested_exception_keeps_dispatched_fault() {
    let (builder, host) = builder(config(Severity::ALL, vec![descriptor("dying")]));
    let interceptor = builder
        .notifier(
            "dying",
            with_fn(|ctx| {
                let interceptor = ctx.interceptor();
                interceptor.capture_exception(RawSignal::RuntimeError {
                    code: Severity::NOTICE,
                    message: "nested notice".into(),
                    location: None,
                });
                interceptor.host().record_terminal(out_of_memory());
                interceptor.capture_shutdown();
                false
            }),
        )
        .build();

    interceptor.trigger(Severity::WARNING, "original fault");

    let diagnostics = host.diagnostics();
    assert_eq!(diagnostics.len(), 3);
    assert_eq!(diagnostics[0], "[tripwire] self fault NOTICE: nested notice at unknown location");
    assert!(diagnostics[1].starts_with("[tripwire] error fault WARNING: original fault at "));
    assert_eq!(
        diagnostics[2],
        "[tripwire] self fault FATAL: out of memory at src/alloc.rs:12"
    );
    assert_eq!(interceptor.last_fault().unwrap().message(), "original fault");
}

#[test]
fn test_user_callback_panic_goes_through_pipeline() {
    let calls = Calls::default();
    let (builder, host) = builder(config(Severity::ALL, vec![descriptor("rec")]));
    let interceptor = builder.notifier("rec", recording(&calls, false)).build();

    interceptor.add_user_callback(|| panic!("cleanup failed"));
    let after = calls.clone();
    interceptor.add_user_callback(move || after.push("second callback"));
    interceptor.capture_shutdown();

    assert_eq!(calls.entries(), vec!["rec:ERROR:cleanup failed", "second callback"]);
    assert!(host.diagnostics().is_empty());
}

#[test]
fn test_deferred_callback_panic_goes_to_self_handler() {
    let calls = Calls::default();
    let (builder, host) = builder(config(Severity::ALL, vec![descriptor("rec")]));
    let interceptor = builder.notifier("rec", recording(&calls, false)).build();

    interceptor.add_deferred_callback(|_| panic!("flush failed"));
    interceptor.capture_shutdown();

    assert!(calls.entries().is_empty());
    let diagnostics = host.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].starts_with("[tripwire] self fault ERROR: flush failed"));
}

#[test]
fn test_user_callbacks_run_before_deferred() {
    let calls = Calls::default();
    let (builder, _host) = builder(config(Severity::ALL, vec![]));
    let interceptor = builder.build();

    let deferred = calls.clone();
    interceptor.add_deferred_callback(move |_| deferred.push("deferred"));
    let user = calls.clone();
    interceptor.add_user_callback(move || user.push("user"));
    interceptor.capture_shutdown();

    assert_eq!(calls.entries(), vec!["user", "deferred"]);
}

#[test]
fn test_shutdown_runs_once() {
    let (builder, _host) = builder(config(Severity::ALL, vec![]));
    let interceptor = builder.build();
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    interceptor.add_user_callback(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    interceptor.capture_shutdown();
    interceptor.capture_shutdown();

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_run_returns_body_value() {
    let calls = Calls::default();
    let (builder, host) = builder(config(Severity::ALL, vec![descriptor("rec")]));
    let interceptor = builder.notifier("rec", recording(&calls, false)).build();
    let user = calls.clone();
    interceptor.add_user_callback(move || user.push("cleanup"));

    let value = interceptor.run(|| Ok::<_, ConfigError>(42));

    assert_eq!(value, Some(42));
    assert_eq!(calls.entries(), vec!["cleanup"]);
    assert!(host.diagnostics().is_empty());
}

#[test]
fn test_run_error_becomes_terminal_fault() {
    let calls = Calls::default();
    let (builder, host) = builder(config(Severity::ALL, vec![descriptor("rec")]));
    let seen = calls.clone();
    let interceptor = builder
        .notifier(
            "rec",
            with_fn(move |ctx| {
                seen.push(format!("{}:{}", ctx.fault().channel(), ctx.fault().message()));
                false
            }),
        )
        .build();

    let value: Option<()> = interceptor.run(|| Err(ConfigError::Source("lost connection".into())));

    assert_eq!(value, None);
    assert_eq!(calls.entries(), vec!["shutdown:Config source error: lost connection"]);
    assert!(!host.has_terminal_fault());
}

#[test]
fn test_run_panic_becomes_exception() {
    let calls = Calls::default();
    let (builder, host) = builder(config(Severity::ALL, vec![descriptor("rec")]));
    let interceptor = builder.notifier("rec", recording(&calls, false)).build();

    let value: Option<()> = interceptor.run(|| -> Result<(), ConfigError> { panic!("body crashed") });

    assert_eq!(value, None);
    assert_eq!(calls.entries(), vec!["rec:ERROR:body crashed"]);
    assert_eq!(interceptor.last_fault().unwrap().channel(), Channel::Exception);
    assert!(host.exits().is_empty());
}

#[test]
fn test_unrecoverable_terminate_runs_shutdown_first() {
    let calls = Calls::default();
    let (builder, host) = builder(config(Severity::ALL, vec![descriptor("rec")]));
    let interceptor = builder.notifier("rec", recording(&calls, false)).build();
    let observer = host.clone();
    let user = calls.clone();
    interceptor.add_user_callback(move || user.push(format!("cleanup, exits so far {}", observer.exits().len())));

    interceptor.trigger(Severity::USER_ERROR, "fatal input");

    assert_eq!(
        calls.entries(),
        vec!["rec:USER_ERROR:fatal input", "cleanup, exits so far 0"]
    );
    assert_eq!(host.exits(), vec![3]);
}
