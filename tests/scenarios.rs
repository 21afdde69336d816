//! End-to-end scenarios driving a [`DebugSession`] against the scripted
//! mock runtime in `support/mock.rs`: breakpoint hit, step-over across a
//! call, pause during a busy loop, evaluate with an exception, repr
//! truncation, and reference expiry after resume.

#[path = "support/mock.rs"]
mod mock;

use std::sync::Arc;
use std::thread;

use tracepit::{BreakpointSpec, DebugSession, RenderFormat, Source, Value};
use mock::{MockFrame, MockRuntime, RecordingTransport};

fn session(runtime: Arc<MockRuntime>) -> (DebugSession, Arc<RecordingTransport>) {
    let transport = RecordingTransport::new();
    let session = DebugSession::new(runtime, transport.clone());
    (session, transport)
}

#[test]
fn breakpoint_hit_suspends_and_reports_stack_and_locals() {
    let runtime = MockRuntime::new(vec![(1, "main")]);
    let (session, transport) = session(runtime.clone());

    session
        .set_breakpoints(
            &Source {
                name: Some("a.py".to_string()),
                path: Some("a.py".to_string()),
            },
            vec![BreakpointSpec {
                line: 10,
                condition: None,
                hit_condition: None,
                log_message: None,
            }],
        )
        .unwrap();

    let frame = MockFrame::new(1, "a.py", 10, "<module>").with_local("x", Value::Int(42));
    let handle = thread::spawn(move || runtime.fire_line(1, frame));

    let stopped = transport.wait_for_event("stopped").expect("stopped event");
    assert_eq!(stopped["body"]["reason"], "breakpoint");
    assert_eq!(stopped["body"]["threadId"], 1);

    let frames = session.stack_trace(1, None).expect("stack trace");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].line, 10);

    let scopes = session.scopes(frames[0].id).expect("scopes");
    let locals_ref = scopes[0].variables_reference;
    let vars = session.variables(locals_ref, None).expect("locals");
    assert!(vars.iter().any(|v| v.name == "x" && v.value == "42"));

    session.continue_(1);
    handle.join().unwrap();
}

#[test]
fn step_over_stops_after_the_call_returns_on_the_next_line() {
    let runtime = MockRuntime::new(vec![(1, "main")]);
    let (session, transport) = session(runtime.clone());

    let origin = MockFrame::new(1, "a.py", 5, "<module>");
    let (_, handle) = suspend_on(&session, &runtime, &transport, origin.clone());
    session.next(1);
    handle.join().unwrap();

    // While stepping over, a line inside a called function must not stop:
    // the call chain still contains the step's origin frame (id 1), but
    // the predicate only fires once that frame itself moves to a new line.
    let r2 = runtime.clone();
    let inner_call = MockFrame::new(2, "a.py", 50, "helper").with_caller(origin.clone());
    let h2 = thread::spawn(move || r2.fire_line(1, inner_call));
    h2.join().unwrap();

    let r3 = runtime.clone();
    let next_line = MockFrame::new(1, "a.py", 6, "<module>");
    let h3 = thread::spawn(move || r3.fire_line(1, next_line));
    let stopped = transport.wait_for_event("stopped").expect("step stop");
    assert_eq!(stopped["body"]["reason"], "step");
    session.continue_(1);
    h3.join().unwrap();
}

#[test]
fn pause_interrupts_a_busy_loop_on_its_next_line_event() {
    let runtime = MockRuntime::new(vec![(1, "main")]);
    let (session, transport) = session(runtime.clone());

    session.pause(1);

    let frame = MockFrame::new(1, "loop.py", 3, "<module>");
    let r = runtime.clone();
    let handle = thread::spawn(move || r.fire_line(1, frame));

    let stopped = transport.wait_for_event("stopped").expect("paused");
    assert_eq!(stopped["body"]["reason"], "pause");

    session.continue_(1);
    handle.join().unwrap();
}

#[test]
fn evaluate_of_an_undefined_name_surfaces_as_an_exception_value() {
    let runtime = MockRuntime::new(vec![(1, "main")]);
    let (session, transport) = session(runtime.clone());

    let frame = MockFrame::new(1, "a.py", 1, "<module>");
    let (frame_id, handle) = suspend_on(&session, &runtime, &transport, frame);

    let result = session.evaluate("missing_name", Some(frame_id), None).unwrap();
    assert!(result.value.contains("NameError"));
    assert_eq!(result.type_name.as_deref(), Some("EvalError"));
    // An exception result must still be expandable (SPEC_FULL §8 scenario 4).
    assert_ne!(result.variables_reference, 0);
    let args = session.variables(result.variables_reference, None).unwrap();
    assert!(args.iter().any(|v| v.name == "args"));

    session.continue_(1);
    handle.join().unwrap();
}

#[test]
fn evaluate_render_format_truncates_long_values() {
    let runtime = MockRuntime::new(vec![(1, "main")]);
    let (session, transport) = session(runtime.clone());

    let long = "x".repeat(5000);
    let frame = MockFrame::new(1, "a.py", 1, "<module>").with_local("big", Value::Str(long));
    let (frame_id, handle) = suspend_on(&session, &runtime, &transport, frame);

    let format = RenderFormat {
        max_length: 20,
        ..RenderFormat::default()
    };
    let result = session.evaluate("big", Some(frame_id), Some(format)).unwrap();
    assert!(result.value.len() <= 20);

    session.continue_(1);
    handle.join().unwrap();
}

#[test]
fn variables_reference_expires_once_the_owning_frame_is_invalidated() {
    let runtime = MockRuntime::new(vec![(1, "main")]);
    let (session, transport) = session(runtime.clone());

    let frame = MockFrame::new(1, "a.py", 1, "<module>").with_local("x", Value::Int(1));
    let (frame_id, handle) = suspend_on(&session, &runtime, &transport, frame);

    let scopes = session.scopes(frame_id).unwrap();
    let locals_ref = scopes[0].variables_reference;

    session.continue_(1);
    handle.join().unwrap();

    let result = session.variables(locals_ref, None);
    assert!(result.is_err());
}

/// Pause thread 1, fire one LINE event for it on a background thread, and
/// wait for the resulting `stopped` event. Returns the id of the frame
/// captured at that stop and the join handle for the still-blocked
/// debuggee thread, which the caller must `continue_`/join.
fn suspend_on(
    session: &DebugSession,
    runtime: &Arc<MockRuntime>,
    transport: &Arc<RecordingTransport>,
    frame: MockFrame,
) -> (i64, thread::JoinHandle<tracepit::EventAction>) {
    session.pause(1);
    let r = runtime.clone();
    let handle = thread::spawn(move || r.fire_line(1, frame));
    transport.wait_for_event("stopped").expect("stopped event");

    let frames = session.stack_trace(1, None).unwrap();
    (frames[0].id, handle)
}
