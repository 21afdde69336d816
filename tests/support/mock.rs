//! A scripted [`Runtime`]/[`Frame`] pair for driving the tracing core from
//! integration tests without a real language interpreter.
//!
//! A test spawns a thread that calls [`MockRuntime::fire_line`] (or the
//! exception-shaped callbacks) to play back a debuggee's execution one
//! event at a time; `fire_line` blocks exactly as a real monitoring
//! callback would when the tracing core decides to suspend, so the test's
//! main thread drives `DebugSession` the same way a real client would.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use tracepit::{EventAction, Frame, MonitorSink, Runtime, ThreadId, Transport, Value};

#[derive(Clone)]
pub struct MockFrame {
    pub identity: usize,
    pub path: String,
    pub line: u32,
    pub function_name: String,
    pub is_internal: bool,
    pub caller: Option<Box<MockFrame>>,
    pub locals: Vec<(String, Value)>,
    pub globals: Vec<(String, Value)>,
}

impl MockFrame {
    pub fn new(identity: usize, path: &str, line: u32, function_name: &str) -> Self {
        MockFrame {
            identity,
            path: path.to_string(),
            line,
            function_name: function_name.to_string(),
            is_internal: false,
            caller: None,
            locals: Vec::new(),
            globals: Vec::new(),
        }
    }

    pub fn with_caller(mut self, caller: MockFrame) -> Self {
        self.caller = Some(Box::new(caller));
        self
    }

    pub fn with_local(mut self, name: &str, value: Value) -> Self {
        self.locals.push((name.to_string(), value));
        self
    }
}

impl Frame for MockFrame {
    fn identity(&self) -> usize {
        self.identity
    }

    fn source_path(&self) -> String {
        self.path.clone()
    }

    fn line(&self) -> u32 {
        self.line
    }

    fn function_name(&self) -> String {
        self.function_name.clone()
    }

    fn is_internal(&self) -> bool {
        self.is_internal
    }

    fn caller(&self) -> Option<Box<dyn Frame>> {
        self.caller.clone().map(|f| f as Box<dyn Frame>)
    }

    fn locals(&self) -> Vec<(String, Value)> {
        self.locals.clone()
    }

    fn globals(&self) -> Vec<(String, Value)> {
        self.globals.clone()
    }

    fn evaluate(&self, expr: &str) -> Result<Value, String> {
        self.locals
            .iter()
            .chain(self.globals.iter())
            .find(|(name, _)| name == expr)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| format!("NameError: name '{}' is not defined", expr))
    }
}

pub struct MockRuntime {
    threads: Vec<(ThreadId, String)>,
    monitor: Mutex<Option<Arc<dyn MonitorSink>>>,
    top_frames: Mutex<HashMap<ThreadId, MockFrame>>,
}

impl MockRuntime {
    pub fn new(threads: Vec<(ThreadId, &str)>) -> Arc<Self> {
        Arc::new(MockRuntime {
            threads: threads.into_iter().map(|(id, name)| (id, name.to_string())).collect(),
            monitor: Mutex::new(None),
            top_frames: Mutex::new(HashMap::new()),
        })
    }

    /// Play back one LINE event for `thread`, blocking exactly as a real
    /// embedder callback would if the tracing core decides to suspend.
    pub fn fire_line(&self, thread: ThreadId, frame: MockFrame) -> EventAction {
        self.top_frames.lock().unwrap().insert(thread, frame.clone());
        let monitor = self
            .monitor
            .lock()
            .unwrap()
            .clone()
            .expect("session must be constructed before firing events");
        let path = frame.path.clone();
        let line = frame.line;
        monitor.on_line(thread, &frame, &path, line)
    }

    pub fn fire_raise(&self, thread: ThreadId, frame: &MockFrame, exc: &Value) {
        let monitor = self.monitor.lock().unwrap().clone().unwrap();
        monitor.on_raise(thread, frame, exc);
    }
}

impl Runtime for MockRuntime {
    fn threads(&self) -> Vec<(ThreadId, String)> {
        self.threads.clone()
    }

    fn top_frame(&self, thread: ThreadId) -> Option<Box<dyn Frame>> {
        self.top_frames
            .lock()
            .unwrap()
            .get(&thread)
            .cloned()
            .map(|f| Box::new(f) as Box<dyn Frame>)
    }

    fn register_monitor(&self, sink: Arc<dyn MonitorSink>) {
        *self.monitor.lock().unwrap() = Some(sink);
    }

    fn restart_events(&self) {}
}

/// Collects every response/event body a [`tracepit::DebugSession`]
/// sends, and lets a test block until one matching a predicate arrives.
pub struct RecordingTransport {
    messages: Mutex<Vec<serde_json::Value>>,
    condvar: Condvar,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingTransport {
            messages: Mutex::new(Vec::new()),
            condvar: Condvar::new(),
        })
    }

    pub fn messages(&self) -> Vec<serde_json::Value> {
        self.messages.lock().unwrap().clone()
    }

    /// Block (up to 2 seconds) until a message satisfying `predicate` has
    /// been sent, returning it.
    pub fn wait_for(&self, predicate: impl Fn(&serde_json::Value) -> bool) -> Option<serde_json::Value> {
        let mut messages = self.messages.lock().unwrap();
        loop {
            if let Some(found) = messages.iter().find(|m| predicate(m)) {
                return Some(found.clone());
            }
            let (guard, timeout) = self
                .condvar
                .wait_timeout(messages, Duration::from_secs(2))
                .unwrap();
            messages = guard;
            if timeout.timed_out() {
                return messages.iter().find(|m| predicate(m)).cloned();
            }
        }
    }

    pub fn wait_for_event(&self, name: &str) -> Option<serde_json::Value> {
        self.wait_for(|m| m.get("type").and_then(|t| t.as_str()) == Some("event") && m.get("event").and_then(|e| e.as_str()) == Some(name))
    }
}

impl Transport for RecordingTransport {
    fn send(&self, body: serde_json::Value) {
        self.messages.lock().unwrap().push(body);
        self.condvar.notify_all();
    }
}
