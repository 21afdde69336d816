use crate::value::Value;

/// The outcome a monitoring callback hands back to the runtime for a
/// single code object.
///
/// Returning `Disable` tells the runtime to stop delivering further line
/// events for that code object until [`Runtime::restart_events`] is
/// called; this keeps tracing overhead proportional to the number of
/// instrumented code paths rather than to total line throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Continue,
    Disable,
}

/// A monitoring-event callback target, implemented by the tracing core and
/// registered with a [`Runtime`].
///
/// Implementations must never let a panic escape: a failure here must be
/// caught and logged by the core, not propagated into the runtime, since
/// that would disable tracing process-wide.
pub trait MonitorSink: Send + Sync {
    /// A line is about to execute. `path` is not yet canonicalized.
    fn on_line(&self, thread: ThreadId, frame: &dyn Frame, path: &str, line: u32) -> EventAction;

    fn on_py_start(&self, thread: ThreadId, frame: &dyn Frame) {
        let _ = (thread, frame);
    }
    fn on_py_return(&self, thread: ThreadId, frame: &dyn Frame) {
        let _ = (thread, frame);
    }
    fn on_py_resume(&self, thread: ThreadId, frame: &dyn Frame) {
        let _ = (thread, frame);
    }
    fn on_py_yield(&self, thread: ThreadId, frame: &dyn Frame) {
        let _ = (thread, frame);
    }
    fn on_py_throw(&self, thread: ThreadId, frame: &dyn Frame, exc: &Value) {
        let _ = (thread, frame, exc);
    }
    fn on_py_unwind(&self, thread: ThreadId, frame: &dyn Frame, exc: &Value) {
        let _ = (thread, frame, exc);
    }
    fn on_raise(&self, thread: ThreadId, frame: &dyn Frame, exc: &Value) {
        let _ = (thread, frame, exc);
    }
    fn on_reraise(&self, thread: ThreadId, frame: &dyn Frame, exc: &Value) {
        let _ = (thread, frame, exc);
    }
    fn on_exception_handled(&self, thread: ThreadId, frame: &dyn Frame, exc: &Value) {
        let _ = (thread, frame, exc);
    }
}

/// The runtime's native thread identifier, as handed to the tracing core.
pub type ThreadId = u64;

/// A live activation record, borrowed from the runtime for the span of one
/// suspension. Must not be retained past the owning thread's resume.
pub trait Frame: Send + Sync {
    /// Identity used to compare frames across events (the call-stack-chain
    /// walk the step machine performs compares by this, not by value).
    fn identity(&self) -> usize;

    fn source_path(&self) -> String;
    fn line(&self) -> u32;
    fn function_name(&self) -> String;

    /// `true` for frames belonging to the debugger's own machinery; these
    /// are filtered out of stack traces and never stopped on.
    fn is_internal(&self) -> bool;

    /// The frame directly below this one on the call stack, if any.
    fn caller(&self) -> Option<Box<dyn Frame>>;

    fn locals(&self) -> Vec<(String, Value)>;
    fn globals(&self) -> Vec<(String, Value)>;

    /// Compile-and-evaluate `expr` against this frame's scopes. A runtime
    /// error surfaces as `Ok(Value::Exception { .. })`, matching the
    /// "catch `BaseException`, use it as the result" rule — `Err` is
    /// reserved for cases the embedder cannot evaluate at all (e.g. the
    /// frame has already gone out of scope).
    fn evaluate(&self, expr: &str) -> Result<Value, String>;
}

/// The trait boundary through which an embedding language runtime supplies
/// thread enumeration, stack walking, and monitoring-event registration.
pub trait Runtime: Send + Sync {
    fn threads(&self) -> Vec<(ThreadId, String)>;

    /// The frame currently executing on `thread`, if it is presently
    /// stopped inside a monitoring callback.
    fn top_frame(&self, thread: ThreadId) -> Option<Box<dyn Frame>>;

    fn register_monitor(&self, sink: std::sync::Arc<dyn MonitorSink>);

    /// Re-enable event delivery for code objects previously told to
    /// `EventAction::Disable` themselves. Must be called after any state
    /// change that could alter a future `on_line` decision.
    fn restart_events(&self);
}
