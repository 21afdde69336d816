//! The tracing core (SPEC_FULL §4.G): owns the coordination monitor, the
//! PauseSet, the per-thread step machine, and the LINE event decision
//! tree. Implements [`MonitorSink`] so a [`Runtime`] can drive it directly.
//!
//! The distilled spec models the coordination monitor as one reentrant
//! lock plus one condition variable. `std::sync::Mutex` is not reentrant,
//! so this crate uses a plain `Mutex<Inner>` + `Condvar` and keeps every
//! critical section short enough that nothing re-enters it (see DESIGN.md).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Condvar, Mutex};

use crate::breakpoint::{BreakpointRegistry, HitOutcome};
use crate::event::{Event, OutputCategory, StopReason};
use crate::frame::FrameRegistry;
use crate::render::render;
use crate::runtime::{EventAction, Frame, MonitorSink, Runtime, ThreadId};
use crate::value::{RenderFormat, Value};
use crate::variables::VariableRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    In,
    Out,
    Over,
}

/// Per-thread step state (SPEC_FULL §3 "StepState"). `origin` starts
/// unpopulated: the step predicate cannot be evaluated until the thread
/// has resumed past the event that initiated the step (SPEC_FULL §9).
struct StepState {
    kind: StepKind,
    origin: Option<(usize, u32)>,
}

/// Emits events produced by the tracing core or the dispatcher. Both share
/// one implementation so `seq` numbering stays monotonic session-wide; see
/// `session::SessionEmitter`.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: Event);
}

struct Inner {
    pause_set: HashSet<ThreadId>,
    step_state: HashMap<ThreadId, StepState>,
}

enum LineDecision {
    Continue,
    Disable,
    Stop {
        reason: StopReason,
        hit_ids: Vec<i64>,
    },
}

pub struct TracingCore {
    inner: Mutex<Inner>,
    condvar: Condvar,
    breakpoints: Arc<BreakpointRegistry>,
    frames: Arc<FrameRegistry>,
    variables: Arc<VariableRegistry>,
    runtime: Arc<dyn Runtime>,
    emitter: Arc<dyn EventEmitter>,
}

impl TracingCore {
    pub fn new(
        runtime: Arc<dyn Runtime>,
        breakpoints: Arc<BreakpointRegistry>,
        frames: Arc<FrameRegistry>,
        variables: Arc<VariableRegistry>,
        emitter: Arc<dyn EventEmitter>,
    ) -> Self {
        TracingCore {
            inner: Mutex::new(Inner {
                pause_set: HashSet::new(),
                step_state: HashMap::new(),
            }),
            condvar: Condvar::new(),
            breakpoints,
            frames,
            variables,
            runtime,
            emitter,
        }
    }

    /// Add threads to the PauseSet (all traced threads if `ids` is empty).
    pub fn pause(&self, ids: &[ThreadId]) {
        {
            let mut inner = self.inner.lock().unwrap();
            if ids.is_empty() {
                for (id, _) in self.runtime.threads() {
                    inner.pause_set.insert(id);
                }
            } else {
                inner.pause_set.extend(ids.iter().copied());
            }
        }
        self.runtime.restart_events();
        self.condvar.notify_all();
    }

    /// Remove threads from the PauseSet (all currently paused threads if
    /// `ids` is empty) and invalidate their captured frames/containers.
    pub fn continue_threads(&self, ids: &[ThreadId]) {
        let resumed: Vec<ThreadId> = {
            let mut inner = self.inner.lock().unwrap();
            let resumed: Vec<ThreadId> = if ids.is_empty() {
                inner.pause_set.drain().collect()
            } else {
                for id in ids {
                    inner.pause_set.remove(id);
                }
                ids.to_vec()
            };
            resumed
        };
        self.invalidate_threads(&resumed);
        self.condvar.notify_all();
    }

    /// Begin a step for `id`: set step state, clear its pause bit, and
    /// invalidate its captured frames so stale ids can't outlive the step.
    pub fn step(&self, id: ThreadId, kind: StepKind) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.step_state.insert(id, StepState { kind, origin: None });
            inner.pause_set.remove(&id);
        }
        self.invalidate_threads(&[id]);
        self.runtime.restart_events();
        self.condvar.notify_all();
    }

    fn invalidate_threads(&self, ids: &[ThreadId]) {
        for id in ids {
            let frame_ids = self.frames.invalidate(crate::thread::dap_id(*id));
            self.variables.invalidate(&frame_ids);
        }
    }

    /// Drop all pending pauses/steps and wake every suspended thread
    /// (SPEC_FULL §5 "Cancellation & timeouts" / `disconnect`).
    pub fn disconnect(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.pause_set.clear();
            inner.step_state.clear();
        }
        self.condvar.notify_all();
    }

    fn decide(&self, thread: ThreadId, frame: &dyn Frame, path: &str, line: u32) -> LineDecision {
        let mut inner = self.inner.lock().unwrap();

        if inner.pause_set.contains(&thread) {
            return LineDecision::Stop {
                reason: StopReason::Pause,
                hit_ids: Vec::new(),
            };
        }

        let mut is_stepping = false;
        if let Some(step) = inner.step_state.get(&thread) {
            is_stepping = true;
            if let Some((origin_id, origin_line)) = step.origin {
                let stop = match step.kind {
                    StepKind::In => frame.identity() != origin_id || frame.line() != origin_line,
                    StepKind::Out => !frame_chain_contains(frame, origin_id),
                    StepKind::Over => {
                        !frame_chain_contains(frame, origin_id)
                            || (frame.identity() == origin_id && frame.line() != origin_line)
                    }
                };
                if stop {
                    inner.step_state.remove(&thread);
                    inner.pause_set.insert(thread);
                    return LineDecision::Stop {
                        reason: StopReason::Step,
                        hit_ids: Vec::new(),
                    };
                }
            }
            // Step active but its predicate isn't satisfied yet (or its
            // origin isn't populated yet): still fall through to the
            // breakpoint check below, so a breakpoint lying on the step's
            // path is not missed. `is_stepping` only suppresses the
            // DISABLE result — this code must keep receiving line events
            // until the step ends.
        }

        drop(inner);

        let hits = self.breakpoints.at(path, line);
        if hits.is_empty() {
            return if is_stepping {
                LineDecision::Continue
            } else {
                LineDecision::Disable
            };
        }

        let mut hit_ids = Vec::new();
        for bp in &hits {
            match bp.is_hit(frame) {
                HitOutcome::Hit => hit_ids.push(bp.id),
                HitOutcome::LogPoint(message) => {
                    self.emitter.emit(Event::Output {
                        category: OutputCategory::Console,
                        output: message,
                    });
                }
                HitOutcome::NotHit => {}
            }
        }

        if hit_ids.is_empty() {
            return LineDecision::Continue;
        }

        let mut inner = self.inner.lock().unwrap();
        inner.pause_set.insert(thread);
        LineDecision::Stop {
            reason: StopReason::Breakpoint,
            hit_ids,
        }
    }

    /// Send `stopped`, block until the thread leaves the PauseSet, then
    /// populate any freshly-started step's origin (SPEC_FULL §4.G "Stop
    /// protocol").
    fn stop(&self, thread: ThreadId, reason: StopReason, hit_ids: Vec<i64>, frame: &dyn Frame) {
        self.emitter.emit(Event::Stopped {
            reason,
            thread_id: crate::thread::dap_id(thread),
            hit_breakpoint_ids: hit_ids,
        });

        let mut inner = self.inner.lock().unwrap();
        while inner.pause_set.contains(&thread) {
            inner = self.condvar.wait(inner).unwrap();
        }

        if let Some(step) = inner.step_state.get_mut(&thread) {
            if step.origin.is_none() {
                step.origin = Some((frame.identity(), frame.line()));
            }
        }
    }
}

impl MonitorSink for TracingCore {
    fn on_line(&self, thread: ThreadId, frame: &dyn Frame, path: &str, line: u32) -> EventAction {
        match self.decide(thread, frame, path, line) {
            LineDecision::Continue => EventAction::Continue,
            LineDecision::Disable => EventAction::Disable,
            LineDecision::Stop { reason, hit_ids } => {
                self.stop(thread, reason, hit_ids, frame);
                EventAction::Continue
            }
        }
    }

    fn on_py_throw(&self, thread: ThreadId, frame: &dyn Frame, exc: &Value) {
        log_exception_event("throw", thread, frame, exc);
    }

    fn on_py_unwind(&self, thread: ThreadId, frame: &dyn Frame, exc: &Value) {
        log_exception_event("unwind", thread, frame, exc);
    }

    fn on_raise(&self, thread: ThreadId, frame: &dyn Frame, exc: &Value) {
        log_exception_event("raise", thread, frame, exc);
    }

    fn on_reraise(&self, thread: ThreadId, frame: &dyn Frame, exc: &Value) {
        log_exception_event("reraise", thread, frame, exc);
    }

    fn on_exception_handled(&self, thread: ThreadId, frame: &dyn Frame, exc: &Value) {
        log_exception_event("handled", thread, frame, exc);
    }

    fn on_py_start(&self, thread: ThreadId, frame: &dyn Frame) {
        log::trace!(
            "thread {} entered {}:{}",
            thread,
            frame.source_path(),
            frame.line()
        );
    }

    fn on_py_return(&self, thread: ThreadId, frame: &dyn Frame) {
        log::trace!(
            "thread {} returned from {}:{}",
            thread,
            frame.source_path(),
            frame.line()
        );
    }

    fn on_py_resume(&self, thread: ThreadId, frame: &dyn Frame) {
        log::trace!(
            "thread {} resumed {}:{}",
            thread,
            frame.source_path(),
            frame.line()
        );
    }

    fn on_py_yield(&self, thread: ThreadId, frame: &dyn Frame) {
        log::trace!(
            "thread {} yielded {}:{}",
            thread,
            frame.source_path(),
            frame.line()
        );
    }
}

/// Diagnostic-only hook for the exception-shaped monitoring events
/// (SPEC_FULL §4.G). A tight `max_length` keeps a failing repr from
/// stalling the callback.
fn log_exception_event(kind: &str, thread: ThreadId, frame: &dyn Frame, exc: &Value) {
    let format = RenderFormat {
        max_length: 200,
        ..RenderFormat::default()
    };
    log::trace!(
        "thread {} {} at {}:{}: {}",
        thread,
        kind,
        frame.source_path(),
        frame.line(),
        render(exc, &format)
    );
}

/// Whether `target` identifies a frame on `frame`'s call chain, starting
/// from `frame` itself.
fn frame_chain_contains(frame: &dyn Frame, target: usize) -> bool {
    if frame.identity() == target {
        return true;
    }
    let mut current = frame.caller();
    while let Some(f) = current {
        if f.identity() == target {
            return true;
        }
        current = f.caller();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct NullEmitter {
        events: StdMutex<Vec<String>>,
    }

    impl EventEmitter for NullEmitter {
        fn emit(&self, event: Event) {
            self.events.lock().unwrap().push(event.name().to_string());
        }
    }

    struct NullRuntime;
    impl Runtime for NullRuntime {
        fn threads(&self) -> Vec<(ThreadId, String)> {
            vec![(1, "main".to_string())]
        }
        fn top_frame(&self, _thread: ThreadId) -> Option<Box<dyn Frame>> {
            None
        }
        fn register_monitor(&self, _sink: Arc<dyn MonitorSink>) {}
        fn restart_events(&self) {}
    }

    fn core() -> (TracingCore, Arc<NullEmitter>) {
        let emitter = Arc::new(NullEmitter {
            events: StdMutex::new(Vec::new()),
        });
        let core = TracingCore::new(
            Arc::new(NullRuntime),
            Arc::new(BreakpointRegistry::new()),
            Arc::new(FrameRegistry::new()),
            Arc::new(VariableRegistry::new()),
            emitter.clone() as Arc<dyn EventEmitter>,
        );
        (core, emitter)
    }

    #[test]
    fn pause_then_continue_empties_pause_set() {
        let (core, _emitter) = core();
        core.pause(&[1]);
        assert!(core.inner.lock().unwrap().pause_set.contains(&1));
        core.continue_threads(&[1]);
        assert!(!core.inner.lock().unwrap().pause_set.contains(&1));
    }

    #[test]
    fn line_with_no_breakpoints_disables() {
        let (core, _emitter) = core();
        struct F;
        impl Frame for F {
            fn identity(&self) -> usize {
                1
            }
            fn source_path(&self) -> String {
                "a.py".to_string()
            }
            fn line(&self) -> u32 {
                1
            }
            fn function_name(&self) -> String {
                "<module>".to_string()
            }
            fn is_internal(&self) -> bool {
                false
            }
            fn caller(&self) -> Option<Box<dyn Frame>> {
                None
            }
            fn locals(&self) -> Vec<(String, Value)> {
                Vec::new()
            }
            fn globals(&self) -> Vec<(String, Value)> {
                Vec::new()
            }
            fn evaluate(&self, _expr: &str) -> Result<Value, String> {
                Err("unsupported".to_string())
            }
        }
        let decision = core.decide(1, &F, "a.py", 1);
        assert!(matches!(decision, LineDecision::Disable));
    }
}
