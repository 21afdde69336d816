//! `DebugSession`: owns every per-session registry and exposes the 12 core
//! DAP requests this crate handles (SPEC_FULL §6). `dispatch.rs` decodes
//! wire requests into calls on this type; this type never touches the wire
//! itself, only `Transport`/`EventEmitter`.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::breakpoint::{BreakpointRegistry, BreakpointSpec};
use crate::dap_type::{self, Capabilities, Scope, Source, StackFrame as StackFrameWire, Thread, Variable};
use crate::error::DapError;
use crate::eval::{self, EvalError};
use crate::frame::FrameRegistry;
use crate::render::render;
use crate::runtime::Runtime;
use crate::thread::{self, ThreadRegistry};
use crate::tracing::{EventEmitter, StepKind, TracingCore};
use crate::value::RenderFormat;
use crate::variables::{ScopeKind, VariableRegistry};

/// Where a session writes its wire messages. `session.rs` hands this fully
/// framed JSON bodies; framing itself is `message::write_message`'s job.
pub trait Transport: Send + Sync {
    fn send(&self, body: serde_json::Value);
}

/// Wraps a [`Transport`] with the session-wide monotone `seq` counter, and
/// implements [`EventEmitter`] so the tracing core's out-of-band events and
/// this session's own responses share one sequence.
pub struct SessionEmitter {
    transport: Arc<dyn Transport>,
    seq: AtomicI64,
}

impl SessionEmitter {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        SessionEmitter {
            transport,
            seq: AtomicI64::new(1),
        }
    }

    fn next_seq(&self) -> i64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Send a response envelope for `request_seq`/`command`.
    pub fn respond(&self, request_seq: i64, command: &str, result: Result<serde_json::Value, DapError>) {
        let seq = self.next_seq();
        let body = match result {
            Ok(body) => serde_json::json!({
                "seq": seq,
                "type": "response",
                "request_seq": request_seq,
                "success": true,
                "command": command,
                "body": body,
            }),
            Err(err) => serde_json::json!({
                "seq": seq,
                "type": "response",
                "request_seq": request_seq,
                "success": false,
                "command": command,
                "message": err.to_string(),
            }),
        };
        self.transport.send(body);
    }
}

impl EventEmitter for SessionEmitter {
    fn emit(&self, event: crate::event::Event) {
        let seq = self.next_seq();
        let mut body = serde_json::json!({
            "seq": seq,
            "type": "event",
            "event": event.name(),
        });
        if let Some(payload) = event.body() {
            body["body"] = payload;
        }
        self.transport.send(body);
    }
}

pub struct DebugSession {
    runtime: Arc<dyn Runtime>,
    threads: ThreadRegistry,
    frames: Arc<FrameRegistry>,
    variables: Arc<VariableRegistry>,
    breakpoints: Arc<BreakpointRegistry>,
    tracing: Arc<TracingCore>,
    emitter: Arc<SessionEmitter>,
}

impl DebugSession {
    pub fn new(runtime: Arc<dyn Runtime>, transport: Arc<dyn Transport>) -> Self {
        let frames = Arc::new(FrameRegistry::new());
        let variables = Arc::new(VariableRegistry::new());
        let breakpoints = Arc::new(BreakpointRegistry::new());
        let emitter = Arc::new(SessionEmitter::new(transport));

        let tracing = Arc::new(TracingCore::new(
            runtime.clone(),
            breakpoints.clone(),
            frames.clone(),
            variables.clone(),
            emitter.clone() as Arc<dyn EventEmitter>,
        ));
        runtime.register_monitor(tracing.clone());

        DebugSession {
            runtime,
            threads: ThreadRegistry::new(),
            frames,
            variables,
            breakpoints,
            tracing,
            emitter,
        }
    }

    pub fn emitter(&self) -> Arc<SessionEmitter> {
        self.emitter.clone()
    }

    pub fn initialize(&self) -> Capabilities {
        Capabilities::advertised()
    }

    pub fn set_breakpoints(&self, source: &Source, specs: Vec<BreakpointSpec>) -> Result<Vec<dap_type::Breakpoint>, DapError> {
        let path = source
            .path
            .as_ref()
            .ok_or_else(|| DapError::MissingArguments("source.path".to_string()))?;
        let created = self.breakpoints.set_breakpoints(path, specs);
        self.runtime.restart_events();
        Ok(created
            .into_iter()
            .map(|bp| dap_type::Breakpoint {
                id: bp.id,
                verified: true,
                line: bp.line,
            })
            .collect())
    }

    pub fn configuration_done(&self) {
        self.runtime.restart_events();
    }

    pub fn threads(&self) -> Vec<Thread> {
        self.threads
            .enumerate(self.runtime.as_ref())
            .into_iter()
            .map(|t| Thread { id: t.id, name: t.name })
            .collect()
    }

    pub fn stack_trace(&self, thread_id: i64, levels: Option<usize>) -> Result<Vec<StackFrameWire>, DapError> {
        let native = thread::native_id(thread_id);
        let top = self
            .runtime
            .top_frame(native)
            .ok_or_else(|| DapError::InvalidRequest("thread is not suspended".to_string()))?;
        let mut frames = self.frames.capture_stack(thread_id, top);
        // capture_stack returns outer-to-inner; DAP wants innermost first.
        frames.reverse();
        if let Some(levels) = levels {
            frames.truncate(levels);
        }
        Ok(frames
            .into_iter()
            .map(|f| StackFrameWire {
                id: f.id,
                name: f.function_name.clone(),
                source: Source {
                    name: std::path::Path::new(&f.source_path)
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned()),
                    path: Some(f.source_path.clone()),
                },
                line: f.line,
                column: 1,
            })
            .collect())
    }

    pub fn scopes(&self, frame_id: i64) -> Result<Vec<Scope>, DapError> {
        if self.frames.get(frame_id).is_none() {
            return Err(DapError::InvalidRequest("frame reference has expired".to_string()));
        }
        let local = self.variables.create_scope(frame_id, ScopeKind::Local);
        let global = self.variables.create_scope(frame_id, ScopeKind::Global);
        Ok(vec![
            Scope {
                name: "Locals".to_string(),
                presentation_hint: "locals",
                variables_reference: local,
                expensive: false,
            },
            Scope {
                name: "Globals".to_string(),
                presentation_hint: "globals",
                variables_reference: global,
                expensive: true,
            },
        ])
    }

    pub fn variables(&self, reference: i64, format: Option<RenderFormat>) -> Result<Vec<Variable>, DapError> {
        let format = format.unwrap_or_default();
        let entries = self
            .variables
            .list(reference, &self.frames)
            .map_err(|_| DapError::InvalidRequest("variables reference has expired".to_string()))?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let variables_reference = if entry.has_children { entry.id } else { 0 };
                Variable {
                    name: entry.name,
                    value: render(&entry.value, &format),
                    type_name: Some(entry.value.type_name()),
                    variables_reference,
                }
            })
            .collect())
    }

    pub fn evaluate(&self, expr: &str, frame_id: Option<i64>, format: Option<RenderFormat>) -> Result<Variable, DapError> {
        let frame_id = frame_id.ok_or_else(|| DapError::InvalidRequest("evaluate requires frameId".to_string()))?;
        let format = format.unwrap_or_default();
        eval::evaluate(&self.frames, &self.variables, frame_id, expr, &format).map_err(|err| match err {
            EvalError::ReferenceExpired => DapError::InvalidRequest("frame reference has expired".to_string()),
        })
    }

    pub fn continue_(&self, thread_id: i64) {
        self.tracing.continue_threads(&[thread::native_id(thread_id)]);
    }

    pub fn pause(&self, thread_id: i64) {
        self.tracing.pause(&[thread::native_id(thread_id)]);
    }

    pub fn next(&self, thread_id: i64) {
        self.tracing.step(thread::native_id(thread_id), StepKind::Over);
    }

    pub fn step_in(&self, thread_id: i64) {
        self.tracing.step(thread::native_id(thread_id), StepKind::In);
    }

    pub fn step_out(&self, thread_id: i64) {
        self.tracing.step(thread::native_id(thread_id), StepKind::Out);
    }

    pub fn disconnect(&self) {
        self.breakpoints.clear_all();
        self.tracing.disconnect();
    }
}
