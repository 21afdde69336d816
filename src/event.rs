//! Events emitted out-of-band by the tracing core and dispatcher
//! (SPEC_FULL §6): `stopped`, `thread`, `output`, `module`, `terminated`.
//!
//! An event carries its own wire name and JSON body; `DebugSession` wraps
//! it in the `{seq,type:"event",event,body}` envelope (see `session.rs`)
//! before handing it to a [`crate::session::Transport`].

use serde::Serialize;
use serde_json::Value;

use crate::dap_type::Module;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Pause,
    Step,
    Breakpoint,
    Exception,
}

impl StopReason {
    fn as_str(&self) -> &'static str {
        match self {
            StopReason::Pause => "pause",
            StopReason::Step => "step",
            StopReason::Breakpoint => "breakpoint",
            StopReason::Exception => "exception",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadReason {
    Started,
    Exited,
}

impl ThreadReason {
    fn as_str(&self) -> &'static str {
        match self {
            ThreadReason::Started => "started",
            ThreadReason::Exited => "exited",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCategory {
    Console,
    Stdout,
    Stderr,
}

impl OutputCategory {
    fn as_str(&self) -> &'static str {
        match self {
            OutputCategory::Console => "console",
            OutputCategory::Stdout => "stdout",
            OutputCategory::Stderr => "stderr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleReason {
    New,
}

impl ModuleReason {
    fn as_str(&self) -> &'static str {
        match self {
            ModuleReason::New => "new",
        }
    }
}

/// The events this core emits. `Event::name`/`Event::body` feed the wire
/// envelope assembled by `DebugSession` (see `session.rs`).
pub enum Event {
    Stopped {
        reason: StopReason,
        thread_id: i64,
        hit_breakpoint_ids: Vec<i64>,
    },
    Thread {
        reason: ThreadReason,
        thread_id: i64,
    },
    Output {
        category: OutputCategory,
        output: String,
    },
    Module {
        reason: ModuleReason,
        module: Module,
    },
    Terminated,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoppedBody {
    reason: &'static str,
    thread_id: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    hit_breakpoint_ids: Vec<i64>,
    all_threads_stopped: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThreadBody {
    reason: &'static str,
    thread_id: i64,
}

#[derive(Serialize)]
struct OutputBody {
    category: &'static str,
    output: String,
}

#[derive(Serialize)]
struct ModuleBody {
    reason: &'static str,
    module: Module,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Stopped { .. } => "stopped",
            Event::Thread { .. } => "thread",
            Event::Output { .. } => "output",
            Event::Module { .. } => "module",
            Event::Terminated => "terminated",
        }
    }

    /// The event's JSON body, or `None` for events with no body.
    pub fn body(&self) -> Option<Value> {
        let value = match self {
            Event::Stopped {
                reason,
                thread_id,
                hit_breakpoint_ids,
            } => serde_json::to_value(StoppedBody {
                reason: reason.as_str(),
                thread_id: *thread_id,
                hit_breakpoint_ids: hit_breakpoint_ids.clone(),
                // This core pauses one thread per event; other threads
                // keep running unless independently paused (SPEC_FULL §5).
                all_threads_stopped: false,
            }),
            Event::Thread { reason, thread_id } => serde_json::to_value(ThreadBody {
                reason: reason.as_str(),
                thread_id: *thread_id,
            }),
            Event::Output { category, output } => serde_json::to_value(OutputBody {
                category: category.as_str(),
                output: output.clone(),
            }),
            Event::Module { reason, module } => serde_json::to_value(ModuleBody {
                reason: reason.as_str(),
                module: module.clone(),
            }),
            Event::Terminated => return None,
        };
        value.ok()
    }
}
