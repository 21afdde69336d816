//! A Debug Adapter Protocol core for embedding in a language runtime.
//!
//! This crate owns the wire codec, the DAP request/response/event shapes,
//! value rendering and inspection, and the tracing core that turns a
//! runtime's monitoring-event stream into breakpoints, stepping, and
//! suspension. It does not implement a language runtime itself: an
//! embedder supplies one by implementing [`runtime::Runtime`] and
//! [`runtime::Frame`], then drives the whole thing with [`adapter::run_stdio`]
//! (or composes [`session::DebugSession`] with its own transport).

mod adapter;
mod breakpoint;
mod dap_type;
mod dispatch;
mod error;
mod eval;
mod event;
mod frame;
mod header;
mod inspect;
mod message;
mod render;
mod request;
mod runtime;
mod session;
mod thread;
mod tracing;
mod value;
mod variables;

pub use adapter::{run_stdio, Adapter, StdioTransport};
pub use breakpoint::BreakpointSpec;
pub use dap_type::{
    Breakpoint, Capabilities, Module, Scope, Source, SourceBreakpoint, StackFrame, Thread,
    ValueFormat, Variable,
};
pub use error::DapError as Error;
pub use message::{GenericMessage, Message};
pub use runtime::{EventAction, Frame, MonitorSink, Runtime, ThreadId};
pub use session::{DebugSession, SessionEmitter, Transport};
pub use value::{Member, ObjectHandle, RenderFormat, StructuralCategory, Value};
