//! Decodes a `request`-typed [`GenericMessage`] into a [`DebugSession`] call
//! and re-encodes the result as a response envelope, sent through the
//! session's own [`crate::session::SessionEmitter`] so `seq` stays in one
//! sequence with the events the session emits on its own.

use crate::breakpoint::BreakpointSpec;
use crate::dap_type::SourceBreakpoint;
use crate::error::DapError;
use crate::message::GenericMessage;
use crate::request::{
    DisconnectArguments, EvaluateArguments, InitializeArguments, ScopesArguments,
    SetBreakpointsArguments, StackTraceArguments, ThreadArguments, VariablesArguments,
};
use crate::session::DebugSession;
use crate::value::RenderFormat;

fn arguments<T: serde::de::DeserializeOwned>(message: &GenericMessage) -> Result<T, DapError> {
    let arguments = message
        .value()
        .get("arguments")
        .cloned()
        .unwrap_or(serde_json::Value::Null);
    serde_json::from_value(arguments).map_err(DapError::from)
}

fn to_spec(bp: SourceBreakpoint) -> BreakpointSpec {
    BreakpointSpec {
        line: bp.line,
        condition: bp.condition,
        hit_condition: bp.hit_condition,
        log_message: bp.log_message,
    }
}

fn render_format(value_format: Option<crate::dap_type::ValueFormat>) -> Option<RenderFormat> {
    value_format.map(|f| RenderFormat {
        hex: f.hex.unwrap_or(false),
        ..RenderFormat::default()
    })
}

/// Run one request-typed message against `session`, sending its response
/// (and any events produced along the way) through the session's emitter.
///
/// Messages that aren't of type `request` are ignored: this crate never
/// initiates requests of its own, so anything else is out of scope.
pub fn dispatch(session: &DebugSession, message: GenericMessage) {
    if message.message_type() != "request" {
        return;
    }
    let request_seq = message.seq() as i64;
    let command = message
        .value()
        .get("command")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let result = handle(session, &command, &message);
    session.emitter().respond(request_seq, &command, result);
}

fn handle(session: &DebugSession, command: &str, message: &GenericMessage) -> Result<serde_json::Value, DapError> {
    match command {
        "initialize" => {
            let _args: InitializeArguments = arguments(message).unwrap_or_default();
            Ok(serde_json::to_value(session.initialize())?)
        }
        "setBreakpoints" => {
            let args: SetBreakpointsArguments = arguments(message)?;
            let specs = args.breakpoints.into_iter().map(to_spec).collect();
            let created = session.set_breakpoints(&args.source, specs)?;
            Ok(serde_json::json!({ "breakpoints": created }))
        }
        "configurationDone" => {
            session.configuration_done();
            Ok(serde_json::Value::Null)
        }
        "threads" => Ok(serde_json::json!({ "threads": session.threads() })),
        "stackTrace" => {
            let args: StackTraceArguments = arguments(message)?;
            let frames = session.stack_trace(args.thread_id, args.levels)?;
            let total = frames.len();
            Ok(serde_json::json!({ "stackFrames": frames, "totalFrames": total }))
        }
        "scopes" => {
            let args: ScopesArguments = arguments(message)?;
            let scopes = session.scopes(args.frame_id)?;
            Ok(serde_json::json!({ "scopes": scopes }))
        }
        "variables" => {
            let args: VariablesArguments = arguments(message)?;
            let format = render_format(args.format);
            let variables = session.variables(args.variables_reference, format)?;
            Ok(serde_json::json!({ "variables": variables }))
        }
        "evaluate" => {
            let args: EvaluateArguments = arguments(message)?;
            let format = render_format(args.format);
            let variable = session.evaluate(&args.expression, args.frame_id, format)?;
            Ok(serde_json::json!({
                "result": variable.value,
                "type": variable.type_name,
                "variablesReference": variable.variables_reference,
            }))
        }
        "continue" => {
            let args: ThreadArguments = arguments(message)?;
            session.continue_(args.thread_id);
            Ok(serde_json::json!({ "allThreadsContinued": false }))
        }
        "pause" => {
            let args: ThreadArguments = arguments(message)?;
            session.pause(args.thread_id);
            Ok(serde_json::Value::Null)
        }
        "next" => {
            let args: ThreadArguments = arguments(message)?;
            session.next(args.thread_id);
            Ok(serde_json::Value::Null)
        }
        "stepIn" => {
            let args: ThreadArguments = arguments(message)?;
            session.step_in(args.thread_id);
            Ok(serde_json::Value::Null)
        }
        "stepOut" => {
            let args: ThreadArguments = arguments(message)?;
            session.step_out(args.thread_id);
            Ok(serde_json::Value::Null)
        }
        "disconnect" => {
            let _args: DisconnectArguments = arguments(message).unwrap_or_default();
            session.disconnect();
            Ok(serde_json::Value::Null)
        }
        other => Err(DapError::UnknownCommand(other.to_string())),
    }
}
