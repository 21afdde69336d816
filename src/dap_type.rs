//! Wire-shape types for the DAP requests/responses/events this crate
//! handles (see SPEC_FULL §6). Field names follow the DAP spec's camelCase
//! on the wire via `serde(rename...)`, snake_case in Rust.
//!
//! The documentation on public fields is adapted from the DAP specification,
//! licensed under the Creative Commons Attribution 3.0 United States License
//! (https://microsoft.github.io/debug-adapter-protocol/specification).

use serde::{Deserialize, Serialize};

/// A source location, identified by path (this crate never allocates
/// `sourceReference`-addressed sources — compiled-at-runtime code is out
/// of scope per SPEC_FULL §1).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Source {
    pub name: Option<String>,
    pub path: Option<String>,
}

/// Properties of a breakpoint passed to the `setBreakpoints` request.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceBreakpoint {
    pub line: u32,
    pub condition: Option<String>,
    #[serde(rename = "hitCondition")]
    pub hit_condition: Option<String>,
    #[serde(rename = "logMessage")]
    pub log_message: Option<String>,
}

/// A breakpoint as reported back to the client in a `setBreakpoints`
/// response or a `breakpoint` event.
#[derive(Debug, Clone, Serialize)]
pub struct Breakpoint {
    pub id: i64,
    pub verified: bool,
    pub line: u32,
}

/// A thread, as reported by the `threads` request.
#[derive(Debug, Clone, Serialize)]
pub struct Thread {
    pub id: i64,
    pub name: String,
}

/// A stack frame, as reported by the `stackTrace` request.
#[derive(Debug, Clone, Serialize)]
pub struct StackFrame {
    pub id: i64,
    pub name: String,
    pub source: Source,
    pub line: u32,
    pub column: u32,
}

/// A scope, as reported by the `scopes` request.
#[derive(Debug, Clone, Serialize)]
pub struct Scope {
    pub name: String,
    #[serde(rename = "presentationHint")]
    pub presentation_hint: &'static str,
    #[serde(rename = "variablesReference")]
    pub variables_reference: i64,
    pub expensive: bool,
}

/// A variable, as reported by the `variables` request or the `evaluate`
/// response.
#[derive(Debug, Clone, Serialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    #[serde(rename = "variablesReference")]
    pub variables_reference: i64,
}

/// Value-formatting options, honored when the client passes `format` on
/// `stackTrace`/`variables`/`evaluate` (SPEC_FULL §4.A/§6).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ValueFormat {
    pub hex: Option<bool>,
}

/// A module observed while building a stack trace, reported via the
/// `module` event.
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    pub id: String,
    pub name: String,
}

/// Information about the capabilities of this debug adapter, returned from
/// `initialize`. Only the capabilities this core actually implements are
/// advertised (SPEC_FULL §6 "Initial capabilities advertised"); fields for
/// requests this crate does not handle (attach, restart, data breakpoints,
/// memory/disassembly, …) are not part of this record at all, rather than
/// present-and-false.
#[derive(Debug, Clone, Serialize, Default)]
pub struct Capabilities {
    #[serde(rename = "supportsConfigurationDoneRequest")]
    pub supports_configuration_done_request: bool,
    #[serde(rename = "supportsConditionalBreakpoints")]
    pub supports_conditional_breakpoints: bool,
    #[serde(rename = "supportsHitConditionalBreakpoints")]
    pub supports_hit_conditional_breakpoints: bool,
    #[serde(rename = "supportsLogPoints")]
    pub supports_log_points: bool,
    #[serde(rename = "supportsEvaluateForHovers")]
    pub supports_evaluate_for_hovers: bool,
    #[serde(rename = "supportsSetVariable")]
    pub supports_set_variable: bool,
    #[serde(rename = "supportsExceptionInfoRequest")]
    pub supports_exception_info_request: bool,
    #[serde(rename = "supportsDelayedStackTraceLoading")]
    pub supports_delayed_stack_trace_loading: bool,
    #[serde(rename = "supportsTerminateRequest")]
    pub supports_terminate_request: bool,
    #[serde(rename = "supportsGotoTargetsRequest")]
    pub supports_goto_targets_request: bool,
    #[serde(rename = "supportsClipboardContext")]
    pub supports_clipboard_context: bool,
    #[serde(rename = "supportsValueFormattingOptions")]
    pub supports_value_formatting_options: bool,
}

impl Capabilities {
    /// The capability record this core advertises on `initialize`
    /// (SPEC_FULL §6).
    pub fn advertised() -> Self {
        Capabilities {
            supports_configuration_done_request: true,
            supports_conditional_breakpoints: true,
            supports_hit_conditional_breakpoints: true,
            supports_log_points: true,
            supports_evaluate_for_hovers: true,
            supports_set_variable: true,
            supports_exception_info_request: true,
            supports_delayed_stack_trace_loading: true,
            supports_terminate_request: true,
            supports_goto_targets_request: true,
            supports_clipboard_context: true,
            supports_value_formatting_options: true,
        }
    }
}
