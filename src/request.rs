//! Argument shapes for the requests this core handles (SPEC_FULL §6).
//! Field names follow the DAP spec's camelCase on the wire.

use serde::Deserialize;

use crate::dap_type::{Source, SourceBreakpoint, ValueFormat};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct InitializeArguments {
    #[serde(rename = "clientID")]
    pub client_id: Option<String>,
    #[serde(rename = "adapterID")]
    pub adapter_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetBreakpointsArguments {
    pub source: Source,
    #[serde(default)]
    pub breakpoints: Vec<SourceBreakpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadArguments {
    #[serde(rename = "threadId")]
    pub thread_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StackTraceArguments {
    #[serde(rename = "threadId")]
    pub thread_id: i64,
    pub levels: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScopesArguments {
    #[serde(rename = "frameId")]
    pub frame_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariablesArguments {
    #[serde(rename = "variablesReference")]
    pub variables_reference: i64,
    #[serde(default)]
    pub format: Option<ValueFormat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateArguments {
    pub expression: String,
    #[serde(rename = "frameId")]
    pub frame_id: Option<i64>,
    pub context: Option<String>,
    #[serde(default)]
    pub format: Option<ValueFormat>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DisconnectArguments {
    #[serde(rename = "terminateDebuggee")]
    pub terminate_debuggee: Option<bool>,
}
