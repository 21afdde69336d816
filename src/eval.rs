//! The evaluator (SPEC_FULL §4.H): resolves a frame id, compiles and
//! evaluates an expression against that frame's scopes, and wraps the
//! result (or the raised exception) as a Variable.

use crate::dap_type::Variable as VariableWire;
use crate::frame::FrameRegistry;
use crate::inspect;
use crate::render::render;
use crate::value::{RenderFormat, Value};
use crate::variables::VariableRegistry;

pub enum EvalError {
    /// `frame_id` does not resolve to a live frame (SPEC_FULL §7 kind 2).
    ReferenceExpired,
}

/// Evaluate `expr` against the scopes of the frame named by `frame_id`.
/// A runtime error during evaluation is not an `EvalError` — per SPEC_FULL
/// §7 kind 3, it becomes the exception rendered as the Variable's value;
/// only an unresolvable `frame_id` aborts the request.
pub fn evaluate(
    frames: &FrameRegistry,
    variables: &VariableRegistry,
    frame_id: i64,
    expr: &str,
    format: &RenderFormat,
) -> Result<VariableWire, EvalError> {
    let frame = frames.get(frame_id).ok_or(EvalError::ReferenceExpired)?;

    let value = match frame.frame.evaluate(expr) {
        Ok(value) => value,
        Err(message) => Value::Exception {
            type_name: "EvalError".to_string(),
            message,
        },
    };

    let has_children =
        !inspect::named_children(&value).is_empty() || !inspect::indexed_children(&value).is_empty();
    let variables_reference = if has_children {
        variables.create_variable(frame_id, expr.to_string(), value.clone())
    } else {
        0
    };

    Ok(VariableWire {
        name: expr.to_string(),
        value: render(&value, format),
        type_name: Some(value.type_name()),
        variables_reference,
    })
}
