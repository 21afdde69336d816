//! Enumerates a value's children for the variables tree.
//!
//! Two independent sequences: named children (attribute-like access) and
//! indexed children (positional/key access). Both are defensive — a
//! raising attribute access or a raising iterator step ends that child's
//! sequence early rather than failing the whole request.

use crate::value::{StructuralCategory, Value};

pub struct Child {
    pub name: String,
    pub value: Value,
}

/// Attribute-like members: non-underscore, non-callable, sorted by name,
/// plus a synthetic `len()` child when the value has a length.
pub fn named_children(value: &Value) -> Vec<Child> {
    let mut children = match value {
        Value::Object(obj) => match obj.attributes() {
            Ok(members) => members
                .into_iter()
                .filter(|m| !m.name.starts_with('_') && !m.is_callable)
                .map(|m| Child {
                    name: m.name,
                    value: m.value,
                })
                .collect(),
            Err(message) => {
                log::warn!("attribute enumeration failed: {}", message);
                Vec::new()
            }
        },
        // Mirrors a real exception instance's `args` surface, so an
        // exception produced by a raising `evaluate` is itself expandable
        // rather than a dead-end leaf.
        Value::Exception { message, .. } => vec![Child {
            name: "args".to_string(),
            value: Value::Tuple(vec![Value::Str(message.clone())]),
        }],
        _ => Vec::new(),
    };
    children.sort_by(|a, b| a.name.cmp(&b.name));

    if let Some(len) = value.length() {
        children.push(Child {
            name: "len()".to_string(),
            value: Value::Int(len as i64),
        });
    }

    children
}

/// Positional/key children: dict entries, iterable elements, or string
/// codepoints. Empty for values with no indexed structure.
pub fn indexed_children(value: &Value) -> Vec<Child> {
    match value {
        Value::Dict(pairs) => pairs
            .iter()
            .map(|(k, v)| Child {
                name: format!("[{}]", crate::render::render(k, &Default::default())),
                value: v.clone(),
            })
            .collect(),
        Value::Tuple(items) | Value::List(items) | Value::Set(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| Child {
                name: format!("[{}]", i),
                value: v.clone(),
            })
            .collect(),
        Value::Str(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| Child {
                name: format!("[{}]", i),
                value: Value::Int(c as i64),
            })
            .collect(),
        Value::Object(obj) => match obj.category() {
            StructuralCategory::Mapping => {
                let mut children = Vec::new();
                for item in obj.mapping_items() {
                    match item {
                        Ok((k, v)) => children.push(Child {
                            name: format!("[{}]", crate::render::render(&k, &Default::default())),
                            value: v,
                        }),
                        Err(message) => {
                            log::warn!("mapping iteration stopped: {}", message);
                            break;
                        }
                    }
                }
                children
            }
            StructuralCategory::Iterable => {
                let mut children = Vec::new();
                for (i, item) in obj.iterable_items().enumerate() {
                    match item {
                        Ok(v) => children.push(Child {
                            name: format!("[{}]", i),
                            value: v,
                        }),
                        Err(message) => {
                            log::warn!("iteration stopped: {}", message);
                            break;
                        }
                    }
                }
                children
            }
            StructuralCategory::Scalar => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_children_of_list() {
        let value = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let children = indexed_children(&value);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name, "[0]");
    }

    #[test]
    fn named_children_include_synthetic_len() {
        let value = Value::Str("abc".to_string());
        let children = named_children(&value);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "len()");
        match children[0].value {
            Value::Int(3) => (),
            _ => panic!(),
        }
    }

    #[test]
    fn indexed_children_of_string_are_codepoints() {
        let value = Value::Str("ab".to_string());
        let children = indexed_children(&value);
        assert_eq!(children.len(), 2);
        match children[0].value {
            Value::Int(97) => (),
            _ => panic!(),
        }
    }

    #[test]
    fn exception_has_an_expandable_args_child() {
        let value = Value::Exception {
            type_name: "TypeError".to_string(),
            message: "bad operand".to_string(),
        };
        let children = named_children(&value);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "args");
    }
}
