//! Variable container registry: stable ids for scopes and variables,
//! invalidated in bulk whenever their owning frame is invalidated.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::frame::FrameRegistry;
use crate::inspect;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Local,
    Global,
}

impl ScopeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScopeKind::Local => "local",
            ScopeKind::Global => "global",
        }
    }
}

enum Container {
    Scope { frame_id: i64, kind: ScopeKind },
    Variable { frame_id: i64, name: String, value: Value },
}

impl Container {
    fn frame_id(&self) -> i64 {
        match self {
            Container::Scope { frame_id, .. } => *frame_id,
            Container::Variable { frame_id, .. } => *frame_id,
        }
    }
}

pub struct VariableEntry {
    pub id: i64,
    pub name: String,
    pub value: Value,
    pub has_children: bool,
}

/// Process-wide registry of every Scope/Variable container issued this
/// session. Ids are monotone and never reused.
pub struct VariableRegistry {
    next_id: Mutex<i64>,
    containers: Mutex<HashMap<i64, Container>>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        VariableRegistry {
            next_id: Mutex::new(1),
            containers: Mutex::new(HashMap::new()),
        }
    }

    fn allocate(&self, container: Container) -> i64 {
        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            let id = *next_id;
            *next_id += 1;
            id
        };
        self.containers.lock().unwrap().insert(id, container);
        id
    }

    pub fn create_scope(&self, frame_id: i64, kind: ScopeKind) -> i64 {
        self.allocate(Container::Scope { frame_id, kind })
    }

    pub fn create_variable(&self, frame_id: i64, name: String, value: Value) -> i64 {
        self.allocate(Container::Variable { frame_id, name, value })
    }

    /// Drop every container whose owning frame is in `frame_ids`. Called
    /// by the tracing core before waking a resumed/stepped thread.
    pub fn invalidate(&self, frame_ids: &[i64]) {
        let mut containers = self.containers.lock().unwrap();
        containers.retain(|_, c| !frame_ids.contains(&c.frame_id()));
    }

    /// Enumerate the children of `id`, allocating a fresh container for
    /// each so the client can re-expand them. `Err` means the reference
    /// has expired (its container no longer exists).
    pub fn list(&self, id: i64, frames: &FrameRegistry) -> Result<Vec<VariableEntry>, ()> {
        let (frame_id, children) = {
            let containers = self.containers.lock().unwrap();
            let container = containers.get(&id).ok_or(())?;
            match container {
                Container::Scope { frame_id, kind } => {
                    let frame = frames.get(*frame_id).ok_or(())?;
                    let bindings = match kind {
                        ScopeKind::Local => frame.frame.locals(),
                        ScopeKind::Global => frame.frame.globals(),
                    };
                    (*frame_id, bindings)
                }
                Container::Variable { frame_id, value, .. } => {
                    let mut bindings: Vec<(String, Value)> = inspect::named_children(value)
                        .into_iter()
                        .map(|c| (c.name, c.value))
                        .collect();
                    bindings.extend(
                        inspect::indexed_children(value)
                            .into_iter()
                            .map(|c| (c.name, c.value)),
                    );
                    (*frame_id, bindings)
                }
            }
        };

        let entries = bindings_to_entries(self, frame_id, children);
        Ok(entries)
    }

    pub fn name_of(&self, id: i64) -> Option<String> {
        let containers = self.containers.lock().unwrap();
        match containers.get(&id)? {
            Container::Variable { name, .. } => Some(name.clone()),
            Container::Scope { kind, .. } => Some(kind.name().to_string()),
        }
    }
}

fn bindings_to_entries(
    registry: &VariableRegistry,
    frame_id: i64,
    bindings: Vec<(String, Value)>,
) -> Vec<VariableEntry> {
    bindings
        .into_iter()
        .map(|(name, value)| {
            let has_children =
                !inspect::named_children(&value).is_empty() || !inspect::indexed_children(&value).is_empty();
            let id = registry.create_variable(frame_id, name.clone(), value.clone());
            VariableEntry {
                id,
                name,
                value,
                has_children,
            }
        })
        .collect()
}

impl Default for VariableRegistry {
    fn default() -> Self {
        Self::new()
    }
}
