//! Frame registry: stable ids for stack frames captured during a
//! suspension, walked from a thread's current top frame.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::runtime::Frame as RuntimeFrame;

/// A captured activation record, as handed out to the dispatcher for
/// `stackTrace`/`scopes`/`evaluate`. Valid only while its owning thread
/// stays suspended at the point it was captured.
pub struct StackFrame {
    pub id: i64,
    pub thread_id: i64,
    pub source_path: String,
    pub line: u32,
    pub function_name: String,
    pub(crate) frame: Arc<dyn RuntimeFrame>,
}

pub struct FrameRegistry {
    next_id: Mutex<i64>,
    frames: Mutex<HashMap<i64, Arc<StackFrame>>>,
    by_thread: Mutex<HashMap<i64, Vec<i64>>>,
}

impl FrameRegistry {
    pub fn new() -> Self {
        FrameRegistry {
            next_id: Mutex::new(1),
            frames: Mutex::new(HashMap::new()),
            by_thread: Mutex::new(HashMap::new()),
        }
    }

    /// Walk the call chain from `top`, skipping internal frames, and
    /// register each as a `StackFrame`. Returns them outer-to-inner.
    pub fn capture_stack(
        &self,
        thread_id: i64,
        top: Box<dyn RuntimeFrame>,
    ) -> Vec<Arc<StackFrame>> {
        let mut chain: Vec<Box<dyn RuntimeFrame>> = Vec::new();
        let mut current = Some(top);
        while let Some(frame) = current {
            current = frame.caller();
            if !frame.is_internal() {
                chain.push(frame);
            }
        }
        // chain is currently inner-to-outer; reverse for outer-to-inner.
        chain.reverse();

        let mut registered = Vec::with_capacity(chain.len());
        for frame in chain {
            registered.push(self.register(thread_id, Arc::from(frame)));
        }
        registered
    }

    fn register(&self, thread_id: i64, frame: Arc<dyn RuntimeFrame>) -> Arc<StackFrame> {
        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            let id = *next_id;
            *next_id += 1;
            id
        };
        let stack_frame = Arc::new(StackFrame {
            id,
            thread_id,
            source_path: frame.source_path(),
            line: frame.line(),
            function_name: frame.function_name(),
            frame,
        });

        self.frames
            .lock()
            .unwrap()
            .insert(id, stack_frame.clone());
        self.by_thread
            .lock()
            .unwrap()
            .entry(thread_id)
            .or_default()
            .push(id);

        stack_frame
    }

    pub fn get(&self, id: i64) -> Option<Arc<StackFrame>> {
        self.frames.lock().unwrap().get(&id).cloned()
    }

    /// Remove every frame captured for `thread_id`. Called on resume/step
    /// before the thread is woken, so the runtime is free to reuse the
    /// frame objects once it continues.
    pub fn invalidate(&self, thread_id: i64) -> Vec<i64> {
        let ids = self
            .by_thread
            .lock()
            .unwrap()
            .remove(&thread_id)
            .unwrap_or_default();
        let mut frames = self.frames.lock().unwrap();
        for id in &ids {
            frames.remove(id);
        }
        ids
    }

    pub fn frames_for_thread(&self, thread_id: i64) -> Vec<Arc<StackFrame>> {
        let ids = self
            .by_thread
            .lock()
            .unwrap()
            .get(&thread_id)
            .cloned()
            .unwrap_or_default();
        let frames = self.frames.lock().unwrap();
        ids.iter().filter_map(|id| frames.get(id).cloned()).collect()
    }
}

impl Default for FrameRegistry {
    fn default() -> Self {
        Self::new()
    }
}
