//! Breakpoint registry: path-indexed `(path, line) -> breakpoints`, with
//! the hit-test order and condition/hit-count/log-point semantics §9 of
//! this crate's design notes commits to.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::runtime::Frame;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct BreakpointSpec {
    pub line: u32,
    pub condition: Option<String>,
    pub hit_condition: Option<String>,
    pub log_message: Option<String>,
}

pub struct Breakpoint {
    pub id: i64,
    pub path: String,
    pub line: u32,
    pub enabled: bool,
    pub condition: Option<String>,
    pub hit_condition: Option<String>,
    pub log_message: Option<String>,
    hit_count: Mutex<u64>,
}

pub enum HitOutcome {
    NotHit,
    Hit,
    /// A log point matched; it never suspends. Carries the interpolated
    /// message to send as an `output` event.
    LogPoint(String),
}

pub struct BreakpointRegistry {
    next_id: Mutex<i64>,
    by_path: Mutex<HashMap<String, HashMap<u32, Vec<std::sync::Arc<Breakpoint>>>>>,
}

impl BreakpointRegistry {
    pub fn new() -> Self {
        BreakpointRegistry {
            next_id: Mutex::new(1),
            by_path: Mutex::new(HashMap::new()),
        }
    }

    pub fn canonicalize(path: &str) -> String {
        match std::fs::canonicalize(Path::new(path)) {
            Ok(resolved) => resolved.to_string_lossy().replace('\\', "/"),
            Err(_) => path.replace('\\', "/"),
        }
    }

    /// Replace every breakpoint for `path` atomically. Returns the newly
    /// created breakpoints in the same order as `specs`.
    pub fn set_breakpoints(
        &self,
        path: &str,
        specs: Vec<BreakpointSpec>,
    ) -> Vec<std::sync::Arc<Breakpoint>> {
        let canonical = Self::canonicalize(path);
        let mut by_path = self.by_path.lock().unwrap();
        by_path.remove(&canonical);

        let mut created = Vec::with_capacity(specs.len());
        let mut by_line: HashMap<u32, Vec<std::sync::Arc<Breakpoint>>> = HashMap::new();
        for spec in specs {
            let id = {
                let mut next_id = self.next_id.lock().unwrap();
                let id = *next_id;
                *next_id += 1;
                id
            };
            let bp = std::sync::Arc::new(Breakpoint {
                id,
                path: canonical.clone(),
                line: spec.line,
                enabled: true,
                condition: spec.condition,
                hit_condition: spec.hit_condition,
                log_message: spec.log_message,
                hit_count: Mutex::new(0),
            });
            by_line.entry(spec.line).or_default().push(bp.clone());
            created.push(bp);
        }
        by_path.insert(canonical, by_line);
        created
    }

    pub fn clear_all(&self) {
        self.by_path.lock().unwrap().clear();
    }

    pub fn at(&self, path: &str, line: u32) -> Vec<std::sync::Arc<Breakpoint>> {
        let canonical = Self::canonicalize(path);
        self.at_canonical(&canonical, line)
    }

    fn at_canonical(&self, canonical: &str, line: u32) -> Vec<std::sync::Arc<Breakpoint>> {
        let by_path = self.by_path.lock().unwrap();
        by_path
            .get(canonical)
            .and_then(|by_line| by_line.get(&line))
            .cloned()
            .unwrap_or_default()
    }

}

impl Default for BreakpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Breakpoint {
    /// Order: enabled -> line -> path -> condition -> hit-count. `frame`
    /// supplies the scopes condition/log-message expressions evaluate in.
    pub fn is_hit(&self, frame: &dyn Frame) -> HitOutcome {
        if !self.enabled {
            return HitOutcome::NotHit;
        }
        if self.line != frame.line() {
            return HitOutcome::NotHit;
        }
        if self.path != BreakpointRegistry::canonicalize(&frame.source_path()) {
            return HitOutcome::NotHit;
        }

        if let Some(condition) = &self.condition {
            match frame.evaluate(condition) {
                Ok(value) if !value.is_truthy() => return HitOutcome::NotHit,
                // A raising condition is treated as a hit so the error
                // surfaces to the user instead of hiding the breakpoint.
                _ => {}
            }
        }

        let mut hit_count = self.hit_count.lock().unwrap();
        *hit_count += 1;
        let count = *hit_count;
        drop(hit_count);

        if let Some(hit_condition) = &self.hit_condition {
            if !hit_condition_satisfied(hit_condition, count) {
                return HitOutcome::NotHit;
            }
        }

        if let Some(template) = &self.log_message {
            return HitOutcome::LogPoint(render_log_message(template, frame));
        }

        HitOutcome::Hit
    }
}

fn hit_condition_satisfied(expr: &str, count: u64) -> bool {
    let expr = expr.trim();
    if let Some(rest) = expr.strip_prefix(">=") {
        return rest.trim().parse::<u64>().map(|n| count >= n).unwrap_or(false);
    }
    if let Some(rest) = expr.strip_prefix('%') {
        return rest
            .trim()
            .parse::<u64>()
            .map(|n| n != 0 && count % n == 0)
            .unwrap_or(false);
    }
    expr.parse::<u64>().map(|n| count == n).unwrap_or(false)
}

fn render_log_message(template: &str, frame: &dyn Frame) -> String {
    let mut out = String::new();
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(end) = template[i..].find('}') {
                let expr = &template[i + 1..i + end];
                match frame.evaluate(expr) {
                    Ok(value) => out.push_str(&crate::render::render(&value, &Default::default())),
                    Err(message) => out.push_str(&format!("<error: {}>", message)),
                }
                i += end + 1;
                continue;
            }
        }
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestFrame {
        path: String,
        line: u32,
        locals: Vec<(String, Value)>,
    }

    impl Frame for TestFrame {
        fn identity(&self) -> usize {
            1
        }
        fn source_path(&self) -> String {
            self.path.clone()
        }
        fn line(&self) -> u32 {
            self.line
        }
        fn function_name(&self) -> String {
            "<module>".to_string()
        }
        fn is_internal(&self) -> bool {
            false
        }
        fn caller(&self) -> Option<Box<dyn Frame>> {
            None
        }
        fn locals(&self) -> Vec<(String, Value)> {
            self.locals.clone()
        }
        fn globals(&self) -> Vec<(String, Value)> {
            Vec::new()
        }
        fn evaluate(&self, expr: &str) -> Result<Value, String> {
            self.locals
                .iter()
                .find(|(name, _)| name == expr)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| format!("NameError: {}", expr))
        }
    }

    fn frame(path: &str, line: u32) -> TestFrame {
        TestFrame {
            path: path.to_string(),
            line,
            locals: Vec::new(),
        }
    }

    #[test]
    fn set_breakpoints_replaces_prior_set_for_the_same_source() {
        let registry = BreakpointRegistry::new();
        registry.set_breakpoints(
            "a.py",
            vec![BreakpointSpec {
                line: 1,
                condition: None,
                hit_condition: None,
                log_message: None,
            }],
        );
        let second = registry.set_breakpoints(
            "a.py",
            vec![BreakpointSpec {
                line: 2,
                condition: None,
                hit_condition: None,
                log_message: None,
            }],
        );
        assert!(registry.at("a.py", 1).is_empty());
        assert_eq!(registry.at("a.py", 2).len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn is_hit_false_when_line_does_not_match() {
        let registry = BreakpointRegistry::new();
        let bp = &registry.set_breakpoints(
            "a.py",
            vec![BreakpointSpec {
                line: 10,
                condition: None,
                hit_condition: None,
                log_message: None,
            }],
        )[0]
            .clone();
        assert!(matches!(bp.is_hit(&frame("a.py", 11)), HitOutcome::NotHit));
        assert!(matches!(bp.is_hit(&frame("a.py", 10)), HitOutcome::Hit));
    }

    #[test]
    fn raising_condition_counts_as_hit() {
        let bp = Breakpoint {
            id: 1,
            path: BreakpointRegistry::canonicalize("a.py"),
            line: 5,
            enabled: true,
            condition: Some("missing".to_string()),
            hit_condition: None,
            log_message: None,
            hit_count: Mutex::new(0),
        };
        assert!(matches!(bp.is_hit(&frame("a.py", 5)), HitOutcome::Hit));
    }

    #[test]
    fn falsy_condition_is_not_hit() {
        let bp = Breakpoint {
            id: 1,
            path: BreakpointRegistry::canonicalize("a.py"),
            line: 5,
            enabled: true,
            condition: Some("flag".to_string()),
            hit_condition: None,
            log_message: None,
            hit_count: Mutex::new(0),
        };
        let mut f = frame("a.py", 5);
        f.locals.push(("flag".to_string(), Value::Bool(false)));
        assert!(matches!(bp.is_hit(&f), HitOutcome::NotHit));
    }

    #[test]
    fn hit_condition_every_nth_only_hits_on_multiples() {
        let bp = Breakpoint {
            id: 1,
            path: BreakpointRegistry::canonicalize("a.py"),
            line: 5,
            enabled: true,
            condition: None,
            hit_condition: Some("% 2".to_string()),
            log_message: None,
            hit_count: Mutex::new(0),
        };
        let f = frame("a.py", 5);
        assert!(matches!(bp.is_hit(&f), HitOutcome::NotHit));
        assert!(matches!(bp.is_hit(&f), HitOutcome::Hit));
        assert!(matches!(bp.is_hit(&f), HitOutcome::NotHit));
    }

    #[test]
    fn log_point_never_suspends_and_interpolates_expression() {
        let bp = Breakpoint {
            id: 1,
            path: BreakpointRegistry::canonicalize("a.py"),
            line: 5,
            enabled: true,
            condition: None,
            hit_condition: None,
            log_message: Some("x = {x}".to_string()),
            hit_count: Mutex::new(0),
        };
        let mut f = frame("a.py", 5);
        f.locals.push(("x".to_string(), Value::Int(7)));
        match bp.is_hit(&f) {
            HitOutcome::LogPoint(message) => assert_eq!(message, "x = 7"),
            _ => panic!("expected a log point"),
        }
    }
}
