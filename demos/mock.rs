//! Demonstrates wiring a minimal embedder: a `Runtime` with one thread and
//! a single breakpoint, run to completion over stdio with `log4rs` logging
//! to a file (the same pattern the crate's own tests drive through the
//! mock support module, but exercised here as a standalone binary).

use std::sync::{Arc, Mutex};

use tracepit::{DebugSession, EventAction, Frame, MonitorSink, Runtime, ThreadId, Value};
use log::info;

fn init_logger() {
    use log4rs::append::file::FileAppender;
    use log4rs::config::{Appender, Config, Root};
    use log4rs::encode::pattern::PatternEncoder;

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build("output.log")
        .unwrap();

    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(
            Root::builder()
                .appender("logfile")
                .build(log::LevelFilter::Info),
        )
        .unwrap();

    log4rs::init_config(config).unwrap();
}

/// A single fixed activation record, standing in for a real interpreter
/// frame for this demo.
struct OneLineFrame;

impl Frame for OneLineFrame {
    fn identity(&self) -> usize {
        1
    }
    fn source_path(&self) -> String {
        "demo.py".to_string()
    }
    fn line(&self) -> u32 {
        1
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
        vec![("answer".to_string(), Value::Int(42))]
    }
    fn globals(&self) -> Vec<(String, Value)> {
        Vec::new()
    }
    fn evaluate(&self, _expr: &str) -> Result<Value, String> {
        Err("evaluation not supported in this demo".to_string())
    }
}

struct OneThreadRuntime {
    monitor: Mutex<Option<Arc<dyn MonitorSink>>>,
}

impl Runtime for OneThreadRuntime {
    fn threads(&self) -> Vec<(ThreadId, String)> {
        vec![(1, "main".to_string())]
    }
    fn top_frame(&self, _thread: ThreadId) -> Option<Box<dyn Frame>> {
        Some(Box::new(OneLineFrame))
    }
    fn register_monitor(&self, sink: Arc<dyn MonitorSink>) {
        *self.monitor.lock().unwrap() = Some(sink);
    }
    fn restart_events(&self) {}
}

struct StdoutTransport;
impl tracepit::Transport for StdoutTransport {
    fn send(&self, body: serde_json::Value) {
        println!("{}", body);
    }
}

fn main() {
    init_logger();

    let runtime = Arc::new(OneThreadRuntime {
        monitor: Mutex::new(None),
    });
    let session = DebugSession::new(runtime.clone(), Arc::new(StdoutTransport));

    let caps = session.initialize();
    info!("advertised capabilities: {:?}", caps);

    let monitor = runtime.monitor.lock().unwrap().clone().unwrap();
    let action = monitor.on_line(1, &OneLineFrame, "demo.py", 1);
    info!("line event result: {:?}", action);
}
