//! The stdio transport: reads framed [`Message`]s from stdin on a
//! background thread and writes framed response/event bodies to stdout.
//!
//! Kept separate from `session.rs`/`dispatch.rs` so an embedder that wants
//! a different transport (a socket, an in-process channel for tests) only
//! needs to supply its own [`crate::session::Transport`] and feed messages
//! to [`dispatch::dispatch`] itself.

use std::io;
use std::io::{BufRead, Write};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use crate::dispatch;
use crate::error::DapError;
use crate::message::{write_message, Message};
use crate::runtime::Runtime;
use crate::session::{DebugSession, Transport};

pub struct Adapter {
    receiver: mpsc::Receiver<Result<Message, DapError>>,
}

impl Adapter {
    /// Start reading framed messages from stdin on a background thread.
    /// Do not write anything to stdout before handing it to [`run`]; this
    /// crate owns stdout for the duration of the session.
    pub fn single_session_mode() -> Self {
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            let stdin = io::stdin();
            let lock = stdin.lock();
            let listener = Listener::new(sender, lock);
            listener.start();
        });
        Adapter { receiver }
    }
}

impl Iterator for Adapter {
    type Item = Result<Message, DapError>;

    fn next(&mut self) -> Option<Result<Message, DapError>> {
        self.receiver.recv().ok()
    }
}

struct Listener<R: BufRead> {
    input: R,
    sender: mpsc::Sender<Result<Message, DapError>>,
}

impl<R: BufRead> Listener<R> {
    fn new(sender: mpsc::Sender<Result<Message, DapError>>, input: R) -> Listener<R> {
        Listener { input, sender }
    }

    fn start(mut self) -> ! {
        loop {
            let msg = Message::read_from(&mut self.input);
            let stop = msg.is_err();
            if self.sender.send(msg).is_err() || stop {
                // The receiving end hung up, or the stream is unreadable
                // (EOF/malformed framing); either way nothing left to do.
                loop {
                    thread::park();
                }
            }
        }
    }
}

/// Writes framed response/event bodies to stdout, guarded by a mutex since
/// both the dispatcher (responses) and the tracing core (events), running
/// on different threads, send through the same `SessionEmitter`.
pub struct StdioTransport {
    output: std::sync::Mutex<io::Stdout>,
}

impl StdioTransport {
    pub fn new() -> Self {
        StdioTransport {
            output: std::sync::Mutex::new(io::stdout()),
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for StdioTransport {
    fn send(&self, body: serde_json::Value) {
        let mut output = self.output.lock().unwrap();
        if let Err(err) = write_message(&mut *output, &body) {
            log::warn!("failed to write dap message: {}", err);
        }
        let _ = output.flush();
    }
}

/// Run a debug session over stdin/stdout until the client disconnects or
/// the input stream ends. This is the crate's single-process entry point;
/// an embedder driving a different transport composes [`DebugSession`] and
/// [`dispatch::dispatch`] directly instead.
pub fn run_stdio(runtime: Arc<dyn Runtime>) -> Result<(), DapError> {
    let transport = Arc::new(StdioTransport::new());
    let session = DebugSession::new(runtime, transport);
    let adapter = Adapter::single_session_mode();

    for message in adapter {
        match message {
            Ok(message) => dispatch::dispatch(&session, message.into_generic()),
            Err(err) => {
                log::error!("dap transport error: {}", err);
                break;
            }
        }
    }
    Ok(())
}
