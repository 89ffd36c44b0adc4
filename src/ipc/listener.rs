//! Unix-socket [`CommandSource`] implementation.
//!
//! Binds a Unix stream socket and serves each connection on its own
//! thread.
//! Each line received is parsed as a JSON-encoded [`Message`] and answered
//! with exactly one line.
//!
//! # Wire format
//!
//! Every message is a single line of JSON followed by `\n`:
//!
//! ```json
//! {"Input":{"KeyDown":{"key":"tab","modifiers":{"alt":true}}}}
//! {"Input":{"FlagsChanged":{}}}
//! {"Command":{"Tap":2}}
//! {"Command":{"Activated":"firefox"}}
//! ```
//!
//! Inputs are answered with the switcher's decision, `"Pass"` or
//! `"Suppress"`; commands with `"Ack"`.  Malformed lines are logged and
//! get no answer.

use crate::command::{Decision, InputEvent};
use crate::ipc::tap::TapGates;
use crate::traits::{CommandSource, Message, Request};
use log::{debug, error, info};
use serde::Serialize;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

/// One answer line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
enum Reply {
    Pass,
    Suppress,
    Ack,
}

impl From<Decision> for Reply {
    fn from(d: Decision) -> Self {
        match d {
            Decision::Pass => Reply::Pass,
            Decision::Suppress => Reply::Suppress,
        }
    }
}

/// A [`CommandSource`] that listens on a Unix stream socket for
/// JSON-encoded inputs and commands.
///
/// Each accepted connection can send multiple newline-delimited messages
/// and stays open as long as the client likes.
pub struct UnixSocketListener {
    path: PathBuf,
    gates: Arc<TapGates>,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UnixSocketListener {
    /// Create a listener bound to `path` that forwards every input.
    ///
    /// The socket file is created when [`run`](CommandSource::run) is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_gates(path, Arc::new(TapGates::open()))
    }

    /// Create a listener whose inputs are filtered by `gates`.
    ///
    /// Inputs for a tap that is not live are answered `"Pass"` right away
    /// without reaching the switcher.
    pub fn with_gates(path: impl AsRef<Path>, gates: Arc<TapGates>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            gates,
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bind the socket, replacing a stale file.
    pub fn bind(&self) -> Result<UnixListener, UnixSocketError> {
        let _ = std::fs::remove_file(&self.path);
        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());
        Ok(listener)
    }

    /// Accept connections on an already bound `listener`.
    ///
    /// Every client is served on its own thread, so a long-lived input
    /// helper does not lock out the renderer or scripts.  Blocks until
    /// `sink` is closed; the closure is noticed on the next accept.
    pub fn serve(&self, listener: UnixListener, sink: mpsc::Sender<Request>) -> Result<(), UnixSocketError> {
        let closed = Arc::new(AtomicBool::new(false));
        for stream in listener.incoming() {
            if closed.load(Ordering::SeqCst) {
                info!("sink closed, shutting down");
                return Ok(());
            }
            match stream {
                Ok(stream) => {
                    debug!("client connected");
                    let client = Client {
                        gates: Arc::clone(&self.gates),
                        sink: sink.clone(),
                        closed: Arc::clone(&closed),
                    };
                    let spawned = std::thread::Builder::new()
                        .name("appgrd-client".into())
                        .spawn(move || match client.serve(stream) {
                            Ok(()) => debug!("client disconnected"),
                            Err(e) => error!("client error: {}", e),
                        });
                    if let Err(e) = spawned {
                        error!("cannot spawn client thread: {}", e);
                    }
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
        Ok(())
    }
}

/// One connection's share of the listener.
struct Client {
    gates: Arc<TapGates>,
    sink: mpsc::Sender<Request>,
    /// Set once the switcher is gone.
    closed: Arc<AtomicBool>,
}

impl Client {
    fn serve(&self, stream: UnixStream) -> Result<(), UnixSocketError> {
        let reader = BufReader::new(stream.try_clone()?);
        let mut writer = stream;
        for line in reader.lines() {
            let text = match line {
                Ok(text) => text,
                Err(e) => {
                    error!("read error: {}", e);
                    break;
                }
            };
            if text.trim().is_empty() {
                continue;
            }
            let reply = match serde_json::from_str::<Message>(&text) {
                Ok(Message::Input(event)) => match self.forward_input(event) {
                    Some(decision) => Reply::from(decision),
                    None => {
                        self.close();
                        return Ok(());
                    }
                },
                Ok(Message::Command(cmd)) => {
                    debug!("received {:?}", cmd);
                    if self.sink.send(Request::command(cmd)).is_err() {
                        self.close();
                        return Ok(());
                    }
                    Reply::Ack
                }
                Err(e) => {
                    error!("bad message: {}: {}", text, e);
                    continue;
                }
            };
            serde_json::to_writer(&mut writer, &reply)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Decide `event`, asking the switcher if its tap is live.
    ///
    /// `None` means the switcher is gone.
    fn forward_input(&self, event: InputEvent) -> Option<Decision> {
        if let InputEvent::TapDisabled { tap, .. } = event {
            self.gates.disable(tap);
        } else if !self.gates.admits(&event) {
            return Some(Decision::Pass);
        }
        let (request, reply) = Request::input(event);
        self.sink.send(request).ok()?;
        // A switcher that drops the reply sender without answering lets
        // the event through.
        Some(reply.recv().unwrap_or(Decision::Pass))
    }
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** indefinitely.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error> {
        let listener = self.bind()?;
        self.serve(listener, sink)
    }
}

//  Tests
