//! [`EventTap`] backed by the request socket.
//!
//! The actual key and pointer grabs live in an external helper that
//! connects to the socket and asks for a decision on every event.  On this
//! side, "installing" the keyboard tap means binding the socket, and the
//! liveness of each tap is a flag the [`UnixSocketListener`] checks before
//! bothering the switcher.

use crate::command::{InputEvent, TapKind};
use crate::ipc::listener::{UnixSocketError, UnixSocketListener};
use crate::traits::{EventTap, Request};
use log::{debug, error};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

/// Liveness of the two taps, shared with the listener thread.
#[derive(Debug, Default)]
pub struct TapGates {
    keyboard: AtomicBool,
    mouse: AtomicBool,
}

impl TapGates {
    /// Both taps live.
    pub fn open() -> Self {
        Self {
            keyboard: AtomicBool::new(true),
            mouse: AtomicBool::new(true),
        }
    }

    fn flag(&self, tap: TapKind) -> &AtomicBool {
        match tap {
            TapKind::Keyboard => &self.keyboard,
            TapKind::Mouse => &self.mouse,
        }
    }

    pub fn is_live(&self, tap: TapKind) -> bool {
        self.flag(tap).load(Ordering::SeqCst)
    }

    pub fn set_live(&self, tap: TapKind, live: bool) {
        self.flag(tap).store(live, Ordering::SeqCst);
    }

    pub fn disable(&self, tap: TapKind) {
        self.set_live(tap, false);
    }

    /// Whether `event` belongs to a live tap.  Tap-disabled notices are
    /// always admitted.
    pub fn admits(&self, event: &InputEvent) -> bool {
        match event {
            InputEvent::TapDisabled { .. } => true,
            InputEvent::Mouse { .. } => self.is_live(TapKind::Mouse),
            InputEvent::FlagsChanged(_) | InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. } => {
                self.is_live(TapKind::Keyboard)
            }
        }
    }
}

/// Errors produced by the socket tap.
#[derive(Debug, thiserror::Error)]
pub enum SocketTapError {
    #[error("cannot bind {}: {source}", path.display())]
    Bind {
        path: PathBuf,
        source: UnixSocketError,
    },
    #[error("cannot spawn listener thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// The socket-backed pair of taps.
pub struct SocketTap {
    path: PathBuf,
    gates: Arc<TapGates>,
    sink: mpsc::Sender<Request>,
}

impl SocketTap {
    /// A tap that will listen on `path` and forward into `sink`.
    ///
    /// Nothing is bound until [`install_keyboard`](EventTap::install_keyboard).
    pub fn new(path: impl AsRef<Path>, sink: mpsc::Sender<Request>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            gates: Arc::new(TapGates::default()),
            sink,
        }
    }

    pub fn gates(&self) -> &Arc<TapGates> {
        &self.gates
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventTap for SocketTap {
    type Error = SocketTapError;

    fn install_keyboard(&mut self) -> Result<(), SocketTapError> {
        let listener = UnixSocketListener::with_gates(&self.path, Arc::clone(&self.gates));
        let bound = listener.bind().map_err(|source| SocketTapError::Bind {
            path: self.path.clone(),
            source,
        })?;
        let sink = self.sink.clone();
        std::thread::Builder::new()
            .name("appgrd-listener".into())
            .spawn(move || {
                if let Err(e) = listener.serve(bound, sink) {
                    error!("socket listener error: {}", e);
                }
            })?;
        self.gates.set_live(TapKind::Keyboard, true);
        Ok(())
    }

    fn enable_keyboard(&mut self) {
        debug!("keyboard tap enabled");
        self.gates.set_live(TapKind::Keyboard, true);
    }

    fn install_mouse(&mut self) -> Result<(), SocketTapError> {
        self.gates.set_live(TapKind::Mouse, true);
        Ok(())
    }

    fn enable_mouse(&mut self) {
        debug!("mouse tap enabled");
        self.gates.set_live(TapKind::Mouse, true);
    }

    fn remove_mouse(&mut self) {
        self.gates.set_live(TapKind::Mouse, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, Decision, Key, Modifiers, MouseKind, Point};
    use crate::ipc::listener::tests::tmp_socket_path;
    use crate::traits::Message;
    use std::io::{BufRead, BufReader, Write};
    use std::os::unix::net::UnixStream;
    use std::time::Duration;

    fn key_down() -> InputEvent {
        InputEvent::KeyDown {
            key: Key::Tab,
            modifiers: Modifiers::default(),
        }
    }

    #[test]
    fn gates_route_by_tap() {
        let gates = TapGates::default();
        let mouse = InputEvent::Mouse {
            kind: MouseKind::Move,
            at: Point::new(0.0, 0.0),
        };
        let disabled = InputEvent::TapDisabled {
            tap: TapKind::Mouse,
            reason: crate::command::DisableReason::Timeout,
        };
        assert!(!gates.admits(&key_down()));
        assert!(!gates.admits(&mouse));
        assert!(gates.admits(&disabled));

        gates.set_live(TapKind::Keyboard, true);
        assert!(gates.admits(&key_down()));
        assert!(gates.admits(&InputEvent::FlagsChanged(Modifiers::default())));
        assert!(!gates.admits(&mouse));

        gates.set_live(TapKind::Mouse, true);
        assert!(gates.admits(&mouse));
        gates.disable(TapKind::Keyboard);
        assert!(!gates.admits(&key_down()));
    }

    #[test]
    fn mouse_lifecycle_toggles_gate() {
        let (tx, _rx) = mpsc::channel();
        let mut tap = SocketTap::new(tmp_socket_path(), tx);
        assert!(!tap.gates().is_live(TapKind::Mouse));
        tap.install_mouse().unwrap();
        assert!(tap.gates().is_live(TapKind::Mouse));
        tap.gates().disable(TapKind::Mouse);
        tap.enable_mouse();
        assert!(tap.gates().is_live(TapKind::Mouse));
        tap.remove_mouse();
        assert!(!tap.gates().is_live(TapKind::Mouse));
    }

    #[test]
    fn install_keyboard_binds_and_serves() {
        let path = tmp_socket_path();
        let (tx, rx) = mpsc::channel::<Request>();
        let mut tap = SocketTap::new(&path, tx);
        tap.install_keyboard().unwrap();
        assert!(tap.gates().is_live(TapKind::Keyboard));

        std::thread::spawn(move || {
            for req in rx {
                if let Some(reply) = req.reply {
                    let _ = reply.send(Decision::Suppress);
                }
            }
        });

        let mut stream = UnixStream::connect(&path).expect("connect");
        stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let line = serde_json::to_string(&Message::Input(key_down())).unwrap();
        writeln!(stream, "{}", line).unwrap();
        let line = serde_json::to_string(&Message::Command(Command::Cancel)).unwrap();
        writeln!(stream, "{}", line).unwrap();

        let mut reader = BufReader::new(stream);
        let mut first = String::new();
        reader.read_line(&mut first).unwrap();
        let mut second = String::new();
        reader.read_line(&mut second).unwrap();
        assert_eq!(first.trim(), r#""Suppress""#);
        assert_eq!(second.trim(), r#""Ack""#);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn install_keyboard_reports_bind_failure() {
        let (tx, _rx) = mpsc::channel();
        let mut tap = SocketTap::new("/nonexistent-appgrd-dir/tap.sock", tx);
        let err = tap.install_keyboard().unwrap_err();
        assert!(matches!(err, SocketTapError::Bind { .. }));
        assert!(!tap.gates().is_live(TapKind::Keyboard));
    }
}
