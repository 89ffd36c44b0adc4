//! Translates Hyprland focus events into [`Command::Activated`].
//!
//! Hyprland announces focus changes on its event socket (`socket2`) as
//! `EVENT>>DATA\n` lines:
//!
//! | Event           | Payload           |
//! |-----------------|-------------------|
//! | `activewindow`  | `<class>,<title>` |
//!
//! [`HyprlandFocusSource`] connects to the socket directly and forwards
//! the class of every newly focused window, which is what keeps the
//! [`MruList`](crate::mru::MruList) current.  An empty class (focus moved
//! to nothing) is ignored.

use crate::command::{AppId, Command};
use crate::traits::{CommandSource, Request};
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixStream;
use std::sync::mpsc;

/// A [`CommandSource`] over Hyprland's event socket.
#[derive(Debug, Default)]
pub struct HyprlandFocusSource;

impl HyprlandFocusSource {
    pub fn new() -> Self {
        Self
    }
}

/// Error from the Hyprland focus source.
#[derive(Debug, thiserror::Error)]
#[error("hyprland focus source error: {0}")]
pub struct HyprlandFocusError(String);

/// Parse a single event line from socket2.
///
/// Lines have the form `EVENT>>DATA\n`.
fn parse_event_line(line: &str) -> Option<(&str, &str)> {
    let sep = line.find(">>")?;
    Some((&line[..sep], &line[sep + 2..]))
}

/// The command an event stands for, if any.
fn command_for(event: &str, data: &str) -> Option<Command> {
    match event {
        "activewindow" => {
            // The title may contain commas; the class never does.
            let class = data.split(',').next().unwrap_or_default().trim();
            if class.is_empty() {
                None
            } else {
                Some(Command::Activated(AppId::new(class)))
            }
        }
        _ => None,
    }
}

impl CommandSource for HyprlandFocusSource {
    type Error = HyprlandFocusError;

    /// Connect to Hyprland's event socket and forward focus changes.
    ///
    /// This method **blocks** until the socket is closed or the sink goes
    /// away.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error> {
        let path = super::instance_socket(".socket2.sock").map_err(HyprlandFocusError)?;
        let stream = UnixStream::connect(&path)
            .map_err(|e| HyprlandFocusError(format!("connect to {}: {}", path.display(), e)))?;
        info!("focus source connected to {}", path.display());

        for line in BufReader::new(stream).lines() {
            match line {
                Ok(line) if line.is_empty() => continue,
                Ok(line) => {
                    let Some(cmd) = parse_event_line(&line).and_then(|(ev, data)| command_for(ev, data))
                    else {
                        continue;
                    };
                    debug!("focus event: {:?}", cmd);
                    if sink.send(Request::command(cmd)).is_err() {
                        info!("sink closed, shutting down");
                        return Ok(());
                    }
                }
                Err(e) => {
                    error!("socket2 read error: {}", e);
                    return Err(HyprlandFocusError(format!("read error: {}", e)));
                }
            }
        }

        warn!("socket2 stream ended");
        Ok(())
    }
}
