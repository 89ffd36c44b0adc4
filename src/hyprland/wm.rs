//! [`WindowManager`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any shell command invocation or third-party crate for socket
//! discovery.
//!
//! Applications are identified by their window class.  An application is
//! "running" while it has at least one mapped client, and its windows are
//! that class's clients; a client on a special (scratchpad) workspace or
//! marked hidden counts as minimized.

use crate::command::{AppHandle, AppId, Rect, WindowInfo};
use crate::traits::{Capabilities, DesktopSnapshot, WindowManager};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Hyprland-backed window manager.
///
/// All communication happens over Hyprland's IPC socket.  No child
/// processes are spawned.
pub struct HyprlandWm;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandWmError(String);

impl Default for HyprlandWm {
    fn default() -> Self {
        Self
    }
}

impl HyprlandWm {
    /// Create a new handle.
    ///
    /// No connection is opened eagerly; each method call opens a short-lived
    /// IPC request.
    pub fn new() -> Self {
        Self
    }

    fn clients(&self) -> Result<Vec<ClientJson>, HyprlandWmError> {
        parse(&ipc_json("clients")?)
    }
}

//  Direct Hyprland IPC helpers

fn socket_path() -> Result<PathBuf, HyprlandWmError> {
    super::instance_socket(".socket.sock").map_err(HyprlandWmError)
}

/// Send a raw command to the Hyprland command socket and return the
/// response as a string.
fn ipc_request(command: &str) -> Result<String, HyprlandWmError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandWmError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandWmError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandWmError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandWmError(format!("utf-8: {}", e)))
}

/// Send a JSON data query (`j/<command>`) and return the raw JSON string.
fn ipc_json(data_command: &str) -> Result<String, HyprlandWmError> {
    ipc_request(&format!("j/{}", data_command))
}

/// Send a dispatch command and check for `"ok"`.
fn ipc_dispatch(args: &str) -> Result<(), HyprlandWmError> {
    let response = ipc_request(&format!("/dispatch {}", args))?;
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandWmError(format!("dispatch error: {}", response)))
    }
}

fn parse<'a, T: Deserialize<'a>>(json: &'a str) -> Result<T, HyprlandWmError> {
    serde_json::from_str(json).map_err(|e| HyprlandWmError(format!("parse: {}", e)))
}

//  Minimal serde structs for the JSON we care about

#[derive(Debug, Deserialize)]
struct WorkspaceRef {
    id: i64,
}

/// Subset of one object returned by `j/clients` (and `j/activewindow`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientJson {
    address: String,
    #[serde(default = "yes")]
    mapped: bool,
    #[serde(default)]
    hidden: bool,
    class: String,
    #[serde(default)]
    title: String,
    workspace: WorkspaceRef,
    /// `0` is the most recently focused client.
    #[serde(rename = "focusHistoryID", default)]
    focus_history_id: i64,
}

fn yes() -> bool {
    true
}

impl ClientJson {
    fn is_switchable(&self) -> bool {
        self.mapped && !self.class.is_empty()
    }

    /// Hidden, or parked on a special workspace (negative id).
    fn is_minimized(&self) -> bool {
        self.hidden || self.workspace.id < 0
    }

    fn window_info(&self) -> WindowInfo {
        WindowInfo {
            address: self.address.clone(),
            title: self.title.clone(),
            minimized: self.is_minimized(),
        }
    }
}

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Debug, Deserialize)]
struct MonitorJson {
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    #[serde(default = "unit_scale")]
    scale: f64,
    #[serde(default)]
    focused: bool,
}

fn unit_scale() -> f64 {
    1.0
}

impl MonitorJson {
    /// Logical area of the monitor.
    fn area(&self) -> Rect {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        Rect::new(
            self.x as f64,
            self.y as f64,
            self.width as f64 / scale,
            self.height as f64 / scale,
        )
    }
}

//  Pure mapping from Hyprland state to the engine's model

/// One handle per class, in client order.
fn running_from(clients: &[ClientJson]) -> Vec<AppHandle> {
    let mut seen = HashSet::new();
    clients
        .iter()
        .filter(|c| c.is_switchable())
        .filter(|c| seen.insert(c.class.as_str()))
        .map(|c| AppHandle {
            id: AppId::new(c.class.as_str()),
            name: c.class.clone(),
            icon: Some(c.class.to_lowercase()),
            running: true,
        })
        .collect()
}

/// Classes of visible clients, most recently focused first.
fn z_order_from(clients: &[ClientJson]) -> Vec<AppId> {
    let mut visible: Vec<&ClientJson> = clients
        .iter()
        .filter(|c| c.is_switchable() && !c.is_minimized())
        .collect();
    visible.sort_by_key(|c| c.focus_history_id);
    visible.into_iter().map(|c| AppId::new(c.class.as_str())).collect()
}

fn windows_from(clients: &[ClientJson], app: &AppId) -> Vec<WindowInfo> {
    clients
        .iter()
        .filter(|c| c.is_switchable() && c.class == app.as_str())
        .map(ClientJson::window_info)
        .collect()
}

/// The client of `app` to focus: the most recent visible one, else the
/// most recent one at all.
fn focus_target<'a>(clients: &'a [ClientJson], app: &AppId) -> Option<&'a ClientJson> {
    let of_app = || {
        clients
            .iter()
            .filter(move |c| c.is_switchable() && c.class == app.as_str())
    };
    of_app()
        .filter(|c| !c.is_minimized())
        .min_by_key(|c| c.focus_history_id)
        .or_else(|| of_app().min_by_key(|c| c.focus_history_id))
}

/// Class of the client with the newest focus, which is the focused one
/// unless focus moved to an empty workspace.
fn frontmost_from(clients: &[ClientJson]) -> Option<AppId> {
    clients
        .iter()
        .filter(|c| c.is_switchable())
        .find(|c| c.focus_history_id == 0)
        .map(|c| AppId::new(c.class.as_str()))
}

fn snapshot_from(clients: &[ClientJson]) -> DesktopSnapshot {
    DesktopSnapshot {
        running: running_from(clients),
        z_ordered: z_order_from(clients),
        frontmost: frontmost_from(clients),
    }
}

/// `j/activewindow` answers `{}` when nothing is focused.
fn active_class(json: &str) -> Result<Option<AppId>, HyprlandWmError> {
    if json.trim() == "{}" {
        return Ok(None);
    }
    let client: ClientJson = parse(json)?;
    Ok(Some(client.class).filter(|c| !c.is_empty()).map(AppId))
}

fn focused_area(monitors: &[MonitorJson]) -> Option<Rect> {
    monitors
        .iter()
        .find(|m| m.focused)
        .or_else(|| monitors.first())
        .map(MonitorJson::area)
}

//  WindowManager implementation

impl WindowManager for HyprlandWm {
    type Error = HyprlandWmError;

    fn running_apps(&self) -> Result<Vec<AppHandle>, Self::Error> {
        Ok(running_from(&self.clients()?))
    }

    fn z_ordered_apps(&self) -> Result<Vec<AppId>, Self::Error> {
        Ok(z_order_from(&self.clients()?))
    }

    fn frontmost_app(&self) -> Result<Option<AppId>, Self::Error> {
        active_class(&ipc_json("activewindow")?)
    }

    fn screen_area(&self) -> Result<Rect, Self::Error> {
        let monitors: Vec<MonitorJson> = parse(&ipc_json("monitors")?)?;
        focused_area(&monitors).ok_or_else(|| HyprlandWmError("no monitors".into()))
    }

    fn activate(&self, app: &AppId) -> Result<(), Self::Error> {
        let clients = self.clients()?;
        let target = focus_target(&clients, app)
            .ok_or_else(|| HyprlandWmError(format!("{} has no windows", app)))?;
        debug!("focusing {} ({})", target.address, app);
        ipc_dispatch(&format!("focuswindow address:{}", target.address))
    }

    fn windows(&self, app: &AppId) -> Result<Vec<WindowInfo>, Self::Error> {
        Ok(windows_from(&self.clients()?, app))
    }

    fn raise_window(&self, window: &WindowInfo) -> Result<(), Self::Error> {
        ipc_dispatch(&format!("alterzorder top,address:{}", window.address))
    }

    /// One `j/clients` request instead of three.
    fn snapshot(&self) -> Result<DesktopSnapshot, Self::Error> {
        Ok(snapshot_from(&self.clients()?))
    }
}

//  Capabilities

impl Capabilities for HyprlandWm {
    /// Input reaches appgrd through Hyprland's sockets, so listening is
    /// possible once the instance socket exists.
    fn listen_granted(&self, prompt: bool) -> bool {
        let granted = socket_path().map(|p| p.exists()).unwrap_or(false);
        if !granted && prompt {
            warn!("Hyprland IPC socket not found; is appgrd running inside Hyprland?");
        }
        granted
    }

    /// Windows can be inspected once client queries succeed.
    fn accessibility_granted(&self, prompt: bool) -> bool {
        match self.clients() {
            Ok(_) => true,
            Err(e) => {
                if prompt {
                    warn!("cannot query Hyprland clients: {}", e);
                }
                false
            }
        }
    }
}
