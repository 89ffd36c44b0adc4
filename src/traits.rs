//! Core traits that decouple appgrd from any specific desktop, input
//! transport or renderer.
//!
//! Every concrete backend (Hyprland, a Unix-socket tap, a test harness, …)
//! implements one of these traits.  The
//! [`AppSwitcher`](crate::switcher::AppSwitcher) only depends on these
//! abstractions.

use crate::command::{AppHandle, AppId, Command, Decision, InputEvent, Point, Rect, Size, WindowInfo};
use crate::grid::GridLayout;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::mpsc;

/// Abstraction over the desktop: the running-application registry plus
/// window access for activation.
///
/// The [`Committer`](crate::activation::Committer) calls
/// [`activate`](WindowManager::activate) and the window methods from a
/// worker thread, hence `Send + Sync`.
pub trait WindowManager: Send + Sync + 'static {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Switchable running applications, one entry per application, in a
    /// stable discovery order.
    fn running_apps(&self) -> Result<Vec<AppHandle>, Self::Error>;

    /// Owners of on-screen windows, front to back.  May contain an id more
    /// than once.
    fn z_ordered_apps(&self) -> Result<Vec<AppId>, Self::Error>;

    /// The application that currently has focus.
    fn frontmost_app(&self) -> Result<Option<AppId>, Self::Error>;

    /// Area the overlay may occupy (the focused screen).
    fn screen_area(&self) -> Result<Rect, Self::Error>;

    /// Ask the desktop to activate `app`.
    fn activate(&self, app: &AppId) -> Result<(), Self::Error>;

    /// Top-level windows of `app`, in enumeration order.
    fn windows(&self, app: &AppId) -> Result<Vec<WindowInfo>, Self::Error>;

    /// Bring `window` to the front.
    fn raise_window(&self, window: &WindowInfo) -> Result<(), Self::Error>;

    /// Everything arming a session needs from the desktop, in one go.
    ///
    /// The default asks the three queries separately.  Only a failure to
    /// list running apps is an error; a missing z-order or frontmost app
    /// leaves that part empty.  Backends that can answer from a single
    /// request override this.
    fn snapshot(&self) -> Result<DesktopSnapshot, Self::Error> {
        let running = self.running_apps()?;
        let z_ordered = self.z_ordered_apps().unwrap_or_else(|e| {
            debug!("no z-order snapshot: {}", e);
            Vec::new()
        });
        let frontmost = self.frontmost_app().unwrap_or_else(|e| {
            debug!("no frontmost app: {}", e);
            None
        });
        Ok(DesktopSnapshot {
            running,
            z_ordered,
            frontmost,
        })
    }
}

/// The desktop as seen when a session is armed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesktopSnapshot {
    /// See [`WindowManager::running_apps`].
    pub running: Vec<AppHandle>,
    /// See [`WindowManager::z_ordered_apps`]; empty when unknown.
    pub z_ordered: Vec<AppId>,
    pub frontmost: Option<AppId>,
}

/// Answers whether the host has granted what the taps need.
///
/// `prompt` lets the implementation show the host's permission request as
/// a side effect.  Negotiation itself is the implementation's business.
pub trait Capabilities {
    /// May global input be observed?
    fn listen_granted(&self, prompt: bool) -> bool;

    /// May other applications' windows be inspected and raised?
    fn accessibility_granted(&self, prompt: bool) -> bool;
}

/// The platform side of the two global taps.
///
/// Implementations deliver [`InputEvent`]s to the switcher on their own;
/// this trait only covers their lifecycle.
pub trait EventTap {
    /// The error type produced by this tap.
    type Error: std::error::Error + Send + 'static;

    /// Create and enable the keyboard tap.
    fn install_keyboard(&mut self) -> Result<(), Self::Error>;

    /// Re-enable the keyboard tap after the host disabled it.
    fn enable_keyboard(&mut self);

    /// Create and enable the mouse tap.
    fn install_mouse(&mut self) -> Result<(), Self::Error>;

    /// Re-enable the mouse tap after the host disabled it.
    fn enable_mouse(&mut self);

    /// Tear the mouse tap down.
    fn remove_mouse(&mut self);
}

//  Visualizer

/// Everything the renderer needs to draw the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayFrame {
    /// Candidates in display order.
    pub candidates: Vec<AppHandle>,
    /// Index of the highlighted candidate.
    pub selected: usize,
    pub layout: GridLayout,
    /// Area the layout was planned for; the panel is centred in it.
    pub area: Rect,
}

impl OverlayFrame {
    /// Screen rectangle covered by the panel.
    pub fn panel_rect(&self) -> Rect {
        self.layout.panel_rect(self.area)
    }

    /// Index of the candidate tile under `p`.
    pub fn tile_at(&self, p: Point) -> Option<usize> {
        self.layout.tile_at(self.area, p, self.candidates.len())
    }

    pub fn area_size(&self) -> Size {
        Size::new(self.area.width, self.area.height)
    }
}

/// Events sent from the [`AppSwitcher`](crate::switcher::AppSwitcher) to an
/// external renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VisualizerEvent {
    /// Show (or update) the overlay.
    Show(OverlayFrame),
    /// The session ended; hide the overlay.
    Hide,
}

/// The rendering collaborator.
///
/// [`show`](Visualizer::show) is called after every state change of an
/// armed session, [`hide`](Visualizer::hide) on every return to idle.  The
/// renderer reports tile clicks back as [`Command::Tap`].
pub trait Visualizer {
    fn show(&mut self, frame: OverlayFrame);

    fn hide(&mut self);

    /// Whether `p` falls within the visible overlay.  Mouse events outside
    /// it are suppressed during a session.
    fn hit_test(&self, p: Point) -> bool;
}

//  Requests and sources

/// One unit of work for the switcher's thread.
///
/// This is also the IPC wire format: `{"Input":{"KeyDown":{"key":"tab"}}}`
/// or `{"Command":"Commit"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// A tap saw an event and waits for a [`Decision`].
    Input(InputEvent),
    Command(Command),
}

/// A [`Message`] plus, for inputs, the channel the decision goes back on.
#[derive(Debug)]
pub struct Request {
    pub message: Message,
    pub reply: Option<mpsc::Sender<Decision>>,
}

impl Request {
    /// A command; nobody waits for it.
    pub fn command(cmd: Command) -> Self {
        Self {
            message: Message::Command(cmd),
            reply: None,
        }
    }

    /// An intercepted event and the receiver its decision arrives on.
    pub fn input(event: InputEvent) -> (Self, mpsc::Receiver<Decision>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                message: Message::Input(event),
                reply: Some(tx),
            },
            rx,
        )
    }
}

/// A source of [`Request`]s.
///
/// Implementations listen on some transport (a Unix socket, Hyprland's
/// event socket, an in-memory channel) and forward what they receive into
/// the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received message must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming message into `sink`.
    ///
    /// This method blocks the calling thread.  To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error>;
}
