//! The main orchestrator that ties the session, window manager, taps and
//! visualizer together.
//!
//! [`AppSwitcher`] owns the process-wide [`MruList`] and the [`Session`],
//! reacts to intercepted input and [`Command`]s, and turns session
//! [`Effect`]s into calls on its collaborators.

use crate::activation::{Committer, RaiseOutcome};
use crate::candidates;
use crate::command::{AppHandle, Command, Decision, InputEvent, Rect, Slot};
use crate::config::Config;
use crate::grid::{self, LayoutConfig};
use crate::interceptor::Interceptor;
use crate::mru::MruList;
use crate::session::{Action, Effect, Session};
use crate::traits::{
    Capabilities, DesktopSnapshot, EventTap, Message, OverlayFrame, Request, Visualizer, WindowManager,
};
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Possible errors from the switcher.
#[derive(Debug, thiserror::Error)]
pub enum SwitcherError {
    /// The window manager returned an error.
    #[error("window manager error: {0}")]
    WindowManager(String),
}

/// Result of one capability poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// The keyboard tap is installed; polling can stop.
    Installed,
    /// Capabilities are missing or installation failed; poll again later.
    Waiting,
}

/// Orchestrates switch sessions.
///
/// The switcher is generic over its collaborators, making it independent
/// of Hyprland, of the input transport and of the renderer.
///
/// # Typical usage
///
/// ```ignore
/// let wm = Arc::new(HyprlandWm::new());
/// let mut switcher = AppSwitcher::new(wm, tap, visualizer, &config);
/// switcher.poll_capabilities();
/// let decision = switcher.handle_input(&event);
/// ```
pub struct AppSwitcher<W, T, V>
where
    W: WindowManager + Capabilities,
    T: EventTap,
    V: Visualizer,
{
    wm: Arc<W>,
    mru: MruList,
    session: Session,
    interceptor: Interceptor<T>,
    committer: Committer,
    visualizer: V,
    layout: LayoutConfig,
    fallback_area: Rect,
    /// Area the current session's overlay was planned for.
    area: Rect,
}

impl<W, T, V> AppSwitcher<W, T, V>
where
    W: WindowManager + Capabilities,
    T: EventTap,
    V: Visualizer,
{
    pub fn new(wm: Arc<W>, tap: T, visualizer: V, config: &Config) -> Self {
        let fallback_area = config.switcher.fallback_area();
        Self {
            committer: Committer::new(Arc::clone(&wm), config.switcher.raise_delay()),
            wm,
            mru: MruList::new(),
            session: Session::Idle,
            interceptor: Interceptor::new(tap, config.keys.clone()),
            visualizer,
            layout: config.layout.clone(),
            fallback_area,
            area: fallback_area,
        }
    }

    pub fn mru(&self) -> &MruList {
        &self.mru
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn interceptor(&self) -> &Interceptor<T> {
        &self.interceptor
    }

    pub fn visualizer(&self) -> &V {
        &self.visualizer
    }

    /// Block until the raise scheduled by the last commit finished.
    pub fn wait_for_activation(&mut self) -> Option<RaiseOutcome> {
        self.committer.wait()
    }

    /// Seed the MRU from the window manager's z-order.
    ///
    /// Called once at startup; arming re-seeds lazily if the list is still
    /// empty.
    pub fn seed_mru(&mut self) -> Result<(), SwitcherError> {
        let desktop = self.wm.snapshot().map_err(wm_err)?;
        seed(&mut self.mru, &desktop);
        Ok(())
    }

    //  Capability poll

    /// Install the keyboard tap once the host grants both capabilities.
    ///
    /// Each capability is first queried silently and, if missing, queried
    /// again with the host's prompt.
    pub fn poll_capabilities(&mut self) -> PollStatus {
        if self.interceptor.keyboard_installed() {
            return PollStatus::Installed;
        }
        let listen = self.wm.listen_granted(false) || self.wm.listen_granted(true);
        let accessibility =
            self.wm.accessibility_granted(false) || self.wm.accessibility_granted(true);
        if !(listen && accessibility) {
            debug!(
                "capabilities missing (listen: {}, accessibility: {})",
                listen, accessibility
            );
            return PollStatus::Waiting;
        }
        match self.interceptor.install_keyboard() {
            Ok(()) => PollStatus::Installed,
            Err(e) => {
                error!("failed to install keyboard tap: {}", e);
                PollStatus::Waiting
            }
        }
    }

    //  Requests

    /// Process one [`Request`], replying to inputs.
    pub fn handle(&mut self, request: Request) {
        match request.message {
            Message::Input(event) => {
                let decision = self.handle_input(&event);
                if let Some(reply) = request.reply {
                    if reply.send(decision).is_err() {
                        debug!("tap gave up waiting for {:?}", event);
                    }
                }
            }
            Message::Command(cmd) => self.handle_command(cmd),
        }
    }

    /// Classify an intercepted event and apply the action it stands for.
    pub fn handle_input(&mut self, event: &InputEvent) -> Decision {
        let armed = self.session.is_armed();
        let visualizer = &self.visualizer;
        let verdict = self
            .interceptor
            .classify(event, armed, |p| visualizer.hit_test(p));
        if let InputEvent::FlagsChanged(_) = event {
            self.session.set_modifier_held(self.interceptor.modifier_held());
        }
        if let Some(action) = verdict.action {
            self.apply(action);
        }
        if !matches!(event, InputEvent::Mouse { .. }) {
            debug!("{:?} -> {:?}", event, verdict.decision);
        }
        verdict.decision
    }

    /// Process a single [`Command`].
    pub fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Cycle { reverse } => {
                let action = if self.session.is_armed() {
                    Action::Advance { reverse }
                } else {
                    Action::Arm { reverse }
                };
                self.apply(action);
            }
            Command::Jump(Slot(n)) => {
                self.apply(Action::Jump(n));
            }
            Command::Commit => {
                self.apply(Action::Commit);
            }
            Command::Cancel => {
                self.apply(Action::Cancel);
            }
            Command::Tap(index) => {
                if !self.session.is_armed() {
                    debug!("tap on tile {} without a session, ignored", index);
                    return;
                }
                match self.apply(Action::Jump(index.saturating_add(1))) {
                    Effect::Selected(_) => {
                        self.apply(Action::Commit);
                    }
                    _ => debug!("tap on tile {} past the last candidate, ignored", index),
                }
            }
            Command::Activated(id) => {
                debug!("frontmost is now {}", id);
                self.mru.push(id);
            }
        }
    }

    //  Effects

    fn apply(&mut self, action: Action) -> Effect {
        let wm = &*self.wm;
        let mru = &mut self.mru;
        let effect = self
            .session
            .apply(action, || build_candidates(wm, mru));

        match &effect {
            Effect::Armed => {
                self.area = self.screen_area();
                self.interceptor.start_mouse();
                if let Some(armed) = self.session.armed() {
                    info!("session armed with {} candidate(s)", armed.candidates().len());
                }
                self.show();
            }
            Effect::Selected(idx) => {
                debug!("selected {}", idx);
                self.show();
            }
            Effect::Committed(Some(app)) => {
                info!("commit {}", app.id);
                self.end_session();
                self.committer.commit(app.id.clone());
            }
            Effect::Committed(None) => {
                info!("commit with no candidate, nothing to activate");
                self.end_session();
            }
            Effect::Cancelled => {
                info!("session cancelled");
                self.end_session();
            }
            Effect::Ignored => debug!("{:?} ignored", action),
        }
        effect
    }

    /// The overlay frame for the armed session.
    pub fn frame(&self) -> Option<OverlayFrame> {
        let armed = self.session.armed()?;
        let area = self.area;
        Some(OverlayFrame {
            candidates: armed.candidates().to_vec(),
            selected: armed.selected(),
            layout: grid::plan_with(&self.layout, armed.candidates().len(), area.width, area.height),
            area,
        })
    }

    fn show(&mut self) {
        if let Some(frame) = self.frame() {
            self.visualizer.show(frame);
        }
    }

    fn end_session(&mut self) {
        self.interceptor.stop_mouse();
        self.visualizer.hide();
    }

    fn screen_area(&self) -> Rect {
        match self.wm.screen_area() {
            Ok(area) if area.width > 0.0 && area.height > 0.0 => area,
            Ok(area) => {
                warn!("window manager reported an empty screen {:?}, using fallback", area);
                self.fallback_area
            }
            Err(e) => {
                warn!("cannot query screen area ({}), using fallback", e);
                self.fallback_area
            }
        }
    }
}

fn wm_err<E: std::fmt::Display>(e: E) -> SwitcherError {
    SwitcherError::WindowManager(e.to_string())
}

/// Replace `mru` with the desktop's z-order.
fn seed(mru: &mut MruList, desktop: &DesktopSnapshot) {
    let frontmost = desktop.frontmost.as_ref();
    let ids = candidates::seed_ids(&desktop.z_ordered, &desktop.running, frontmost);
    mru.seed(ids, frontmost);
    debug!("seeded mru with {} id(s)", mru.len());
}

/// Candidates for a new session, seeding an empty `mru` first.
///
/// The desktop is queried once; seeding and ordering share the snapshot.
fn build_candidates<W: WindowManager>(wm: &W, mru: &mut MruList) -> Vec<AppHandle> {
    let desktop = match wm.snapshot() {
        Ok(desktop) => desktop,
        Err(e) => {
            warn!("cannot list running applications: {}", e);
            return Vec::new();
        }
    };
    if mru.is_empty() {
        seed(mru, &desktop);
    }
    candidates::order(mru.ids(), &desktop.running)
}

//  Tests
