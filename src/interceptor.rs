//! Classification of intercepted input.
//!
//! Every key, modifier and mouse event is offered to the
//! [`Interceptor`] before the desktop delivers it anywhere else.  The
//! interceptor answers with a [`Verdict`]: pass or suppress, plus the
//! session [`Action`] the event stands for, if any.
//!
//! | Event                         | Idle                 | Armed                    |
//! |-------------------------------|----------------------|--------------------------|
//! | tap disabled                  | re-enable, pass      | re-enable, pass          |
//! | modifier released             | pass                 | **commit**, suppress     |
//! | other modifier change         | pass                 | suppress                 |
//! | modifier + cycle key          | **arm**, suppress    | **advance**, suppress    |
//! | confirm key                   | pass                 | **commit**, suppress     |
//! | digit `1`–`9`                 | pass                 | **jump**, suppress       |
//! | cancel key                    | pass                 | **cancel**, suppress     |
//! | any other key down            | pass                 | suppress                 |
//! | key up                        | pass                 | pass                     |
//! | mouse inside the overlay      | pass                 | pass                     |
//! | mouse outside the overlay     | pass                 | suppress                 |
//!
//! Holding shift with the cycle key reverses the direction.
//!
//! The interceptor also owns the lifecycle of the two taps: the keyboard
//! tap is installed once (idempotently) and the mouse tap only lives for
//! the duration of a session.

use crate::command::{Decision, InputEvent, Key, Modifier, Point, TapKind};
use crate::session::Action;
use crate::traits::EventTap;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

/// Which keys drive a session.
///
/// # Example
///
/// ```json
/// {
///   "modifier": "super",
///   "cycle_key": "tab",
///   "confirm_keys": ["return", "keypad-enter"],
///   "cancel_key": "escape"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Held for the whole session; releasing it commits.  Default: `alt`.
    pub modifier: Modifier,
    /// Pressed with the modifier to arm or advance.  Default: `tab`.
    pub cycle_key: Key,
    /// Commit without releasing the modifier.  Default: return, keypad enter.
    pub confirm_keys: Vec<Key>,
    /// Abort the session.  Default: `escape`.
    pub cancel_key: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            modifier: Modifier::Alt,
            cycle_key: Key::Tab,
            confirm_keys: vec![Key::Return, Key::KeypadEnter],
            cancel_key: Key::Escape,
        }
    }
}

/// The interceptor's answer for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub decision: Decision,
    pub action: Option<Action>,
}

impl Verdict {
    fn pass() -> Self {
        Self {
            decision: Decision::Pass,
            action: None,
        }
    }

    fn suppress() -> Self {
        Self {
            decision: Decision::Suppress,
            action: None,
        }
    }

    /// Suppress the event and perform `action`.
    fn act(action: Action) -> Self {
        Self {
            decision: Decision::Suppress,
            action: Some(action),
        }
    }
}

/// Routes raw events into session actions and manages the taps.
pub struct Interceptor<T: EventTap> {
    tap: T,
    bindings: KeyBindings,
    modifier_held: bool,
    keyboard_installed: bool,
    mouse_installed: bool,
}

impl<T: EventTap> Interceptor<T> {
    pub fn new(tap: T, bindings: KeyBindings) -> Self {
        Self {
            tap,
            bindings,
            modifier_held: false,
            keyboard_installed: false,
            mouse_installed: false,
        }
    }

    pub fn tap(&self) -> &T {
        &self.tap
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Whether the primary modifier is currently held.
    pub fn modifier_held(&self) -> bool {
        self.modifier_held
    }

    pub fn keyboard_installed(&self) -> bool {
        self.keyboard_installed
    }

    pub fn mouse_installed(&self) -> bool {
        self.mouse_installed
    }

    /// Install the keyboard tap.  A no-op once installed.
    pub fn install_keyboard(&mut self) -> Result<(), T::Error> {
        if self.keyboard_installed {
            return Ok(());
        }
        info!("installing keyboard tap");
        self.tap.install_keyboard()?;
        self.keyboard_installed = true;
        info!("keyboard tap installed");
        Ok(())
    }

    /// Install the mouse tap for a starting session.
    ///
    /// Failure only costs mouse suppression for this session, so it is
    /// logged rather than returned.
    pub fn start_mouse(&mut self) {
        if self.mouse_installed {
            return;
        }
        match self.tap.install_mouse() {
            Ok(()) => {
                debug!("mouse tap installed");
                self.mouse_installed = true;
            }
            Err(e) => error!("failed to install mouse tap: {}", e),
        }
    }

    /// Remove the mouse tap at the end of a session.
    pub fn stop_mouse(&mut self) {
        if self.mouse_installed {
            debug!("removing mouse tap");
            self.tap.remove_mouse();
            self.mouse_installed = false;
        }
    }

    /// Classify `event` given whether a session is `armed`.
    ///
    /// `hit_test` is only consulted for mouse events during a session.
    pub fn classify<H>(&mut self, event: &InputEvent, armed: bool, hit_test: H) -> Verdict
    where
        H: FnOnce(Point) -> bool,
    {
        match *event {
            InputEvent::TapDisabled { tap, reason } => {
                warn!("{:?} tap disabled ({:?}), re-enabling", tap, reason);
                match tap {
                    TapKind::Keyboard => self.tap.enable_keyboard(),
                    TapKind::Mouse => {
                        if self.mouse_installed {
                            self.tap.enable_mouse();
                        }
                    }
                }
                Verdict::pass()
            }

            InputEvent::FlagsChanged(mods) => {
                let now = mods.contains(self.bindings.modifier);
                let was = self.modifier_held;
                self.modifier_held = now;
                if was && !now && armed {
                    debug!("{} released, committing", self.bindings.modifier);
                    return Verdict::act(Action::Commit);
                }
                if armed {
                    Verdict::suppress()
                } else {
                    Verdict::pass()
                }
            }

            InputEvent::KeyDown { key, modifiers } => {
                if key == self.bindings.cycle_key && modifiers.contains(self.bindings.modifier) {
                    self.modifier_held = true;
                    let reverse = modifiers.shift;
                    return Verdict::act(if armed {
                        Action::Advance { reverse }
                    } else {
                        Action::Arm { reverse }
                    });
                }
                if !armed {
                    return Verdict::pass();
                }
                debug!("key {} during session", key);
                if self.bindings.confirm_keys.contains(&key) {
                    return Verdict::act(Action::Commit);
                }
                if key == self.bindings.cancel_key {
                    return Verdict::act(Action::Cancel);
                }
                match key {
                    Key::Digit(n @ 1..=9) => Verdict::act(Action::Jump(n as usize)),
                    // Nothing reaches the focused application mid-session.
                    _ => Verdict::suppress(),
                }
            }

            InputEvent::KeyUp { .. } => Verdict::pass(),

            InputEvent::Mouse { at, .. } => {
                if !armed || hit_test(at) {
                    Verdict::pass()
                } else {
                    Verdict::suppress()
                }
            }
        }
    }
}

//  Tests
