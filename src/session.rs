//! The switch-session state machine.
//!
//! A [`Session`] is either [`Idle`](Session::Idle) or
//! [`Armed`](Session::Armed).  Every [`Action`] is accepted in every state;
//! the ones that make no sense (advancing while idle, jumping past the last
//! candidate, …) come back as [`Effect::Ignored`] instead of an error so the
//! input path never has to handle a failure.
//!
//! ```text
//!            arm                advance / jump
//!   Idle ───────────▶ Armed ◀──────────────┐
//!    ▲                  │  └────────────────┘
//!    └──── commit ──────┤
//!    └──── cancel ──────┘
//! ```
//!
//! The state machine knows nothing about taps, windows or rendering; the
//! [`AppSwitcher`](crate::switcher::AppSwitcher) turns its [`Effect`]s into
//! side effects.

use crate::command::AppHandle;

/// An input to the state machine, as classified by the
/// [`Interceptor`](crate::interceptor::Interceptor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start a session, moving the selection one step from the first
    /// candidate.
    Arm { reverse: bool },
    /// Move the selection one step, wrapping.
    Advance { reverse: bool },
    /// Select the 1-based slot `n`.
    Jump(usize),
    Commit,
    Cancel,
}

/// What an [`Action`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// `Idle → Armed`.
    Armed,
    /// The selection is now the given index.
    Selected(usize),
    /// `Armed → Idle`, activating the candidate if there was one.
    Committed(Option<AppHandle>),
    /// `Armed → Idle` without activation.
    Cancelled,
    /// Nothing changed.
    Ignored,
}

/// State of an armed session.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmedSession {
    candidates: Vec<AppHandle>,
    selected: usize,
    modifier_held: bool,
}

impl ArmedSession {
    pub fn candidates(&self) -> &[AppHandle] {
        &self.candidates
    }

    /// Index of the selected candidate.  Always `0` when there are no
    /// candidates.
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn current(&self) -> Option<&AppHandle> {
        self.candidates.get(self.selected)
    }

    pub fn modifier_held(&self) -> bool {
        self.modifier_held
    }

    fn step(&mut self, reverse: bool) -> Option<usize> {
        let count = self.candidates.len();
        if count == 0 {
            return None;
        }
        self.selected = if reverse {
            (self.selected + count - 1) % count
        } else {
            (self.selected + 1) % count
        };
        Some(self.selected)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    #[default]
    Idle,
    Armed(ArmedSession),
}

impl Session {
    pub fn is_armed(&self) -> bool {
        matches!(self, Session::Armed(_))
    }

    pub fn armed(&self) -> Option<&ArmedSession> {
        match self {
            Session::Armed(s) => Some(s),
            Session::Idle => None,
        }
    }

    /// Record the primary modifier state while armed.
    pub fn set_modifier_held(&mut self, held: bool) {
        if let Session::Armed(s) = self {
            s.modifier_held = held;
        }
    }

    /// Apply `action`.
    ///
    /// `candidates` is only called when arming from `Idle`; it supplies
    /// the ordered candidate list for the new session.
    pub fn apply<F>(&mut self, action: Action, candidates: F) -> Effect
    where
        F: FnOnce() -> Vec<AppHandle>,
    {
        match self {
            Session::Idle => match action {
                Action::Arm { reverse } => {
                    let mut armed = ArmedSession {
                        candidates: candidates(),
                        selected: 0,
                        modifier_held: true,
                    };
                    armed.step(reverse);
                    *self = Session::Armed(armed);
                    Effect::Armed
                }
                // Everything else needs a session.
                Action::Advance { .. } | Action::Jump(_) | Action::Commit | Action::Cancel => {
                    Effect::Ignored
                }
            },
            Session::Armed(s) => match action {
                // Arming is only reachable from Idle.
                Action::Arm { .. } => Effect::Ignored,
                Action::Advance { reverse } => match s.step(reverse) {
                    Some(idx) => Effect::Selected(idx),
                    None => Effect::Ignored,
                },
                Action::Jump(n) => {
                    if n >= 1 && n <= s.candidates.len() {
                        s.selected = n - 1;
                        Effect::Selected(s.selected)
                    } else {
                        Effect::Ignored
                    }
                }
                Action::Commit => {
                    let selected = s.selected;
                    let candidates = std::mem::take(&mut s.candidates);
                    *self = Session::Idle;
                    Effect::Committed(candidates.into_iter().nth(selected))
                }
                Action::Cancel => {
                    *self = Session::Idle;
                    Effect::Cancelled
                }
            },
        }
    }
}

//  Tests
