//! **appgrd**: a keyboard-driven application switcher.
//!
//! Holding the modifier and pressing the cycle key opens a *switch session*
//! over every running application, most recently used first, laid out as a
//! dense grid.  Further presses move the selection, digits jump to a slot,
//! and releasing the modifier activates the selected application.
//!
//! # Architecture
//!
//! The engine itself is free of platform code:
//!
//! * [`mru`], [`candidates`] and [`grid`] are pure data and layout.
//! * [`session`] is the state machine and [`interceptor`] classifies raw
//!   input into its actions.
//! * [`activation`] brings the chosen application forward.
//! * [`switcher::AppSwitcher`] owns all of the above and talks to the
//!   collaborators declared in [`traits`].
//!
//! Concrete collaborators live in [`hyprland`] (Hyprland IPC), [`ipc`]
//! (Unix-socket requests and taps) and [`visualizer`] (frame streaming).

pub mod activation;
pub mod candidates;
pub mod command;
pub mod config;
pub mod grid;
pub mod hyprland;
pub mod interceptor;
pub mod ipc;
pub mod mru;
pub mod session;
pub mod switcher;
pub mod traits;
pub mod visualizer;

#[cfg(test)]
mod testutil;
