//! Commands and types used throughout appgrd.
//!
//! This module defines the vocabulary that all components share:
//! [`InputEvent`] is a raw event seen by a global tap, [`Command`] is an
//! intent delivered by a [`CommandSource`](crate::traits::CommandSource),
//! and [`AppHandle`] / [`WindowInfo`] / [`Point`] / [`Rect`] are the
//! supporting data types.
//!
//! Key and modifier names are parsed leniently (case-insensitive, `-` and
//! `_` ignored) so both the config file and the IPC wire can say `"Tab"`,
//! `"keypad-enter"` or `"KeypadEnter"`.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

//  Applications and windows

/// Stable identity of a running application (bundle id, window class, …).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(pub String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A switchable application as reported by the
/// [`WindowManager`](crate::traits::WindowManager).
///
/// The engine only borrows these for the duration of a session; it never
/// assumes the application is still alive once the session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppHandle {
    pub id: AppId,
    /// Human-readable name, for the overlay.
    pub name: String,
    /// Icon reference understood by the renderer (icon theme name, path, …).
    #[serde(default)]
    pub icon: Option<String>,
    /// Whether the application is currently running.
    #[serde(default = "default_running")]
    pub running: bool,
}

fn default_running() -> bool {
    true
}

impl AppHandle {
    /// A running application whose name and icon are both its id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            icon: Some(id.clone()),
            id: AppId(id),
            running: true,
        }
    }
}

/// A top-level window of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    /// Backend-specific window address.
    pub address: String,
    pub title: String,
    pub minimized: bool,
}

//  Geometry

/// A point in global screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Whether `p` lies inside the rectangle (left/top edges inclusive).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

//  Keys and modifiers

/// A key as classified by the input taps.
///
/// Only the keys the switcher reacts to get their own variant; everything
/// else is carried as a raw backend key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Return,
    KeypadEnter,
    Escape,
    /// The number row, `0`–`9`.
    Digit(u8),
    /// Any other key, by backend key code.
    Other(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Tab => write!(f, "tab"),
            Key::Return => write!(f, "return"),
            Key::KeypadEnter => write!(f, "keypad-enter"),
            Key::Escape => write!(f, "escape"),
            Key::Digit(n) => write!(f, "{}", n),
            Key::Other(code) => write!(f, "key:{}", code),
        }
    }
}

/// Lowercase `s` and drop whitespace, `-` and `_`.
fn normalize_name(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Parse a key name (`"tab"`, `"Return"`, `"keypad-enter"`, `"esc"`, `"7"`,
/// `"key:48"`).
pub fn parse_key(s: &str) -> Option<Key> {
    let normalized = normalize_name(s);
    match normalized.as_str() {
        "tab" => Some(Key::Tab),
        "return" | "enter" => Some(Key::Return),
        "keypadenter" | "kpenter" => Some(Key::KeypadEnter),
        "escape" | "esc" => Some(Key::Escape),
        other => {
            if let Some(code) = other.strip_prefix("key:") {
                return code.parse().ok().map(Key::Other);
            }
            match other.parse::<u8>() {
                Ok(n) if n <= 9 => Some(Key::Digit(n)),
                _ => None,
            }
        }
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_key(&s).ok_or_else(|| DeError::custom(format!("invalid key: {:?}", s)))
    }
}

/// The modifier that must be held for a switch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Super,
    Alt,
    Ctrl,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Super => write!(f, "super"),
            Modifier::Alt => write!(f, "alt"),
            Modifier::Ctrl => write!(f, "ctrl"),
        }
    }
}

fn parse_modifier(s: &str) -> Option<Modifier> {
    match normalize_name(s).as_str() {
        "super" | "cmd" | "command" | "meta" | "logo" | "win" => Some(Modifier::Super),
        "alt" | "option" | "opt" | "mod1" => Some(Modifier::Alt),
        "ctrl" | "control" => Some(Modifier::Ctrl),
        _ => None,
    }
}

impl Serialize for Modifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Modifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_modifier(&s).ok_or_else(|| DeError::custom(format!("invalid modifier: {:?}", s)))
    }
}

/// Modifier flags attached to a key or flags-changed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    #[serde(rename = "super")]
    pub super_key: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    /// Whether `modifier` is held.
    pub fn contains(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Super => self.super_key,
            Modifier::Alt => self.alt,
            Modifier::Ctrl => self.ctrl,
        }
    }

    /// Flags with only `modifier` held.
    pub fn only(modifier: Modifier) -> Self {
        let mut m = Self::default();
        match modifier {
            Modifier::Super => m.super_key = true,
            Modifier::Alt => m.alt = true,
            Modifier::Ctrl => m.ctrl = true,
        }
        m
    }

    /// Same flags with shift held.
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

//  Raw input

/// Which global tap an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TapKind {
    Keyboard,
    Mouse,
}

/// Why the host disabled a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisableReason {
    /// The tap callback took too long.
    Timeout,
    /// Forced off (secure input, user action, …).
    UserInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseKind {
    Down,
    Up,
    Drag,
    Move,
    Scroll,
}

/// A raw event delivered by a global tap before normal delivery.
///
/// # Wire format
///
/// ```json
/// {"KeyDown":{"key":"tab","modifiers":{"alt":true}}}
/// {"FlagsChanged":{"alt":false}}
/// {"Mouse":{"kind":"Move","at":{"x":10.0,"y":20.0}}}
/// {"TapDisabled":{"tap":"Keyboard","reason":"Timeout"}}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// The host disabled a tap; it must be re-enabled.
    TapDisabled { tap: TapKind, reason: DisableReason },
    /// The set of held modifiers changed.
    FlagsChanged(Modifiers),
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Mouse { kind: MouseKind, at: Point },
}

/// What a tap does with the event it intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Forward unmodified.
    Pass,
    /// Swallow; no other consumer sees it.
    Suppress,
}

//  Commands

/// Wire format for a 1-based candidate slot: accepts a number or a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot(pub usize);

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = Slot;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "non-negative integer or string")
            }
            fn visit_u64<E>(self, n: u64) -> Result<Slot, E>
            where
                E: DeError,
            {
                usize::try_from(n)
                    .map(Slot)
                    .map_err(|_| DeError::custom(format!("Jump: slot {} out of range", n)))
            }
            fn visit_str<E>(self, s: &str) -> Result<Slot, E>
            where
                E: DeError,
            {
                let n: usize = s
                    .trim()
                    .parse()
                    .map_err(|_| DeError::custom("Jump: expected non-negative integer"))?;
                Ok(Slot(n))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Every intent a [`CommandSource`](crate::traits::CommandSource) can
/// deliver to the [`AppSwitcher`](crate::switcher::AppSwitcher).
///
/// Keyboard-driven sessions do not need these; they come out of the
/// [`Interceptor`](crate::interceptor::Interceptor). Commands are for the
/// renderer (tile taps), focus notifications and scripting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Same as the combination key: arm when idle, advance when armed.
    Cycle {
        #[serde(default)]
        reverse: bool,
    },
    /// Select the 1-based slot.
    Jump(Slot),
    Commit,
    Cancel,
    /// A tile was clicked; `0`-based index. Equivalent to `Jump(i + 1)`
    /// followed by `Commit`.
    Tap(usize),
    /// The frontmost application changed.
    Activated(AppId),
}
