//! Test doubles shared by the unit tests.

use crate::command::{AppHandle, AppId, Rect, WindowInfo};
use crate::traits::{Capabilities, WindowManager};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
#[error("fake desktop: {0}")]
pub(crate) struct FakeError(String);

/// An in-memory desktop that records every activation and raise.
///
/// Each app gets one visible window named `<id>-1` unless
/// [`set_windows`](FakeDesktop::set_windows) says otherwise.
#[derive(Debug, Default)]
pub(crate) struct FakeDesktop {
    running: Mutex<Vec<AppHandle>>,
    z_order: Mutex<Option<Vec<AppId>>>,
    frontmost: Mutex<Option<AppId>>,
    windows: Mutex<HashMap<AppId, Vec<WindowInfo>>>,
    broken: Mutex<Vec<String>>,
    screen: Mutex<Option<Rect>>,
    listen: Mutex<bool>,
    accessibility: Mutex<bool>,
    prompts: Mutex<Vec<&'static str>>,
    activations: Mutex<Vec<AppId>>,
    slow: Mutex<HashMap<AppId, Duration>>,
    running_queries: Mutex<usize>,
    raised: Mutex<Vec<String>>,
}

impl FakeDesktop {
    pub fn with_apps(names: &[&str]) -> Self {
        let desktop = Self::default();
        *desktop.running.lock().unwrap() = names.iter().map(|n| AppHandle::new(*n)).collect();
        *desktop.z_order.lock().unwrap() = Some(Vec::new());
        *desktop.screen.lock().unwrap() = Some(Rect::new(0.0, 0.0, 1920.0, 1080.0));
        for name in names {
            desktop.set_windows(name, &[(&format!("{}-1", name), false)]);
        }
        desktop
    }

    pub fn set_windows(&self, app: &str, windows: &[(&str, bool)]) {
        let list = windows
            .iter()
            .map(|(address, minimized)| WindowInfo {
                address: address.to_string(),
                title: address.to_string(),
                minimized: *minimized,
            })
            .collect();
        self.windows.lock().unwrap().insert(AppId::new(app), list);
    }

    /// Make activating `app` take `delay`.
    pub fn set_activation_delay(&self, app: &str, delay: Duration) {
        self.slow.lock().unwrap().insert(AppId::new(app), delay);
    }

    /// How often the running applications were listed.
    pub fn running_queries(&self) -> usize {
        *self.running_queries.lock().unwrap()
    }

    pub fn break_window(&self, address: &str) {
        self.broken.lock().unwrap().push(address.to_string());
    }

    /// `None` makes the z-order query fail.
    pub fn set_z_order(&self, names: Option<&[&str]>) {
        *self.z_order.lock().unwrap() =
            names.map(|n| n.iter().map(|id| AppId::new(*id)).collect());
    }

    pub fn set_frontmost(&self, name: Option<&str>) {
        *self.frontmost.lock().unwrap() = name.map(AppId::new);
    }

    /// `None` makes the screen query fail.
    pub fn set_screen(&self, area: Option<Rect>) {
        *self.screen.lock().unwrap() = area;
    }

    pub fn grant(&self, listen: bool, accessibility: bool) {
        *self.listen.lock().unwrap() = listen;
        *self.accessibility.lock().unwrap() = accessibility;
    }

    pub fn prompts(&self) -> Vec<&'static str> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn activations(&self) -> Vec<AppId> {
        self.activations.lock().unwrap().clone()
    }

    pub fn raised(&self) -> Vec<String> {
        self.raised.lock().unwrap().clone()
    }
}

impl WindowManager for FakeDesktop {
    type Error = FakeError;

    fn running_apps(&self) -> Result<Vec<AppHandle>, FakeError> {
        *self.running_queries.lock().unwrap() += 1;
        Ok(self.running.lock().unwrap().clone())
    }

    fn z_ordered_apps(&self) -> Result<Vec<AppId>, FakeError> {
        self.z_order
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| FakeError("no window list".into()))
    }

    fn frontmost_app(&self) -> Result<Option<AppId>, FakeError> {
        Ok(self.frontmost.lock().unwrap().clone())
    }

    fn screen_area(&self) -> Result<Rect, FakeError> {
        self.screen
            .lock()
            .unwrap()
            .ok_or_else(|| FakeError("no monitor".into()))
    }

    fn activate(&self, app: &AppId) -> Result<(), FakeError> {
        let delay = self.slow.lock().unwrap().get(app).copied();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        self.activations.lock().unwrap().push(app.clone());
        Ok(())
    }

    fn windows(&self, app: &AppId) -> Result<Vec<WindowInfo>, FakeError> {
        self.windows
            .lock()
            .unwrap()
            .get(app)
            .cloned()
            .ok_or_else(|| FakeError(format!("unknown app {}", app)))
    }

    fn raise_window(&self, window: &WindowInfo) -> Result<(), FakeError> {
        if self.broken.lock().unwrap().contains(&window.address) {
            return Err(FakeError(format!("{} vanished", window.address)));
        }
        self.raised.lock().unwrap().push(window.address.clone());
        Ok(())
    }
}

impl Capabilities for FakeDesktop {
    fn listen_granted(&self, prompt: bool) -> bool {
        if prompt {
            self.prompts.lock().unwrap().push("listen");
        }
        *self.listen.lock().unwrap()
    }

    fn accessibility_granted(&self, prompt: bool) -> bool {
        if prompt {
            self.prompts.lock().unwrap().push("accessibility");
        }
        *self.accessibility.lock().unwrap()
    }
}
