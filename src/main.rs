//! Entry point for the **appgrd** daemon.
//!
//! Spawns the configured [`CommandSource`](appgrd::traits::CommandSource)s
//! on background threads and processes every request on the main thread.
//! Until the keyboard tap is installed, the same loop polls the host's
//! capabilities.

use appgrd::config::Config;
use appgrd::hyprland::focus::HyprlandFocusSource;
use appgrd::hyprland::wm::HyprlandWm;
use appgrd::ipc::tap::SocketTap;
use appgrd::switcher::{AppSwitcher, PollStatus};
use appgrd::traits::{Capabilities, CommandSource, EventTap, Request, Visualizer, VisualizerEvent, WindowManager};
use appgrd::visualizer::ChannelVisualizer;
use log::{debug, error, info, warn};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default socket path for the request listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/appgrd.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/appgrd`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("appgrd")
}

/// Try to load the config from `$XDG_CONFIG_HOME/appgrd/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();
    let config = load_config();

    let (req_tx, req_rx) = mpsc::channel::<Request>();
    let (vis_tx, vis_rx) = mpsc::channel::<VisualizerEvent>();
    spawn_frame_logger(vis_rx);

    let tap = SocketTap::new(default_socket_path(), req_tx.clone());
    let mut switcher = AppSwitcher::new(
        Arc::new(HyprlandWm::new()),
        tap,
        ChannelVisualizer::new(vis_tx),
        &config,
    );
    if let Err(e) = switcher.seed_mru() {
        warn!("initial mru seed failed: {}", e);
    }

    spawn_command_sources(req_tx);
    run_event_loop(switcher, req_rx, config.switcher.capability_poll());
}

//  Event loop

/// Process requests until every sender is gone.
///
/// While the keyboard tap is missing, capabilities are polled every
/// `poll_interval`, independent of request traffic.
fn run_event_loop<W, T, V>(
    mut switcher: AppSwitcher<W, T, V>,
    rx: mpsc::Receiver<Request>,
    poll_interval: Duration,
) where
    W: WindowManager + Capabilities,
    T: EventTap,
    V: Visualizer,
{
    info!("appgrd running");
    let mut next_poll = Some(Instant::now());
    loop {
        if let Some(at) = next_poll {
            if Instant::now() >= at {
                next_poll = match switcher.poll_capabilities() {
                    PollStatus::Installed => {
                        info!("keyboard tap installed, capability poll stopped");
                        None
                    }
                    PollStatus::Waiting => {
                        debug!("capabilities not ready, polling again in {:?}", poll_interval);
                        Some(Instant::now() + poll_interval)
                    }
                };
            }
        }
        let received = match next_poll {
            Some(at) => rx.recv_timeout(at.saturating_duration_since(Instant::now())),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(request) => switcher.handle(request),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    info!("all request sources closed, exiting");
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Request>) {
    std::thread::spawn(move || {
        let mut source = HyprlandFocusSource::new();
        if let Err(e) = source.run(tx) {
            error!("focus source error: {}", e);
        }
    });
}

/// Log overlay frames; stands in for an external renderer.
fn spawn_frame_logger(rx: mpsc::Receiver<VisualizerEvent>) {
    std::thread::spawn(move || {
        for event in rx {
            match event {
                VisualizerEvent::Show(frame) => {
                    let names: Vec<&str> = frame.candidates.iter().map(|a| a.name.as_str()).collect();
                    info!(
                        "overlay: {}x{} grid, tile {}, selected {} of {:?}",
                        frame.layout.rows, frame.layout.cols, frame.layout.tile_size, frame.selected, names
                    );
                }
                VisualizerEvent::Hide => info!("overlay hidden"),
            }
        }
    });
}
