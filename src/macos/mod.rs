pub mod automation;
pub mod display;
pub mod keyboard;

use crate::error::DockError;
use crate::keystroke::KeyEvent;
use crate::platform::{spawn_shell_command, Platform, RunningApp};
use crate::Rect;
use core_foundation::bundle::CFBundle;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::process::Command;

const SHELL: &str = "/bin/zsh";

pub struct MacPlatform {
    own_pid: i32,
}

impl MacPlatform {
    pub fn new() -> Self {
        Self {
            own_pid: std::process::id() as i32,
        }
    }
}

impl Default for MacPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for MacPlatform {
    fn launch_application(&self, bundle_id: &str) -> bool {
        debug!("Launching application {}", bundle_id);
        match Command::new("open").arg("-b").arg(bundle_id).status() {
            Ok(status) => status.success(),
            Err(e) => {
                warn!("Failed to run open for {}: {}", bundle_id, e);
                false
            }
        }
    }

    fn activate_application(&self, app: &RunningApp) -> bool {
        info!("Activating {} (pid {})", app.name, app.pid);
        match automation::activate_process(app.pid) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to activate {}: {}", app.name, e);
                false
            }
        }
    }

    fn post_key_event(&self, event: KeyEvent) -> Result<(), DockError> {
        keyboard::post_key_event(event)
    }

    fn run_script(&self, script: &str) -> Result<(), DockError> {
        automation::run_applescript(script).map(|_| ())
    }

    fn spawn_shell(&self, command: &str) -> Result<(), DockError> {
        spawn_shell_command(SHELL, command)
    }

    fn alert(&self, message: &str) {
        automation::show_notification("TouchDock", message);
    }

    fn running_applications(&self) -> Option<Vec<RunningApp>> {
        match automation::list_foreground_processes(self.own_pid) {
            Ok(apps) => Some(apps),
            Err(e) => {
                warn!("Failed to list running applications: {}", e);
                None
            }
        }
    }

    fn main_screen_bounds(&self) -> Option<Rect> {
        Some(display::main_screen_rect())
    }
}

// `Contents/Resources` of the running app bundle. `None` for a bare
// executable, whose "bundle" is just its directory.
pub fn main_bundle_resources() -> Option<PathBuf> {
    CFBundle::main_bundle()
        .bundle_resources_url()
        .and_then(|url| url.to_path())
        .filter(|path| path.file_name().map_or(false, |name| name == "Resources"))
}
