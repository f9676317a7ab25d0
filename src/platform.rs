use crate::error::DockError;
use crate::keystroke::KeyEvent;
use crate::Rect;
use log::{debug, warn};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningApp {
    pub name: String,
    pub bundle_id: Option<String>,
    pub pid: i32,
}

pub trait Platform: Send + Sync {
    fn launch_application(&self, bundle_id: &str) -> bool;

    fn activate_application(&self, app: &RunningApp) -> bool;

    fn post_key_event(&self, event: KeyEvent) -> Result<(), DockError>;

    fn run_script(&self, script: &str) -> Result<(), DockError>;

    // Spawns `command` through the user's shell without waiting for it.
    fn spawn_shell(&self, command: &str) -> Result<(), DockError>;

    fn alert(&self, message: &str);

    // `None` when the process list could not be read.
    fn running_applications(&self) -> Option<Vec<RunningApp>>;

    fn main_screen_bounds(&self) -> Option<Rect>;
}

pub fn system_platform() -> Arc<dyn Platform> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(crate::macos::MacPlatform::new())
    }

    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(HeadlessPlatform)
    }
}

pub fn bundled_resources_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    if let Some(dir) = crate::macos::main_bundle_resources() {
        return dir;
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("Resources")))
        .unwrap_or_else(|| PathBuf::from("Resources"))
}

// Spawns `shell -c command` with output captured. A detached thread reaps
// the child and logs what it printed.
pub fn spawn_shell_command(shell: &str, command: &str) -> Result<(), DockError> {
    let child = Command::new(shell)
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| DockError::SpawnFailure {
            command: command.to_string(),
            source,
        })?;

    let label = command.to_string();
    std::thread::spawn(move || match child.wait_with_output() {
        Ok(output) => debug!(
            "Shell command {:?} exited with {} ({} bytes stdout, {} bytes stderr)",
            label,
            output.status,
            output.stdout.len(),
            output.stderr.len()
        ),
        Err(e) => warn!("Failed to reap shell command {:?}: {}", label, e),
    });

    Ok(())
}

// Parses `name<TAB>bundle id<TAB>pid` lines as produced by the process
// listing script. AppleScript's `missing value` becomes `None`.
pub fn parse_process_list(output: &str, own_pid: i32) -> Vec<RunningApp> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let name = fields.next()?.trim();
            let bundle_id = fields.next()?.trim();
            let pid = fields.next()?.trim().parse::<i32>().ok()?;
            if name.is_empty() || pid == own_pid {
                return None;
            }
            let bundle_id = match bundle_id {
                "" | "missing value" => None,
                id => Some(id.to_string()),
            };
            Some(RunningApp {
                name: name.to_string(),
                bundle_id,
                pid,
            })
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessPlatform;

impl Platform for HeadlessPlatform {
    fn launch_application(&self, bundle_id: &str) -> bool {
        warn!("Cannot launch {} without a window server", bundle_id);
        false
    }

    fn activate_application(&self, app: &RunningApp) -> bool {
        warn!("Cannot activate {} without a window server", app.name);
        false
    }

    fn post_key_event(&self, event: KeyEvent) -> Result<(), DockError> {
        Err(DockError::UnknownAction(format!(
            "key events are not supported on this platform (key code {})",
            event.key_code
        )))
    }

    fn run_script(&self, _script: &str) -> Result<(), DockError> {
        Err(DockError::ScriptError(
            "automation scripts are not supported on this platform".to_string(),
        ))
    }

    fn spawn_shell(&self, command: &str) -> Result<(), DockError> {
        spawn_shell_command("/bin/sh", command)
    }

    fn alert(&self, message: &str) {
        warn!("Alert: {}", message);
    }

    fn running_applications(&self) -> Option<Vec<RunningApp>> {
        None
    }

    fn main_screen_bounds(&self) -> Option<Rect> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_process_listing() {
        let output = "Safari\tcom.apple.Safari\t412\n\
                      Finder\tcom.apple.finder\t301\n\
                      TouchDock\tcom.example.TouchDock\t999\n\
                      Helper\tmissing value\t77\n\
                      garbage line\n";
        let apps = parse_process_list(output, 999);
        assert_eq!(apps.len(), 3);
        assert_eq!(apps[0].bundle_id.as_deref(), Some("com.apple.Safari"));
        assert_eq!(apps[0].pid, 412);
        assert_eq!(apps[2].name, "Helper");
        assert_eq!(apps[2].bundle_id, None);
    }

    #[cfg(unix)]
    #[test]
    fn spawns_shell_without_waiting() {
        assert!(spawn_shell_command("/bin/sh", "exit 0").is_ok());
        assert!(spawn_shell_command("/nonexistent/shell", "true").is_err());
    }
}
