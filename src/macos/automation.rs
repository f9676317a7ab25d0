use crate::error::DockError;
use crate::platform::{parse_process_list, RunningApp};
use log::{debug, warn};
use std::process::{Command, Stdio};

const LIST_PROCESSES_SCRIPT: &str = r#"set out to ""
tell application "System Events"
    repeat with p in (every process whose background only is false)
        set out to out & (name of p) & tab & (bundle identifier of p) & tab & (unix id of p) & linefeed
    end repeat
end tell
return out"#;

// Runs an AppleScript through `osascript` and returns what it printed.
pub fn run_applescript(script: &str) -> Result<String, DockError> {
    debug!("Running AppleScript ({} bytes)", script.len());
    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| DockError::ScriptError(format!("failed to run osascript: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(DockError::ScriptError(if stderr.is_empty() {
            format!("osascript exited with {}", output.status)
        } else {
            stderr
        }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub fn list_foreground_processes(own_pid: i32) -> Result<Vec<RunningApp>, DockError> {
    let output = run_applescript(LIST_PROCESSES_SCRIPT)?;
    Ok(parse_process_list(&output, own_pid))
}

pub fn activate_process(pid: i32) -> Result<(), DockError> {
    let script = format!(
        "tell application \"System Events\" to set frontmost of (first process whose unix id is {}) to true",
        pid
    );
    run_applescript(&script).map(|_| ())
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn show_notification(title: &str, message: &str) {
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        escape_applescript(message),
        escape_applescript(title)
    );
    if let Err(e) = Command::new("osascript")
        .arg("-e")
        .arg(&script)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        warn!("Failed to show notification: {}", e);
    }
}
