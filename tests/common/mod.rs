#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;
use touchdock::error::DockError;
use touchdock::keystroke::KeyEvent;
use touchdock::platform::{Platform, RunningApp};
use touchdock::Rect;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Launch(String),
    Activate(i32),
    Key(KeyEvent),
    Script(String),
    Shell(String),
    Alert(String),
}

pub struct FakePlatform {
    pub effects: Mutex<Vec<Effect>>,
    pub running: Mutex<Vec<RunningApp>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            effects: Mutex::new(Vec::new()),
            running: Mutex::new(Vec::new()),
        }
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.effects.lock().unwrap().clone()
    }

    fn push(&self, effect: Effect) {
        self.effects.lock().unwrap().push(effect);
    }
}

impl Platform for FakePlatform {
    fn launch_application(&self, bundle_id: &str) -> bool {
        self.push(Effect::Launch(bundle_id.to_string()));
        true
    }

    fn activate_application(&self, app: &RunningApp) -> bool {
        self.push(Effect::Activate(app.pid));
        true
    }

    fn post_key_event(&self, event: KeyEvent) -> Result<(), DockError> {
        self.push(Effect::Key(event));
        Ok(())
    }

    fn run_script(&self, script: &str) -> Result<(), DockError> {
        self.push(Effect::Script(script.to_string()));
        Ok(())
    }

    fn spawn_shell(&self, command: &str) -> Result<(), DockError> {
        self.push(Effect::Shell(command.to_string()));
        Ok(())
    }

    fn alert(&self, message: &str) {
        self.push(Effect::Alert(message.to_string()));
    }

    fn running_applications(&self) -> Option<Vec<RunningApp>> {
        Some(self.running.lock().unwrap().clone())
    }

    fn main_screen_bounds(&self) -> Option<Rect> {
        Some(Rect::new(0.0, 0.0, 1920.0, 1080.0))
    }
}

pub fn write_preset(dir: &Path, name: &str, items: &str) {
    let json = format!(r#"{{ "name": "{}", "dockItems": [{}] }}"#, name, items);
    std::fs::write(dir.join(format!("{}.json", name)), json).unwrap();
}
