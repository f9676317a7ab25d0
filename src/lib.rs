pub mod actions;
pub mod config;
pub mod controls;
pub mod dock;
pub mod dock_manager;
pub mod error;
pub mod keystroke;
pub mod layout;
#[cfg(target_os = "macos")]
pub mod macos;
pub mod platform;
pub mod plugins;
pub mod preset;
pub mod preset_loader;
pub mod snap;
pub mod watcher;

pub use config::{Config, DockPrefs};
pub use dock_manager::DockManager;
pub use error::DockError;
pub use layout::Edge;
pub use preset::{ActionKind, DockItem, Preset};
pub use preset_loader::PresetLoader;

pub type Result<T> = anyhow::Result<T>;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x() && x <= self.max_x() && y >= self.min_y() && y <= self.max_y()
    }
}
