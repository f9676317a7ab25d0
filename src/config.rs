use crate::layout::Edge;
use crate::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "touchdock";
pub const MIN_OPACITY: f64 = 0.2;
pub const MAX_OPACITY: f64 = 1.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub presets: PresetConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub plugins: PluginConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_icon_size")]
    pub icon_size: f64,
    #[serde(default = "default_thickness")]
    pub thickness: f64,
    #[serde(default = "default_snap_threshold")]
    pub snap_threshold: f64,
    #[serde(default = "default_peek")]
    pub peek: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundled_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_running_apps_ms")]
    pub running_apps_ms: u64,
    #[serde(default = "default_animation_ms")]
    pub animation_ms: u64,
    #[serde(default = "default_slide_duration_ms")]
    pub slide_duration_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub enabled: Vec<String>,
}

fn default_icon_size() -> f64 {
    64.0
}
fn default_thickness() -> f64 {
    120.0
}
fn default_snap_threshold() -> f64 {
    50.0
}
fn default_peek() -> f64 {
    4.0
}
fn default_running_apps_ms() -> u64 {
    2000
}
fn default_animation_ms() -> u64 {
    16
}
fn default_slide_duration_ms() -> u64 {
    200
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            icon_size: default_icon_size(),
            thickness: default_thickness(),
            snap_threshold: default_snap_threshold(),
            peek: default_peek(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            running_apps_ms: default_running_apps_ms(),
            animation_ms: default_animation_ms(),
            slide_duration_ms: default_slide_duration_ms(),
        }
    }
}

// `~/Library/Application Support/touchdock` on macOS.
pub fn app_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    app_config_dir().join("config.toml")
}

impl PresetConfig {
    pub fn user_dir(&self) -> PathBuf {
        self.user_dir
            .clone()
            .unwrap_or_else(|| app_config_dir().join("Presets"))
    }

    pub fn bundled_dir(&self) -> PathBuf {
        self.bundled_dir
            .clone()
            .unwrap_or_else(|| crate::platform::bundled_resources_dir().join("Presets"))
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_toml(path.as_ref(), self)
    }

    pub fn reload<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        *self = Self::load(path)?;
        Ok(())
    }

    pub fn prefs_path(config_path: &Path) -> PathBuf {
        config_path
            .parent()
            .map(|dir| dir.join("prefs.toml"))
            .unwrap_or_else(|| PathBuf::from("prefs.toml"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenshotMode {
    #[default]
    File,
    Clipboard,
    Both,
}

impl ScreenshotMode {
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(Self::File),
            1 => Some(Self::Clipboard),
            2 => Some(Self::Both),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockPrefs {
    #[serde(default)]
    pub dock_position: i64,
    #[serde(default)]
    pub slide_animation: bool,
    #[serde(default)]
    pub multi_row: bool,
    #[serde(default = "default_opacity")]
    pub dock_opacity: f64,
    #[serde(default)]
    pub screenshot_mode: i64,
    #[serde(default = "default_preset_name")]
    pub selected_preset: String,
    // Opaque encoded shortcut per shortcut name.
    #[serde(default)]
    pub shortcuts: BTreeMap<String, Vec<u8>>,
}

fn default_opacity() -> f64 {
    1.0
}
fn default_preset_name() -> String {
    "default".to_string()
}

impl Default for DockPrefs {
    fn default() -> Self {
        Self {
            dock_position: 0,
            slide_animation: false,
            multi_row: false,
            dock_opacity: default_opacity(),
            screenshot_mode: 0,
            selected_preset: default_preset_name(),
            shortcuts: BTreeMap::new(),
        }
    }
}

impl DockPrefs {
    // Loads preferences, falling back to defaults when the file is missing
    // or unreadable. Out-of-range values are normalized, never rejected.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let prefs = match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Self>(&content) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!("Ignoring malformed preferences at {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };
        prefs.normalized()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_toml(path.as_ref(), self)
    }

    pub fn normalized(mut self) -> Self {
        if Edge::from_position(self.dock_position).is_none() {
            warn!("Invalid dock position {}, using bottom", self.dock_position);
            self.dock_position = Edge::Bottom.position();
        }
        self.dock_opacity = normalize_opacity(self.dock_opacity);
        if ScreenshotMode::from_raw(self.screenshot_mode).is_none() {
            self.screenshot_mode = 0;
        }
        if self.selected_preset.trim().is_empty() {
            self.selected_preset = default_preset_name();
        }
        self
    }

    pub fn edge(&self) -> Edge {
        Edge::from_position(self.dock_position).unwrap_or_default()
    }

    pub fn set_edge(&mut self, edge: Edge) {
        self.dock_position = edge.position();
    }

    pub fn screenshot_mode(&self) -> ScreenshotMode {
        ScreenshotMode::from_raw(self.screenshot_mode).unwrap_or_default()
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.dock_opacity = normalize_opacity(opacity);
    }

    pub fn shortcut(&self, name: &str) -> Option<&[u8]> {
        self.shortcuts.get(name).map(Vec::as_slice)
    }

    pub fn set_shortcut(&mut self, name: &str, encoded: Vec<u8>) {
        self.shortcuts.insert(name.to_string(), encoded);
    }
}

// Unset (zero) opacity means fully opaque.
fn normalize_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() || opacity == 0.0 {
        return MAX_OPACITY;
    }
    opacity.clamp(MIN_OPACITY, MAX_OPACITY)
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    Ok(())
}
