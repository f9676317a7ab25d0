use crate::layout::{DockLayout, Edge, LayoutOptions};
use crate::platform::RunningApp;
use crate::preset::{DockItem, Preset};
use crate::Rect;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum IconSource {
    Running { pid: i32 },
    Preset { index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DockIcon {
    // Bundle identifier when known, else `preset:<index>` or `pid:<pid>`.
    pub id: String,
    pub name: String,
    pub icon: String,
    pub source: IconSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickAction {
    Activate(RunningApp),
    Dispatch(DockItem),
    LegacyLaunch(String),
    Ignore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DockRender {
    pub layout: DockLayout,
    pub icons: Vec<DockIcon>,
    pub alpha: f64,
}

impl DockRender {
    // Icons of each row, top row first.
    pub fn rows(&self) -> Vec<Vec<&DockIcon>> {
        self.layout
            .rows
            .iter()
            .map(|row| row.icons.iter().filter_map(|&i| self.icons.get(i)).collect())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct DockModel {
    preset: Option<Arc<Preset>>,
    running: Vec<RunningApp>,
    multi_row: bool,
    opacity: f64,
    icon_size: f64,
}

impl DockModel {
    pub fn new(icon_size: f64, multi_row: bool, opacity: f64) -> Self {
        Self {
            preset: None,
            running: Vec::new(),
            multi_row,
            opacity,
            icon_size,
        }
    }

    pub fn preset(&self) -> Option<&Arc<Preset>> {
        self.preset.as_ref()
    }

    pub fn set_preset(&mut self, preset: Option<Arc<Preset>>) {
        self.preset = preset;
    }

    pub fn running(&self) -> &[RunningApp] {
        &self.running
    }

    // Replaces the running-app list. Returns whether it changed.
    pub fn set_running(&mut self, running: Vec<RunningApp>) -> bool {
        if self.running == running {
            return false;
        }
        self.running = running;
        true
    }

    pub fn set_multi_row(&mut self, multi_row: bool) {
        self.multi_row = multi_row;
    }

    pub fn multi_row(&self) -> bool {
        self.multi_row
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity;
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    // Preset items when a preset is loaded, running applications otherwise.
    pub fn icons(&self) -> Vec<DockIcon> {
        match &self.preset {
            Some(preset) => preset
                .items
                .iter()
                .enumerate()
                .map(|(index, item)| DockIcon {
                    id: item
                        .bundle_id
                        .clone()
                        .filter(|id| !id.is_empty())
                        .unwrap_or_else(|| format!("preset:{}", index)),
                    name: item.display_name.clone(),
                    icon: item.icon.clone(),
                    source: IconSource::Preset { index },
                })
                .collect(),
            None => self
                .running
                .iter()
                .map(|app| DockIcon {
                    id: app
                        .bundle_id
                        .clone()
                        .unwrap_or_else(|| format!("pid:{}", app.pid)),
                    name: app.name.clone(),
                    icon: app.bundle_id.clone().unwrap_or_default(),
                    source: IconSource::Running { pid: app.pid },
                })
                .collect(),
        }
    }

    // Lays the current icons out in `frame`. Side edges cannot fit a
    // single long row, so they always wrap.
    pub fn render(&self, frame: Rect, edge: Edge) -> DockRender {
        let icons = self.icons();
        let options = LayoutOptions {
            icon_size: self.icon_size,
            multi_row: self.multi_row || !edge.is_horizontal(),
        };
        DockRender {
            layout: DockLayout::compute(frame, edge, icons.len(), options),
            icons,
            alpha: self.opacity,
        }
    }

    // Decides what a click on the icon with `id` does.
    // A running process with that identifier is activated first; else the
    // preset item it names is dispatched; else a bundle-like identifier is
    // launched directly.
    pub fn route_click(&self, id: &str) -> ClickAction {
        if let Some(app) = self.find_running(id) {
            return ClickAction::Activate(app.clone());
        }

        if let Some(item) = self.find_preset_item(id) {
            return ClickAction::Dispatch(item.clone());
        }

        if id.starts_with("preset:") || id.starts_with("pid:") || id.is_empty() {
            return ClickAction::Ignore;
        }
        ClickAction::LegacyLaunch(id.to_string())
    }

    fn find_running(&self, id: &str) -> Option<&RunningApp> {
        if let Some(pid) = id.strip_prefix("pid:").and_then(|p| p.parse::<i32>().ok()) {
            return self.running.iter().find(|app| app.pid == pid);
        }
        self.running
            .iter()
            .find(|app| app.bundle_id.as_deref() == Some(id))
    }

    fn find_preset_item(&self, id: &str) -> Option<&DockItem> {
        let preset = self.preset.as_ref()?;
        if let Some(index) = id.strip_prefix("preset:").and_then(|i| i.parse::<usize>().ok()) {
            return preset.items.get(index);
        }
        preset.find_by_bundle_id(id)
    }
}
