use crate::actions::ActionDispatcher;
use crate::config::DockPrefs;
use crate::controls::SystemControl;
use crate::dock::{ClickAction, DockModel, DockRender};
use crate::layout::{frame_for, hidden_frame, slide_step, Edge};
use crate::platform::{Platform, RunningApp};
use crate::plugins::PluginManager;
use crate::preset_loader::{PresetLoader, SharedPreset};
use crate::snap::{DragResult, EdgeSnapper};
use crate::watcher::ChangeNotifier;
use crate::{Config, Rect, Result};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};

// Used until the platform reports real screen bounds.
const FALLBACK_SCREEN: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 1440.0,
    height: 900.0,
};

#[derive(Debug, Clone, PartialEq)]
pub enum PrefChange {
    Edge(Edge),
    MultiRow(bool),
    SlideAnimation(bool),
    Opacity(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DockEvent {
    IconClicked(String),
    ControlClicked(SystemControl),
    HoverEntered,
    HoverExited,
    DragStarted,
    DragEnded(Rect),
    ScreenChanged(Rect),
    PrefChanged(PrefChange),
    ReloadPrefs,
    SelectPreset(String),
    ToggleVisibility,
    RefreshRunning,
    Quit,
}

impl DockEvent {
    // Parses one line of the text control protocol read from stdin, e.g.
    // `click com.apple.Safari`, `edge left` or `drop 0 0 800 120`.
    pub fn parse_command(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = parts.next()?.to_lowercase();
        let rest: Vec<&str> = parts.collect();

        let event = match (command.as_str(), rest.as_slice()) {
            ("click", [id]) => Self::IconClicked(id.to_string()),
            ("control", [name]) => Self::ControlClicked(SystemControl::from_string(name)?),
            ("hover" | "enter", []) => Self::HoverEntered,
            ("leave" | "exit", []) => Self::HoverExited,
            ("drag", []) => Self::DragStarted,
            ("drop", coords) => Self::DragEnded(parse_rect(coords)?),
            ("screen", coords) => Self::ScreenChanged(parse_rect(coords)?),
            ("preset", [name]) => Self::SelectPreset(name.to_string()),
            ("edge", [name]) => Self::PrefChanged(PrefChange::Edge(Edge::from_string(name)?)),
            ("multi-row", [flag]) => Self::PrefChanged(PrefChange::MultiRow(parse_flag(flag)?)),
            ("slide", [flag]) => Self::PrefChanged(PrefChange::SlideAnimation(parse_flag(flag)?)),
            ("opacity", [value]) => Self::PrefChanged(PrefChange::Opacity(value.parse().ok()?)),
            ("reload-prefs", []) => Self::ReloadPrefs,
            ("toggle", []) => Self::ToggleVisibility,
            ("refresh", []) => Self::RefreshRunning,
            ("quit", []) => Self::Quit,
            _ => return None,
        };
        Some(event)
    }
}

fn parse_rect(coords: &[&str]) -> Option<Rect> {
    let values: Vec<f64> = coords
        .iter()
        .map(|c| c.parse::<f64>().ok())
        .collect::<Option<_>>()?;
    match values.as_slice() {
        [x, y, width, height] => Some(Rect::new(*x, *y, *width, *height)),
        _ => None,
    }
}

fn parse_flag(flag: &str) -> Option<bool> {
    match flag.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DockWindow {
    // Current, possibly mid-animation, frame.
    pub frame: Rect,
    pub edge: Edge,
    pub visible: bool,
    // False while slid away behind the screen edge.
    pub revealed: bool,
    pub alpha: f64,
}

#[derive(Debug, Clone)]
struct SlideAnimation {
    from: Rect,
    to: Rect,
    elapsed_ms: f64,
    duration_ms: f64,
}

pub struct DockManager {
    config: Config,
    prefs: DockPrefs,
    prefs_path: Option<PathBuf>,

    platform: Arc<dyn Platform>,
    loader: PresetLoader,
    preset_rx: watch::Receiver<SharedPreset>,
    dispatcher: ActionDispatcher,
    plugin_manager: PluginManager,
    snapper: EdgeSnapper,
    model: DockModel,

    window: DockWindow,
    animation: Option<SlideAnimation>,
    last_render: Option<DockRender>,

    event_tx: mpsc::UnboundedSender<DockEvent>,
    event_rx: mpsc::UnboundedReceiver<DockEvent>,
}

impl DockManager {
    pub fn new(
        config: Config,
        prefs: DockPrefs,
        platform: Arc<dyn Platform>,
        notifier: Box<dyn ChangeNotifier>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let loader = PresetLoader::new(&config.presets, notifier);
        let preset_rx = loader.subscribe();
        let dispatcher = ActionDispatcher::new(Arc::clone(&platform));
        let plugin_manager = PluginManager::new(&config.plugins);

        let screen_rect = platform.main_screen_bounds().unwrap_or_else(|| {
            warn!("Screen bounds unavailable, assuming {:?}", FALLBACK_SCREEN);
            FALLBACK_SCREEN
        });
        let snapper = EdgeSnapper::new(
            screen_rect,
            config.general.snap_threshold,
            config.general.thickness,
        );
        let model = DockModel::new(
            config.general.icon_size,
            prefs.multi_row,
            prefs.dock_opacity,
        );

        let edge = prefs.edge();
        let docked = frame_for(screen_rect, edge, config.general.thickness);
        let revealed = !prefs.slide_animation;
        let window = DockWindow {
            frame: if revealed {
                docked
            } else {
                hidden_frame(docked, edge, config.general.peek)
            },
            edge,
            visible: true,
            revealed,
            alpha: prefs.dock_opacity,
        };

        Self {
            config,
            prefs,
            prefs_path: None,
            platform,
            loader,
            preset_rx,
            dispatcher,
            plugin_manager,
            snapper,
            model,
            window,
            animation: None,
            last_render: None,
            event_tx,
            event_rx,
        }
    }

    pub fn with_prefs_path(mut self, path: PathBuf) -> Self {
        self.prefs_path = Some(path);
        self
    }

    pub fn event_sender(&self) -> mpsc::UnboundedSender<DockEvent> {
        self.event_tx.clone()
    }

    pub fn subscribe_presets(&self) -> watch::Receiver<SharedPreset> {
        self.loader.subscribe()
    }

    pub fn window(&self) -> &DockWindow {
        &self.window
    }

    pub fn prefs(&self) -> &DockPrefs {
        &self.prefs
    }

    pub fn model(&self) -> &DockModel {
        &self.model
    }

    pub fn loader(&self) -> &PresetLoader {
        &self.loader
    }

    pub fn last_render(&self) -> Option<&DockRender> {
        self.last_render.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn start(&mut self) {
        let name = self.prefs.selected_preset.clone();
        info!("Starting dock on {} edge with preset {}", self.window.edge.name(), name);

        if self.loader.select(&name).is_err() {
            info!("Showing running applications instead of preset {}", name);
        }
        self.refresh_running();
        self.sync_preset();
        self.render();
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("Starting dock event loop");
        self.start();

        let mut change_rx = self.loader.take_change_receiver();
        let mut refresh_timer = interval(Duration::from_millis(
            self.config.refresh.running_apps_ms.max(100),
        ));
        let animation_ms = self.config.refresh.animation_ms.max(1);
        let mut animation_timer = interval(Duration::from_millis(animation_ms));
        animation_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                Some(event) = self.event_rx.recv() => {
                    if event == DockEvent::Quit {
                        info!("Quit requested");
                        break;
                    }
                    if let Err(e) = self.handle_event(event) {
                        error!("Error handling dock event: {}", e);
                    }
                }
                Some(path) = next_change(&mut change_rx) => {
                    self.handle_preset_file_change(&path);
                }
                Ok(()) = self.preset_rx.changed() => {
                    self.sync_preset();
                }
                _ = refresh_timer.tick() => {
                    let platform = Arc::clone(&self.platform);
                    match tokio::task::spawn_blocking(move || platform.running_applications()).await {
                        Ok(Some(apps)) => self.apply_running(apps),
                        Ok(None) => debug!("Keeping the previous running-app list"),
                        Err(e) => error!("Error refreshing running applications: {}", e),
                    }
                }
                _ = animation_timer.tick(), if self.animation.is_some() => {
                    self.advance_animation(animation_ms as f64);
                }
            }
        }

        self.shutdown();
        Ok(())
    }

    pub fn shutdown(&mut self) {
        info!("Shutting down dock");
        self.plugin_manager.shutdown();
    }

    pub fn handle_event(&mut self, event: DockEvent) -> Result<()> {
        debug!("Handling dock event: {:?}", event);

        match event {
            DockEvent::IconClicked(id) => self.handle_click(&id),
            DockEvent::ControlClicked(control) => {
                // failures are logged by the control itself
                let _ = control.run(self.platform.as_ref());
            }
            DockEvent::HoverEntered => self.reveal(),
            DockEvent::HoverExited => self.conceal(),
            DockEvent::DragStarted => self.snapper.start_drag(self.window.frame),
            DockEvent::DragEnded(frame) => self.handle_drag_end(frame),
            DockEvent::ScreenChanged(screen) => {
                info!("Screen changed to {:?}", screen);
                self.snapper.update_screen_rect(screen);
                self.reposition();
            }
            DockEvent::PrefChanged(change) => self.apply_pref_change(change),
            DockEvent::ReloadPrefs => self.reload_prefs(),
            DockEvent::SelectPreset(name) => self.select_preset(&name),
            DockEvent::ToggleVisibility => {
                self.window.visible = !self.window.visible;
                info!(
                    "Dock {}",
                    if self.window.visible { "shown" } else { "hidden" }
                );
            }
            DockEvent::RefreshRunning => self.refresh_running(),
            DockEvent::Quit => {}
        }

        Ok(())
    }

    fn handle_click(&mut self, id: &str) {
        match self.model.route_click(id) {
            ClickAction::Activate(app) => self.activate(&app),
            ClickAction::Dispatch(item) => {
                let succeeded = self.dispatcher.dispatch(&item).is_ok();
                self.plugin_manager.on_item_dispatched(&item, succeeded);
            }
            ClickAction::LegacyLaunch(bundle_id) => {
                let _ = self.dispatcher.launch_bundle(&bundle_id);
            }
            ClickAction::Ignore => debug!("Click on {} has nothing to do", id),
        }
    }

    fn activate(&mut self, app: &RunningApp) {
        if self.platform.activate_application(app) {
            self.plugin_manager.on_app_activated(app);
        } else {
            warn!("Failed to activate {} (pid {})", app.name, app.pid);
        }
    }

    fn handle_drag_end(&mut self, frame: Rect) {
        match self.snapper.end_drag(frame, self.window.edge) {
            DragResult::SnapToEdge(edge, _) => {
                info!("Snapping dock to {} edge", edge.name());
                self.window.edge = edge;
                self.prefs.set_edge(edge);
                self.reposition();
                self.persist_prefs();
            }
            DragResult::ReturnToEdge(_) => self.reposition(),
            DragResult::NoAction => {}
        }
    }

    fn apply_pref_change(&mut self, change: PrefChange) {
        match change {
            PrefChange::Edge(edge) => self.prefs.set_edge(edge),
            PrefChange::MultiRow(on) => self.prefs.multi_row = on,
            PrefChange::SlideAnimation(on) => self.prefs.slide_animation = on,
            PrefChange::Opacity(opacity) => self.prefs.set_opacity(opacity),
        }
        self.apply_prefs();
        self.persist_prefs();
    }

    fn reload_prefs(&mut self) {
        let Some(path) = self.prefs_path.clone() else {
            warn!("No preferences file to reload");
            return;
        };
        let previous = self.prefs.selected_preset.clone();
        self.prefs = DockPrefs::load(&path);
        info!("Reloaded preferences from {:?}", path);

        if self.prefs.selected_preset != previous {
            let name = self.prefs.selected_preset.clone();
            if self.loader.select(&name).is_err() {
                // keep the stored name in step with what is on screen
                self.prefs.selected_preset = previous;
            }
            self.sync_preset();
        }
        self.apply_prefs();
    }

    fn apply_prefs(&mut self) {
        self.window.edge = self.prefs.edge();
        self.window.alpha = self.prefs.dock_opacity;
        self.window.revealed = !self.prefs.slide_animation;
        self.model.set_multi_row(self.prefs.multi_row);
        self.model.set_opacity(self.prefs.dock_opacity);
        self.reposition();
    }

    fn select_preset(&mut self, name: &str) {
        // load errors are logged by the loader and leave the old preset up
        let selected = self.loader.select(name).is_ok();
        self.sync_preset();
        if selected {
            self.prefs.selected_preset = name.to_string();
            self.persist_prefs();
        }
    }

    fn handle_preset_file_change(&mut self, path: &Path) {
        if self.loader.handle_change(path).is_some() {
            self.sync_preset();
        }
    }

    // Picks up the latest published preset. No-op when it is unchanged.
    pub fn sync_preset(&mut self) {
        let preset = self.preset_rx.borrow_and_update().clone();
        let changed = match (self.model.preset(), &preset) {
            (Some(current), Some(next)) => !Arc::ptr_eq(current, next),
            (None, None) => false,
            _ => true,
        };
        if !changed {
            return;
        }

        self.model.set_preset(preset.clone());
        self.plugin_manager.on_preset_changed(preset.as_deref());
        self.render();
    }

    // Keeps the previous list when the platform cannot read one.
    pub fn refresh_running(&mut self) {
        match self.platform.running_applications() {
            Some(apps) => self.apply_running(apps),
            None => debug!("Keeping the previous running-app list"),
        }
    }

    fn apply_running(&mut self, apps: Vec<RunningApp>) {
        if self.model.set_running(apps) {
            debug!("Running applications changed ({})", self.model.running().len());
            if self.model.preset().is_none() {
                self.render();
            }
        }
    }

    fn docked_frame(&self) -> Rect {
        frame_for(
            self.snapper.screen_rect(),
            self.window.edge,
            self.config.general.thickness,
        )
    }

    fn resting_frame(&self) -> Rect {
        let docked = self.docked_frame();
        if self.window.revealed {
            docked
        } else {
            hidden_frame(docked, self.window.edge, self.config.general.peek)
        }
    }

    fn reposition(&mut self) {
        self.animation = None;
        self.window.frame = self.resting_frame();
        self.render();
    }

    fn reveal(&mut self) {
        if !self.prefs.slide_animation || self.window.revealed {
            return;
        }
        self.window.revealed = true;
        self.start_slide(self.docked_frame());
    }

    fn conceal(&mut self) {
        if !self.prefs.slide_animation || !self.window.revealed {
            return;
        }
        self.window.revealed = false;
        let hidden = hidden_frame(
            self.docked_frame(),
            self.window.edge,
            self.config.general.peek,
        );
        self.start_slide(hidden);
    }

    fn start_slide(&mut self, to: Rect) {
        let duration_ms = self.config.refresh.slide_duration_ms as f64;
        if duration_ms <= 0.0 {
            self.animation = None;
            self.window.frame = to;
            return;
        }
        self.animation = Some(SlideAnimation {
            from: self.window.frame,
            to,
            elapsed_ms: 0.0,
            duration_ms,
        });
    }

    // Advances the slide by `dt_ms`. Returns whether it is still running.
    pub fn advance_animation(&mut self, dt_ms: f64) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        animation.elapsed_ms += dt_ms.max(0.0);
        let t = animation.elapsed_ms / animation.duration_ms;
        self.window.frame = slide_step(animation.from, animation.to, t);

        if t >= 1.0 {
            self.animation = None;
            false
        } else {
            true
        }
    }

    pub fn render(&mut self) -> &DockRender {
        let render = self.model.render(self.docked_frame(), self.window.edge);
        debug!(
            "Rendered {} icons in {} rows on {} edge",
            render.icons.len(),
            render.layout.row_count(),
            self.window.edge.name()
        );
        self.last_render.insert(render)
    }

    fn persist_prefs(&self) {
        let Some(path) = &self.prefs_path else {
            return;
        };
        if let Err(e) = self.prefs.save(path) {
            error!("Failed to save preferences to {:?}: {}", path, e);
        }
    }
}

async fn next_change(rx: &mut Option<mpsc::UnboundedReceiver<PathBuf>>) -> Option<PathBuf> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
