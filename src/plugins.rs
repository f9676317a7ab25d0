use crate::config::PluginConfig;
use crate::platform::RunningApp;
use crate::preset::{DockItem, Preset};
use crate::Result;
use log::{debug, error, info, warn};
use std::collections::{BTreeMap, HashMap};

pub trait DockPlugin: Send {
    fn name(&self) -> &str;
    fn init(&mut self) -> Result<()>;
    fn on_preset_changed(&mut self, preset: Option<&Preset>) -> Result<()>;
    fn on_item_dispatched(&mut self, item: &DockItem, succeeded: bool) -> Result<()>;
    fn on_app_activated(&mut self, app: &RunningApp) -> Result<()>;
    fn shutdown(&mut self) -> Result<()>;
}

pub type PluginFactory = fn() -> Box<dyn DockPlugin>;

#[derive(Clone, Default)]
pub struct PluginRegistry {
    factories: BTreeMap<&'static str, PluginFactory>,
}

impl PluginRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("activity-log", || Box::new(ActivityLog));
        registry.register("launch-counter", || Box::<LaunchCounter>::default());
        registry
    }

    pub fn register(&mut self, name: &'static str, factory: PluginFactory) {
        self.factories.insert(name, factory);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    fn create(&self, name: &str) -> Option<Box<dyn DockPlugin>> {
        self.factories.get(name).map(|factory| factory())
    }
}

pub struct PluginManager {
    config: PluginConfig,
    registry: PluginRegistry,
    plugins: Vec<Box<dyn DockPlugin>>,
}

impl PluginManager {
    pub fn new(config: &PluginConfig) -> Self {
        Self::with_registry(config, PluginRegistry::builtin())
    }

    pub fn with_registry(config: &PluginConfig, registry: PluginRegistry) -> Self {
        let mut manager = Self {
            config: config.clone(),
            registry,
            plugins: Vec::new(),
        };
        manager.load_plugins();
        manager
    }

    fn load_plugins(&mut self) {
        let enabled = self.config.enabled.clone();
        for name in &enabled {
            info!("Loading plugin: {}", name);
            if let Err(e) = self.load_plugin(name) {
                error!("Failed to load plugin {}: {}", name, e);
            }
        }
    }

    fn load_plugin(&mut self, name: &str) -> Result<()> {
        let Some(mut plugin) = self.registry.create(name) else {
            warn!(
                "Unknown plugin {} (available: {})",
                name,
                self.registry.names().join(", ")
            );
            return Ok(());
        };

        plugin.init()?;
        self.plugins.push(plugin);
        info!("Successfully loaded plugin: {}", name);
        Ok(())
    }

    pub fn loaded(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn on_preset_changed(&mut self, preset: Option<&Preset>) {
        debug!(
            "Notifying plugins of preset change: {:?}",
            preset.map(|p| p.name.as_str())
        );

        for plugin in self.plugins.iter_mut() {
            if let Err(e) = plugin.on_preset_changed(preset) {
                error!("Plugin {} error on preset changed: {}", plugin.name(), e);
            }
        }
    }

    pub fn on_item_dispatched(&mut self, item: &DockItem, succeeded: bool) {
        for plugin in self.plugins.iter_mut() {
            if let Err(e) = plugin.on_item_dispatched(item, succeeded) {
                error!("Plugin {} error on item dispatched: {}", plugin.name(), e);
            }
        }
    }

    pub fn on_app_activated(&mut self, app: &RunningApp) {
        for plugin in self.plugins.iter_mut() {
            if let Err(e) = plugin.on_app_activated(app) {
                error!("Plugin {} error on app activated: {}", plugin.name(), e);
            }
        }
    }

    pub fn reload_plugin(&mut self, name: &str) -> Result<()> {
        info!("Reloading plugin: {}", name);

        if let Some(index) = self.plugins.iter().position(|p| p.name() == name) {
            let mut plugin = self.plugins.remove(index);
            if let Err(e) = plugin.shutdown() {
                warn!("Error shutting down plugin {} before reload: {}", name, e);
            }
        }

        self.load_plugin(name)
    }

    pub fn shutdown(&mut self) {
        info!("Shutting down plugin manager");

        for plugin in self.plugins.iter_mut() {
            if let Err(e) = plugin.shutdown() {
                error!("Error shutting down plugin {}: {}", plugin.name(), e);
            }
        }

        self.plugins.clear();
    }
}

// Logs every preset switch, dispatch and activation at info level.
struct ActivityLog;

impl DockPlugin for ActivityLog {
    fn name(&self) -> &str {
        "activity-log"
    }

    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_preset_changed(&mut self, preset: Option<&Preset>) -> Result<()> {
        match preset {
            Some(preset) => info!("[activity] preset {} ({} items)", preset.name, preset.items.len()),
            None => info!("[activity] showing running applications"),
        }
        Ok(())
    }

    fn on_item_dispatched(&mut self, item: &DockItem, succeeded: bool) -> Result<()> {
        info!(
            "[activity] {} {:?} {}",
            item.action_kind().name(),
            item.display_name,
            if succeeded { "ok" } else { "failed" }
        );
        Ok(())
    }

    fn on_app_activated(&mut self, app: &RunningApp) -> Result<()> {
        info!("[activity] activated {} (pid {})", app.name, app.pid);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

// Counts successful dispatches per item and logs a summary on shutdown.
#[derive(Default)]
struct LaunchCounter {
    counts: HashMap<String, u64>,
}

impl LaunchCounter {
    fn record(&mut self, key: &str) {
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }
}

impl DockPlugin for LaunchCounter {
    fn name(&self) -> &str {
        "launch-counter"
    }

    fn init(&mut self) -> Result<()> {
        self.counts.clear();
        Ok(())
    }

    fn on_preset_changed(&mut self, _preset: Option<&Preset>) -> Result<()> {
        Ok(())
    }

    fn on_item_dispatched(&mut self, item: &DockItem, succeeded: bool) -> Result<()> {
        if succeeded {
            self.record(&item.display_name);
        }
        Ok(())
    }

    fn on_app_activated(&mut self, app: &RunningApp) -> Result<()> {
        self.record(&app.name);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        let mut counts: Vec<(&String, &u64)> = self.counts.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (name, count) in counts {
            info!("[launch-counter] {}: {}", name, count);
        }
        Ok(())
    }
}
