use crate::config::PresetConfig;
use crate::error::DockError;
use crate::preset::Preset;
use crate::watcher::{ChangeNotifier, Subscription};
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

pub type SharedPreset = Option<Arc<Preset>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Loading,
    Loaded,
    LoadFailed,
}

// A failed load never replaces the published preset.
pub struct PresetLoader {
    user_dir: PathBuf,
    bundled_dir: PathBuf,
    notifier: Box<dyn ChangeNotifier>,
    current_name: Option<String>,
    state: LoaderState,
    publisher: watch::Sender<SharedPreset>,
    change_tx: mpsc::UnboundedSender<PathBuf>,
    change_rx: Option<mpsc::UnboundedReceiver<PathBuf>>,
    subscription: Option<Subscription>,
}

impl PresetLoader {
    pub fn new(config: &PresetConfig, notifier: Box<dyn ChangeNotifier>) -> Self {
        Self::with_dirs(config.user_dir(), config.bundled_dir(), notifier)
    }

    pub fn with_dirs(
        user_dir: PathBuf,
        bundled_dir: PathBuf,
        notifier: Box<dyn ChangeNotifier>,
    ) -> Self {
        let (publisher, _) = watch::channel(None);
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        debug!(
            "Preset directories: user={:?} bundled={:?}",
            user_dir, bundled_dir
        );

        Self {
            user_dir,
            bundled_dir,
            notifier,
            current_name: None,
            state: LoaderState::Idle,
            publisher,
            change_tx,
            change_rx: Some(change_rx),
            subscription: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SharedPreset> {
        self.publisher.subscribe()
    }

    // The receiving end of file change events. Can only be taken once.
    pub fn take_change_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<PathBuf>> {
        self.change_rx.take()
    }

    pub fn current(&self) -> SharedPreset {
        self.publisher.borrow().clone()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn watched_path(&self) -> Option<&Path> {
        self.subscription.as_ref().map(Subscription::path)
    }

    // User directory first, then bundled resources.
    pub fn resolve_path(&self, name: &str) -> Result<PathBuf, DockError> {
        // names are plain file stems, never paths
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return Err(DockError::NotFound {
                name: name.to_string(),
            });
        }
        let file_name = format!("{}.json", name);
        [&self.user_dir, &self.bundled_dir]
            .into_iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
            .ok_or_else(|| DockError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn read_preset(path: &Path) -> Result<Preset, DockError> {
        let content = std::fs::read_to_string(path).map_err(|source| DockError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Preset::from_json(&content).map_err(|source| DockError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    // Loads `name` and publishes it. On failure the previously published
    // preset stays in place.
    pub fn load(&mut self, name: &str) -> Result<Arc<Preset>, DockError> {
        self.state = LoaderState::Loading;
        self.current_name = Some(name.to_string());

        let result = self
            .resolve_path(name)
            .and_then(|path| Self::read_preset(&path).map(|preset| (path, preset)));

        match result {
            Ok((path, preset)) => {
                info!(
                    "Loaded preset {} ({} items) from {:?}",
                    name,
                    preset.items.len(),
                    path
                );
                let preset = Arc::new(preset);
                self.publisher.send_replace(Some(Arc::clone(&preset)));
                self.state = LoaderState::Loaded;
                Ok(preset)
            }
            Err(e) => {
                error!("Failed to load preset {}: {}", name, e);
                self.state = LoaderState::LoadFailed;
                Err(e)
            }
        }
    }

    // Watches `path` for changes, replacing any previous subscription.
    // Failure is logged and leaves live reload disabled.
    pub fn watch(&mut self, path: &Path) -> bool {
        if let Some(previous) = self.subscription.take() {
            previous.cancel();
        }

        match self.notifier.subscribe(path, self.change_tx.clone()) {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                true
            }
            Err(e) => {
                warn!("Live reload disabled: {}", e);
                false
            }
        }
    }

    // Switches to `name`: loads it and moves the watch to its file.
    pub fn select(&mut self, name: &str) -> Result<Arc<Preset>, DockError> {
        let result = self.load(name);
        match self.resolve_path(name) {
            Ok(path) => {
                self.watch(&path);
            }
            Err(_) => {
                if let Some(previous) = self.subscription.take() {
                    previous.cancel();
                }
            }
        }
        result
    }

    // Handles a change event from the watcher by reloading the active
    // preset. Events for paths other than the watched one are ignored.
    pub fn handle_change(&mut self, path: &Path) -> Option<Result<Arc<Preset>, DockError>> {
        if self.watched_path() != Some(path) {
            debug!("Ignoring change for unwatched path {:?}", path);
            return None;
        }
        let name = self.current_name.clone()?;
        info!("Preset file changed, reloading {}", name);
        Some(self.load(&name))
    }

    pub fn available_presets(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for dir in [&self.user_dir, &self.bundled_dir] {
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
                let hidden = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map_or(true, |n| n.starts_with('.'));
                if is_json && !hidden {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        names.insert(stem.to_string());
                    }
                }
            }
        }

        if names.is_empty() {
            return vec!["default".to_string()];
        }
        names.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::Mutex;

    // Records subscriptions instead of touching the file system.
    #[derive(Clone, Default)]
    struct FakeNotifier {
        subscribed: Arc<Mutex<Vec<PathBuf>>>,
        fail: bool,
    }

    impl ChangeNotifier for FakeNotifier {
        fn subscribe(
            &self,
            path: &Path,
            _sink: mpsc::UnboundedSender<PathBuf>,
        ) -> Result<Subscription, DockError> {
            if self.fail {
                return Err(DockError::Watch {
                    path: path.to_path_buf(),
                    source: notify::Error::generic("unsupported"),
                });
            }
            self.subscribed.lock().unwrap().push(path.to_path_buf());
            Ok(Subscription::new(path.to_path_buf(), None))
        }
    }

    const VALID: &str = r#"{ "name": "work", "dockItems": [
        { "name": "Mail", "iconName": "mail", "bundleID": "com.apple.mail" }
    ] }"#;

    fn loader(roots: &(tempfile::TempDir, tempfile::TempDir), notifier: FakeNotifier) -> PresetLoader {
        PresetLoader::with_dirs(
            roots.0.path().to_path_buf(),
            roots.1.path().to_path_buf(),
            Box::new(notifier),
        )
    }

    fn temp_dirs() -> (tempfile::TempDir, tempfile::TempDir) {
        (tempfile::tempdir().unwrap(), tempfile::tempdir().unwrap())
    }

    #[test]
    fn user_directory_overrides_bundled() {
        let roots = temp_dirs();
        std::fs::write(roots.1.path().join("work.json"), VALID).unwrap();
        let loader = loader(&roots, FakeNotifier::default());
        assert_eq!(
            loader.resolve_path("work").unwrap(),
            roots.1.path().join("work.json")
        );

        std::fs::write(roots.0.path().join("work.json"), VALID).unwrap();
        assert_eq!(
            loader.resolve_path("work").unwrap(),
            roots.0.path().join("work.json")
        );
        assert_matches!(loader.resolve_path("missing"), Err(DockError::NotFound { .. }));
    }

    #[test]
    fn names_that_leave_the_preset_directories_are_rejected() {
        let roots = temp_dirs();
        let outside = roots.0.path().join("outside");
        std::fs::create_dir(&outside).unwrap();
        std::fs::write(outside.join("escape.json"), VALID).unwrap();

        let inner = tempfile::tempdir_in(roots.0.path()).unwrap();
        let mut loader = PresetLoader::with_dirs(
            inner.path().to_path_buf(),
            roots.1.path().to_path_buf(),
            Box::new(FakeNotifier::default()),
        );
        for name in ["../outside/escape", "..", "", "sub\\x", "/etc/hosts"] {
            assert_matches!(loader.resolve_path(name), Err(DockError::NotFound { .. }), "{:?}", name);
        }
        assert!(loader.load("../outside/escape").is_err());
        assert!(loader.current().is_none());
    }

    #[test]
    fn malformed_reload_keeps_previous_preset() {
        let roots = temp_dirs();
        let path = roots.0.path().join("work.json");
        std::fs::write(&path, VALID).unwrap();

        let mut loader = loader(&roots, FakeNotifier::default());
        let rx = loader.subscribe();
        assert_eq!(loader.state(), LoaderState::Idle);
        assert!(rx.borrow().is_none());

        let first = loader.load("work").unwrap();
        assert_eq!(loader.state(), LoaderState::Loaded);

        std::fs::write(&path, "{ \"name\": \"work\", \"dockItems\": [ {").unwrap();
        assert_matches!(loader.load("work"), Err(DockError::Decode { .. }));
        assert_eq!(loader.state(), LoaderState::LoadFailed);

        let published = rx.borrow().clone().unwrap();
        assert!(Arc::ptr_eq(&published, &first));
        assert_eq!(published.items[0].display_name, "Mail");
    }

    #[test]
    fn missing_preset_keeps_previous_preset() {
        let roots = temp_dirs();
        std::fs::write(roots.1.path().join("work.json"), VALID).unwrap();
        let mut loader = loader(&roots, FakeNotifier::default());
        loader.load("work").unwrap();

        assert_matches!(loader.load("nope"), Err(DockError::NotFound { .. }));
        assert_eq!(loader.current().unwrap().name, "work");
    }

    #[test]
    fn select_watches_resolved_file_and_reloads_on_change() {
        let roots = temp_dirs();
        let path = roots.0.path().join("work.json");
        std::fs::write(&path, VALID).unwrap();

        let notifier = FakeNotifier::default();
        let mut loader = loader(&roots, notifier.clone());
        loader.select("work").unwrap();
        assert_eq!(notifier.subscribed.lock().unwrap().as_slice(), &[path.clone()]);
        assert_eq!(loader.watched_path(), Some(path.as_path()));

        std::fs::write(
            &path,
            r#"{ "name": "work", "dockItems": [
                { "name": "Mail", "iconName": "mail", "bundleID": "com.apple.mail" },
                { "name": "Notes", "iconName": "notes", "bundleID": "com.apple.Notes" }
            ] }"#,
        )
        .unwrap();
        let reloaded = loader.handle_change(&path).unwrap().unwrap();
        assert_eq!(reloaded.items.len(), 2);
        assert_eq!(loader.current().unwrap().items.len(), 2);

        assert!(loader.handle_change(Path::new("/elsewhere.json")).is_none());
    }

    #[test]
    fn watch_failure_is_not_fatal() {
        let roots = temp_dirs();
        std::fs::write(roots.0.path().join("work.json"), VALID).unwrap();
        let notifier = FakeNotifier {
            fail: true,
            ..FakeNotifier::default()
        };
        let mut loader = loader(&roots, notifier);
        assert!(loader.select("work").is_ok());
        assert!(loader.watched_path().is_none());
        assert!(loader.current().is_some());
    }

    #[test]
    fn lists_presets_from_both_directories() {
        let roots = temp_dirs();
        let loader = loader(&roots, FakeNotifier::default());
        assert_eq!(loader.available_presets(), vec!["default".to_string()]);

        std::fs::write(roots.0.path().join("work.json"), VALID).unwrap();
        std::fs::write(roots.1.path().join("work.json"), VALID).unwrap();
        std::fs::write(roots.1.path().join("default.json"), VALID).unwrap();
        std::fs::write(roots.1.path().join("notes.txt"), "x").unwrap();
        assert_eq!(
            loader.available_presets(),
            vec!["default".to_string(), "work".to_string()]
        );
    }
}
