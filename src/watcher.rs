use crate::error::DockError;
use log::{debug, info, warn};
use notify::{EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

pub trait ChangeNotifier: Send {
    fn subscribe(
        &self,
        path: &Path,
        sink: mpsc::UnboundedSender<PathBuf>,
    ) -> Result<Subscription, DockError>;
}

pub struct Subscription {
    path: PathBuf,
    _guard: Option<Box<dyn Send>>,
}

impl Subscription {
    pub fn new(path: PathBuf, guard: Option<Box<dyn Send>>) -> Self {
        Self {
            path,
            _guard: guard,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cancel(self) {
        debug!("Cancelled change subscription for {:?}", self.path);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .finish()
    }
}

// `ChangeNotifier` backed by the platform's native watcher.
// Watches the file's parent directory and filters on the file name, so
// editors that save by writing a temp file and renaming still trigger a
// reload.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotifyWatcher;

impl ChangeNotifier for NotifyWatcher {
    fn subscribe(
        &self,
        path: &Path,
        sink: mpsc::UnboundedSender<PathBuf>,
    ) -> Result<Subscription, DockError> {
        let target = path.to_path_buf();
        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let file_name = target.file_name().map(|n| n.to_os_string());

        let watched = target.clone();
        let mut watcher = notify::recommended_watcher(
            move |result: notify::Result<notify::Event>| match result {
                Ok(event) => {
                    if !matches!(
                        event.kind,
                        EventKind::Modify(_) | EventKind::Create(_)
                    ) {
                        return;
                    }
                    let touches_target = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_target && sink.send(watched.clone()).is_err() {
                        debug!("Change sink closed for {:?}", watched);
                    }
                }
                Err(e) => warn!("File watcher error: {:?}", e),
            },
        )
        .map_err(|source| DockError::Watch {
            path: target.clone(),
            source,
        })?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| DockError::Watch {
                path: target.clone(),
                source,
            })?;

        info!("Watching {:?} for changes", target);
        let guard: Box<dyn Send> = Box::new(watcher);
        Ok(Subscription::new(target, Some(guard)))
    }
}
