use crate::error::DockError;
use crate::keystroke::KeyStroke;
use crate::platform::Platform;
use crate::preset::{ActionKind, DockItem};
use log::{debug, error, info};
use std::sync::Arc;

// Turns a `DockItem` into its side effect.
// Every failure is logged once here and handed back to the caller, which
// only inspects it.
#[derive(Clone)]
pub struct ActionDispatcher {
    platform: Arc<dyn Platform>,
}

impl ActionDispatcher {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    pub fn dispatch(&self, item: &DockItem) -> Result<(), DockError> {
        let kind = item.action_kind();
        debug!("Dispatching {} for {:?}", kind.name(), item.display_name);

        let result = match &kind {
            ActionKind::Launch => self.launch_item(item),
            ActionKind::Keystroke => self
                .payload(item, &kind)
                .and_then(|payload| self.send_keystroke(payload)),
            ActionKind::Script => self
                .payload(item, &kind)
                .and_then(|payload| self.platform.run_script(payload)),
            ActionKind::Shell => self.payload(item, &kind).and_then(|payload| {
                info!("Running shell command for {:?}", item.display_name);
                self.platform.spawn_shell(payload)
            }),
            ActionKind::Unknown(name) => Err(DockError::UnknownAction(format!(
                "action type {:?} on item {:?}",
                name, item.display_name
            ))),
        };

        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    // Opens an application by bundle identifier. Used for clicks on icons
    // that match neither a running process nor a preset item.
    pub fn launch_bundle(&self, bundle_id: &str) -> Result<(), DockError> {
        let result = self.open_bundle(bundle_id);
        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    fn launch_item(&self, item: &DockItem) -> Result<(), DockError> {
        let bundle_id = item
            .bundle_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DockError::MissingBundleId {
                item: item.display_name.clone(),
            })?;
        self.open_bundle(bundle_id)
    }

    fn open_bundle(&self, bundle_id: &str) -> Result<(), DockError> {
        if self.platform.launch_application(bundle_id) {
            info!("Launched {}", bundle_id);
            Ok(())
        } else {
            Err(DockError::LaunchFailure(bundle_id.to_string()))
        }
    }

    fn send_keystroke(&self, payload: &str) -> Result<(), DockError> {
        let stroke = KeyStroke::parse(payload)?;
        for event in stroke.events() {
            self.platform.post_key_event(event)?;
        }
        debug!("Sent keystroke {:?}", payload);
        Ok(())
    }

    fn payload<'a>(&self, item: &'a DockItem, kind: &ActionKind) -> Result<&'a str, DockError> {
        item.payload
            .as_deref()
            .ok_or_else(|| DockError::MissingPayload {
                kind: kind.name().to_string(),
                item: item.display_name.clone(),
            })
    }

    fn report(&self, e: &DockError) {
        error!("Action failed: {}", e);
        if e.is_alertable() {
            self.platform.alert(&e.to_string());
        }
    }
}
