mod common;

use common::{Effect, FakePlatform};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Arc, Mutex};
use touchdock::actions::ActionDispatcher;
use touchdock::Preset;

// One logger per process, so this file holds a single test.
struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if record.target().starts_with("touchdock") {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

fn take_serious_records() -> Vec<(Level, String)> {
    LOGGER
        .records
        .lock()
        .unwrap()
        .drain(..)
        .filter(|(level, _)| *level <= Level::Warn)
        .collect()
}

const ITEMS: &str = r#"{ "name": "broken", "dockItems": [
    { "name": "X", "iconName": "x" },
    { "name": "Hyper", "iconName": "k", "actionType": "keystroke", "actionValue": "hyper+4" },
    { "name": "Nokey", "iconName": "k", "actionType": "keystroke", "actionValue": "cmd+nokey" }
] }"#;

#[test]
fn each_failed_action_logs_exactly_one_error() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let preset = Preset::from_json(ITEMS).unwrap();
    let platform = Arc::new(FakePlatform::new());
    let dispatcher = ActionDispatcher::new(platform.clone());

    assert!(dispatcher.dispatch(&preset.items[0]).is_err());
    let records = take_serious_records();
    assert_eq!(records.len(), 1, "{:?}", records);
    assert_eq!(records[0].0, Level::Error);
    assert!(records[0].1.contains("bundleID"), "{:?}", records);
    assert!(platform.effects().is_empty());

    for item in &preset.items[1..] {
        assert!(dispatcher.dispatch(item).is_err());
        let records = take_serious_records();
        assert_eq!(records.len(), 1, "{:?}", records);
        assert_eq!(records[0].0, Level::Error);
    }
    assert!(platform
        .effects()
        .iter()
        .all(|effect| matches!(effect, Effect::Alert(_))));
}
