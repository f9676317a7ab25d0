use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(rename = "dockItems", default)]
    pub items: Vec<DockItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockItem {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "iconName", default)]
    pub icon: String,
    #[serde(rename = "bundleID", default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(rename = "actionType", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionKind>,
    #[serde(rename = "actionValue", default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl DockItem {
    pub fn action_kind(&self) -> ActionKind {
        self.action.clone().unwrap_or(ActionKind::Launch)
    }
}

// Selects which effect a `DockItem` triggers.
// Unrecognised names are kept as `ActionKind::Unknown` so one bad item
// does not reject the whole preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Launch,
    Keystroke,
    Script,
    Shell,
    Unknown(String),
}

impl ActionKind {
    pub fn from_string(s: &str) -> Self {
        match s {
            "launchApp" => Self::Launch,
            "keystroke" => Self::Keystroke,
            "applescript" => Self::Script,
            "shell" => Self::Shell,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Launch => "launchApp",
            Self::Keystroke => "keystroke",
            Self::Script => "applescript",
            Self::Shell => "shell",
            Self::Unknown(name) => name,
        }
    }
}

impl Serialize for ActionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ActionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_string(&s))
    }
}

impl Preset {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn find_by_bundle_id(&self, id: &str) -> Option<&DockItem> {
        self.items
            .iter()
            .find(|item| item.bundle_id.as_deref() == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SAMPLE: &str = r#"{
        "name": "dev",
        "dockItems": [
            { "name": "Safari", "iconName": "safari", "bundleID": "com.apple.Safari" },
            { "name": "Shot", "iconName": "camera", "bundleID": null,
              "actionType": "keystroke", "actionValue": "cmd+shift+4" },
            { "name": "Hello", "iconName": "terminal", "actionType": "shell",
              "actionValue": "say hello" },
            { "name": "Odd", "iconName": "?", "actionType": "teleport" }
        ]
    }"#;

    #[test]
    fn parses_preset_document() {
        let preset = Preset::from_json(SAMPLE).unwrap();
        assert_eq!(preset.name, "dev");
        assert_eq!(preset.items.len(), 4);

        let safari = &preset.items[0];
        assert_eq!(safari.display_name, "Safari");
        assert_eq!(safari.action, None);
        assert_eq!(safari.action_kind(), ActionKind::Launch);

        assert_eq!(preset.items[1].action_kind(), ActionKind::Keystroke);
        assert_eq!(preset.items[1].bundle_id, None);
        assert_eq!(preset.items[2].payload.as_deref(), Some("say hello"));
        assert_matches!(preset.items[3].action_kind(), ActionKind::Unknown(ref s) if s == "teleport");
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(Preset::from_json("{ \"name\": ").is_err());
        assert!(Preset::from_json(r#"{ "dockItems": [] }"#).is_err());
    }

    #[test]
    fn finds_items_by_bundle_id() {
        let preset = Preset::from_json(SAMPLE).unwrap();
        let item = preset.find_by_bundle_id("com.apple.Safari").unwrap();
        assert_eq!(item.display_name, "Safari");
        assert!(preset.find_by_bundle_id("com.example.none").is_none());
    }

    #[test]
    fn serializes_wire_names() {
        let preset = Preset::from_json(SAMPLE).unwrap();
        let json = serde_json::to_value(&preset).unwrap();
        assert_eq!(json["dockItems"][1]["actionType"], "keystroke");
        assert_eq!(json["dockItems"][0]["bundleID"], "com.apple.Safari");
    }

    #[test]
    fn bundled_presets_parse() {
        for json in [
            include_str!("../Resources/Presets/default.json"),
            include_str!("../Resources/Presets/media.json"),
        ] {
            let preset = Preset::from_json(json).unwrap();
            assert!(!preset.items.is_empty());
            assert!(preset
                .items
                .iter()
                .all(|item| !matches!(item.action_kind(), ActionKind::Unknown(_))));
        }
    }
}
