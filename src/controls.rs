use crate::error::DockError;
use crate::platform::Platform;
use log::{debug, warn};

// Output volume change per click, in percent.
pub const VOLUME_STEP: u8 = 6;
// Brightness change per click.
pub const BRIGHTNESS_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemControl {
    VolumeDown,
    Mute,
    VolumeUp,
    BrightnessDown,
    BrightnessUp,
}

impl SystemControl {
    pub const ALL: [SystemControl; 5] = [
        SystemControl::VolumeDown,
        SystemControl::Mute,
        SystemControl::VolumeUp,
        SystemControl::BrightnessDown,
        SystemControl::BrightnessUp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::VolumeDown => "volume-down",
            Self::Mute => "mute",
            Self::VolumeUp => "volume-up",
            Self::BrightnessDown => "brightness-down",
            Self::BrightnessUp => "brightness-up",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "volume-down" | "voldown" => Some(Self::VolumeDown),
            "mute" => Some(Self::Mute),
            "volume-up" | "volup" => Some(Self::VolumeUp),
            "brightness-down" | "brightdown" => Some(Self::BrightnessDown),
            "brightness-up" | "brightup" => Some(Self::BrightnessUp),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VolumeDown => "🔉",
            Self::Mute => "🔇",
            Self::VolumeUp => "🔊",
            Self::BrightnessDown => "🌙",
            Self::BrightnessUp => "💡",
        }
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            Self::VolumeDown => "Volume Down",
            Self::Mute => "Mute",
            Self::VolumeUp => "Volume Up",
            Self::BrightnessDown => "Brightness Down",
            Self::BrightnessUp => "Brightness Up",
        }
    }

    // AppleScript performing the control. Brightness goes through the
    // `brightness` command line tool.
    pub fn script(&self) -> String {
        match self {
            Self::VolumeDown => format!(
                "set volume output volume (output volume of (get volume settings) - {})",
                VOLUME_STEP
            ),
            Self::Mute => "set volume output muted true".to_string(),
            Self::VolumeUp => format!(
                "set volume output volume (output volume of (get volume settings) + {})",
                VOLUME_STEP
            ),
            Self::BrightnessDown => {
                format!("do shell script \"brightness -{}\"", BRIGHTNESS_STEP)
            }
            Self::BrightnessUp => {
                format!("do shell script \"brightness +{}\"", BRIGHTNESS_STEP)
            }
        }
    }

    pub fn run(&self, platform: &dyn Platform) -> Result<(), DockError> {
        debug!("Running control {}", self.name());
        platform.run_script(&self.script()).map_err(|e| {
            warn!("Control {} failed: {}", self.name(), e);
            e
        })
    }
}
