use crate::error::DockError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Cmd,   // Command key
    Alt,   // Option key
    Ctrl,  // Control key
    Shift, // Shift key
}

impl ModifierKey {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "cmd" | "command" => Some(Self::Cmd),
            "alt" | "option" => Some(Self::Alt),
            "ctrl" | "control" => Some(Self::Ctrl),
            "shift" => Some(Self::Shift),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub cmd: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn insert(&mut self, key: ModifierKey) {
        match key {
            ModifierKey::Cmd => self.cmd = true,
            ModifierKey::Alt => self.alt = true,
            ModifierKey::Ctrl => self.ctrl = true,
            ModifierKey::Shift => self.shift = true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.cmd || self.alt || self.ctrl || self.shift)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub modifiers: Modifiers,
    // macOS virtual key code (`kVK_*`).
    pub key_code: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key_code: u16,
    pub modifiers: Modifiers,
    pub key_down: bool,
}

impl KeyStroke {
    // Parses e.g. `"cmd+shift+4"`. Matching is case-insensitive; the last
    // token is the key and every preceding token must be a modifier.
    pub fn parse(combo: &str) -> Result<Self, DockError> {
        let lowered = combo.trim().to_lowercase();
        let parts: Vec<&str> = lowered.split('+').map(str::trim).collect();
        let (key_str, modifier_parts) = match parts.split_last() {
            Some((key, mods)) if !key.is_empty() => (*key, mods),
            _ => {
                return Err(DockError::UnknownAction(format!(
                    "empty key in keystroke {:?}",
                    combo
                )))
            }
        };

        let mut modifiers = Modifiers::default();
        for part in modifier_parts {
            match ModifierKey::from_token(part) {
                Some(modifier) => modifiers.insert(modifier),
                None => {
                    return Err(DockError::UnknownAction(format!(
                        "unknown modifier {:?} in keystroke {:?}",
                        part, combo
                    )))
                }
            }
        }

        let key_code = key_code_for(key_str).ok_or_else(|| {
            DockError::UnknownAction(format!("unknown key {:?} in keystroke {:?}", key_str, combo))
        })?;

        Ok(Self {
            modifiers,
            key_code,
        })
    }

    pub fn events(&self) -> [KeyEvent; 2] {
        [true, false].map(|key_down| KeyEvent {
            key_code: self.key_code,
            modifiers: self.modifiers,
            key_down,
        })
    }
}

// ANSI-layout virtual key codes from `HIToolbox/Events.h`.
fn key_code_for(key_str: &str) -> Option<u16> {
    match key_str {
        "return" | "enter" => Some(36),
        "tab" => Some(48),
        "space" => Some(49),
        "delete" | "backspace" => Some(51),
        "escape" | "esc" => Some(53),
        "left" => Some(123),
        "right" => Some(124),
        "down" => Some(125),
        "up" => Some(126),
        _ => {
            let mut chars = key_str.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            match ch {
                'a' => Some(0),
                's' => Some(1),
                'd' => Some(2),
                'f' => Some(3),
                'h' => Some(4),
                'g' => Some(5),
                'z' => Some(6),
                'x' => Some(7),
                'c' => Some(8),
                'v' => Some(9),
                'b' => Some(11),
                'q' => Some(12),
                'w' => Some(13),
                'e' => Some(14),
                'r' => Some(15),
                'y' => Some(16),
                't' => Some(17),
                '1' => Some(18),
                '2' => Some(19),
                '3' => Some(20),
                '4' => Some(21),
                '6' => Some(22),
                '5' => Some(23),
                '9' => Some(25),
                '7' => Some(26),
                '8' => Some(28),
                '0' => Some(29),
                'o' => Some(31),
                'u' => Some(32),
                'i' => Some(34),
                'p' => Some(35),
                'l' => Some(37),
                'j' => Some(38),
                'k' => Some(40),
                'n' => Some(45),
                'm' => Some(46),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_modifiers_and_digit() {
        let stroke = KeyStroke::parse("cmd+shift+4").unwrap();
        assert_eq!(stroke.key_code, 21);
        assert_eq!(
            stroke.modifiers,
            Modifiers {
                cmd: true,
                shift: true,
                ..Modifiers::default()
            }
        );
    }

    #[test]
    fn parsing_is_case_insensitive_with_aliases() {
        let stroke = KeyStroke::parse("Control+OPTION+Return").unwrap();
        assert_eq!(stroke.key_code, 36);
        assert!(stroke.modifiers.ctrl && stroke.modifiers.alt);
        assert!(!stroke.modifiers.cmd && !stroke.modifiers.shift);

        assert_eq!(KeyStroke::parse("esc").unwrap().key_code, 53);
        assert_eq!(KeyStroke::parse("enter").unwrap().key_code, 36);
        assert!(KeyStroke::parse("space").unwrap().modifiers.is_empty());
    }

    #[test]
    fn every_letter_and_digit_has_a_distinct_code() {
        let mut codes: Vec<u16> = ('a'..='z')
            .chain('0'..='9')
            .map(|c| KeyStroke::parse(&c.to_string()).unwrap().key_code)
            .collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 36);
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert_matches!(KeyStroke::parse("hyper+a"), Err(DockError::UnknownAction(_)));
        assert_matches!(KeyStroke::parse("cmd+f13"), Err(DockError::UnknownAction(_)));
        assert_matches!(KeyStroke::parse("cmd+"), Err(DockError::UnknownAction(_)));
        assert_matches!(KeyStroke::parse(""), Err(DockError::UnknownAction(_)));
    }

    #[test]
    fn events_are_one_down_one_up() {
        let [down, up] = KeyStroke::parse("cmd+c").unwrap().events();
        assert!(down.key_down && !up.key_down);
        assert_eq!(down.key_code, 8);
        assert_eq!(down.modifiers, up.modifiers);
    }
}
