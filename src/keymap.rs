use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::warn;
use serde::de::{Error, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Commands that can be bound to a key
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Quit,
    #[serde(alias = "publish", alias = "force")]
    PublishNow,
    Clear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct KeyMap {
    pub modifiers: KeyModifiers,
    pub code: KeyCode,
}

impl KeyMap {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let mut keymap = Self { modifiers, code };
        if let KeyCode::Char(value) = keymap.code {
            if value.is_ascii_uppercase() {
                keymap.modifiers |= KeyModifiers::SHIFT;
                keymap.code = KeyCode::Char(value.to_ascii_lowercase());
            } else if !value.is_ascii_digit() && !value.is_alphabetic() {
                keymap.modifiers &= !KeyModifiers::SHIFT;
            }
        }
        keymap
    }
}

impl From<KeyEvent> for KeyMap {
    fn from(value: KeyEvent) -> Self {
        Self::new(value.code, value.modifiers)
    }
}

impl FromStr for KeyMap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.replace(' ', "");
        let mut modifiers = KeyModifiers::empty();
        let mut code = KeyCode::Null;

        for part in parts.split('+') {
            let lower = part.to_ascii_lowercase();
            match lower.as_str() {
                "" => {
                    if code == KeyCode::Null {
                        code = KeyCode::Char('+');
                    }
                }
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "alt" => modifiers |= KeyModifiers::ALT,
                value => {
                    if code != KeyCode::Null {
                        return Err(format!("Unknown key: {value}"));
                    }
                    code = match value {
                        "backspace" => KeyCode::Backspace,
                        "enter" => KeyCode::Enter,
                        "space" => KeyCode::Char(' '),
                        "esc" => KeyCode::Esc,
                        "tab" => KeyCode::Tab,
                        "delete" => KeyCode::Delete,
                        "up" => KeyCode::Up,
                        "down" => KeyCode::Down,
                        "left" => KeyCode::Left,
                        "right" => KeyCode::Right,
                        f if f.len() > 1 && f.starts_with('f') && f[1..].chars().all(|c| c.is_ascii_digit()) => {
                            KeyCode::F(f[1..].parse::<u8>().map_err(|e| e.to_string())?)
                        }
                        _ if part.len() == 1 && part.is_ascii() => {
                            match part.chars().next() {
                                Some(c) => KeyCode::Char(c),
                                None => return Err("Must provide a key for a keymap".to_string()),
                            }
                        }
                        _ => return Err(format!("Unknown key: {value}")),
                    };
                }
            }
        }

        if code == KeyCode::Null {
            return Err("Must provide a key for a keymap".to_string());
        }

        Ok(Self::new(code, modifiers))
    }
}

impl Display for KeyMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();

        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("alt".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("shift".to_string());
        }

        parts.push(match self.code {
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(value) => value.to_string(),
            KeyCode::Backspace => "backspace".to_string(),
            KeyCode::Enter => "enter".to_string(),
            KeyCode::Esc => "esc".to_string(),
            KeyCode::Tab => "tab".to_string(),
            KeyCode::Delete => "delete".to_string(),
            KeyCode::Up => "up".to_string(),
            KeyCode::Down => "down".to_string(),
            KeyCode::Left => "left".to_string(),
            KeyCode::Right => "right".to_string(),
            KeyCode::F(n) => format!("f{n}"),
            _ => String::new(),
        });

        write!(f, "{}", parts.join("+"))
    }
}

impl<'de> Deserialize<'de> for KeyMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Mapping;
        impl<'de> Visitor<'de> for Mapping {
            type Value = KeyMap;

            fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
                formatter.write_str("a key such as `f`, `shift+x` or `ctrl+d`")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                KeyMap::from_str(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(Mapping)
    }
}

impl Serialize for KeyMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[macro_export]
macro_rules! keymaps {
    ($($key: literal => $value: ident),* $(,)?) => {
        {
            use std::str::FromStr;

            let mut mappings = std::collections::HashMap::new();
            $(
                mappings.insert(
                    $crate::keymap::KeyMap::from_str($key).expect("valid keymap literal"),
                    $crate::keymap::Action::$value,
                );
            )*
            mappings
        }
    };
}

/// Resolved key bindings: reserved keys, then user bindings, then defaults
#[derive(Debug, Clone, Default)]
pub struct Keymaps {
    mappings: HashMap<KeyMap, Action>,
}

impl Keymaps {
    pub fn reserved() -> HashMap<KeyMap, Action> {
        keymaps! {
            "ctrl+c" => Quit,
        }
    }

    pub fn defaults() -> HashMap<KeyMap, Action> {
        keymaps! {
            "q" => Quit,
            "f" => PublishNow,
            "d" => Clear,
        }
    }

    pub fn compile(user: &HashMap<KeyMap, Action>) -> Self {
        let reserved = Self::reserved();
        let mut mappings = Self::defaults();

        for (key, action) in user.iter() {
            if let Some(existing) = reserved.get(key) {
                warn!("Reserved keymap `{key}`; skipping {key} -> {action:?}, it stays {existing:?}");
            } else {
                mappings.insert(*key, *action);
            }
        }

        mappings.extend(reserved);
        Self { mappings }
    }

    pub fn get(&self, key: &KeyMap) -> Option<Action> {
        self.mappings.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeyMap, &Action)> {
        self.mappings.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_keymaps() {
        assert_eq!(
            KeyMap::from_str("ctrl+c").unwrap(),
            KeyMap::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        );
        assert_eq!(
            KeyMap::from_str("Q").unwrap(),
            KeyMap::new(KeyCode::Char('q'), KeyModifiers::SHIFT)
        );
        assert_eq!(KeyMap::from_str("f5").unwrap().code, KeyCode::F(5));
        assert_eq!(KeyMap::from_str("f").unwrap().code, KeyCode::Char('f'));
        assert_eq!(KeyMap::from_str("+").unwrap().code, KeyCode::Char('+'));
        assert!(KeyMap::from_str("ctrl+").is_ok());
        assert!(KeyMap::from_str("ctrl").is_err());
        assert!(KeyMap::from_str("hyper+x").is_err());
    }

    #[test]
    fn display_round_trips() {
        for key in ["ctrl+c", "shift+x", "f12", "space", "alt+enter"] {
            assert_eq!(KeyMap::from_str(key).unwrap().to_string(), key);
        }
    }

    #[test]
    fn key_events_match_parsed_keys() {
        let event = KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT);
        assert_eq!(KeyMap::from(event), KeyMap::from_str("shift+x").unwrap());

        let event = KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT);
        assert_eq!(KeyMap::from(event), KeyMap::from_str("?").unwrap());
    }

    #[test]
    fn default_bindings() {
        let keymaps = Keymaps::compile(&HashMap::new());
        assert_eq!(keymaps.get(&"q".parse().unwrap()), Some(Action::Quit));
        assert_eq!(keymaps.get(&"f".parse().unwrap()), Some(Action::PublishNow));
        assert_eq!(keymaps.get(&"d".parse().unwrap()), Some(Action::Clear));
        assert_eq!(keymaps.get(&"ctrl+c".parse().unwrap()), Some(Action::Quit));
        assert_eq!(keymaps.get(&"x".parse().unwrap()), None);
    }

    #[test]
    fn user_bindings_never_override_reserved_keys() {
        let user = keymaps! {
            "ctrl+c" => Clear,
            "x" => Clear,
            "q" => PublishNow,
        };
        let keymaps = Keymaps::compile(&user);
        assert_eq!(keymaps.get(&"ctrl+c".parse().unwrap()), Some(Action::Quit));
        assert_eq!(keymaps.get(&"x".parse().unwrap()), Some(Action::Clear));
        assert_eq!(keymaps.get(&"q".parse().unwrap()), Some(Action::PublishNow));
    }

    #[test]
    fn deserialize_from_yaml() {
        let user: HashMap<KeyMap, Action> =
            serde_yaml::from_str("x: clear\n\"shift+p\": publish\nz: publish_now\n").unwrap();
        assert_eq!(user.get(&"x".parse().unwrap()), Some(&Action::Clear));
        assert_eq!(user.get(&"shift+p".parse().unwrap()), Some(&Action::PublishNow));
        assert_eq!(user.get(&"z".parse().unwrap()), Some(&Action::PublishNow));
    }
}
