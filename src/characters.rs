// Assistant personas a user can pick from.

use serde::Serialize;

/// A selectable assistant persona.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Character {
    pub key: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    /// Style instruction appended to prompts sent to the model.
    pub style: &'static str,
}

pub const DEFAULT_CHARACTER: &str = "luku";

pub const CHARACTERS: &[Character] = &[
    Character {
        key: "luku",
        name: "لوكو",
        emoji: "🤖",
        style: "مرح وودود، يستخدم الإيموجيات ويشجع اللاعب",
    },
    Character {
        key: "detective",
        name: "المحقق",
        emoji: "🕵️",
        style: "غامض ودقيق، يقدم الألغاز كقضايا تحتاج إلى حل",
    },
    Character {
        key: "wizard",
        name: "الساحر",
        emoji: "🧙",
        style: "حكيم وخيالي، يروي الألغاز كأنها تعاويذ قديمة",
    },
    Character {
        key: "coach",
        name: "المدرب",
        emoji: "🏆",
        style: "حماسي ومباشر، يتحدى اللاعب ويحفزه على الفوز",
    },
];

/// Look up a character by key.
pub fn find(key: &str) -> Option<&'static Character> {
    CHARACTERS.iter().find(|c| c.key == key)
}

/// Look up a character, falling back to the default persona.
pub fn resolve(key: &str) -> &'static Character {
    find(key).unwrap_or(&CHARACTERS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_character_exists() {
        assert_eq!(resolve(DEFAULT_CHARACTER).key, DEFAULT_CHARACTER);
    }

    #[test]
    fn test_unknown_character_falls_back() {
        assert!(find("pirate").is_none());
        assert_eq!(resolve("pirate").key, DEFAULT_CHARACTER);
    }

    #[test]
    fn test_keys_unique() {
        for (i, a) in CHARACTERS.iter().enumerate() {
            for b in &CHARACTERS[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }
}
