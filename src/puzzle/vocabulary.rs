// Substitution words for template placeholders.

use std::collections::HashMap;

const BUILTIN: &[(&str, &[&str])] = &[
    ("role", &["حارس مرمى", "مهاجم", "مدافع", "قائد الفريق", "مدرب"]),
    ("sport", &["كرة القدم", "كرة السلة", "كرة الطائرة", "كرة اليد", "التنس"]),
    ("animal", &["جمل", "صقر", "أسد", "دلفين", "سلحفاة", "نملة"]),
    ("object", &["مفتاح", "مرآة", "ساعة", "شمعة", "كتاب", "مظلة"]),
    ("color", &["الأحمر", "الأزرق", "الأخضر", "الأصفر", "الأبيض"]),
    ("number", &["3", "5", "7", "9", "12", "15"]),
    ("country", &["مصر", "المغرب", "السعودية", "اليابان", "البرازيل", "كندا"]),
    ("city", &["القاهرة", "الرباط", "الرياض", "طوكيو", "دبي", "عمّان"]),
    ("scientist", &["ابن الهيثم", "الخوارزمي", "ابن سينا", "نيوتن", "ماري كوري"]),
    ("planet", &["عطارد", "الزهرة", "المريخ", "المشتري", "زحل"]),
    ("element", &["الأكسجين", "الحديد", "الذهب", "الهيدروجين", "الكربون"]),
    ("profession", &["طبيب", "مهندس", "خباز", "طيار", "نجار"]),
    ("food", &["تمر", "خبز", "عسل", "برتقال", "زيتون"]),
    ("era", &["العصر العباسي", "العصر الأموي", "الحضارة الفرعونية", "الأندلس"]),
    ("name", &["سارة", "عمر", "ليلى", "يوسف", "مريم", "خالد"]),
];

/// Placeholder name → candidate values.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    entries: HashMap<String, Vec<String>>,
}

impl Vocabulary {
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(key, words)| {
                (
                    key.to_string(),
                    words.iter().map(|w| w.to_string()).collect(),
                )
            })
            .collect();
        Self { entries }
    }

    pub fn from_map(entries: HashMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    /// Candidates for `placeholder`, or `None` when unknown or empty.
    pub fn candidates(&self, placeholder: &str) -> Option<&[String]> {
        self.entries
            .get(placeholder)
            .map(Vec::as_slice)
            .filter(|c| !c.is_empty())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_no_empty_entries() {
        let vocab = Vocabulary::builtin();
        for key in vocab.keys() {
            assert!(vocab.candidates(key).is_some(), "{key} has no candidates");
        }
    }

    #[test]
    fn test_empty_entry_counts_as_missing() {
        let mut map = HashMap::new();
        map.insert("ghost".to_string(), Vec::new());
        let vocab = Vocabulary::from_map(map);
        assert!(vocab.candidates("ghost").is_none());
        assert!(vocab.candidates("missing").is_none());
    }
}
