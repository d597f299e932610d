// Template rendering: pick a template, fill its placeholders, add a banner.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::PuzzleError;

use super::templates::TemplateLibrary;
use super::vocabulary::Vocabulary;

/// Banner formats wrapped around every rendered puzzle.
/// `{level}` and `{body}` are filled in by `decorate`.
pub const BANNERS: &[&str] = &[
    "🧩 لغز جديد - مستوى {level}:\n\n{body}",
    "🎯 تحدي LUKU ({level}):\n\n{body}",
    "🔍 فكّر جيدًا! المستوى: {level}\n\n{body}",
    "✨ هل تستطيع حلّه؟ [{level}]\n\n{body}",
];

#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    library: TemplateLibrary,
    vocabulary: Vocabulary,
}

impl TemplateRenderer {
    pub fn new(library: TemplateLibrary, vocabulary: Vocabulary) -> Self {
        Self {
            library,
            vocabulary,
        }
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.library.templates(category).is_some()
    }

    /// Render a random template of `category` with its banner.
    pub fn render<R: Rng + ?Sized>(
        &self,
        category: &str,
        level: &str,
        rng: &mut R,
    ) -> Result<String, PuzzleError> {
        let template = self
            .library
            .templates(category)
            .and_then(|t| t.choose(rng))
            .ok_or_else(|| PuzzleError::CategoryNotFound(category.to_string()))?;
        let body = self.fill(template, rng);
        Ok(decorate(&body, level, rng))
    }

    /// Replace each `{name}` token with a random candidate. Each occurrence is
    /// drawn independently. Unknown names are copied through untouched.
    pub fn fill<R: Rng + ?Sized>(&self, template: &str, rng: &mut R) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                return out;
            };
            let name = &after[..close];
            // Only the innermost `{` before `}` opens a token.
            if let Some(inner) = name.rfind('{') {
                out.push_str(&rest[open..open + 1 + inner]);
                rest = &after[inner..];
                continue;
            }
            match self
                .vocabulary
                .candidates(name)
                .and_then(|c| c.choose(rng))
            {
                Some(word) => out.push_str(word),
                None => out.push_str(&rest[open..open + close + 2]),
            }
            rest = &after[close + 1..];
        }

        out.push_str(rest);
        out
    }
}

/// Wrap `body` in a randomly chosen banner.
pub fn decorate<R: Rng + ?Sized>(body: &str, level: &str, rng: &mut R) -> String {
    let banner = BANNERS.choose(rng).copied().unwrap_or("{body}");
    banner.replace("{level}", level).replace("{body}", body)
}
