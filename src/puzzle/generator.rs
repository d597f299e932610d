// Puzzle generation with ordered fallback tiers.
//
// Tiers are tried in order: Template (render + novelty retry loop), External
// (hosted model), then Backup (static puzzles). Backup cannot fail, so every
// call ends with non-empty text and no error ever reaches the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::characters;
use crate::error::{LlmError, PuzzleError};
use crate::llm::{self, TextGenerator};
use crate::metrics;
use crate::profile::UserProfile;
use crate::store::Store;

use super::novelty::{Fingerprint, Novelty, NoveltyTracker};
use super::render::TemplateRenderer;

/// Template renders checked for novelty before forcing one through.
pub const MAX_ATTEMPTS: u32 = 5;

/// Appended to the user id when deriving the seed for the forced render.
pub const FORCED_SEED_SUFFIX: &str = "#forced";

pub const BACKUP_PUZZLES: &[&str] = &[
    "🧩 ما الشيء الذي كلما زاد نقص؟\n\nفكّر جيدًا قبل أن تجيب! 🤔",
    "🧩 له أسنان ولا يعض، ما هو؟ 🪮",
    "🧩 شيء يكتب ولا يقرأ، ما هو؟ ✏️",
    "🧩 ما هو الشيء الذي يتكلم جميع لغات العالم؟ 🏔️",
    "🧩 بيت بلا أبواب ولا نوافذ، ما هو؟ 🥚",
];

/// A puzzle production strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Template,
    External,
    Backup,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Template => "template",
            Tier::External => "external",
            Tier::Backup => "backup",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PuzzleRequest {
    pub category: String,
    pub level: String,
    pub user_id: String,
}

impl PuzzleRequest {
    pub fn new(
        category: impl Into<String>,
        level: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            level: level.into(),
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPuzzle {
    pub text: String,
    pub tier: Tier,
    /// Template renders tried. Zero for the other tiers.
    pub attempts: u32,
    /// True when the novelty check was skipped after exhausting attempts.
    pub forced: bool,
    pub fingerprint: Fingerprint,
}

/// Seed derived from the minute bucket of `now` and `key`.
pub fn time_seed(now: DateTime<Utc>, key: &str) -> u64 {
    let bucket = now.timestamp().div_euclid(60);
    Fingerprint::of(&format!("{bucket}:{key}")).prefix_u64()
}

#[derive(Clone)]
pub struct PuzzleGenerator {
    renderer: Arc<TemplateRenderer>,
    tracker: NoveltyTracker,
    profiles: Arc<dyn Store<UserProfile>>,
    external: Option<Arc<dyn TextGenerator>>,
}

impl PuzzleGenerator {
    pub fn new(
        renderer: TemplateRenderer,
        profiles: Arc<dyn Store<UserProfile>>,
        external: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            renderer: Arc::new(renderer),
            tracker: NoveltyTracker::new(profiles.clone()),
            profiles,
            external,
        }
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    pub fn tracker(&self) -> &NoveltyTracker {
        &self.tracker
    }

    /// Generate with an rng seeded from the time bucket and user id.
    pub async fn generate(&self, request: &PuzzleRequest, now: DateTime<Utc>) -> GeneratedPuzzle {
        let mut rng = StdRng::seed_from_u64(time_seed(now, &request.user_id));
        self.generate_with(request, &mut rng).await
    }

    /// Generate using the supplied random source.
    pub async fn generate_with<R>(&self, request: &PuzzleRequest, rng: &mut R) -> GeneratedPuzzle
    where
        R: Rng + Send,
    {
        match self.from_templates(request, rng) {
            Ok(puzzle) => return finish(puzzle),
            Err(e) => log_fallback(Tier::Template, request, &e),
        }
        match self.from_model(request).await {
            Ok(puzzle) => return finish(puzzle),
            Err(e) => log_fallback(Tier::External, request, &e),
        }
        finish(self.from_backup(rng))
    }

    fn from_templates<R: Rng + ?Sized>(
        &self,
        request: &PuzzleRequest,
        rng: &mut R,
    ) -> Result<GeneratedPuzzle, PuzzleError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let text = self.renderer.render(&request.category, &request.level, rng)?;
            match self.tracker.check(&request.user_id, &text) {
                (Novelty::Novel, fingerprint) => {
                    return Ok(GeneratedPuzzle {
                        text,
                        tier: Tier::Template,
                        attempts: attempt,
                        forced: false,
                        fingerprint,
                    });
                }
                (Novelty::Duplicate, _) => metrics::NOVELTY_DUPLICATES_TOTAL.inc(),
            }
        }

        let forced_key = format!("{}{FORCED_SEED_SUFFIX}", request.user_id);
        let seed = rng.next_u64() ^ Fingerprint::of(&forced_key).prefix_u64();
        let mut forced_rng = StdRng::seed_from_u64(seed);
        let text = self
            .renderer
            .render(&request.category, &request.level, &mut forced_rng)?;
        let fingerprint = self.tracker.record_unchecked(&request.user_id, &text);
        tracing::debug!(
            user_id = %request.user_id,
            "novelty attempts exhausted, forcing puzzle"
        );
        metrics::FORCED_PUZZLES_TOTAL.inc();

        Ok(GeneratedPuzzle {
            text,
            tier: Tier::Template,
            attempts: MAX_ATTEMPTS,
            forced: true,
            fingerprint,
        })
    }

    async fn from_model(&self, request: &PuzzleRequest) -> Result<GeneratedPuzzle, PuzzleError> {
        let external = match &self.external {
            Some(g) if g.is_configured() => g,
            _ => return Err(LlmError::MissingApiKey.into()),
        };

        let character_key = self
            .profiles
            .get(&request.user_id)
            .map(|p| p.character)
            .unwrap_or_else(|| characters::DEFAULT_CHARACTER.to_string());
        let prompt = llm::puzzle_prompt(
            &request.category,
            &request.level,
            characters::resolve(&character_key),
        );

        let text = external.generate_text(&prompt).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse.into());
        }
        let fingerprint = self.tracker.record_unchecked(&request.user_id, text);

        Ok(GeneratedPuzzle {
            text: text.to_string(),
            tier: Tier::External,
            attempts: 0,
            forced: false,
            fingerprint,
        })
    }

    fn from_backup<R: Rng + ?Sized>(&self, rng: &mut R) -> GeneratedPuzzle {
        let text = BACKUP_PUZZLES
            .choose(rng)
            .copied()
            .unwrap_or(BACKUP_PUZZLES[0])
            .to_string();
        let fingerprint = Fingerprint::of(&text);
        GeneratedPuzzle {
            text,
            tier: Tier::Backup,
            attempts: 0,
            forced: false,
            fingerprint,
        }
    }
}

fn log_fallback(tier: Tier, request: &PuzzleRequest, e: &PuzzleError) {
    tracing::warn!(
        tier = tier.as_str(),
        category = %request.category,
        "puzzle tier unavailable, falling back: {e}"
    );
}

fn finish(puzzle: GeneratedPuzzle) -> GeneratedPuzzle {
    metrics::PUZZLES_GENERATED_TOTAL
        .with_label_values(&[puzzle.tier.as_str()])
        .inc();
    puzzle
}
