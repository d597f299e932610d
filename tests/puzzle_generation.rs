// Integration tests for the puzzle engine: template rendering, novelty
// tracking with eviction, and the template -> external -> backup tiers.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use luku_backend::error::LlmError;
use luku_backend::llm::TextGenerator;
use luku_backend::profile::UserProfile;
use luku_backend::puzzle::generator::BACKUP_PUZZLES;
use luku_backend::puzzle::novelty::{HISTORY_LIMIT, HISTORY_RETAIN};
use luku_backend::puzzle::{
    Fingerprint, PuzzleGenerator, PuzzleRequest, TemplateLibrary, TemplateRenderer, Tier,
    Vocabulary,
};
use luku_backend::store::{MemoryStore, Store};

/// A model that is always down.
struct DownModel;

#[async_trait]
impl TextGenerator for DownModel {
    async fn generate_text(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Status {
            status: 500,
            body: "boom".into(),
        })
    }
}

fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_718_000_000, 0).unwrap()
}

fn generator_with(
    library: TemplateLibrary,
    external: Option<Arc<dyn TextGenerator>>,
) -> (PuzzleGenerator, Arc<dyn Store<UserProfile>>) {
    let profiles: Arc<dyn Store<UserProfile>> = Arc::new(MemoryStore::new());
    let renderer = TemplateRenderer::new(library, Vocabulary::builtin());
    (
        PuzzleGenerator::new(renderer, profiles.clone(), external),
        profiles,
    )
}

// ── Rendering ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_every_category_renders_without_known_placeholders() {
    let (gen, _) = generator_with(TemplateLibrary::builtin(), None);
    let vocab = Vocabulary::builtin();
    let keys: Vec<String> = vocab.keys().map(|k| format!("{{{k}}}")).collect();
    let categories: Vec<String> = gen
        .renderer()
        .library()
        .categories()
        .into_iter()
        .map(String::from)
        .collect();
    assert!(!categories.is_empty());

    for category in &categories {
        for seed in 0..25u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let req = PuzzleRequest::new(category.as_str(), "متوسط", format!("user-{seed}"));
            let puzzle = gen.generate_with(&req, &mut rng).await;
            assert_eq!(puzzle.tier, Tier::Template);
            assert!(!puzzle.text.trim().is_empty());
            for key in &keys {
                assert!(
                    !puzzle.text.contains(key.as_str()),
                    "{category}: unresolved {key} in {:?}",
                    puzzle.text
                );
            }
        }
    }
}

#[tokio::test]
async fn test_seeded_generation_is_reproducible() {
    let req = PuzzleRequest::new("رياضة", "متوسط", "u1");

    let (gen_a, _) = generator_with(TemplateLibrary::builtin(), None);
    let (gen_b, _) = generator_with(TemplateLibrary::builtin(), None);
    let a = gen_a.generate(&req, fixed_now()).await;
    let b = gen_b.generate(&req, fixed_now()).await;
    assert_eq!(a.text, b.text);
    assert_eq!(a.fingerprint, b.fingerprint);

    let (gen_c, _) = generator_with(TemplateLibrary::builtin(), None);
    let c = gen_c
        .generate_with(&req, &mut StdRng::seed_from_u64(1234))
        .await;
    let (gen_d, _) = generator_with(TemplateLibrary::builtin(), None);
    let d = gen_d
        .generate_with(&req, &mut StdRng::seed_from_u64(1234))
        .await;
    assert_eq!(c.text, d.text);
}

// ── Novelty ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rapid_calls_avoid_repeats() {
    let (gen, _) = generator_with(TemplateLibrary::builtin(), None);
    let req = PuzzleRequest::new("رياضة", "متوسط", "u1");

    let mut fingerprints = Vec::new();
    for _ in 0..6 {
        // Same minute bucket every time, as with rapid successive requests.
        let puzzle = gen.generate(&req, fixed_now()).await;
        fingerprints.push(puzzle.fingerprint);
    }

    let first_five: HashSet<Fingerprint> = fingerprints[..5].iter().copied().collect();
    assert!(
        first_five.len() >= 4,
        "expected at most one duplicate among the first five"
    );
}

#[tokio::test]
async fn test_history_is_pruned_to_newest_entries() {
    let (gen, profiles) = generator_with(TemplateLibrary::builtin(), None);
    let tracker = gen.tracker();

    let texts: Vec<String> = (0..=HISTORY_LIMIT).map(|i| format!("puzzle {i}")).collect();
    for text in &texts {
        tracker.check("u1", text);
    }

    let profile = profiles.get("u1").unwrap();
    assert_eq!(profile.history.len(), HISTORY_RETAIN);
    let kept: Vec<Fingerprint> = profile.history.iter().copied().collect();
    let expected: Vec<Fingerprint> = texts[texts.len() - HISTORY_RETAIN..]
        .iter()
        .map(|t| Fingerprint::of(t))
        .collect();
    assert_eq!(kept, expected);
}

#[tokio::test]
async fn test_reset_makes_duplicate_novel_again() {
    let library = TemplateLibrary::from_json(r#"{"ثابت": ["نص واحد فقط"]}"#).unwrap();
    let (gen, profiles) = generator_with(library, None);
    let req = PuzzleRequest::new("ثابت", "سهل", "u1");

    let first = gen
        .generate_with(&req, &mut StdRng::seed_from_u64(9))
        .await;
    assert!(!first.forced);

    let (novelty, _) = gen.tracker().check("u1", &first.text);
    assert_eq!(novelty, luku_backend::puzzle::Novelty::Duplicate);

    gen.tracker().reset("u1");
    let profile = profiles.get("u1").unwrap();
    assert!(profile.history.is_empty());
    assert_eq!(profile.history.session_len(), 0);

    let (novelty, _) = gen.tracker().check("u1", &first.text);
    assert_eq!(novelty, luku_backend::puzzle::Novelty::Novel);
}

#[tokio::test]
async fn test_exhausted_templates_still_return_text() {
    let library = TemplateLibrary::from_json(r#"{"ثابت": ["نص واحد فقط"]}"#).unwrap();
    let (gen, _) = generator_with(library, None);
    let req = PuzzleRequest::new("ثابت", "سهل", "u1");

    let mut rng = StdRng::seed_from_u64(3);
    let mut forced = 0;
    for _ in 0..20 {
        let puzzle = gen.generate_with(&req, &mut rng).await;
        assert_eq!(puzzle.tier, Tier::Template);
        assert!(puzzle.text.contains("نص واحد فقط"));
        if puzzle.forced {
            forced += 1;
        }
    }
    // Only a handful of banner variants exist, so most calls must be forced.
    assert!(forced > 0);
}

// ── Fallback tiers ───────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_library_and_failing_model_yield_backup() {
    let (gen, _) = generator_with(TemplateLibrary::empty(), Some(Arc::new(DownModel)));
    for seed in 0..10u64 {
        let req = PuzzleRequest::new("رياضة", "صعب", "u1");
        let puzzle = gen
            .generate_with(&req, &mut StdRng::seed_from_u64(seed))
            .await;
        assert_eq!(puzzle.tier, Tier::Backup);
        assert!(BACKUP_PUZZLES.contains(&puzzle.text.as_str()));
    }
}

#[tokio::test]
async fn test_no_model_configured_yields_backup() {
    let (gen, _) = generator_with(TemplateLibrary::builtin(), None);
    let req = PuzzleRequest::new("فئة غير موجودة", "سهل", "u1");
    let puzzle = gen.generate(&req, fixed_now()).await;
    assert_eq!(puzzle.tier, Tier::Backup);
    assert!(!puzzle.text.is_empty());
}
