// Puzzle generation: static tables, rendering, novelty tracking and tiers.

pub mod generator;
pub mod novelty;
pub mod render;
pub mod templates;
pub mod vocabulary;

pub use generator::{GeneratedPuzzle, PuzzleGenerator, PuzzleRequest, Tier};
pub use novelty::{Fingerprint, Novelty, NoveltyTracker};
pub use render::TemplateRenderer;
pub use templates::TemplateLibrary;
pub use vocabulary::Vocabulary;
