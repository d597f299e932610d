// Per-user state: gamification counters, persona choice and puzzle history.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::characters::DEFAULT_CHARACTER;
use crate::puzzle::novelty::PuzzleHistory;

#[derive(Debug, Clone)]
pub struct UserProfile {
    pub points: u64,
    pub streak: u32,
    pub best_streak: u32,
    pub correct: u32,
    pub total: u32,
    pub achievements: BTreeSet<String>,
    pub character: String,
    pub puzzles_served: u64,
    pub history: PuzzleHistory,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            points: 0,
            streak: 0,
            best_streak: 0,
            correct: 0,
            total: 0,
            achievements: BTreeSet::new(),
            character: DEFAULT_CHARACTER.to_string(),
            puzzles_served: 0,
            history: PuzzleHistory::default(),
        }
    }
}

impl UserProfile {
    pub fn accuracy(&self) -> f64 {
        if self.total > 0 {
            self.correct as f64 / self.total as f64
        } else {
            0.0
        }
    }

    pub fn summary(&self, user_id: &str) -> ProfileSummary {
        ProfileSummary {
            user_id: user_id.to_string(),
            points: self.points,
            streak: self.streak,
            best_streak: self.best_streak,
            correct: self.correct,
            total: self.total,
            accuracy: self.accuracy(),
            achievements: self.achievements.iter().cloned().collect(),
            character: self.character.clone(),
            puzzles_served: self.puzzles_served,
            history_size: self.history.len(),
            session_history_size: self.history.session_len(),
        }
    }
}

/// Public view of a profile, without the fingerprint sets.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub user_id: String,
    pub points: u64,
    pub streak: u32,
    pub best_streak: u32,
    pub correct: u32,
    pub total: u32,
    pub accuracy: f64,
    pub achievements: Vec<String>,
    pub character: String,
    pub puzzles_served: u64,
    pub history_size: usize,
    pub session_history_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let p = UserProfile::default();
        assert_eq!(p.points, 0);
        assert_eq!(p.character, DEFAULT_CHARACTER);
        assert!(p.history.is_empty());
        assert_eq!(p.accuracy(), 0.0);
    }

    #[test]
    fn test_summary() {
        let mut p = UserProfile {
            correct: 3,
            total: 4,
            ..Default::default()
        };
        p.achievements.insert("first_correct".into());
        let s = p.summary("u1");
        assert_eq!(s.user_id, "u1");
        assert!((s.accuracy - 0.75).abs() < 1e-9);
        assert_eq!(s.achievements, vec!["first_correct"]);
    }
}
