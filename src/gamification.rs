// Points, streaks, achievements and leaderboard ranking.
//
// Correct answers earn level-based points plus a bonus on every third
// consecutive correct answer. Wrong answers only reset the streak.

use serde::Serialize;

use crate::profile::UserProfile;

pub const POINTS_EASY: u64 = 10;
pub const POINTS_MEDIUM: u64 = 20;
pub const POINTS_HARD: u64 = 30;
pub const POINTS_OTHER: u64 = 15;

const STREAK_BONUS_EVERY: u32 = 3;
const STREAK_BONUS: u64 = 5;

pub const LEVEL_EASY: &str = "سهل";
pub const LEVEL_MEDIUM: &str = "متوسط";
pub const LEVEL_HARD: &str = "صعب";

/// An achievement and the condition that unlocks it.
pub struct Achievement {
    pub key: &'static str,
    pub title: &'static str,
    unlocked: fn(&UserProfile) -> bool,
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        key: "first_correct",
        title: "🎯 أول إجابة صحيحة",
        unlocked: |p| p.correct >= 1,
    },
    Achievement {
        key: "streak_5",
        title: "🔥 خمس إجابات متتالية",
        unlocked: |p| p.streak >= 5,
    },
    Achievement {
        key: "streak_10",
        title: "⚡ عشر إجابات متتالية",
        unlocked: |p| p.streak >= 10,
    },
    Achievement {
        key: "points_100",
        title: "💯 مئة نقطة",
        unlocked: |p| p.points >= 100,
    },
    Achievement {
        key: "points_500",
        title: "👑 خمسمئة نقطة",
        unlocked: |p| p.points >= 500,
    },
    Achievement {
        key: "puzzle_veteran",
        title: "🧠 خبير الألغاز",
        unlocked: |p| p.total >= 50,
    },
];

/// Base points for a correct answer at `level`.
pub fn points_for_level(level: &str) -> u64 {
    match level {
        LEVEL_EASY => POINTS_EASY,
        LEVEL_MEDIUM => POINTS_MEDIUM,
        LEVEL_HARD => POINTS_HARD,
        _ => POINTS_OTHER,
    }
}

/// What a single answer changed on the profile.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub points_awarded: u64,
    pub streak_bonus: u64,
    pub points: u64,
    pub streak: u32,
    pub new_achievements: Vec<String>,
}

/// Apply one answer to `profile`.
pub fn record_answer(profile: &mut UserProfile, correct: bool, level: &str) -> AnswerOutcome {
    profile.total += 1;

    let mut awarded = 0;
    let mut bonus = 0;
    if correct {
        profile.correct += 1;
        profile.streak += 1;
        profile.best_streak = profile.best_streak.max(profile.streak);
        awarded = points_for_level(level);
        if profile.streak % STREAK_BONUS_EVERY == 0 {
            bonus = STREAK_BONUS;
        }
        profile.points += awarded + bonus;
    } else {
        profile.streak = 0;
    }

    let new_achievements = unlock_achievements(profile);

    AnswerOutcome {
        correct,
        points_awarded: awarded,
        streak_bonus: bonus,
        points: profile.points,
        streak: profile.streak,
        new_achievements,
    }
}

/// Unlock every achievement whose condition now holds. Returns the new keys.
pub fn unlock_achievements(profile: &mut UserProfile) -> Vec<String> {
    let mut unlocked = Vec::new();
    for a in ACHIEVEMENTS {
        if !profile.achievements.contains(a.key) && (a.unlocked)(profile) {
            profile.achievements.insert(a.key.to_string());
            unlocked.push(a.key.to_string());
        }
    }
    unlocked
}

pub fn achievement_title(key: &str) -> Option<&'static str> {
    ACHIEVEMENTS.iter().find(|a| a.key == key).map(|a| a.title)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub points: u64,
    pub best_streak: u32,
}

/// Rank users by points (descending), breaking ties by user id.
pub fn leaderboard(mut entries: Vec<(String, UserProfile)>, limit: usize) -> Vec<LeaderboardEntry> {
    entries.sort_by(|(id_a, a), (id_b, b)| b.points.cmp(&a.points).then_with(|| id_a.cmp(id_b)));
    entries
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (user_id, p))| LeaderboardEntry {
            rank: i + 1,
            user_id,
            points: p.points,
            best_streak: p.best_streak,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_for_level() {
        assert_eq!(points_for_level("سهل"), 10);
        assert_eq!(points_for_level("متوسط"), 20);
        assert_eq!(points_for_level("صعب"), 30);
        assert_eq!(points_for_level("خبير"), 15);
    }

    #[test]
    fn test_correct_answer() {
        let mut p = UserProfile::default();
        let out = record_answer(&mut p, true, LEVEL_MEDIUM);
        assert_eq!(out.points_awarded, 20);
        assert_eq!(out.streak_bonus, 0);
        assert_eq!(p.points, 20);
        assert_eq!(p.streak, 1);
        assert_eq!(p.correct, 1);
        assert_eq!(p.total, 1);
        assert_eq!(out.new_achievements, vec!["first_correct"]);
    }

    #[test]
    fn test_wrong_answer_resets_streak() {
        let mut p = UserProfile::default();
        record_answer(&mut p, true, LEVEL_EASY);
        record_answer(&mut p, true, LEVEL_EASY);
        let out = record_answer(&mut p, false, LEVEL_EASY);
        assert_eq!(out.points_awarded, 0);
        assert_eq!(p.streak, 0);
        assert_eq!(p.best_streak, 2);
        assert_eq!(p.points, 20);
        assert_eq!(p.total, 3);
    }

    #[test]
    fn test_streak_bonus_every_third() {
        let mut p = UserProfile::default();
        record_answer(&mut p, true, LEVEL_EASY);
        record_answer(&mut p, true, LEVEL_EASY);
        let out = record_answer(&mut p, true, LEVEL_EASY);
        assert_eq!(out.streak_bonus, 5);
        assert_eq!(p.points, 35);
    }

    #[test]
    fn test_achievements_unlock_once() {
        let mut p = UserProfile::default();
        let mut all = Vec::new();
        for _ in 0..5 {
            all.extend(record_answer(&mut p, true, LEVEL_HARD).new_achievements);
        }
        // 5 * 30 + one streak bonus = 155
        assert_eq!(p.points, 155);
        assert_eq!(all, vec!["first_correct", "points_100", "streak_5"]);
        let again = record_answer(&mut p, true, LEVEL_HARD);
        assert!(again.new_achievements.is_empty());
    }

    #[test]
    fn test_achievement_titles() {
        for a in ACHIEVEMENTS {
            assert_eq!(achievement_title(a.key), Some(a.title));
        }
        assert!(achievement_title("nope").is_none());
    }

    #[test]
    fn test_leaderboard_ranking() {
        let mk = |points| UserProfile {
            points,
            ..Default::default()
        };
        let board = leaderboard(
            vec![
                ("carol".into(), mk(50)),
                ("alice".into(), mk(100)),
                ("bob".into(), mk(100)),
                ("dave".into(), mk(10)),
            ],
            3,
        );
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].user_id, "alice");
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].user_id, "bob");
        assert_eq!(board[2].user_id, "carol");
        assert_eq!(board[2].rank, 3);
    }
}
