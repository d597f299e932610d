// Per-user duplicate detection for served puzzles.
//
// Each user keeps an insertion-ordered history of SHA-256 fingerprints. The
// history is bounded: once it grows past HISTORY_LIMIT it is cut back to the
// HISTORY_RETAIN most recent entries, so very old puzzles can be served again.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::profile::UserProfile;
use crate::store::Store;

/// Size above which the cumulative history is pruned.
pub const HISTORY_LIMIT: usize = 1000;
/// Number of newest entries kept after pruning.
pub const HISTORY_RETAIN: usize = 500;

/// 256-bit content digest of a puzzle text.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        Fingerprint(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First eight bytes as an integer, used for seeding.
    pub fn prefix_u64(&self) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.0[..8]);
        u64::from_be_bytes(buf)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Outcome of a novelty check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Novelty {
    Novel,
    Duplicate,
}

/// Fingerprints a user has been served, all-time and in the current session.
#[derive(Debug, Clone, Default)]
pub struct PuzzleHistory {
    order: VecDeque<Fingerprint>,
    seen: HashSet<Fingerprint>,
    session: Vec<Fingerprint>,
}

impl PuzzleHistory {
    /// Record `fp` if it has not been seen. A duplicate leaves the history untouched.
    pub fn check_and_record(&mut self, fp: Fingerprint) -> Novelty {
        if self.seen.contains(&fp) || self.session.contains(&fp) {
            return Novelty::Duplicate;
        }

        self.order.push_back(fp);
        self.seen.insert(fp);
        self.session.push(fp);
        self.prune();
        Novelty::Novel
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.seen.contains(fp) || self.session.contains(fp)
    }

    /// Cumulative number of remembered fingerprints.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn session_len(&self) -> usize {
        self.session.len()
    }

    /// Remembered fingerprints, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Fingerprint> {
        self.order.iter()
    }

    /// Forget everything, both cumulative and session.
    pub fn reset(&mut self) {
        self.order.clear();
        self.seen.clear();
        self.session.clear();
    }

    /// Begin a new chat session. The cumulative history is kept.
    pub fn start_session(&mut self) {
        self.session.clear();
    }

    fn prune(&mut self) {
        if self.order.len() > HISTORY_LIMIT {
            let excess = self.order.len() - HISTORY_RETAIN;
            for fp in self.order.drain(..excess) {
                self.seen.remove(&fp);
            }
        }
        if self.session.len() > HISTORY_LIMIT {
            let excess = self.session.len() - HISTORY_RETAIN;
            self.session.drain(..excess);
        }
    }
}

/// Novelty checks against the shared profile store.
#[derive(Clone)]
pub struct NoveltyTracker {
    profiles: Arc<dyn Store<UserProfile>>,
}

impl NoveltyTracker {
    pub fn new(profiles: Arc<dyn Store<UserProfile>>) -> Self {
        Self { profiles }
    }

    /// Check `text` for `user_id`, recording it when novel.
    pub fn check(&self, user_id: &str, text: &str) -> (Novelty, Fingerprint) {
        let fp = Fingerprint::of(text);
        let mut outcome = Novelty::Duplicate;
        self.profiles.update(user_id, &mut |profile| {
            outcome = profile.history.check_and_record(fp);
            if outcome == Novelty::Novel {
                profile.puzzles_served += 1;
            }
        });
        (outcome, fp)
    }

    /// Record `text` without checking, as the forced path does.
    pub fn record_unchecked(&self, user_id: &str, text: &str) -> Fingerprint {
        let fp = Fingerprint::of(text);
        self.profiles.update(user_id, &mut |profile| {
            profile.history.check_and_record(fp);
            profile.puzzles_served += 1;
        });
        fp
    }

    pub fn reset(&self, user_id: &str) {
        self.profiles
            .update(user_id, &mut |profile| profile.history.reset());
    }

    pub fn start_session(&self, user_id: &str) {
        self.profiles
            .update(user_id, &mut |profile| profile.history.start_session());
    }
}
