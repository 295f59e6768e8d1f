use bytes::Bytes;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// A set of unique members ordered by score.
///
/// Members are indexed twice: a member -> score map answers `ZSCORE` and membership in constant
/// time, and a tree ordered by `(score, member)` keeps the ascending sequence. Both are updated
/// under the same write guard so readers never see them disagree. Equal scores are ordered by
/// member bytes.
#[derive(Debug, Default)]
pub struct SortedSet {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    scores: HashMap<Bytes, f64>,
    ordered: BTreeSet<ScoredMember>,
}

#[derive(Debug, Clone)]
struct ScoredMember {
    score: f64,
    member: Bytes,
}

impl Ord for ScoredMember {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.member.cmp(&other.member))
    }
}

impl PartialOrd for ScoredMember {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScoredMember {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredMember {}

impl SortedSet {
    /// Inserts `member` with `score`, or moves it when its score changed.
    ///
    /// Returns 1 when the member is new or got a different score, 0 when nothing changed.
    pub fn add(&self, score: f64, member: Bytes) -> usize {
        let mut inner = self.inner.write();

        let current = inner.scores.get(&member).copied();
        if let Some(current) = current {
            if current == score {
                return 0;
            }
            inner.ordered.remove(&ScoredMember {
                score: current,
                member: member.clone(),
            });
        }

        inner.scores.insert(member.clone(), score);
        inner.ordered.insert(ScoredMember { score, member });
        1
    }

    pub fn score(&self, member: &[u8]) -> Option<f64> {
        self.inner.read().scores.get(member).copied()
    }

    /// Removes the members and returns how many were present.
    pub fn remove(&self, members: &[Bytes]) -> usize {
        let mut inner = self.inner.write();
        let mut removed = 0;

        for member in members {
            if let Some(score) = inner.scores.remove(member) {
                inner.ordered.remove(&ScoredMember {
                    score,
                    member: member.clone(),
                });
                removed += 1;
            }
        }

        removed
    }

    pub fn cardinality(&self) -> usize {
        self.inner.read().scores.len()
    }

    /// Members with their scores, lowest score first.
    pub fn members_by_score(&self) -> Vec<(Bytes, f64)> {
        self.inner
            .read()
            .ordered
            .iter()
            .map(|entry| (entry.member.clone(), entry.score))
            .collect()
    }
}
