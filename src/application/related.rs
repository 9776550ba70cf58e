//! Related-post ranking over shared categories and tags.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use crate::application::error::AppError;
use crate::application::repos::{ContentStore, PostQuery, RequestContext};
use crate::config::RelatedSettings;
use crate::domain::entities::PostRecord;

/// Score contribution per shared category and per shared tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelatedWeights {
    pub category: u32,
    pub tag: u32,
}

impl RelatedWeights {
    pub fn new(category: u32, tag: u32) -> Self {
        Self { category, tag }
    }

    /// Category similarity always contributes: both weights zero forces the
    /// category weight to 1.
    pub fn effective(self) -> Self {
        if self.category == 0 && self.tag == 0 {
            Self {
                category: 1,
                tag: 0,
            }
        } else {
            self
        }
    }
}

impl Default for RelatedWeights {
    fn default() -> Self {
        Self {
            category: 1,
            tag: 1,
        }
    }
}

impl From<&RelatedSettings> for RelatedWeights {
    fn from(settings: &RelatedSettings) -> Self {
        Self {
            category: settings.category_weight,
            tag: settings.tag_weight,
        }
    }
}

/// Request-scoped accumulator mapping candidate uid to its score.
///
/// Remembers first-insertion order so that equal scores rank in the order
/// candidates were discovered, keeping the output deterministic.
#[derive(Debug, Default)]
struct ScoreTable {
    order: Vec<i64>,
    scores: HashMap<i64, u64>,
}

impl ScoreTable {
    fn bump(&mut self, uid: i64, weight: u32) {
        match self.scores.entry(uid) {
            Entry::Occupied(mut occupied) => {
                *occupied.get_mut() += u64::from(weight);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(u64::from(weight));
                self.order.push(uid);
            }
        }
    }

    /// Candidates by descending score; ties keep insertion order.
    fn ranked(self) -> Vec<(i64, u64)> {
        let scores = self.scores;
        let mut entries: Vec<(i64, u64)> = self
            .order
            .into_iter()
            .map(|uid| (uid, scores[&uid]))
            .collect();
        entries.sort_by(|left, right| right.1.cmp(&left.1));
        entries
    }
}

pub struct RelatedPostsRanker {
    store: Arc<dyn ContentStore>,
}

impl RelatedPostsRanker {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Rank other posts against `current` by shared categories and tags.
    ///
    /// Every shared category adds the category weight to a candidate's
    /// score, every shared tag the tag weight; contributions accumulate.
    /// The current post itself is never a candidate. The result holds at
    /// most `limit` posts, best first.
    pub async fn rank(
        &self,
        ctx: &RequestContext,
        current: &PostRecord,
        weights: RelatedWeights,
        limit: usize,
    ) -> Result<Vec<PostRecord>, AppError> {
        let weights = weights.effective();
        let mut table = ScoreTable::default();
        let mut candidates: HashMap<i64, PostRecord> = HashMap::new();

        for &category in &current.categories {
            let mut query = PostQuery::from_context(ctx);
            query.category = Some(category);
            for post in self.store.list_posts(&query).await? {
                if post.uid == current.uid {
                    continue;
                }
                table.bump(post.uid, weights.category);
                candidates.entry(post.uid).or_insert(post);
            }
        }

        for &tag in &current.tags {
            let mut query = PostQuery::from_context(ctx);
            query.tag = Some(tag);
            for post in self.store.list_posts(&query).await? {
                if post.uid == current.uid {
                    continue;
                }
                table.bump(post.uid, weights.tag);
                candidates.entry(post.uid).or_insert(post);
            }
        }

        let mut ranked = Vec::new();
        for (uid, _score) in table.ranked() {
            if ranked.len() == limit {
                break;
            }
            if let Some(post) = candidates.remove(&uid) {
                ranked.push(post);
            }
        }

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_accumulate_additively() {
        let mut table = ScoreTable::default();
        table.bump(7, 3);
        table.bump(7, 3);
        table.bump(7, 2);
        assert_eq!(table.ranked(), vec![(7, 8)]);
    }

    #[test]
    fn zero_weight_still_registers_the_candidate() {
        let mut table = ScoreTable::default();
        table.bump(1, 0);
        assert_eq!(table.ranked(), vec![(1, 0)]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        // A(2), B(3), C(2) inserted in that order ranks as B, A, C.
        let mut table = ScoreTable::default();
        table.bump(100, 2);
        table.bump(200, 3);
        table.bump(300, 2);
        assert_eq!(table.ranked(), vec![(200, 3), (100, 2), (300, 2)]);
    }

    #[test]
    fn weights_come_from_related_settings() {
        let settings = RelatedSettings {
            category_weight: 2,
            tag_weight: 3,
            limit: 5,
        };
        assert_eq!(RelatedWeights::from(&settings), RelatedWeights::new(2, 3));
    }

    #[test]
    fn zero_zero_weights_force_category_contribution() {
        let effective = RelatedWeights::new(0, 0).effective();
        assert_eq!(effective, RelatedWeights::new(1, 0));

        // Non-degenerate weights pass through untouched.
        let kept = RelatedWeights::new(0, 4).effective();
        assert_eq!(kept, RelatedWeights::new(0, 4));
    }
}
