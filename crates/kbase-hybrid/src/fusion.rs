//! Score fusion and selection. Everything here is pure: the engine feeds in
//! neighbour lists and raw lexical scores and gets back ranked positions.

use std::collections::HashMap;

use kbase_core::keywords::CategoryKeywords;
use kbase_core::types::Document;
use kbase_vector::Neighbor;

pub const SEMANTIC_WEIGHT: f32 = 0.6;
pub const LEXICAL_WEIGHT: f32 = 0.4;
/// Weight for documents that only the lexical stage found.
pub const LEXICAL_ONLY_WEIGHT: f32 = 0.3;
/// Normalized lexical scores at or below this are ignored.
pub const LEXICAL_FLOOR: f32 = 0.05;
/// Semantic neighbours requested per wanted result.
pub const CANDIDATE_MULTIPLIER: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub position: usize,
    pub score: f32,
}

/// Candidates keyed by document position, kept in insertion order.
#[derive(Debug, Default)]
pub struct CandidateSet {
    order: Vec<Candidate>,
    slots: HashMap<usize, usize>,
}

impl CandidateSet {
    /// Seed with semantic neighbours in rank order.
    pub fn from_semantic(neighbors: &[Neighbor]) -> Self {
        let mut set = Self::default();
        for n in neighbors {
            set.upsert(n.position, |_| n.score, n.score);
        }
        set
    }

    /// Blend in raw lexical scores (one per document, by position).
    pub fn fuse_lexical(&mut self, raw: &[f32]) {
        let max = raw.iter().copied().fold(0.0f32, f32::max);
        if max <= 0.0 {
            return;
        }
        for (position, &score) in raw.iter().enumerate() {
            let lexical = score / max;
            if lexical <= LEXICAL_FLOOR {
                continue;
            }
            self.upsert(
                position,
                |semantic| SEMANTIC_WEIGHT * semantic + LEXICAL_WEIGHT * lexical,
                LEXICAL_ONLY_WEIGHT * lexical,
            );
        }
    }

    /// Multiply section candidates by their category keyword boost.
    pub fn apply_boost(&mut self, documents: &[Document], keywords: &CategoryKeywords, query_lower: &str) {
        for c in &mut self.order {
            let Some(section) = documents.get(c.position).and_then(Document::as_section) else { continue };
            c.score *= keywords.boost_factor(&section.category_key, query_lower);
        }
    }

    /// Stable descending sort, then take from the top until `top_k` results
    /// or the first score under `min_score`.
    pub fn select(mut self, top_k: usize, min_score: f32) -> Vec<Candidate> {
        self.order.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.order
            .into_iter()
            .take_while(|c| c.score >= min_score)
            .take(top_k)
            .collect()
    }

    pub fn score(&self, position: usize) -> Option<f32> {
        self.slots.get(&position).map(|&i| self.order[i].score)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn upsert(&mut self, position: usize, update: impl FnOnce(f32) -> f32, insert: f32) {
        match self.slots.get(&position) {
            Some(&i) => self.order[i].score = update(self.order[i].score),
            None => {
                self.slots.insert(position, self.order.len());
                self.order.push(Candidate { position, score: insert });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbase_core::types::{DocumentDetail, LocationFields, SectionFields};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn section(key: &str) -> Document {
        Document {
            id: format!("section_{key}"),
            text: key.to_string(),
            detail: DocumentDetail::Section(SectionFields { title: key.into(), category_key: key.into(), lines: vec![] }),
        }
    }

    fn location() -> Document {
        Document {
            id: "location_0".into(),
            text: "Салон ORTOS Минск. Адрес: ул. Гикало, 1. Часы: 9-18. Телефоны: 1.".into(),
            detail: DocumentDetail::Location(LocationFields {
                city: "Минск".into(),
                address: "ул. Гикало, 1".into(),
                phones: vec!["1".into()],
                working_hours: "9-18".into(),
                full_text: String::new(),
            }),
        }
    }

    #[test]
    fn lexical_only_hit_gets_reduced_weight() {
        let mut set = CandidateSet::from_semantic(&[Neighbor { position: 0, score: 0.9 }]);
        set.fuse_lexical(&[0.0, 2.0, 1.0]);
        // position 1 normalizes to 1.0, position 2 to 0.5
        assert!(close(set.score(1).unwrap(), 0.3));
        assert!(close(set.score(2).unwrap(), 0.15));
        assert!(close(set.score(0).unwrap(), 0.9));
    }

    #[test]
    fn fused_score_blends_both_signals() {
        let mut set = CandidateSet::from_semantic(&[Neighbor { position: 0, score: 0.5 }]);
        set.fuse_lexical(&[4.0, 1.0]);
        assert!(close(set.score(0).unwrap(), 0.6 * 0.5 + 0.4 * 1.0));
        assert!(close(set.score(1).unwrap(), 0.3 * 0.25));
    }

    #[test]
    fn lexical_floor_is_exclusive() {
        let mut set = CandidateSet::default();
        set.fuse_lexical(&[1.0, 0.05, 0.0]);
        assert_eq!(set.len(), 1);
        assert!(set.score(1).is_none());
    }

    #[test]
    fn all_zero_lexical_scores_change_nothing() {
        let mut set = CandidateSet::from_semantic(&[Neighbor { position: 0, score: 0.4 }]);
        set.fuse_lexical(&[0.0, 0.0]);
        assert_eq!(set.len(), 1);
        assert!(close(set.score(0).unwrap(), 0.4));
    }

    #[test]
    fn boost_applies_to_sections_only() {
        let docs = vec![section("delivery"), location()];
        let keywords = CategoryKeywords::new([("delivery", ["доставка", "самовывоз"])]);
        let mut set = CandidateSet::from_semantic(&[
            Neighbor { position: 0, score: 0.5 },
            Neighbor { position: 1, score: 0.5 },
        ]);
        set.apply_boost(&docs, &keywords, "доставка или самовывоз в минске");
        assert!(close(set.score(0).unwrap(), 0.5 * 1.3));
        assert!(close(set.score(1).unwrap(), 0.5));
    }

    #[test]
    fn selection_stops_at_first_low_score() {
        let mut set = CandidateSet::from_semantic(&[
            Neighbor { position: 0, score: 0.8 },
            Neighbor { position: 1, score: 0.2 },
            Neighbor { position: 2, score: 0.5 },
        ]);
        set.fuse_lexical(&[]);
        let picked = set.select(5, 0.3);
        assert_eq!(picked.iter().map(|c| c.position).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn selection_respects_top_k_and_keeps_tie_order() {
        let set = CandidateSet::from_semantic(&[
            Neighbor { position: 3, score: 0.5 },
            Neighbor { position: 1, score: 0.5 },
            Neighbor { position: 2, score: 0.7 },
        ]);
        let picked = set.select(2, 0.0);
        assert_eq!(picked.iter().map(|c| c.position).collect::<Vec<_>>(), vec![2, 3]);
    }
}
