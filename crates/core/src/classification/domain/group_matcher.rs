use crate::classification::domain::embedding::Embedding;
use crate::classification::domain::reference_set::ReferenceSet;
use crate::shared::constants::MATCH_THRESHOLD;
use crate::shared::group::Group;

/// Outcome of matching one face against every group.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceMatch {
    pub group: Option<Group>,
    /// `(1 - distance) * 100`, floored at 0; 0 when unmatched.
    pub confidence: f64,
}

impl FaceMatch {
    pub fn unknown() -> Self {
        Self {
            group: None,
            confidence: 0.0,
        }
    }
}

/// Best-distance matching.
///
/// Each group is scored by its single closest reference. A group wins when
/// that distance is strictly below the threshold and its confidence beats
/// every earlier candidate, so exact ties go to the group enumerated first.
/// Groups without references are skipped.
#[derive(Clone, Copy, Debug)]
pub struct GroupMatcher {
    threshold: f64,
}

impl GroupMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn match_face(&self, embedding: &Embedding, references: &ReferenceSet) -> FaceMatch {
        let candidates = references.iter().filter_map(|(group, refs)| {
            refs.iter()
                .map(|r| embedding.distance(r))
                .min_by(f64::total_cmp)
                .map(|best| (group, best))
        });
        self.pick(candidates)
    }

    /// Chooses among `(group, closest distance)` candidates in iteration order.
    pub fn pick<'a>(&self, candidates: impl IntoIterator<Item = (&'a Group, f64)>) -> FaceMatch {
        let mut best = FaceMatch::unknown();
        for (group, distance) in candidates {
            let confidence = ((1.0 - distance) * 100.0).max(0.0);
            if distance < self.threshold && confidence > best.confidence {
                best = FaceMatch {
                    group: Some(group.clone()),
                    confidence,
                };
            }
        }
        best
    }
}

impl Default for GroupMatcher {
    fn default() -> Self {
        Self::new(MATCH_THRESHOLD)
    }
}
