use crate::shared::bounding_box::BoundingBox;
use crate::shared::group::{Group, GroupCatalog};

/// One face found in a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub group: Option<Group>,
    pub confidence: f64,
}

/// Everything the classifier learned about one frame.
///
/// Counts are kept for every catalog group (zeros included) in catalog
/// order. The majority is the group with the highest count, the earliest
/// group on ties, and `None` when no face matched any group.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionResult {
    frame_index: usize,
    detections: Vec<Detection>,
    counts: Vec<(Group, usize)>,
    majority: Option<Group>,
}

impl DetectionResult {
    pub fn new(catalog: &GroupCatalog, frame_index: usize, detections: Vec<Detection>) -> Self {
        let counts: Vec<(Group, usize)> = catalog
            .iter()
            .map(|g| {
                let n = detections
                    .iter()
                    .filter(|d| d.group.as_ref() == Some(g))
                    .count();
                (g.clone(), n)
            })
            .collect();

        let mut majority: Option<(&Group, usize)> = None;
        for (group, n) in &counts {
            if *n > majority.map_or(0, |(_, best)| best) {
                majority = Some((group, *n));
            }
        }
        let majority = majority.map(|(g, _)| g.clone());

        Self {
            frame_index,
            detections,
            counts,
            majority,
        }
    }

    pub fn empty(catalog: &GroupCatalog, frame_index: usize) -> Self {
        Self::new(catalog, frame_index, Vec::new())
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn counts(&self) -> &[(Group, usize)] {
        &self.counts
    }

    pub fn count(&self, group: &Group) -> usize {
        self.counts
            .iter()
            .find(|(g, _)| g == group)
            .map_or(0, |(_, n)| *n)
    }

    pub fn majority(&self) -> Option<&Group> {
        self.majority.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(group: Option<&Group>) -> Detection {
        Detection {
            bbox: BoundingBox::new(0, 10, 10, 0),
            group: group.cloned(),
            confidence: if group.is_some() { 70.0 } else { 0.0 },
        }
    }

    #[test]
    fn test_empty_has_no_majority() {
        let catalog = GroupCatalog::default();
        let result = DetectionResult::empty(&catalog, 0);
        assert!(result.majority().is_none());
        assert_eq!(result.counts().len(), 3);
        assert!(result.counts().iter().all(|(_, n)| *n == 0));
    }

    #[test]
    fn test_only_unknown_faces_has_no_majority() {
        let catalog = GroupCatalog::default();
        let result = DetectionResult::new(&catalog, 0, vec![detection(None), detection(None)]);
        assert_eq!(result.detections().len(), 2);
        assert!(result.majority().is_none());
    }

    #[test]
    fn test_majority_is_highest_count() {
        let catalog = GroupCatalog::default();
        let science = catalog.get("science").unwrap();
        let arts = catalog.get("arts").unwrap();
        let result = DetectionResult::new(
            &catalog,
            4,
            vec![detection(Some(science)), detection(Some(arts)), detection(Some(arts)), detection(None)],
        );
        assert_eq!(result.majority(), Some(arts));
        assert_eq!(result.count(science), 1);
        assert_eq!(result.count(arts), 2);
        assert_eq!(result.frame_index(), 4);
    }

    #[test]
    fn test_tie_goes_to_first_enumerated() {
        let catalog = GroupCatalog::default();
        let science = catalog.get("science").unwrap();
        let commerce = catalog.get("commerce").unwrap();
        let result = DetectionResult::new(
            &catalog,
            0,
            vec![detection(Some(commerce)), detection(Some(science))],
        );
        assert_eq!(result.majority(), Some(science));
    }
}
