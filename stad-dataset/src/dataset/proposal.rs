use crate::common::*;

/// Pre-computed detection proposals, keyed by image key.
///
/// Each entry is an N×4 or N×5 array: box coordinates normalized to
/// `[0, 1]`, optionally followed by a detection score. The store is loaded
/// wholesale at construction and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalStore {
    proposals: HashMap<String, Vec<Vec<R64>>>,
}

/// Proposals of one frame after score filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredProposals {
    pub bboxes: Vec<[R64; 4]>,
    /// Present only for 5-column stores, parallel to `bboxes`.
    pub scores: Option<Vec<R64>>,
}

impl ProposalStore {
    pub fn new(proposals: HashMap<String, Vec<Vec<R64>>>) -> Self {
        Self { proposals }
    }

    /// Load a persisted JSON mapping from image key to proposal rows.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(
            fs::File::open(path)
                .with_context(|| format!("failed to open proposal file '{}'", path.display()))?,
        );
        let proposals = serde_json::from_reader(reader)
            .with_context(|| format!("failed to parse proposal file '{}'", path.display()))?;
        Ok(Self { proposals })
    }

    pub fn contains(&self, img_key: &str) -> bool {
        self.proposals.contains_key(img_key)
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// Fetch and filter the proposals of one frame.
    ///
    /// For scored rows, the effective threshold is
    /// `min(score_thr, best score in the frame)`, so at least one proposal
    /// always survives. The result is truncated to `num_max_proposals`, and
    /// every surviving coordinate must lie in `[0, 1]`.
    pub fn filter(
        &self,
        img_key: &str,
        score_thr: R64,
        num_max_proposals: usize,
    ) -> Result<FilteredProposals> {
        let rows = self
            .proposals
            .get(img_key)
            .ok_or_else(|| format_err!("'{}' not in proposals", img_key))?;
        ensure!(!rows.is_empty(), "empty proposal array for '{}'", img_key);

        let width = rows[0].len();
        ensure!(
            width == 4 || width == 5,
            "proposal rows of '{}' must have 4 or 5 columns, found {}",
            img_key,
            width
        );
        for row in rows {
            ensure!(
                row.len() == width,
                "ragged proposal array for '{}': found both {} and {} columns",
                img_key,
                width,
                row.len()
            );
        }

        let filtered = if width == 5 {
            let max_score = rows
                .iter()
                .map(|row| row[4])
                .max()
                .ok_or_else(|| format_err!("empty proposal array for '{}'", img_key))?;
            let thr = cmp::min(score_thr, max_score);

            let (bboxes, scores): (Vec<_>, Vec<_>) = rows
                .iter()
                .filter(|row| row[4] >= thr)
                .take(num_max_proposals)
                .map(|row| ([row[0], row[1], row[2], row[3]], row[4]))
                .unzip();

            FilteredProposals {
                bboxes,
                scores: Some(scores),
            }
        } else {
            let bboxes = rows
                .iter()
                .take(num_max_proposals)
                .map(|row| [row[0], row[1], row[2], row[3]])
                .collect();

            FilteredProposals {
                bboxes,
                scores: None,
            }
        };

        for bbox in &filtered.bboxes {
            ensure!(
                bbox.iter().all(|coord| (0.0..=1.0).contains(&coord.raw())),
                "proposal coordinates of '{}' out of [0, 1] range: {:?}",
                img_key,
                bbox
            );
        }

        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(rows: Vec<Vec<f64>>) -> ProposalStore {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(r64).collect())
            .collect();
        ProposalStore::new([("vid001,00902".to_owned(), rows)].into_iter().collect())
    }

    #[test]
    fn score_threshold_filters_proposals() {
        let store = store(vec![
            vec![0.1, 0.2, 0.8, 0.9, 0.2],
            vec![0.2, 0.3, 0.7, 0.8, 0.95],
            vec![0.0, 0.0, 1.0, 1.0, 0.99],
        ]);
        let filtered = store.filter("vid001,00902", r64(0.9), 1000).unwrap();

        assert_eq!(filtered.bboxes.len(), 2);
        assert_eq!(filtered.scores, Some(vec![r64(0.95), r64(0.99)]));
    }

    #[test]
    fn best_proposal_survives_low_scores() {
        let store = store(vec![
            vec![0.1, 0.2, 0.8, 0.9, 0.1],
            vec![0.2, 0.3, 0.7, 0.8, 0.2],
        ]);
        let filtered = store.filter("vid001,00902", r64(0.9), 1000).unwrap();

        assert_eq!(filtered.bboxes.len(), 1);
        assert_eq!(filtered.scores, Some(vec![r64(0.2)]));
    }

    #[test]
    fn unscored_rows_are_truncated_only() {
        let store = store(vec![
            vec![0.1, 0.2, 0.8, 0.9],
            vec![0.2, 0.3, 0.7, 0.8],
            vec![0.0, 0.0, 1.0, 1.0],
        ]);
        let filtered = store.filter("vid001,00902", r64(0.9), 2).unwrap();

        assert_eq!(filtered.bboxes.len(), 2);
        assert_eq!(filtered.scores, None);
    }

    #[test]
    fn missing_key_fails() {
        let store = store(vec![vec![0.1, 0.2, 0.8, 0.9]]);
        let err = store.filter("vid999,00001", r64(0.9), 1000).unwrap_err();
        assert!(err.to_string().contains("not in proposals"));
    }

    #[test]
    fn out_of_range_coordinates_fail() {
        let store = store(vec![vec![1.2, 0.1, 0.5, 0.9]]);
        let err = store.filter("vid001,00902", r64(0.9), 1000).unwrap_err();
        assert!(err.to_string().contains("proposal coordinates"));
    }

    #[test]
    fn bad_row_width_fails() {
        let store = store(vec![vec![0.1, 0.2, 0.8]]);
        let err = store.filter("vid001,00902", r64(0.9), 1000).unwrap_err();
        assert!(err.to_string().contains("4 or 5 columns"));
    }
}
