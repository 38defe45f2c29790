use crate::{common::*, config::Modality};

/// Build the unique frame key `"{video_id},{timestamp:05}"`.
pub fn img_key(video_id: &str, timestamp: i64) -> String {
    format!("{},{:05}", video_id, timestamp)
}

/// One actor observation parsed from a raw annotation line.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub video_id: String,
    /// Counted by second or by frame, depending on the fps granularity.
    pub timestamp: i64,
    /// Box in dataset-native coordinates.
    pub entity_box: [R64; 4],
    /// Compact label index.
    pub label: usize,
    pub entity_id: i64,
}

/// Ground truth of one frame.
///
/// The three arrays are parallel, one entry per actor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameGroundTruth {
    pub bboxes: Vec<[R64; 4]>,
    /// Multi-hot label vectors of width `num_classes`.
    pub labels: Vec<Vec<f32>>,
    pub entity_ids: Vec<i64>,
}

impl FrameGroundTruth {
    pub fn len(&self) -> usize {
        self.bboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bboxes.is_empty()
    }
}

/// Location of one frame's pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramePath {
    /// Directory of extracted frame files.
    FrameDir(PathBuf),
    /// Container video file, decoded externally.
    Filename(PathBuf),
}

/// The record of one frame, without proposals.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRecord {
    pub path: FramePath,
    pub video_id: String,
    pub timestamp: i64,
    pub img_key: String,
    /// Inclusive frame-index extent, or `None` when resolved at decode time.
    pub shot_info: Option<(i64, i64)>,
    pub fps: i64,
    pub ann: FrameGroundTruth,
}

/// The enriched record served per index, with proposals attached.
#[derive(Debug, Clone)]
pub struct DataItem {
    pub record: Arc<VideoRecord>,
    pub filename_tmpl: String,
    pub start_index: i64,
    pub modality: Modality,
    pub timestamp_start: i64,
    pub timestamp_end: i64,
    /// Filtered proposal boxes in normalized coordinates.
    pub proposals: Option<Vec<[R64; 4]>>,
    /// Detection scores parallel to `proposals`.
    pub scores: Option<Vec<R64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn img_key_test() {
        assert_eq!(img_key("vid001", 902), "vid001,00902");
        assert_eq!(img_key("vid001", 12345), "vid001,12345");
        assert_eq!(img_key("-5KQ66BBWC4", 3), "-5KQ66BBWC4,00003");
    }
}
