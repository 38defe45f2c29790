//! Dataset and sampler configuration format.

use crate::{common::*, dataset::AnnotationSchema};

/// The top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }
}

/// Dataset options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the annotation CSV file.
    pub ann_file: PathBuf,
    /// Root directory holding one frame directory (or video file) per video.
    pub frame_root: PathBuf,
    /// Path to the label-map file, required when `custom_classes` is set.
    #[serde(default)]
    pub label_file: Option<PathBuf>,
    /// Path to the persisted proposal store.
    #[serde(default)]
    pub proposal_file: Option<PathBuf>,
    /// Column layout of the annotation file.
    #[serde(default)]
    pub schema: AnnotationSchema,
    /// Template for frame filenames inside a frame directory.
    #[serde(default = "default_filename_tmpl")]
    pub filename_tmpl: String,
    /// First frame index of extracted frames.
    #[serde(default = "default_start_index")]
    pub start_index: i64,
    #[serde(default)]
    pub modality: Modality,
    /// Proposals with detection score below this threshold are dropped,
    /// except that the best-scored proposal of a frame is always kept.
    #[serde(default = "default_score_thr")]
    pub person_det_score_thr: R64,
    /// Width of the one-hot label space, background class included.
    #[serde(default = "default_num_classes")]
    pub num_classes: usize,
    /// Optional subset of original class ids; must not contain the
    /// background id 0.
    #[serde(default)]
    pub custom_classes: Option<Vec<i64>>,
    #[serde(default = "default_num_max_proposals")]
    pub num_max_proposals: usize,
    #[serde(default = "default_timestamp_start")]
    pub timestamp_start: i64,
    #[serde(default = "default_timestamp_end")]
    pub timestamp_end: i64,
    /// If set, annotations reference extracted frame directories; otherwise
    /// they reference container video files and shot info is resolved at
    /// decode time.
    #[serde(default = "default_true")]
    pub use_frames: bool,
    /// Default frames-per-second value. Set to 1 to count timestamps by
    /// frame instead of by second.
    #[serde(default = "default_fps")]
    pub fps: i64,
    /// Optional CSV table of per-video fps overrides.
    #[serde(default)]
    pub fps_file: Option<PathBuf>,
    /// If set, actions of one actor within a frame merge into one
    /// multi-hot label.
    #[serde(default = "default_true")]
    pub multilabel: bool,
    /// Per-class duplication weights keyed by original class id.
    #[serde(default)]
    pub class_weights: Option<HashMap<String, R64>>,
    /// If set together with `class_weights`, duplicate actors holding rare
    /// classes.
    #[serde(default)]
    pub augment_labels: bool,
}

/// Modality of the decoded input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Modality {
    #[default]
    Rgb,
    Flow,
}

/// Index sampler options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    #[serde(default = "default_true")]
    pub shuffle: bool,
    /// Draw weighted samples with replacement.
    #[serde(default = "default_true")]
    pub replacement: bool,
    /// Pad the index sequence to an exact multiple of the world size.
    #[serde(default = "default_true")]
    pub round_up: bool,
    #[serde(default)]
    pub seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            shuffle: true,
            replacement: true,
            round_up: true,
            seed: 0,
        }
    }
}

fn default_filename_tmpl() -> String {
    "img_{:05}.jpg".into()
}

fn default_start_index() -> i64 {
    1
}

fn default_score_thr() -> R64 {
    r64(0.9)
}

fn default_num_classes() -> usize {
    81
}

fn default_num_max_proposals() -> usize {
    1000
}

fn default_timestamp_start() -> i64 {
    900
}

fn default_timestamp_end() -> i64 {
    1800
}

fn default_fps() -> i64 {
    30
}

fn default_true() -> bool {
    true
}
