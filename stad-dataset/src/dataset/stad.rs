use super::*;
use crate::{common::*, config::DatasetConfig};

/// The spatiotemporal-action detection dataset.
///
/// Loads per-actor-per-frame annotations, resolves frame extents and frame
/// rates per video, optionally duplicates actors holding rare classes, and
/// serves one enriched record per distinct `(video_id, timestamp)` frame.
/// Proposals are fetched and filtered lazily at access time.
///
/// The annotation file is a headerless CSV of
/// `video_id, timestamp, x1, y1, x2, y2, class_id, entity_id[, ...]` lines;
/// the proposal file is a JSON mapping from image key to an N×4 or N×5
/// array, e.g.
///
/// ```json
/// {
///     "0f39OWEqJ24,00902": [[0.011, 0.157, 0.655, 0.983, 0.998163]],
///     "0f39OWEqJ24,00912": [[0.054, 0.088, 0.910, 0.998, 0.068273],
///                           [0.016, 0.161, 0.519, 0.974, 0.984025]]
/// }
/// ```
#[derive(Debug)]
pub struct StadDataset {
    config: DatasetConfig,
    classes: Option<CustomClassList>,
    records: Vec<Arc<VideoRecord>>,
    per_sample_weights: Option<Vec<R64>>,
    proposals: Option<ProposalStore>,
}

impl StadDataset {
    /// Construct the full record list. Runs to completion or fails outright;
    /// no partial dataset is ever produced.
    pub fn load(config: DatasetConfig) -> Result<Self> {
        ensure!(
            config.person_det_score_thr >= 0.0 && config.person_det_score_thr <= 1.0,
            "person_det_score_thr must be in [0, 1], found {}",
            config.person_det_score_thr
        );

        let classes = match &config.custom_classes {
            Some(custom_classes) => {
                let label_file = config.label_file.as_ref().ok_or_else(|| {
                    format_err!("label_file is required when custom_classes is set")
                })?;
                let whitelist = load_labelmap_file(label_file)?;
                Some(CustomClassList::new(
                    custom_classes,
                    config.num_classes,
                    &whitelist,
                )?)
            }
            None => None,
        };

        let class_weights = config
            .class_weights
            .as_ref()
            .map(ClassWeightTable::from_config)
            .transpose()?;

        let fps_table = match &config.fps_file {
            Some(fps_file) => FpsTable::open(fps_file, config.fps)?,
            None => FpsTable::constant(config.fps),
        };

        let Annotations { groups, video_ids } = load_annotations(
            &config.ann_file,
            config.schema,
            classes.as_ref(),
            config.num_classes,
        )?;

        // every referenced video needs a frame directory, whitelisted away
        // or not
        let shot_info_table = if config.use_frames {
            Some(ShotInfoTable::build(
                &config.frame_root,
                video_ids.iter().map(String::as_str),
            )?)
        } else {
            None
        };

        let mut records = Vec::with_capacity(groups.len());
        let mut per_sample_weights = class_weights.as_ref().map(|_| vec![]);

        for (key, group) in &groups {
            let gt = parse_frame_records(group, config.num_classes, config.multilabel);
            let FrameRecord {
                ref video_id,
                timestamp,
                ..
            } = group[0];

            if let Some(weights) = &mut per_sample_weights {
                // aggregate weight of the pre-augmentation actor-label pairs
                weights.push(frame_weight(&gt, classes.as_ref(), class_weights.as_ref())?);
            }

            let gt = match (&class_weights, config.augment_labels) {
                (Some(class_weights), true) => {
                    duplicate_rare_actors(&gt, classes.as_ref(), class_weights)?
                }
                _ => gt,
            };

            let video_path = config.frame_root.join(video_id);
            let path = if config.use_frames {
                FramePath::FrameDir(video_path)
            } else {
                FramePath::Filename(video_path)
            };
            let shot_info = shot_info_table
                .as_ref()
                .and_then(|table| table.get(video_id));

            records.push(Arc::new(VideoRecord {
                path,
                video_id: video_id.clone(),
                timestamp,
                img_key: key.clone(),
                shot_info,
                fps: fps_table.resolve(video_id),
                ann: gt,
            }));
        }

        let proposals = config
            .proposal_file
            .as_ref()
            .map(ProposalStore::open)
            .transpose()?;

        info!(
            "loaded {} frame records from '{}'",
            records.len(),
            config.ann_file.display()
        );

        Ok(Self {
            config,
            classes,
            records,
            per_sample_weights,
            proposals,
        })
    }

    pub fn records(&self) -> &[Arc<VideoRecord>] {
        &self.records
    }

    pub fn classes(&self) -> Option<&CustomClassList> {
        self.classes.as_ref()
    }

    /// Aggregate per-frame sampler weights, present only when class weights
    /// are configured.
    pub fn per_sample_weights(&self) -> Option<&[R64]> {
        self.per_sample_weights.as_deref()
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }
}

impl IndexedDataset for StadDataset {
    fn num_records(&self) -> usize {
        self.records.len()
    }

    fn nth(&self, index: usize) -> Result<DataItem> {
        let record = self
            .records
            .get(index)
            .cloned()
            .ok_or_else(|| format_err!("invalid index {}", index))?;

        let (proposals, scores) = match &self.proposals {
            Some(store) => {
                let FilteredProposals { bboxes, scores } = store
                    .filter(
                        &record.img_key,
                        self.config.person_det_score_thr,
                        self.config.num_max_proposals,
                    )
                    .with_context(|| {
                        format!("failed to fetch proposals for '{}'", record.img_key)
                    })?;
                (Some(bboxes), scores)
            }
            None => (None, None),
        };

        Ok(DataItem {
            record,
            filename_tmpl: self.config.filename_tmpl.clone(),
            start_index: self.config.start_index,
            modality: self.config.modality,
            timestamp_start: self.config.timestamp_start,
            timestamp_end: self.config.timestamp_end,
            proposals,
            scores,
        })
    }
}
