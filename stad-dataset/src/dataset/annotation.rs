use super::*;
use crate::common::*;

/// Known column layouts of the annotation file.
///
/// Both layouts start with
/// `video_id, timestamp, x1, y1, x2, y2, class_id, entity_id`; the extended
/// layout appends `obj_hash, created_by, created_at`, which are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationSchema {
    #[default]
    Short,
    Extended,
}

impl AnnotationSchema {
    pub fn num_columns(&self) -> usize {
        match self {
            Self::Short => 8,
            Self::Extended => 11,
        }
    }
}

/// The parsed annotation file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Annotations {
    /// Per-frame record groups in first-seen key order; records within a
    /// group keep their arrival order.
    pub groups: IndexMap<String, Vec<FrameRecord>>,
    /// Distinct video ids of every line, including lines skipped by the
    /// class list.
    pub video_ids: IndexSet<String>,
}

/// Parse the annotation file and group its rows by `(video_id, timestamp)`.
///
/// Rows whose class id is not in the configured class list are skipped
/// silently, but their video ids are still collected.
pub fn load_annotations(
    ann_file: impl AsRef<Path>,
    schema: AnnotationSchema,
    classes: Option<&CustomClassList>,
    num_classes: usize,
) -> Result<Annotations> {
    let ann_file = ann_file.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(ann_file)
        .with_context(|| format!("failed to open annotation file '{}'", ann_file.display()))?;

    let mut groups: IndexMap<String, Vec<FrameRecord>> = IndexMap::new();
    let mut video_ids: IndexSet<String> = IndexSet::new();
    let mut num_skipped = 0;

    for (index, row) in reader.records().enumerate() {
        let line = index + 1;
        let row = row.with_context(|| {
            format!("malformed line {} in '{}'", line, ann_file.display())
        })?;
        ensure!(
            row.len() == schema.num_columns(),
            "line {} in '{}' has {} columns, expected {} ({:?} schema)",
            line,
            ann_file.display(),
            row.len(),
            schema.num_columns(),
            schema
        );

        let video_id: String = field(&row, 0, line)?;
        video_ids.insert(video_id.clone());

        let class_id: i64 = field(&row, 6, line)?;
        let label = match classes {
            Some(classes) => match classes.compact_index(class_id) {
                Some(label) => label,
                None => {
                    num_skipped += 1;
                    continue;
                }
            },
            None => usize::try_from(class_id)
                .ok()
                .filter(|&label| label < num_classes)
                .ok_or_else(|| {
                    format_err!(
                        "line {}: class id {} out of range for {} classes",
                        line,
                        class_id,
                        num_classes
                    )
                })?,
        };

        let timestamp: i64 = field(&row, 1, line)?;
        let x1: f64 = field(&row, 2, line)?;
        let y1: f64 = field(&row, 3, line)?;
        let x2: f64 = field(&row, 4, line)?;
        let y2: f64 = field(&row, 5, line)?;
        let entity_id: i64 = field(&row, 7, line)?;

        let key = img_key(&video_id, timestamp);
        groups.entry(key).or_default().push(FrameRecord {
            video_id,
            timestamp,
            entity_box: [r64(x1), r64(y1), r64(x2), r64(y2)],
            label,
            entity_id,
        });
    }

    if num_skipped > 0 {
        debug!(
            "skipped {} annotation lines outside the class list in '{}'",
            num_skipped,
            ann_file.display()
        );
    }

    Ok(Annotations { groups, video_ids })
}

/// Merge one frame's records into parallel ground-truth arrays.
///
/// In multilabel mode, records sharing an identical entity box describe one
/// actor and merge into a single multi-hot label vector; otherwise every
/// record keeps its own single-hot vector.
pub fn parse_frame_records(
    records: &[FrameRecord],
    num_classes: usize,
    multilabel: bool,
) -> FrameGroundTruth {
    let mut gt = FrameGroundTruth::default();
    let mut remaining: Vec<&FrameRecord> = records.iter().collect();

    while let Some(head) = remaining.first() {
        let head_box = head.entity_box;
        let (selected, rest): (Vec<_>, Vec<_>) = remaining
            .into_iter()
            .partition(|record| record.entity_box == head_box);
        remaining = rest;

        if multilabel {
            let mut label = vec![0.0; num_classes];
            for record in &selected {
                label[record.label] = 1.0;
            }
            gt.bboxes.push(head_box);
            gt.labels.push(label);
            gt.entity_ids.push(selected[0].entity_id);
        } else {
            for record in selected {
                let mut label = vec![0.0; num_classes];
                label[record.label] = 1.0;
                gt.bboxes.push(record.entity_box);
                gt.labels.push(label);
                gt.entity_ids.push(record.entity_id);
            }
        }
    }

    gt
}

fn field<T>(row: &csv::StringRecord, column: usize, line: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text = row
        .get(column)
        .ok_or_else(|| format_err!("line {}: missing column {}", line, column))?;
    text.trim()
        .parse()
        .with_context(|| format!("line {}: invalid value '{}' in column {}", line, text, column))
}
