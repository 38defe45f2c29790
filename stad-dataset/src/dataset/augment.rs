use super::*;
use crate::common::*;

/// Per-class duplication weights keyed by original class id.
///
/// A weight of 1.0 means no duplication; ids absent from the table resolve
/// to 1.0.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassWeightTable {
    weights: HashMap<i64, R64>,
}

impl ClassWeightTable {
    pub fn new(weights: impl IntoIterator<Item = (i64, R64)>) -> Result<Self> {
        let weights: HashMap<i64, R64> = weights.into_iter().collect();
        for (&class_id, &weight) in &weights {
            ensure!(
                weight > 0.0,
                "class weight for id {} must be positive, found {}",
                class_id,
                weight
            );
        }
        Ok(Self { weights })
    }

    /// Build the table from configuration, where class ids arrive as string
    /// keys.
    pub fn from_config(weights: &HashMap<String, R64>) -> Result<Self> {
        let weights: Vec<(i64, R64)> = weights
            .iter()
            .map(|(key, &weight)| -> Result<_> {
                let class_id: i64 = key
                    .parse()
                    .with_context(|| format!("invalid class id '{}' in class weights", key))?;
                Ok((class_id, weight))
            })
            .try_collect()?;
        Self::new(weights)
    }

    pub fn get(&self, class_id: i64) -> R64 {
        self.weights.get(&class_id).copied().unwrap_or_else(|| r64(1.0))
    }
}

/// Duplicate actors holding rare classes.
///
/// Each actor's triple is emitted once, followed by `factor - 1` copies
/// where `factor = max(1, floor(max of its active class weights))`. The
/// decision is per actor, and relative order is preserved.
pub fn duplicate_rare_actors(
    gt: &FrameGroundTruth,
    classes: Option<&CustomClassList>,
    weights: &ClassWeightTable,
) -> Result<FrameGroundTruth> {
    let mut augmented = FrameGroundTruth::default();

    for (bbox, label, &entity_id) in izip!(&gt.bboxes, &gt.labels, &gt.entity_ids) {
        let max_weight = active_classes(label)
            .map(|index| -> Result<_> { Ok(weights.get(original_id(classes, index)?)) })
            .try_fold(r64(1.0), |max, weight| -> Result<_> {
                Ok(cmp::max(max, weight?))
            })?;
        let factor = cmp::max(max_weight.raw().floor() as usize, 1);

        for _ in 0..factor {
            augmented.bboxes.push(*bbox);
            augmented.labels.push(label.clone());
            augmented.entity_ids.push(entity_id);
        }
    }

    Ok(augmented)
}

/// Sum of class weights over all actor-label pairs of a frame, or the label
/// occurrence count when `weights` is `None`.
pub fn frame_weight(
    gt: &FrameGroundTruth,
    classes: Option<&CustomClassList>,
    weights: Option<&ClassWeightTable>,
) -> Result<R64> {
    gt.labels
        .iter()
        .flat_map(|label| active_classes(label))
        .map(|index| -> Result<_> {
            match weights {
                Some(weights) => Ok(weights.get(original_id(classes, index)?)),
                None => Ok(r64(1.0)),
            }
        })
        .try_fold(r64(0.0), |sum, weight| -> Result<_> { Ok(sum + weight?) })
}

/// Iterate the active compact indices of a multi-hot label vector.
fn active_classes(label: &[f32]) -> impl Iterator<Item = usize> + '_ {
    label
        .iter()
        .enumerate()
        .filter(|(_, &active)| active != 0.0)
        .map(|(index, _)| index)
}

fn original_id(classes: Option<&CustomClassList>, index: usize) -> Result<i64> {
    match classes {
        Some(classes) => classes
            .original_id(index)
            .ok_or_else(|| format_err!("compact label index {} out of range", index)),
        None => Ok(index as i64),
    }
}
