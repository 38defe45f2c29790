use crate::{common::*, config::SamplerConfig};
use derivative::Derivative;
use rand::distributions::WeightedIndex;

/// Observer invoked with each epoch's full index sequence before sharding.
pub type IndexObserver = Arc<dyn Fn(u64, &[usize]) + Send + Sync>;

/// Weighted, distributed-shard-aware index sampler.
///
/// Every rank derives the same shuffled sequence from `(seed, epoch)` and
/// takes its own strided slice, so no cross-rank coordination is needed.
/// When per-sample weights are present, indices are drawn proportionally to
/// them instead of uniformly permuted, and a record may be drawn more than
/// once per epoch if replacement is enabled.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct WeightedSampler {
    num_samples: usize,
    weights: Option<Vec<R64>>,
    shuffle: bool,
    replacement: bool,
    round_up: bool,
    seed: u64,
    rank: usize,
    world_size: usize,
    #[derivative(Debug = "ignore")]
    observer: Option<IndexObserver>,
}

impl WeightedSampler {
    pub fn new(
        num_samples: usize,
        weights: Option<Vec<R64>>,
        config: &SamplerConfig,
        rank: usize,
        world_size: usize,
    ) -> Result<Self> {
        let SamplerConfig {
            shuffle,
            replacement,
            round_up,
            seed,
        } = *config;

        ensure!(world_size > 0, "world_size must be positive");
        ensure!(
            rank < world_size,
            "rank {} out of range for world_size {}",
            rank,
            world_size
        );
        if let Some(weights) = &weights {
            ensure!(
                weights.len() == num_samples,
                "got {} per-sample weights for {} samples",
                weights.len(),
                num_samples
            );
            ensure!(
                weights.iter().all(|&weight| weight >= 0.0),
                "per-sample weights must be non-negative"
            );
        }

        Ok(Self {
            num_samples,
            weights,
            shuffle,
            replacement,
            round_up,
            seed,
            rank,
            world_size,
            observer: None,
        })
    }

    /// Attach an observer receiving each epoch's pre-shard index sequence.
    pub fn with_observer(mut self, observer: IndexObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The padded sequence length shared by all ranks.
    pub fn total_size(&self) -> usize {
        if self.round_up {
            (self.num_samples + self.world_size - 1) / self.world_size * self.world_size
        } else {
            self.num_samples
        }
    }

    /// Generate this rank's index sequence for one epoch.
    pub fn indices(&self, epoch: u64) -> Result<Vec<usize>> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(epoch));

        let mut indices: Vec<usize> = if self.shuffle {
            match &self.weights {
                None => {
                    let mut indices: Vec<usize> = (0..self.num_samples).collect();
                    indices.shuffle(&mut rng);
                    indices
                }
                Some(weights) => {
                    if self.replacement {
                        let dist = WeightedIndex::new(weights.iter().map(|weight| weight.raw()))?;
                        (0..self.num_samples).map(|_| dist.sample(&mut rng)).collect()
                    } else {
                        rand::seq::index::sample_weighted(
                            &mut rng,
                            self.num_samples,
                            |index| weights[index].raw(),
                            self.num_samples,
                        )?
                        .into_vec()
                    }
                }
            }
        } else {
            (0..self.num_samples).collect()
        };

        if let Some(observer) = &self.observer {
            observer(epoch, &indices);
        }
        debug!(
            "epoch {}: drew {} indices for rank {}/{}",
            epoch,
            indices.len(),
            self.rank,
            self.world_size
        );

        // pad cyclically so every rank receives the same count
        let total_size = self.total_size();
        if indices.len() < total_size {
            indices = indices.iter().copied().cycle().take(total_size).collect();
        }

        let sharded = indices
            .get(self.rank..total_size)
            .unwrap_or(&[])
            .iter()
            .copied()
            .step_by(self.world_size)
            .collect();

        Ok(sharded)
    }
}
