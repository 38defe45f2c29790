use super::*;
use crate::common::*;

/// The dataset that can be random accessed by the external loading
/// pipeline.
pub trait IndexedDataset
where
    Self: Debug + Send + Sync,
{
    /// Get number of records in the dataset.
    fn num_records(&self) -> usize;

    /// Get the nth enriched record in the dataset.
    fn nth(&self, index: usize) -> Result<DataItem>;
}
