//! Annotation ingestion and record assembly toolkit.

mod annotation;
mod augment;
mod dataset_;
mod fps;
mod labelmap;
mod proposal;
mod record;
mod shot_info;
mod stad;

pub use annotation::*;
pub use augment::*;
pub use dataset_::*;
pub use fps::*;
pub use labelmap::*;
pub use proposal::*;
pub use record::*;
pub use shot_info::*;
pub use stad::*;
