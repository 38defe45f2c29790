pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use approx::assert_abs_diff_eq;
pub use indexmap::{IndexMap, IndexSet};
pub use itertools::{izip, Itertools as _};
pub use log::{debug, info, warn};
pub use noisy_float::prelude::*;
pub use rand::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{
    cmp,
    collections::HashMap,
    fmt::Debug,
    fs,
    io::BufReader,
    iter,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};
