use crate::common::*;

/// Per-video frame-rate lookup with a mandatory default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpsTable {
    mapping: HashMap<String, i64>,
    default: i64,
}

impl FpsTable {
    /// A table that resolves every video to the same constant.
    pub fn constant(fps: i64) -> Self {
        Self {
            mapping: HashMap::new(),
            default: fps,
        }
    }

    pub fn new(mapping: HashMap<String, i64>, default: i64) -> Self {
        Self { mapping, default }
    }

    /// Load a CSV table with `image_name` and `fps` columns. Fractional fps
    /// values are rounded to the nearest integer.
    pub fn open(fps_file: impl AsRef<Path>, default: i64) -> Result<Self> {
        let fps_file = fps_file.as_ref();

        #[derive(Debug, Deserialize)]
        struct Row {
            image_name: String,
            fps: R64,
        }

        let mapping: HashMap<String, i64> = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(fps_file)
            .with_context(|| format!("failed to open fps file '{}'", fps_file.display()))?
            .deserialize()
            .map(|row| -> Result<_> {
                let Row { image_name, fps } = row?;
                Ok((image_name, fps.raw().round() as i64))
            })
            .try_collect()?;

        Ok(Self { mapping, default })
    }

    /// Resolve the effective fps of a video. Absent keys fall back to the
    /// default and never fail.
    pub fn resolve(&self, video_id: &str) -> i64 {
        self.mapping
            .get(video_id)
            .copied()
            .unwrap_or(self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_falls_back_to_default() {
        let table = FpsTable::new([("vid001".to_owned(), 24)].into_iter().collect(), 30);
        assert_eq!(table.resolve("vid001"), 24);
        assert_eq!(table.resolve("never-seen"), 30);
        assert_eq!(FpsTable::constant(1).resolve("vid001"), 1);
    }
}
