use crate::common::*;

/// Inclusive frame-index extent of one video's extracted frames.
pub type ShotInfo = (i64, i64);

/// Frame-extent lookup built from the frame directory layout
/// `frame_root/{video_id}/{frame files}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShotInfoTable {
    table: HashMap<String, ShotInfo>,
}

impl ShotInfoTable {
    /// Resolve the frame extent of every given video by listing its frame
    /// directory.
    pub fn build<'a>(
        frame_root: impl AsRef<Path>,
        video_ids: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        let frame_root = frame_root.as_ref();

        let table: HashMap<String, ShotInfo> = video_ids
            .into_iter()
            .map(|video_id| -> Result<_> {
                let dir = frame_root.join(video_id);
                ensure!(
                    dir.is_dir(),
                    "missing frame directory '{}' for video '{}'",
                    dir.display(),
                    video_id
                );

                let mut files: Vec<String> = fs::read_dir(&dir)
                    .with_context(|| {
                        format!("failed to list frame directory '{}'", dir.display())
                    })?
                    .map(|entry| -> Result<_> {
                        Ok(entry?.file_name().to_string_lossy().into_owned())
                    })
                    .try_collect()?;
                // stray non-frame files are ignored
                files.retain(|name| frame_index(name).is_ok());
                files.sort();

                let (first, last) = match (files.first(), files.last()) {
                    (Some(first), Some(last)) => (first, last),
                    _ => bail!(
                        "frame directory '{}' for video '{}' has no frame files",
                        dir.display(),
                        video_id
                    ),
                };
                let start = frame_index(first)?;
                let end = frame_index(last)?;

                Ok((video_id.to_owned(), (start, end)))
            })
            .try_collect()?;

        Ok(Self { table })
    }

    pub fn get(&self, video_id: &str) -> Option<ShotInfo> {
        self.table.get(video_id).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Parse the frame index out of a frame filename, e.g. `img_00042.jpg`.
fn frame_index(filename: &str) -> Result<i64> {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| format_err!("invalid frame filename '{}'", filename))?;
    let digits = stem.rsplit('_').next().unwrap_or(stem);
    digits
        .parse()
        .with_context(|| format!("cannot parse frame index from filename '{}'", filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_test() {
        assert_eq!(frame_index("img_00042.jpg").unwrap(), 42);
        assert_eq!(frame_index("frame_7.png").unwrap(), 7);
        assert_eq!(frame_index("00010.jpg").unwrap(), 10);
        assert!(frame_index("thumbs.db").is_err());
    }
}
