use crate::common::*;

/// The ordered class-id table of the dataset.
///
/// Position 0 always holds the reserved background id 0, followed by the
/// whitelisted original class ids. The position of an id is its compact
/// label index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomClassList {
    classes: IndexSet<i64>,
}

impl CustomClassList {
    pub fn new(
        custom_classes: &[i64],
        num_classes: usize,
        whitelist: &IndexSet<i64>,
    ) -> Result<Self> {
        ensure!(
            num_classes == custom_classes.len() + 1,
            "custom classes count {} does not match num_classes {}",
            custom_classes.len(),
            num_classes
        );
        ensure!(
            !custom_classes.contains(&0),
            "custom classes must not include the reserved background id 0"
        );

        let classes: IndexSet<i64> = iter::once(0)
            .chain(custom_classes.iter().copied())
            .collect();
        ensure!(
            classes.len() == custom_classes.len() + 1,
            "custom classes contain duplicated ids"
        );

        let missing: Vec<_> = custom_classes
            .iter()
            .filter(|id| !whitelist.contains(*id))
            .collect();
        ensure!(
            missing.is_empty(),
            "custom classes {:?} are not in the label map whitelist",
            missing
        );

        Ok(Self { classes })
    }

    /// Translate an original class id to its compact label index.
    pub fn compact_index(&self, class_id: i64) -> Option<usize> {
        self.classes.get_index_of(&class_id)
    }

    /// Translate a compact label index back to its original class id.
    pub fn original_id(&self, index: usize) -> Option<i64> {
        self.classes.get_index(index).copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Load the whitelist of original class ids from a label-map file, one id
/// per line.
pub fn load_labelmap_file(path: impl AsRef<Path>) -> Result<IndexSet<i64>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to open label map file '{}'", path.display()))?;
    let ids: Vec<i64> = content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            line.parse()
                .with_context(|| format!("invalid class id '{}' in '{}'", line, path.display()))
        })
        .try_collect()?;
    let whitelist: IndexSet<i64> = ids.iter().copied().collect();
    ensure!(
        ids.len() == whitelist.len(),
        "duplicated class ids found in '{}'",
        path.display()
    );
    ensure!(
        !whitelist.is_empty(),
        "no class ids found in '{}'",
        path.display()
    );
    Ok(whitelist)
}
