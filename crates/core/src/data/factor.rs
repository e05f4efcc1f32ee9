use indexmap::IndexMap;

/// Maps subject or rater labels to 0-based positions in a rating matrix.
///
/// Labels are discovered in order of first appearance, which is the order the
/// rows (subjects) or columns (raters) take in the assembled matrix.
#[derive(Debug, Clone, Default)]
pub struct LevelIndex {
    /// Label -> position, ordered by first appearance.
    levels: IndexMap<String, usize>,
    /// Position of every observation, in input order.
    codes: Vec<usize>,
}

impl LevelIndex {
    /// Build an index from one label per observation.
    ///
    /// # Examples
    /// ```
    /// use icc_core::data::LevelIndex;
    ///
    /// let raters = LevelIndex::new(&["ann", "bob", "ann", "cy"]);
    /// assert_eq!(raters.n_levels(), 3);
    /// assert_eq!(raters.codes(), &[0, 1, 0, 2]);
    /// ```
    pub fn new<S: AsRef<str>>(values: &[S]) -> Self {
        let mut levels = IndexMap::new();
        let mut codes = Vec::with_capacity(values.len());

        for val in values {
            let next_code = levels.len();
            let code = *levels.entry(val.as_ref().to_string()).or_insert(next_code);
            codes.push(code);
        }

        LevelIndex { levels, codes }
    }

    /// Number of distinct labels.
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    /// Position of each observation.
    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    /// Position of a label, if present.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.levels.get(label).copied()
    }

    /// Label at a position, or `None` if out of range.
    pub fn level_name(&self, position: usize) -> Option<&str> {
        self.levels
            .get_index(position)
            .map(|(name, _)| name.as_str())
    }

    /// Labels in position order.
    pub fn labels(&self) -> Vec<String> {
        self.levels.keys().cloned().collect()
    }

    /// Number of observations indexed.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
