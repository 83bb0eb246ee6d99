//! Load statistics and outcome reporting

/// How a load finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadOutcome {
    /// Flush and commit succeeded
    #[default]
    Committed,
    /// A duplicate key surfaced at flush time and the whole batch was rolled back
    Discarded,
}

/// Counters for a single load
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Data rows read, header excluded
    pub rows_read: usize,

    /// Rows accepted by the bulk-insert channel
    pub rows_appended: usize,

    /// Rows rejected by validation
    pub rows_invalid: usize,

    /// Rows dropped because their key already existed
    pub duplicates_ignored: usize,

    /// Rows the channel rejected for reasons other than duplicates
    pub append_failures: usize,

    pub outcome: LoadOutcome,

    /// One line per skipped row, `line N: reason`
    pub errors: Vec<String>,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows that ended up in storage
    pub fn rows_loaded(&self) -> usize {
        match self.outcome {
            LoadOutcome::Committed => self.rows_appended,
            LoadOutcome::Discarded => 0,
        }
    }

    /// Rows not loaded for any reason
    pub fn rows_skipped(&self) -> usize {
        self.rows_read - self.rows_loaded()
    }

    /// Percentage of data rows that were loaded
    pub fn success_rate(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            (self.rows_loaded() as f64 / self.rows_read as f64) * 100.0
        }
    }
}
