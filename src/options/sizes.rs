//! Minimum / pre-describe / maximum index size bands.

use crate::constants::{
    DEFAULT_MAX_INDEX_SIZE_KB, DEFAULT_MIN_INDEX_SIZE_KB, DEFAULT_PRE_DESCRIBE_SIZE_KB,
    MAX_INDEX_SIZE_RANGE, MIN_INDEX_SIZE_RANGE, PRE_DESCRIBE_SIZE_MAX,
};

/// Index size cutoffs in KB.
///
/// Indexes below `min` are skipped, indexes below `pre_describe` only get a
/// lightweight description, and indexes up to `max` get full analysis.
///
/// Always satisfies `0 <= min < pre_describe`, `512 <= max <= 131072` and
/// `min != max`. The ordering of `pre_describe` against `max` is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSizeBands {
    min: i32,
    pre_describe: i32,
    max: i32,
}

impl IndexSizeBands {
    /// Indexes smaller than this are skipped.
    pub fn min(&self) -> i32 {
        self.min
    }

    /// Indexes smaller than this are only pre-described.
    pub fn pre_describe(&self) -> i32 {
        self.pre_describe
    }

    /// Upper size limit for full analysis.
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Reconcile a candidate triple against the current one.
    ///
    /// Each candidate outside its range keeps the current value. The
    /// pre-describe range starts at the already reconciled `min`, and a
    /// pre-describe size that does not exceed `min` is lifted to `min + 1`.
    #[must_use]
    pub fn reconcile(self, min: i32, pre_describe: i32, max: i32) -> Self {
        let mut min = if MIN_INDEX_SIZE_RANGE.contains(&min) {
            min
        } else {
            self.min
        };
        let mut pre_describe = if (min..=PRE_DESCRIBE_SIZE_MAX).contains(&pre_describe) {
            pre_describe
        } else {
            self.pre_describe
        };
        let mut max = if MAX_INDEX_SIZE_RANGE.contains(&max) {
            max
        } else {
            self.max
        };

        if min >= pre_describe {
            pre_describe = min + 1;
        }

        // min tops out at 255 and max starts at 512, so this only fires on
        // a hand-built triple.
        if min == max {
            if min > 0 {
                min -= 1;
            } else {
                max += 1;
            }
        }

        Self {
            min,
            pre_describe,
            max,
        }
    }

    /// Reconcile with a new minimum, holding the other cutoffs fixed.
    #[must_use]
    pub fn with_min(self, min: i32) -> Self {
        self.reconcile(min, self.pre_describe, self.max)
    }

    /// Reconcile with a new pre-describe size, holding the other cutoffs fixed.
    #[must_use]
    pub fn with_pre_describe(self, pre_describe: i32) -> Self {
        self.reconcile(self.min, pre_describe, self.max)
    }

    /// Reconcile with a new maximum, holding the other cutoffs fixed.
    #[must_use]
    pub fn with_max(self, max: i32) -> Self {
        self.reconcile(self.min, self.pre_describe, max)
    }
}

impl Default for IndexSizeBands {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_INDEX_SIZE_KB,
            pre_describe: DEFAULT_PRE_DESCRIBE_SIZE_KB,
            max: DEFAULT_MAX_INDEX_SIZE_KB,
        }
    }
}
