//! Reorganize/rebuild fragmentation threshold pair.

use crate::constants::{
    DEFAULT_REBUILD_THRESHOLD, DEFAULT_REORGANIZE_THRESHOLD, REBUILD_THRESHOLD_RANGE,
    REORGANIZE_THRESHOLD_RANGE,
};

/// Fragmentation cutoffs selecting between `REORGANIZE` and `REBUILD`.
///
/// Always satisfies `0 <= reorganize < rebuild <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentationThresholds {
    reorganize: i32,
    rebuild: i32,
}

impl FragmentationThresholds {
    /// Fragmentation percent at which an index is reorganized.
    pub fn reorganize(&self) -> i32 {
        self.reorganize
    }

    /// Fragmentation percent at which an index is rebuilt.
    pub fn rebuild(&self) -> i32 {
        self.rebuild
    }

    /// Reconcile a candidate pair against the current one.
    ///
    /// Out-of-range candidates keep the current value. An inverted pair
    /// lifts `rebuild` above `reorganize`; an equal pair lowers
    /// `reorganize`, or raises `rebuild` when `reorganize` is already zero.
    #[must_use]
    pub fn reconcile(self, reorganize: i32, rebuild: i32) -> Self {
        let mut reorganize = if REORGANIZE_THRESHOLD_RANGE.contains(&reorganize) {
            reorganize
        } else {
            self.reorganize
        };
        let mut rebuild = if REBUILD_THRESHOLD_RANGE.contains(&rebuild) {
            rebuild
        } else {
            self.rebuild
        };

        if reorganize > rebuild {
            rebuild = reorganize + 1;
        }

        if reorganize == rebuild {
            if reorganize > 0 {
                reorganize -= 1;
            } else {
                rebuild += 1;
            }
        }

        Self {
            reorganize,
            rebuild,
        }
    }

    /// Reconcile with a new reorganize candidate, holding `rebuild` fixed.
    #[must_use]
    pub fn with_reorganize(self, reorganize: i32) -> Self {
        self.reconcile(reorganize, self.rebuild)
    }

    /// Reconcile with a new rebuild candidate, holding `reorganize` fixed.
    #[must_use]
    pub fn with_rebuild(self, rebuild: i32) -> Self {
        self.reconcile(self.reorganize, rebuild)
    }
}

impl Default for FragmentationThresholds {
    fn default() -> Self {
        Self {
            reorganize: DEFAULT_REORGANIZE_THRESHOLD,
            rebuild: DEFAULT_REBUILD_THRESHOLD,
        }
    }
}
