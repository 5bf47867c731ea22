//! Centralized bounds and defaults for index maintenance options.
//!
//! Every legal range and default value used by [`crate::options::Options`]
//! lives here, making them easy to find, understand, and modify.

use std::ops::RangeInclusive;

// =============================================================================
// Timeout Constants
// =============================================================================

/// Legal connection timeout in seconds.
pub const CONNECTION_TIMEOUT_RANGE: RangeInclusive<i32> = 15..=90;

/// Default connection timeout in seconds.
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: i32 = 15;

/// Legal command timeout in seconds. Zero means no timeout.
pub const COMMAND_TIMEOUT_RANGE: RangeInclusive<i32> = 0..=1800;

/// Default command timeout in seconds.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: i32 = 120;

/// Legal `MAX_DURATION` for `WAIT_AT_LOW_PRIORITY`, in minutes.
pub const MAX_DURATION_RANGE: RangeInclusive<i32> = 1..=10;

/// Default `MAX_DURATION` in minutes.
pub const DEFAULT_MAX_DURATION_MINUTES: i32 = 1;

// =============================================================================
// Fragmentation Threshold Constants
// =============================================================================

/// Candidates accepted for the reorganize threshold, in percent.
pub const REORGANIZE_THRESHOLD_RANGE: RangeInclusive<i32> = 0..=99;

/// Candidates accepted for the rebuild threshold, in percent.
pub const REBUILD_THRESHOLD_RANGE: RangeInclusive<i32> = 1..=100;

/// Default reorganize threshold in percent.
pub const DEFAULT_REORGANIZE_THRESHOLD: i32 = 15;

/// Default rebuild threshold in percent.
pub const DEFAULT_REBUILD_THRESHOLD: i32 = 30;

// =============================================================================
// Index Size Constants (KB)
// =============================================================================

/// Candidates accepted for the minimum index size.
pub const MIN_INDEX_SIZE_RANGE: RangeInclusive<i32> = 0..=255;

/// Upper bound for the pre-describe size. The lower bound is the current minimum.
pub const PRE_DESCRIBE_SIZE_MAX: i32 = 256;

/// Candidates accepted for the maximum index size.
pub const MAX_INDEX_SIZE_RANGE: RangeInclusive<i32> = 512..=131_072;

/// Default minimum index size.
pub const DEFAULT_MIN_INDEX_SIZE_KB: i32 = 6;

/// Default pre-describe size.
pub const DEFAULT_PRE_DESCRIBE_SIZE_KB: i32 = 256;

/// Default maximum index size.
pub const DEFAULT_MAX_INDEX_SIZE_KB: i32 = 8192;

// =============================================================================
// Rebuild Option Constants
// =============================================================================

/// Legal `MAXDOP` values. Zero lets the server decide.
pub const MAX_DOP_RANGE: RangeInclusive<i32> = 0..=64;

/// Default `MAXDOP`.
pub const DEFAULT_MAX_DOP: i32 = 0;

/// Legal `FILLFACTOR` values. Zero keeps the index's own setting.
pub const FILL_FACTOR_RANGE: RangeInclusive<i32> = 0..=100;

/// Default `FILLFACTOR`.
pub const DEFAULT_FILL_FACTOR: i32 = 0;

/// Legal statistics sample percentages.
pub const SAMPLE_STATS_PERCENT_RANGE: RangeInclusive<i32> = 1..=100;

/// Default statistics sample percentage (full scan).
pub const DEFAULT_SAMPLE_STATS_PERCENT: i32 = 100;

// =============================================================================
// Filter Token Constants
// =============================================================================

/// Maximum length for SQL Server identifiers (`sysname`).
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

// =============================================================================
// Environment Constants
// =============================================================================

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "IDXMGR_";

/// Environment variable naming a JSON options file to load at startup.
pub const ENV_OPTIONS_FILE: &str = "IDXMGR_OPTIONS_FILE";
