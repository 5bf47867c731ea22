//! Self-validating index maintenance options.
//!
//! Setters never fail. A candidate outside its legal range (or not among the
//! declared literals) is ignored and the previous value is kept. The two
//! coupled groups, fragmentation thresholds and index size bands, are
//! reconciled as a whole whenever one member changes. Callers that need to
//! know whether a candidate was accepted compare the getter afterwards.

mod modes;
mod sizes;
mod thresholds;

pub use modes::{AbortAfterWait, DataCompression, UnknownMode};
pub use sizes::IndexSizeBands;
pub use thresholds::FragmentationThresholds;

use crate::constants::{
    COMMAND_TIMEOUT_RANGE, CONNECTION_TIMEOUT_RANGE, DEFAULT_COMMAND_TIMEOUT_SECS,
    DEFAULT_CONNECTION_TIMEOUT_SECS, DEFAULT_FILL_FACTOR, DEFAULT_MAX_DOP,
    DEFAULT_MAX_DURATION_MINUTES, DEFAULT_SAMPLE_STATS_PERCENT, FILL_FACTOR_RANGE,
    MAX_DOP_RANGE, MAX_DURATION_RANGE, SAMPLE_STATS_PERCENT_RANGE,
};
use crate::security::sanitize_tokens;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::debug;

/// Tunable parameters for index maintenance.
///
/// Every value held by this type is legal at all times; see the module docs
/// for the setter contract. Deserialization goes through the same setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "crate::config::OptionsDocument",
    into = "crate::config::OptionsDocument"
)]
pub struct Options {
    connection_timeout: i32,
    command_timeout: i32,
    thresholds: FragmentationThresholds,
    max_dop: i32,
    fill_factor: i32,
    sample_stats_percent: i32,
    sizes: IndexSizeBands,
    max_duration: i32,
    data_compression: DataCompression,
    abort_after_wait: AbortAfterWait,
    include_schemas: Vec<String>,
    exclude_schemas: Vec<String>,
    include_objects: Vec<String>,
    exclude_objects: Vec<String>,

    /// Rebuild with `ONLINE = ON`
    pub online: bool,

    /// Rebuild with `SORT_IN_TEMPDB = ON`
    pub sort_in_temp_db: bool,

    /// Reorganize with `LOB_COMPACTION = ON`
    pub lob_compaction: bool,

    /// Use `WAIT_AT_LOW_PRIORITY` for online rebuilds
    pub wait_at_low_priority: bool,

    /// Scan heaps
    pub scan_heap: bool,

    /// Scan clustered rowstore indexes
    pub scan_clustered_index: bool,

    /// Scan nonclustered rowstore indexes
    pub scan_non_clustered_index: bool,

    /// Scan clustered columnstore indexes
    pub scan_clustered_columnstore: bool,

    /// Scan nonclustered columnstore indexes
    pub scan_non_clustered_columnstore: bool,

    /// Report missing index suggestions
    pub scan_missing_index: bool,

    /// Continue past objects the login cannot alter
    pub ignore_permissions: bool,

    /// Skip read-only filegroups
    pub ignore_read_only_fl: bool,
}

/// Keep `candidate` if it lies in `range`, otherwise `current`.
fn accept(field: &str, range: RangeInclusive<i32>, candidate: i32, current: i32) -> i32 {
    if range.contains(&candidate) {
        candidate
    } else {
        debug!(
            field,
            candidate,
            kept = current,
            "Ignoring out-of-range value"
        );
        current
    }
}

impl Options {
    /// Create options with the documented defaults.
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Timeouts
    // -------------------------------------------------------------------------

    /// Connection timeout in seconds, within `[15, 90]`.
    pub fn connection_timeout(&self) -> i32 {
        self.connection_timeout
    }

    pub fn set_connection_timeout(&mut self, seconds: i32) {
        self.connection_timeout = accept(
            "connection_timeout",
            CONNECTION_TIMEOUT_RANGE,
            seconds,
            self.connection_timeout,
        );
    }

    /// Command timeout in seconds, within `[0, 1800]`.
    pub fn command_timeout(&self) -> i32 {
        self.command_timeout
    }

    pub fn set_command_timeout(&mut self, seconds: i32) {
        self.command_timeout = accept(
            "command_timeout",
            COMMAND_TIMEOUT_RANGE,
            seconds,
            self.command_timeout,
        );
    }

    /// `MAX_DURATION` for low priority waits in minutes, within `[1, 10]`.
    pub fn max_duration(&self) -> i32 {
        self.max_duration
    }

    pub fn set_max_duration(&mut self, minutes: i32) {
        self.max_duration = accept("max_duration", MAX_DURATION_RANGE, minutes, self.max_duration);
    }

    // -------------------------------------------------------------------------
    // Fragmentation thresholds
    // -------------------------------------------------------------------------

    /// Both fragmentation thresholds.
    pub fn thresholds(&self) -> FragmentationThresholds {
        self.thresholds
    }

    /// Fragmentation percent at which an index is reorganized.
    pub fn reorganize_threshold(&self) -> i32 {
        self.thresholds.reorganize()
    }

    /// Fragmentation percent at which an index is rebuilt.
    pub fn rebuild_threshold(&self) -> i32 {
        self.thresholds.rebuild()
    }

    /// Set the reorganize threshold. May move the rebuild threshold.
    pub fn set_reorganize_threshold(&mut self, percent: i32) {
        self.set_thresholds(percent, self.thresholds.rebuild());
    }

    /// Set the rebuild threshold. May move the reorganize threshold.
    pub fn set_rebuild_threshold(&mut self, percent: i32) {
        self.set_thresholds(self.thresholds.reorganize(), percent);
    }

    /// Reconcile both thresholds in one step.
    pub fn set_thresholds(&mut self, reorganize: i32, rebuild: i32) {
        let reconciled = self.thresholds.reconcile(reorganize, rebuild);
        if (reconciled.reorganize(), reconciled.rebuild()) != (reorganize, rebuild) {
            debug!(
                reorganize,
                rebuild,
                stored_reorganize = reconciled.reorganize(),
                stored_rebuild = reconciled.rebuild(),
                "Reconciled fragmentation thresholds"
            );
        }
        self.thresholds = reconciled;
    }

    // -------------------------------------------------------------------------
    // Index size bands
    // -------------------------------------------------------------------------

    /// All three index size cutoffs.
    pub fn size_bands(&self) -> IndexSizeBands {
        self.sizes
    }

    /// Indexes smaller than this many KB are skipped.
    pub fn min_index_size(&self) -> i32 {
        self.sizes.min()
    }

    /// Indexes smaller than this many KB are only pre-described.
    pub fn pre_describe_size(&self) -> i32 {
        self.sizes.pre_describe()
    }

    /// Upper size limit in KB for full analysis.
    pub fn max_index_size(&self) -> i32 {
        self.sizes.max()
    }

    pub fn set_min_index_size(&mut self, kb: i32) {
        self.set_size_bands(kb, self.sizes.pre_describe(), self.sizes.max());
    }

    pub fn set_pre_describe_size(&mut self, kb: i32) {
        self.set_size_bands(self.sizes.min(), kb, self.sizes.max());
    }

    pub fn set_max_index_size(&mut self, kb: i32) {
        self.set_size_bands(self.sizes.min(), self.sizes.pre_describe(), kb);
    }

    /// Reconcile all three size cutoffs in one step.
    pub fn set_size_bands(&mut self, min: i32, pre_describe: i32, max: i32) {
        let reconciled = self.sizes.reconcile(min, pre_describe, max);
        if (reconciled.min(), reconciled.pre_describe(), reconciled.max())
            != (min, pre_describe, max)
        {
            debug!(
                min,
                pre_describe,
                max,
                stored_min = reconciled.min(),
                stored_pre_describe = reconciled.pre_describe(),
                stored_max = reconciled.max(),
                "Reconciled index size bands"
            );
        }
        self.sizes = reconciled;
    }

    // -------------------------------------------------------------------------
    // Rebuild options
    // -------------------------------------------------------------------------

    /// `MAXDOP`, within `[0, 64]`.
    pub fn max_dop(&self) -> i32 {
        self.max_dop
    }

    pub fn set_max_dop(&mut self, max_dop: i32) {
        self.max_dop = accept("max_dop", MAX_DOP_RANGE, max_dop, self.max_dop);
    }

    /// `FILLFACTOR`, within `[0, 100]`.
    pub fn fill_factor(&self) -> i32 {
        self.fill_factor
    }

    pub fn set_fill_factor(&mut self, percent: i32) {
        self.fill_factor = accept("fill_factor", FILL_FACTOR_RANGE, percent, self.fill_factor);
    }

    /// Statistics `SAMPLE ... PERCENT`, within `[1, 100]`.
    pub fn sample_stats_percent(&self) -> i32 {
        self.sample_stats_percent
    }

    pub fn set_sample_stats_percent(&mut self, percent: i32) {
        self.sample_stats_percent = accept(
            "sample_stats_percent",
            SAMPLE_STATS_PERCENT_RANGE,
            percent,
            self.sample_stats_percent,
        );
    }

    pub fn data_compression(&self) -> DataCompression {
        self.data_compression
    }

    /// Set the compression from its T-SQL literal. Unknown literals are ignored.
    pub fn set_data_compression(&mut self, literal: &str) {
        match literal.parse::<DataCompression>() {
            Ok(mode) => self.data_compression = mode,
            Err(_) => debug!(
                field = "data_compression",
                candidate = literal,
                kept = %self.data_compression,
                "Ignoring unknown literal"
            ),
        }
    }

    pub fn set_data_compression_mode(&mut self, mode: DataCompression) {
        self.data_compression = mode;
    }

    pub fn abort_after_wait(&self) -> AbortAfterWait {
        self.abort_after_wait
    }

    /// Set the abort action from its T-SQL literal. Unknown literals are ignored.
    pub fn set_abort_after_wait(&mut self, literal: &str) {
        match literal.parse::<AbortAfterWait>() {
            Ok(mode) => self.abort_after_wait = mode,
            Err(_) => debug!(
                field = "abort_after_wait",
                candidate = literal,
                kept = %self.abort_after_wait,
                "Ignoring unknown literal"
            ),
        }
    }

    pub fn set_abort_after_wait_mode(&mut self, mode: AbortAfterWait) {
        self.abort_after_wait = mode;
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    pub fn include_schemas(&self) -> &[String] {
        &self.include_schemas
    }

    /// Replace the schema include filter. Invalid tokens are dropped.
    pub fn set_include_schemas<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.include_schemas = sanitize_tokens(tokens);
    }

    pub fn exclude_schemas(&self) -> &[String] {
        &self.exclude_schemas
    }

    /// Replace the schema exclude filter. Invalid tokens are dropped.
    pub fn set_exclude_schemas<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_schemas = sanitize_tokens(tokens);
    }

    pub fn include_objects(&self) -> &[String] {
        &self.include_objects
    }

    /// Replace the object include filter. Invalid tokens are dropped.
    pub fn set_include_objects<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.include_objects = sanitize_tokens(tokens);
    }

    pub fn exclude_objects(&self) -> &[String] {
        &self.exclude_objects
    }

    /// Replace the object exclude filter. Invalid tokens are dropped.
    pub fn set_exclude_objects<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_objects = sanitize_tokens(tokens);
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT_SECS,
            command_timeout: DEFAULT_COMMAND_TIMEOUT_SECS,
            thresholds: FragmentationThresholds::default(),
            max_dop: DEFAULT_MAX_DOP,
            fill_factor: DEFAULT_FILL_FACTOR,
            sample_stats_percent: DEFAULT_SAMPLE_STATS_PERCENT,
            sizes: IndexSizeBands::default(),
            max_duration: DEFAULT_MAX_DURATION_MINUTES,
            data_compression: DataCompression::default(),
            abort_after_wait: AbortAfterWait::default(),
            include_schemas: Vec::new(),
            exclude_schemas: Vec::new(),
            include_objects: Vec::new(),
            exclude_objects: Vec::new(),
            online: false,
            sort_in_temp_db: true,
            lob_compaction: true,
            wait_at_low_priority: false,
            scan_heap: true,
            scan_clustered_index: true,
            scan_non_clustered_index: true,
            scan_clustered_columnstore: true,
            scan_non_clustered_columnstore: true,
            scan_missing_index: false,
            ignore_permissions: true,
            ignore_read_only_fl: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let o = Options::default();
        assert_eq!(o.connection_timeout(), 15);
        assert_eq!(o.command_timeout(), 120);
        assert_eq!((o.reorganize_threshold(), o.rebuild_threshold()), (15, 30));
        assert_eq!(o.max_dop(), 0);
        assert_eq!(o.fill_factor(), 0);
        assert_eq!(o.sample_stats_percent(), 100);
        assert_eq!(
            (o.min_index_size(), o.pre_describe_size(), o.max_index_size()),
            (6, 256, 8192)
        );
        assert_eq!(o.max_duration(), 1);
        assert_eq!(o.data_compression(), DataCompression::Default);
        assert_eq!(o.abort_after_wait(), AbortAfterWait::None);
        assert!(o.include_schemas().is_empty());
        assert!(o.exclude_objects().is_empty());
    }

    #[test]
    fn test_flag_defaults() {
        let o = Options::default();
        assert!(!o.online);
        assert!(o.sort_in_temp_db);
        assert!(o.lob_compaction);
        assert!(!o.wait_at_low_priority);
        assert!(o.scan_heap);
        assert!(o.scan_clustered_index);
        assert!(o.scan_non_clustered_index);
        assert!(o.scan_clustered_columnstore);
        assert!(o.scan_non_clustered_columnstore);
        assert!(!o.scan_missing_index);
        assert!(o.ignore_permissions);
        assert!(o.ignore_read_only_fl);
    }

    #[test]
    fn test_connection_timeout_bounds() {
        let mut o = Options::new();
        o.set_connection_timeout(90);
        assert_eq!(o.connection_timeout(), 90);
        o.set_connection_timeout(91);
        assert_eq!(o.connection_timeout(), 90);
        o.set_connection_timeout(14);
        assert_eq!(o.connection_timeout(), 90);
        o.set_connection_timeout(15);
        assert_eq!(o.connection_timeout(), 15);
    }

    #[test]
    fn test_scalar_bounds_keep_previous() {
        let mut o = Options::new();
        o.set_command_timeout(1801);
        o.set_max_dop(65);
        o.set_fill_factor(-1);
        o.set_sample_stats_percent(0);
        o.set_max_duration(11);
        assert_eq!(o, Options::default());

        o.set_command_timeout(0);
        o.set_max_dop(64);
        o.set_fill_factor(100);
        o.set_sample_stats_percent(1);
        o.set_max_duration(10);
        assert_eq!(o.command_timeout(), 0);
        assert_eq!(o.max_dop(), 64);
        assert_eq!(o.fill_factor(), 100);
        assert_eq!(o.sample_stats_percent(), 1);
        assert_eq!(o.max_duration(), 10);
    }

    #[test]
    fn test_rebuild_equal_to_reorganize() {
        let mut o = Options::new();
        o.set_rebuild_threshold(15);
        assert_eq!((o.reorganize_threshold(), o.rebuild_threshold()), (14, 15));
    }

    #[test]
    fn test_reorganize_100_is_rejected() {
        let mut o = Options::new();
        o.set_reorganize_threshold(100);
        assert_eq!(o.reorganize_threshold(), 15);
        assert_eq!(o.rebuild_threshold(), 30);
    }

    #[test]
    fn test_size_setters_reconcile() {
        let mut o = Options::new();
        o.set_min_index_size(255);
        assert_eq!((o.min_index_size(), o.pre_describe_size()), (255, 256));
        o.set_max_index_size(512);
        assert_eq!(o.max_index_size(), 512);
        o.set_pre_describe_size(100);
        assert_eq!(o.pre_describe_size(), 256);
    }

    #[test]
    fn test_data_compression_literal() {
        let mut o = Options::new();
        o.set_data_compression("ROW");
        assert_eq!(o.data_compression(), DataCompression::Row);
        o.set_data_compression("XYZ");
        assert_eq!(o.data_compression(), DataCompression::Row);
    }

    #[test]
    fn test_abort_after_wait_literal() {
        let mut o = Options::new();
        o.set_abort_after_wait("BLOCKERS");
        assert_eq!(o.abort_after_wait(), AbortAfterWait::Blockers);
        o.set_abort_after_wait("blockers");
        assert_eq!(o.abort_after_wait(), AbortAfterWait::Blockers);
        o.set_abort_after_wait_mode(AbortAfterWait::SelfSession);
        assert_eq!(o.abort_after_wait().as_str(), "SELF");
    }

    #[test]
    fn test_filters_are_sanitized() {
        let mut o = Options::new();
        o.set_include_schemas([" ", "dbo", "", "  sales  "]);
        o.set_exclude_schemas(["audit", "x; DROP TABLE y"]);
        o.set_include_objects(vec!["Orders".to_string()]);
        o.set_exclude_objects(["--"]);
        assert_eq!(o.include_schemas(), ["dbo", "sales"]);
        assert_eq!(o.exclude_schemas(), ["audit"]);
        assert_eq!(o.include_objects(), ["Orders"]);
        assert!(o.exclude_objects().is_empty());
    }
}
