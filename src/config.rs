//! Loading and saving options.
//!
//! Options can come from a JSON document, from environment variables
//! following the 12-factor app pattern, or both (environment wins). Every
//! value read from outside is pushed through the [`Options`] setters, so a
//! loaded model is always consistent no matter what the source contained.

use crate::constants::ENV_PREFIX;
use crate::error::OptionsError;
use crate::options::Options;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env::VarError;
use std::path::Path;
use tracing::warn;

/// On-disk shape of [`Options`]. Every field is optional; missing fields
/// keep their defaults. Numbers are read wide so that an out-of-range
/// integer is absorbed like any other illegal value instead of failing the
/// whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsDocument {
    pub connection_timeout: Option<i64>,
    pub command_timeout: Option<i64>,
    pub reorganize_threshold: Option<i64>,
    pub rebuild_threshold: Option<i64>,
    pub max_dop: Option<i64>,
    pub fill_factor: Option<i64>,
    pub sample_stats_percent: Option<i64>,
    pub min_index_size: Option<i64>,
    pub pre_describe_size: Option<i64>,
    pub max_index_size: Option<i64>,
    pub max_duration: Option<i64>,
    pub data_compression: Option<String>,
    pub abort_after_wait: Option<String>,
    pub include_schemas: Option<Vec<String>>,
    pub exclude_schemas: Option<Vec<String>>,
    pub include_objects: Option<Vec<String>>,
    pub exclude_objects: Option<Vec<String>>,
    pub online: Option<bool>,
    pub sort_in_temp_db: Option<bool>,
    pub lob_compaction: Option<bool>,
    pub wait_at_low_priority: Option<bool>,
    pub scan_heap: Option<bool>,
    pub scan_clustered_index: Option<bool>,
    pub scan_non_clustered_index: Option<bool>,
    pub scan_clustered_columnstore: Option<bool>,
    pub scan_non_clustered_columnstore: Option<bool>,
    pub scan_missing_index: Option<bool>,
    pub ignore_permissions: Option<bool>,
    pub ignore_read_only_fl: Option<bool>,

    /// Keys that do not name an option. Logged and otherwise ignored.
    #[serde(flatten)]
    pub ignored: BTreeMap<String, serde_json::Value>,
}

impl OptionsDocument {
    /// Read overrides from `IDXMGR_*` environment variables.
    ///
    /// # Environment Variables
    ///
    /// ## Numbers
    /// - `IDXMGR_CONNECTION_TIMEOUT`, `IDXMGR_COMMAND_TIMEOUT`, `IDXMGR_MAX_DURATION`
    /// - `IDXMGR_REORGANIZE_THRESHOLD`, `IDXMGR_REBUILD_THRESHOLD`
    /// - `IDXMGR_MIN_INDEX_SIZE`, `IDXMGR_PRE_DESCRIBE_SIZE`, `IDXMGR_MAX_INDEX_SIZE`
    /// - `IDXMGR_MAX_DOP`, `IDXMGR_FILL_FACTOR`, `IDXMGR_SAMPLE_STATS_PERCENT`
    ///
    /// ## Literals
    /// - `IDXMGR_DATA_COMPRESSION`: DEFAULT, NONE, ROW, PAGE
    /// - `IDXMGR_ABORT_AFTER_WAIT`: NONE, SELF, BLOCKERS
    ///
    /// ## Comma-separated lists
    /// - `IDXMGR_INCLUDE_SCHEMAS`, `IDXMGR_EXCLUDE_SCHEMAS`
    /// - `IDXMGR_INCLUDE_OBJECTS`, `IDXMGR_EXCLUDE_OBJECTS`
    ///
    /// ## Flags (true/false/1/0)
    /// - `IDXMGR_ONLINE`, `IDXMGR_SORT_IN_TEMPDB`, `IDXMGR_LOB_COMPACTION`,
    ///   `IDXMGR_WAIT_AT_LOW_PRIORITY`, `IDXMGR_SCAN_HEAP`,
    ///   `IDXMGR_SCAN_CLUSTERED_INDEX`, `IDXMGR_SCAN_NONCLUSTERED_INDEX`,
    ///   `IDXMGR_SCAN_CLUSTERED_COLUMNSTORE`, `IDXMGR_SCAN_NONCLUSTERED_COLUMNSTORE`,
    ///   `IDXMGR_SCAN_MISSING_INDEX`, `IDXMGR_IGNORE_PERMISSIONS`,
    ///   `IDXMGR_IGNORE_READ_ONLY_FL`
    pub fn from_env() -> Result<Self, OptionsError> {
        Ok(Self {
            connection_timeout: env_int("CONNECTION_TIMEOUT")?,
            command_timeout: env_int("COMMAND_TIMEOUT")?,
            reorganize_threshold: env_int("REORGANIZE_THRESHOLD")?,
            rebuild_threshold: env_int("REBUILD_THRESHOLD")?,
            max_dop: env_int("MAX_DOP")?,
            fill_factor: env_int("FILL_FACTOR")?,
            sample_stats_percent: env_int("SAMPLE_STATS_PERCENT")?,
            min_index_size: env_int("MIN_INDEX_SIZE")?,
            pre_describe_size: env_int("PRE_DESCRIBE_SIZE")?,
            max_index_size: env_int("MAX_INDEX_SIZE")?,
            max_duration: env_int("MAX_DURATION")?,
            data_compression: env_var("DATA_COMPRESSION")?,
            abort_after_wait: env_var("ABORT_AFTER_WAIT")?,
            include_schemas: env_list("INCLUDE_SCHEMAS")?,
            exclude_schemas: env_list("EXCLUDE_SCHEMAS")?,
            include_objects: env_list("INCLUDE_OBJECTS")?,
            exclude_objects: env_list("EXCLUDE_OBJECTS")?,
            online: env_flag("ONLINE")?,
            sort_in_temp_db: env_flag("SORT_IN_TEMPDB")?,
            lob_compaction: env_flag("LOB_COMPACTION")?,
            wait_at_low_priority: env_flag("WAIT_AT_LOW_PRIORITY")?,
            scan_heap: env_flag("SCAN_HEAP")?,
            scan_clustered_index: env_flag("SCAN_CLUSTERED_INDEX")?,
            scan_non_clustered_index: env_flag("SCAN_NONCLUSTERED_INDEX")?,
            scan_clustered_columnstore: env_flag("SCAN_CLUSTERED_COLUMNSTORE")?,
            scan_non_clustered_columnstore: env_flag("SCAN_NONCLUSTERED_COLUMNSTORE")?,
            scan_missing_index: env_flag("SCAN_MISSING_INDEX")?,
            ignore_permissions: env_flag("IGNORE_PERMISSIONS")?,
            ignore_read_only_fl: env_flag("IGNORE_READ_ONLY_FL")?,
            ignored: BTreeMap::new(),
        })
    }
}

fn env_var(suffix: &str) -> Result<Option<String>, OptionsError> {
    let name = format!("{ENV_PREFIX}{suffix}");
    match std::env::var(&name) {
        Ok(v) => Ok(Some(v)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(OptionsError::config(format!(
            "{name} is not valid UTF-8"
        ))),
    }
}

fn env_int(suffix: &str) -> Result<Option<i64>, OptionsError> {
    env_var(suffix)?
        .map(|v| {
            v.trim().parse().map_err(|_| {
                OptionsError::config(format!("{ENV_PREFIX}{suffix} must be an integer, got '{v}'"))
            })
        })
        .transpose()
}

fn env_flag(suffix: &str) -> Result<Option<bool>, OptionsError> {
    env_var(suffix)?
        .map(|v| match v.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(OptionsError::config(format!(
                "{ENV_PREFIX}{suffix} must be true, false, 1 or 0, got '{v}'"
            ))),
        })
        .transpose()
}

fn env_list(suffix: &str) -> Result<Option<Vec<String>>, OptionsError> {
    Ok(env_var(suffix)?.map(|v| v.split(',').map(str::to_string).collect()))
}

/// Narrow a document number; `None` when it cannot be a legal value.
fn narrow(value: i64) -> Option<i32> {
    i32::try_from(value).ok()
}

impl Options {
    /// Push every value present in `doc` through the setters.
    ///
    /// Coupled fields go through the group setters, so the order in which a
    /// document lists them does not matter. Numbers beyond `i32` keep the
    /// previous value. Values the model adjusted and unknown keys are logged
    /// as warnings.
    pub fn apply(&mut self, doc: OptionsDocument) {
        if let Some(v) = doc.connection_timeout.and_then(narrow) {
            self.set_connection_timeout(v);
        }
        if let Some(v) = doc.command_timeout.and_then(narrow) {
            self.set_command_timeout(v);
        }
        if doc.reorganize_threshold.is_some() || doc.rebuild_threshold.is_some() {
            self.set_thresholds(
                doc.reorganize_threshold.and_then(narrow).unwrap_or(self.reorganize_threshold()),
                doc.rebuild_threshold.and_then(narrow).unwrap_or(self.rebuild_threshold()),
            );
        }
        if let Some(v) = doc.max_dop.and_then(narrow) {
            self.set_max_dop(v);
        }
        if let Some(v) = doc.fill_factor.and_then(narrow) {
            self.set_fill_factor(v);
        }
        if let Some(v) = doc.sample_stats_percent.and_then(narrow) {
            self.set_sample_stats_percent(v);
        }
        if doc.min_index_size.is_some()
            || doc.pre_describe_size.is_some()
            || doc.max_index_size.is_some()
        {
            self.set_size_bands(
                doc.min_index_size.and_then(narrow).unwrap_or(self.min_index_size()),
                doc.pre_describe_size.and_then(narrow).unwrap_or(self.pre_describe_size()),
                doc.max_index_size.and_then(narrow).unwrap_or(self.max_index_size()),
            );
        }
        if let Some(v) = doc.max_duration.and_then(narrow) {
            self.set_max_duration(v);
        }
        if let Some(v) = doc.data_compression.as_deref() {
            self.set_data_compression(v);
        }
        if let Some(v) = doc.abort_after_wait.as_deref() {
            self.set_abort_after_wait(v);
        }
        if let Some(v) = doc.include_schemas.as_ref() {
            self.set_include_schemas(v);
        }
        if let Some(v) = doc.exclude_schemas.as_ref() {
            self.set_exclude_schemas(v);
        }
        if let Some(v) = doc.include_objects.as_ref() {
            self.set_include_objects(v);
        }
        if let Some(v) = doc.exclude_objects.as_ref() {
            self.set_exclude_objects(v);
        }

        let flags = [
            (doc.online, &mut self.online),
            (doc.sort_in_temp_db, &mut self.sort_in_temp_db),
            (doc.lob_compaction, &mut self.lob_compaction),
            (doc.wait_at_low_priority, &mut self.wait_at_low_priority),
            (doc.scan_heap, &mut self.scan_heap),
            (doc.scan_clustered_index, &mut self.scan_clustered_index),
            (doc.scan_non_clustered_index, &mut self.scan_non_clustered_index),
            (doc.scan_clustered_columnstore, &mut self.scan_clustered_columnstore),
            (
                doc.scan_non_clustered_columnstore,
                &mut self.scan_non_clustered_columnstore,
            ),
            (doc.scan_missing_index, &mut self.scan_missing_index),
            (doc.ignore_permissions, &mut self.ignore_permissions),
            (doc.ignore_read_only_fl, &mut self.ignore_read_only_fl),
        ];
        for (value, flag) in flags {
            if let Some(value) = value {
                *flag = value;
            }
        }

        self.warn_adjusted(&doc);
    }

    /// Numeric fields as `(name, requested, stored)`, named like the setters log them.
    fn numeric_fields(&self, doc: &OptionsDocument) -> [(&'static str, Option<i64>, i32); 11] {
        [
            ("connection_timeout", doc.connection_timeout, self.connection_timeout()),
            ("command_timeout", doc.command_timeout, self.command_timeout()),
            ("reorganize_threshold", doc.reorganize_threshold, self.reorganize_threshold()),
            ("rebuild_threshold", doc.rebuild_threshold, self.rebuild_threshold()),
            ("max_dop", doc.max_dop, self.max_dop()),
            ("fill_factor", doc.fill_factor, self.fill_factor()),
            ("sample_stats_percent", doc.sample_stats_percent, self.sample_stats_percent()),
            ("min_index_size", doc.min_index_size, self.min_index_size()),
            ("pre_describe_size", doc.pre_describe_size, self.pre_describe_size()),
            ("max_index_size", doc.max_index_size, self.max_index_size()),
            ("max_duration", doc.max_duration, self.max_duration()),
        ]
    }

    fn warn_adjusted(&self, doc: &OptionsDocument) {
        for (field, requested, stored) in self.numeric_fields(doc) {
            if let Some(requested) = requested.filter(|r| *r != i64::from(stored)) {
                warn!(field, requested, stored, "Option value adjusted");
            }
        }

        let literals = [
            ("data_compression", &doc.data_compression, self.data_compression().as_str()),
            ("abort_after_wait", &doc.abort_after_wait, self.abort_after_wait().as_str()),
        ];
        for (field, requested, stored) in literals {
            if let Some(requested) = requested.as_deref().filter(|r| *r != stored) {
                warn!(field, requested, stored, "Unknown option literal ignored");
            }
        }

        let lists = [
            ("include_schemas", &doc.include_schemas, self.include_schemas().len()),
            ("exclude_schemas", &doc.exclude_schemas, self.exclude_schemas().len()),
            ("include_objects", &doc.include_objects, self.include_objects().len()),
            ("exclude_objects", &doc.exclude_objects, self.exclude_objects().len()),
        ];
        for (field, requested, kept) in lists {
            if let Some(requested) = requested.as_ref().filter(|r| r.len() != kept) {
                warn!(
                    field,
                    dropped = requested.len() - kept,
                    "Invalid filter tokens dropped"
                );
            }
        }

        for key in doc.ignored.keys() {
            warn!(key = %key, "Unknown option ignored");
        }
    }

    /// Load options from environment variables on top of the defaults.
    pub fn from_env() -> Result<Self, OptionsError> {
        let mut options = Self::default();
        options.apply_env()?;
        Ok(options)
    }

    /// Apply `IDXMGR_*` environment overrides to these options.
    ///
    /// See [`OptionsDocument::from_env`] for the variable names.
    pub fn apply_env(&mut self) -> Result<(), OptionsError> {
        self.apply(OptionsDocument::from_env()?);
        Ok(())
    }

    /// Parse options from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render these options as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, OptionsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| OptionsError::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// Save options to a JSON file, replacing it if it exists.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), OptionsError> {
        let path = path.as_ref();
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|e| OptionsError::io(path, e))
    }
}

impl From<OptionsDocument> for Options {
    fn from(doc: OptionsDocument) -> Self {
        let mut options = Options::default();
        options.apply(doc);
        options
    }
}

impl From<Options> for OptionsDocument {
    fn from(o: Options) -> Self {
        Self {
            connection_timeout: Some(i64::from(o.connection_timeout())),
            command_timeout: Some(i64::from(o.command_timeout())),
            reorganize_threshold: Some(i64::from(o.reorganize_threshold())),
            rebuild_threshold: Some(i64::from(o.rebuild_threshold())),
            max_dop: Some(i64::from(o.max_dop())),
            fill_factor: Some(i64::from(o.fill_factor())),
            sample_stats_percent: Some(i64::from(o.sample_stats_percent())),
            min_index_size: Some(i64::from(o.min_index_size())),
            pre_describe_size: Some(i64::from(o.pre_describe_size())),
            max_index_size: Some(i64::from(o.max_index_size())),
            max_duration: Some(i64::from(o.max_duration())),
            data_compression: Some(o.data_compression().as_str().to_string()),
            abort_after_wait: Some(o.abort_after_wait().as_str().to_string()),
            include_schemas: Some(o.include_schemas().to_vec()),
            exclude_schemas: Some(o.exclude_schemas().to_vec()),
            include_objects: Some(o.include_objects().to_vec()),
            exclude_objects: Some(o.exclude_objects().to_vec()),
            online: Some(o.online),
            sort_in_temp_db: Some(o.sort_in_temp_db),
            lob_compaction: Some(o.lob_compaction),
            wait_at_low_priority: Some(o.wait_at_low_priority),
            scan_heap: Some(o.scan_heap),
            scan_clustered_index: Some(o.scan_clustered_index),
            scan_non_clustered_index: Some(o.scan_non_clustered_index),
            scan_clustered_columnstore: Some(o.scan_clustered_columnstore),
            scan_non_clustered_columnstore: Some(o.scan_non_clustered_columnstore),
            scan_missing_index: Some(o.scan_missing_index),
            ignore_permissions: Some(o.ignore_permissions),
            ignore_read_only_fl: Some(o.ignore_read_only_fl),
            ignored: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{AbortAfterWait, DataCompression};

    #[test]
    fn test_empty_document_yields_defaults() {
        let options = Options::from_json_str("{}").unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_document_order_does_not_matter() {
        // rebuild listed before reorganize would collapse if applied one by one
        let options =
            Options::from_json_str(r#"{"rebuildThreshold": 50, "reorganizeThreshold": 40}"#)
                .unwrap();
        assert_eq!(options.reorganize_threshold(), 40);
        assert_eq!(options.rebuild_threshold(), 50);
    }

    #[test]
    fn test_illegal_values_are_absorbed() {
        let options = Options::from_json_str(
            r#"{
                "connectionTimeout": 5,
                "maxDop": 128,
                "reorganizeThreshold": 100,
                "dataCompression": "XYZ",
                "includeSchemas": ["dbo", " ", "a;b"]
            }"#,
        )
        .unwrap();
        assert_eq!(options.connection_timeout(), 15);
        assert_eq!(options.max_dop(), 0);
        assert_eq!(options.reorganize_threshold(), 15);
        assert_eq!(options.data_compression(), DataCompression::Default);
        assert_eq!(options.include_schemas(), ["dbo"]);
    }

    #[test]
    fn test_flags_and_modes_from_document() {
        let options = Options::from_json_str(
            r#"{"online": true, "scanHeap": false, "abortAfterWait": "SELF"}"#,
        )
        .unwrap();
        assert!(options.online);
        assert!(!options.scan_heap);
        assert!(options.sort_in_temp_db);
        assert_eq!(options.abort_after_wait(), AbortAfterWait::SelfSession);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = Options::default().to_json_pretty().unwrap();
        assert!(json.contains("\"reorganizeThreshold\": 15"));
        assert!(json.contains("\"preDescribeSize\": 256"));
        assert!(json.contains("\"dataCompression\": \"DEFAULT\""));
        assert!(json.contains("\"ignoreReadOnlyFl\": true"));
    }

    #[test]
    fn test_integer_beyond_i32_keeps_previous_value() {
        let options = Options::from_json_str(
            r#"{"maxDop": 99999999999, "fillFactor": 80, "rebuildThreshold": -99999999999}"#,
        )
        .unwrap();
        assert_eq!(options.max_dop(), 0);
        assert_eq!(options.rebuild_threshold(), 30);
        assert_eq!(options.fill_factor(), 80);
    }

    #[test]
    fn test_wide_integer_in_size_group_keeps_other_members() {
        let options =
            Options::from_json_str(r#"{"minIndexSize": 4294967296, "maxIndexSize": 1024}"#)
                .unwrap();
        assert_eq!(options.min_index_size(), 6);
        assert_eq!(options.max_index_size(), 1024);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let options = Options::from_json_str(r#"{"maxdop": 4, "fillFactor": 70}"#).unwrap();
        assert_eq!(options.max_dop(), 0);
        assert_eq!(options.fill_factor(), 70);

        let doc: OptionsDocument = serde_json::from_str(r#"{"maxdop": 4}"#).unwrap();
        assert_eq!(doc.ignored.keys().collect::<Vec<_>>(), ["maxdop"]);
        assert_eq!(doc.max_dop, None);
    }

    #[test]
    fn test_serialized_document_has_no_ignored_keys() {
        let value = serde_json::to_value(Options::default()).unwrap();
        assert!(value.get("ignored").is_none());
        let doc: OptionsDocument = serde_json::from_value(value).unwrap();
        assert!(doc.ignored.is_empty());
    }

    #[test]
    fn test_logged_field_names_match_document_keys() {
        let options = Options::default();
        let doc = OptionsDocument::from(options.clone());
        let value = serde_json::to_value(&options).unwrap();
        for (field, requested, stored) in options.numeric_fields(&doc) {
            let key: String = field
                .split('_')
                .enumerate()
                .map(|(i, part)| {
                    let mut chars = part.chars();
                    match chars.next() {
                        Some(first) if i > 0 => {
                            first.to_ascii_uppercase().to_string() + chars.as_str()
                        }
                        _ => part.to_string(),
                    }
                })
                .collect();
            assert_eq!(value[&key], serde_json::json!(stored), "{field}");
            assert_eq!(requested, Some(i64::from(stored)), "{field}");
        }
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = Options::from_json_str("{\"maxDop\": \"four\"}").unwrap_err();
        assert!(matches!(err, OptionsError::Parse(_)));
    }
}
