use serde::{Deserialize, Serialize};

use crate::error::{MergeError, MergeResult};

/// Switches controlling how defaults are pulled into a merge.
///
/// Field names are snake_case; the camelCase spellings are accepted as
/// aliases so option files written for other tooling still load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeOptions {
    /// Pull default array entries into indices the value does not have.
    #[serde(alias = "deepMergeArrays")]
    pub deep_merge_arrays: bool,
    /// Include the defaults' keys when merging records.
    #[serde(alias = "deepMergeObjects")]
    pub deep_merge_objects: bool,
    /// Replace `undefined` with the default.
    #[serde(alias = "getDefaultForUndefined")]
    pub get_default_for_undefined: bool,
    /// Replace `null` with the default.
    #[serde(alias = "getDefaultForNull")]
    pub get_default_for_null: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            deep_merge_arrays: false,
            deep_merge_objects: true,
            get_default_for_undefined: true,
            get_default_for_null: false,
        }
    }
}

impl MergeOptions {
    /// Defaults fill every gap: array indices, missing keys, `undefined`
    /// and `null`.
    pub fn deep() -> Self {
        Self {
            deep_merge_arrays: true,
            get_default_for_null: true,
            ..Default::default()
        }
    }

    /// The value is taken as given; defaults never contribute keys or
    /// replace absent data.
    pub fn value_only() -> Self {
        Self {
            deep_merge_arrays: false,
            deep_merge_objects: false,
            get_default_for_undefined: false,
            get_default_for_null: false,
        }
    }

    /// Load options from a TOML document. Missing fields keep their defaults.
    pub fn from_toml_str(source: &str) -> MergeResult<Self> {
        toml::from_str(source).map_err(|e| MergeError::Config(e.to_string()))
    }

    pub fn with_deep_merge_arrays(mut self, enabled: bool) -> Self {
        self.deep_merge_arrays = enabled;
        self
    }

    pub fn with_deep_merge_objects(mut self, enabled: bool) -> Self {
        self.deep_merge_objects = enabled;
        self
    }

    pub fn with_default_for_undefined(mut self, enabled: bool) -> Self {
        self.get_default_for_undefined = enabled;
        self
    }

    pub fn with_default_for_null(mut self, enabled: bool) -> Self {
        self.get_default_for_null = enabled;
        self
    }
}
