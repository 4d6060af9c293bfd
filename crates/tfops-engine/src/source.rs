//! Resolved source bundles and stable content hashing.
//!
//! The change detector relies on these hashes being invariant under key
//! ordering: the digest is computed over the lexicographically sorted list of
//! `"key,sha1(value)"` tuples, so two bundles hash equal iff their key/value
//! pairs are equal. Sorting the full tuple string rather than just the key
//! keeps value changes from colliding with key ordering.

use k8s_openapi::api::core::v1::ConfigMap;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Key/value content of one source ConfigMap, for validation and hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMapSourceData(BTreeMap<String, String>);

impl ConfigMapSourceData {
    /// Wraps raw ConfigMap data.
    #[must_use]
    pub fn new(data: BTreeMap<String, String>) -> Self {
        Self(data)
    }

    /// Verifies the source carries at least one key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySource`] for a zero-entry bundle.
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::EmptySource {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Computes the stable content hash of this bundle.
    ///
    /// Tuples `"key,sha1(value)"` are sorted lexicographically, joined with
    /// commas, and hashed with SHA-1 (lowercase hex). The result is invariant
    /// under key-order permutation and changes iff any pair differs.
    #[must_use]
    pub fn content_hash(&self) -> String {
        // BTreeMap iteration is already sorted by key, but the tuple strings
        // are re-sorted as full strings to pin the documented ordering.
        let mut tuples: Vec<String> = self
            .0
            .iter()
            .map(|(key, value)| format!("{key},{}", sha1_hex(value)))
            .collect();
        tuples.sort();
        sha1_hex(&tuples.join(","))
    }

    /// Iterates the key/value pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Returns true if the bundle carries no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for ConfigMapSourceData {
    fn from(data: BTreeMap<String, String>) -> Self {
        Self(data)
    }
}

/// Computes the lowercase-hex SHA-1 of a string.
#[must_use]
pub fn sha1_hex(input: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Per-invocation aggregate of all resolved config sources.
///
/// Computed fresh on every call by the source provider; never persisted
/// except as hashes and generated-ConfigMap names in the status document.
#[derive(Debug, Clone, Default)]
pub struct SourceBundle {
    /// Content hash per source ConfigMap name.
    pub config_map_hashes: BTreeMap<String, String>,
    /// `(config_map_name, key)` pairs to mount into the worker.
    pub config_map_keys: Vec<(String, String)>,
    /// Object-storage source URLs.
    pub object_storage: Vec<String>,
    /// Generated ConfigMap objects materializing embedded inline config.
    /// Registered as desired children at dispatch.
    pub embedded_config_maps: Vec<ConfigMap>,
}

impl SourceBundle {
    /// Names of the generated embedded-source ConfigMaps, in order.
    #[must_use]
    pub fn embedded_names(&self) -> Vec<String> {
        self.embedded_config_maps
            .iter()
            .filter_map(|cm| cm.metadata.name.clone())
            .collect()
    }

    /// Returns true if the bundle resolved no sources at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.config_map_keys.is_empty()
            && self.object_storage.is_empty()
            && self.embedded_config_maps.is_empty()
    }
}
