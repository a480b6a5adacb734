//! # Call Metadata
//!
//! An ordered multimap of gRPC metadata entries attached to every outgoing
//! call. The call adapter stamps a base set into each request (correlation
//! id, calling component, call timestamp) and appends whatever the invoker
//! supplies on top, so multi-valued keys are never clobbered.
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Correlation identifier joined across process boundaries.
pub const REQUEST_ID_KEY: &str = "x-request-id";
/// Name of the component issuing the call.
pub const CALLER_KEY: &str = "x-caller";
/// Unix-millisecond timestamp taken when the call was issued.
pub const REQUEST_TS_KEY: &str = "x-request-ts";

/// Ordered multimap of metadata entries.
///
/// Keys are normalised to ASCII lowercase on insertion, as gRPC metadata
/// requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallMetadata {
    entries: Vec<(String, String)>,
}

impl CallMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// The base set attached to every outgoing call: a fresh correlation
    /// id, the calling component and the call timestamp.
    pub fn base(component: &str) -> Self {
        let mut metadata = Self::new();
        metadata.append(REQUEST_ID_KEY, Uuid::new_v4().to_string());
        metadata.append(CALLER_KEY, component);
        metadata.append(REQUEST_TS_KEY, unix_millis().to_string());
        metadata
    }

    /// Appends an entry, keeping any existing values under the same key.
    pub fn append(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .push((key.as_ref().to_ascii_lowercase(), value.into()));
    }

    /// Builder-style [`CallMetadata::append`].
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.append(key, value);
        self
    }

    /// Appends every entry of `other` after the existing ones.
    pub fn extend(&mut self, other: CallMetadata) {
        self.entries.extend(other.entries);
    }

    /// First value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values stored under `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
