//! What-if overrides of activity eligibility.
//!
//! # JSON format
//!
//! ```json
//! {
//!   "Create Purchase Order Item": ["user_001", "user_TEST_OPTIMIZED"],
//!   "Record Goods Receipt": []
//! }
//! ```
//!
//! Each entry fully replaces the eligible set of that activity.  Names not
//! seen in the event log are new hires and become fresh resources.  An empty
//! list removes all contention for the activity.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::PoolResult;

/// Activity name → replacement list of resource names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolOverrides {
    map: BTreeMap<String, Vec<String>>,
}

impl PoolOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the eligible set of `activity` with `resources`.
    pub fn set<I, S>(&mut self, activity: &str, resources: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map
            .insert(activity.to_owned(), resources.into_iter().map(Into::into).collect());
        self
    }

    /// Builder-style variant of [`set`][Self::set].
    pub fn with<I, S>(mut self, activity: &str, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(activity, resources);
        self
    }

    pub fn get(&self, activity: &str) -> Option<&[String]> {
        self.map.get(activity).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Entries in ascending activity-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.map.iter().map(|(a, r)| (a.as_str(), r.as_slice()))
    }

    pub fn from_json_str(s: &str) -> PoolResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_path(path: &Path) -> PoolResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
