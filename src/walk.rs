// Copyright 2025 the snmpscope authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Full GET-NEXT walks and relationship queries over their results.
//!
//! A walk is slow (device OID count times round-trip latency), so callers
//! wanting a responsive UI should drive it from its own task and keep
//! serving previously-collected data meanwhile. The [`WalkResult`] it
//! produces is immutable and can be shared freely across readers.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::oid;
use crate::session::{SnmpSession, WalkStep};
use crate::value::MetricValue;

/// The ordered outcome of one walk. Entry order is protocol walk order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkResult {
    entries: Vec<MetricValue>,
    skipped: usize,
}

impl WalkResult {
    /// Wrap an already-collected entry list, e.g. replayed from a capture.
    pub fn from_entries(entries: Vec<MetricValue>) -> Self {
        Self {
            entries,
            skipped: 0,
        }
    }

    pub fn entries(&self) -> &[MetricValue] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetricValue> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many walk-step failures were absorbed before termination.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Every entry sharing the given OID's immediate parent, in walk
    /// order. Empty when the OID has no parent.
    pub fn siblings_of(&self, target: &str) -> Vec<&MetricValue> {
        match oid::parent(target) {
            Some(parent) => self
                .entries
                .iter()
                .filter(|e| oid::parent(e.oid()) == Some(parent))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every entry sharing both the given OID's grandparent and its
    /// trailing instance component: the same row across sibling tables.
    /// Empty when the OID has no grandparent.
    pub fn cousins_of(&self, target: &str) -> Vec<&MetricValue> {
        let (Some(gparent), Some(instance)) = (oid::grandparent(target), oid::instance(target))
        else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|e| {
                oid::grandparent(e.oid()) == Some(gparent)
                    && oid::instance(e.oid()) == Some(instance)
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a WalkResult {
    type Item = &'a MetricValue;
    type IntoIter = std::slice::Iter<'a, MetricValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Walk the agent's tree from `start_oid` until it signals end-of-tree,
/// advancing through each returned OID in turn.
///
/// Fails only if the session itself is unusable. An absorbed step failure
/// terminates the walk early (the probe yields no OID to advance from) and
/// is recorded in [`WalkResult::skipped`].
pub async fn walk(session: &mut SnmpSession, start_oid: &str) -> Result<WalkResult> {
    let mut entries = Vec::new();
    let mut skipped = 0;
    let mut cursor = start_oid.to_string();

    loop {
        match session.get_next(&cursor).await? {
            WalkStep::Entry(entry) => {
                cursor = entry.oid().to_string();
                entries.push(entry);
            }
            WalkStep::Skipped => {
                skipped += 1;
                break;
            }
            WalkStep::End => break,
        }
    }

    debug!(
        start_oid,
        entries = entries.len(),
        skipped,
        "walk complete"
    );
    Ok(WalkResult { entries, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SnmpValue;

    fn result_of(oids: &[&str]) -> WalkResult {
        WalkResult::from_entries(
            oids.iter()
                .map(|o| MetricValue::new(*o, SnmpValue::Integer(1)))
                .collect(),
        )
    }

    #[test]
    fn test_siblings_same_parent_only() {
        let result = result_of(&[
            "1.3.6.1.2.1.2.2.1.1.1",
            "1.3.6.1.2.1.2.2.1.1.2",
            "1.3.6.1.2.1.2.2.1.2.1",
        ]);
        let siblings = result.siblings_of("1.3.6.1.2.1.2.2.1.1.1");
        let oids: Vec<&str> = siblings.iter().map(|e| e.oid()).collect();
        assert_eq!(oids, vec!["1.3.6.1.2.1.2.2.1.1.1", "1.3.6.1.2.1.2.2.1.1.2"]);
    }

    #[test]
    fn test_siblings_of_rootless_oid_is_empty() {
        let result = result_of(&["1.3.6.1.2.1.1.1.0"]);
        assert!(result.siblings_of("1").is_empty());
    }

    #[test]
    fn test_cousins_require_matching_instance() {
        let result = result_of(&[
            "1.3.6.1.2.1.2.2.1.1.1",
            "1.3.6.1.2.1.2.2.1.1.2",
            "1.3.6.1.2.1.2.2.1.2.1",
            "1.3.6.1.2.1.2.2.1.2.2",
        ]);
        let cousins = result.cousins_of("1.3.6.1.2.1.2.2.1.1.1");
        let oids: Vec<&str> = cousins.iter().map(|e| e.oid()).collect();
        // same grandparent ...2.2.1, same trailing instance .1
        assert_eq!(oids, vec!["1.3.6.1.2.1.2.2.1.1.1", "1.3.6.1.2.1.2.2.1.2.1"]);
    }

    #[test]
    fn test_cousins_of_short_oid_is_empty() {
        let result = result_of(&["1.3.6.1.2.1.1.1.0"]);
        assert!(result.cousins_of("1.3").is_empty());
        assert!(result.cousins_of("1").is_empty());
    }

    #[test]
    fn test_queries_ignore_list_order() {
        let sorted = result_of(&["1.3.6.1.2.1.2.2.1.1.1", "1.3.6.1.2.1.2.2.1.1.2"]);
        let reversed = result_of(&["1.3.6.1.2.1.2.2.1.1.2", "1.3.6.1.2.1.2.2.1.1.1"]);
        assert_eq!(
            sorted.siblings_of("1.3.6.1.2.1.2.2.1.1.1").len(),
            reversed.siblings_of("1.3.6.1.2.1.2.2.1.1.1").len()
        );
    }
}
