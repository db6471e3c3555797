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

//! Rebuilding the OID hierarchy from a flat walk result.
//!
//! The walk returns leaves; the intermediate prefixes were never returned
//! by the agent, so the builder synthesizes placeholder nodes for them.
//! Synthetic nodes are memoized by OID string, so every distinct prefix
//! appears exactly once regardless of input order.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::mib::MibIndex;
use crate::oid;
use crate::value::MetricValue;
use crate::walk::WalkResult;

/// A node in the rebuilt hierarchy. Real nodes carry the walked value;
/// synthetic nodes are bare prefixes. The root is a fixed synthetic node
/// with an empty OID under which all top-level prefixes hang.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    oid: String,
    value: Option<MetricValue>,
    children: Vec<TreeNode>,
}

impl TreeNode {
    /// The dotted-decimal OID, empty for the root.
    pub fn oid(&self) -> &str {
        &self.oid
    }

    /// The walked value, present only on real nodes.
    pub fn value(&self) -> Option<&MetricValue> {
        self.value.as_ref()
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.oid.is_empty()
    }

    /// Whether this node is a placeholder the walk never returned.
    pub fn is_synthetic(&self) -> bool {
        !self.is_root() && self.value.is_none()
    }

    /// Display label, resolved against the index at call time so a later
    /// MIB load relabels the tree automatically. Never stored.
    pub fn display_label(&self, mib: &MibIndex) -> String {
        if self.is_root() {
            "SNMP".to_string()
        } else {
            mib.prettify(&self.oid)
        }
    }

    /// Depth-first search for a node by OID.
    pub fn find(&self, target: &str) -> Option<&TreeNode> {
        if self.oid == target {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(target))
    }

    /// Every OID in the subtree, real and synthetic, excluding the root.
    pub fn all_oids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_oids(&mut out);
        out
    }

    fn collect_oids<'a>(&'a self, out: &mut Vec<&'a str>) {
        if !self.is_root() {
            out.push(&self.oid);
        }
        for child in &self.children {
            child.collect_oids(out);
        }
    }
}

/// Build the rooted hierarchy for a walk result.
///
/// Each entry becomes a real node; its ancestor chain is walked upward,
/// synthesizing placeholders until an already-known prefix (or the root)
/// is reached. Ascent always stops at the first existing node, so no node
/// ever acquires two parents.
pub fn build(result: &WalkResult) -> TreeNode {
    let values: HashMap<&str, &MetricValue> =
        result.iter().map(|e| (e.oid(), e)).collect();

    // parent OID -> child OIDs, first-seen order
    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    let mut known: HashSet<String> = HashSet::new();
    let mut roots: Vec<String> = Vec::new();

    for entry in result {
        let mut current = entry.oid().to_string();
        if !known.insert(current.clone()) {
            continue;
        }
        loop {
            match oid::parent(&current) {
                Some(parent) => {
                    let parent = parent.to_string();
                    let existed = known.contains(&parent);
                    children.entry(parent.clone()).or_default().push(current);
                    if existed {
                        break;
                    }
                    known.insert(parent.clone());
                    current = parent;
                }
                None => {
                    roots.push(current);
                    break;
                }
            }
        }
    }

    TreeNode {
        oid: String::new(),
        value: None,
        children: roots
            .into_iter()
            .map(|r| assemble(r, &mut children, &values))
            .collect(),
    }
}

fn assemble(
    oid: String,
    children: &mut HashMap<String, Vec<String>>,
    values: &HashMap<&str, &MetricValue>,
) -> TreeNode {
    let child_oids = children.remove(&oid).unwrap_or_default();
    let value = values.get(oid.as_str()).map(|v| (*v).clone());
    TreeNode {
        value,
        children: child_oids
            .into_iter()
            .map(|c| assemble(c, children, values))
            .collect(),
        oid,
    }
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
    fn test_synthesizes_ancestor_chain() {
        let result = result_of(&[
            "1.3.6.1.2.1.1.1.0",
            "1.3.6.1.2.1.1.2.0",
            "1.3.6.1.2.1.2.1.0",
        ]);
        let root = build(&result);
        assert!(root.is_root());
        assert_eq!(root.children.len(), 1);

        for prefix in ["1", "1.3", "1.3.6", "1.3.6.1", "1.3.6.1.2", "1.3.6.1.2.1"] {
            let node = root.find(prefix).unwrap_or_else(|| panic!("missing {prefix}"));
            assert!(node.is_synthetic());
        }

        let sys = root.find("1.3.6.1.2.1.1").unwrap();
        let sys_children: Vec<&str> = sys.children().iter().map(|c| c.oid()).collect();
        assert_eq!(sys_children, vec!["1.3.6.1.2.1.1.1", "1.3.6.1.2.1.1.2"]);

        let ifgrp = root.find("1.3.6.1.2.1.2").unwrap();
        let if_children: Vec<&str> = ifgrp.children().iter().map(|c| c.oid()).collect();
        assert_eq!(if_children, vec!["1.3.6.1.2.1.2.1"]);
    }

    #[test]
    fn test_every_entry_is_a_real_node_exactly_once() {
        let oids = [
            "1.3.6.1.2.1.1.1.0",
            "1.3.6.1.2.1.1.3.0",
            "1.3.6.1.2.1.2.2.1.10.1",
        ];
        let root = build(&result_of(&oids));
        for o in oids {
            let matches: Vec<&str> = root
                .all_oids()
                .into_iter()
                .filter(|n| *n == o)
                .collect();
            assert_eq!(matches.len(), 1, "{o} should appear once");
            assert!(root.find(o).unwrap().value().is_some());
        }
    }

    #[test]
    fn test_node_set_is_prefix_closed() {
        let root = build(&result_of(&[
            "1.3.6.1.2.1.1.1.0",
            "1.3.6.1.4.1.2021.4.5.0",
        ]));
        let all: std::collections::HashSet<String> =
            root.all_oids().into_iter().map(String::from).collect();
        for o in &all {
            let mut cur = o.as_str();
            while let Some(p) = oid::parent(cur) {
                assert!(all.contains(p), "ancestor {p} of {o} missing");
                cur = p;
            }
        }
    }

    #[test]
    fn test_order_does_not_change_node_set() {
        let forward = build(&result_of(&["1.3.6.1.2.1.1.1.0", "1.3.6.1.2.1.1.2.0"]));
        let reverse = build(&result_of(&["1.3.6.1.2.1.1.2.0", "1.3.6.1.2.1.1.1.0"]));
        let a: std::collections::HashSet<String> =
            forward.all_oids().into_iter().map(String::from).collect();
        let b: std::collections::HashSet<String> =
            reverse.all_oids().into_iter().map(String::from).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_result_builds_bare_root() {
        let root = build(&WalkResult::default());
        assert!(root.is_root());
        assert!(root.children().is_empty());
    }

    #[test]
    fn test_display_label_uses_index() {
        let mib = MibIndex::new();
        mib.insert("1.3.6.1.2.1.1", "system", "SNMPv2-MIB::system");
        let root = build(&result_of(&["1.3.6.1.2.1.1.1.0"]));
        assert_eq!(root.display_label(&mib), "SNMP");
        let node = root.find("1.3.6.1.2.1.1.1.0").unwrap();
        assert_eq!(node.display_label(&mib), "system.1.0");
    }
}
