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

//! Name resolution from MIB definition files.
//!
//! A [`MibIndex`] holds three append-only tables built by scanning MIB
//! directories: numeric OID to canonical name, name to numeric OID, and
//! numeric OID to the declaring MIB symbol. It is an explicit object,
//! shared via `Arc` rather than hidden global state; construct and scan
//! it before concurrent readers attach. Scans taken later extend the
//! tables but never retract entries.

pub mod parser;

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::common::config::AppConfig;
use crate::oid;

pub use parser::MibSymbol;

/// Outcome of one directory scan: how many files contributed symbols and
/// how many were skipped as unparseable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub loaded: usize,
    pub skipped: usize,
}

#[derive(Default)]
struct Tables {
    oid_to_name: HashMap<String, String>,
    name_to_oid: HashMap<String, String>,
    oid_to_symbol: HashMap<String, String>,
}

/// The three lookup tables, behind a read-write lock: directory scans are
/// mutually exclusive writers, lookups are concurrent readers.
pub struct MibIndex {
    tables: RwLock<Tables>,
}

impl MibIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// An index populated from the conventional system MIB directories,
    /// each scanned best-effort.
    pub fn with_system_mibs() -> Self {
        let index = Self::new();
        for dir in AppConfig::MIB_DIRS {
            index.scan_dir(Path::new(dir));
        }
        index
    }

    /// Scan every file in a directory, adding an entry for each symbol
    /// whose value resolves to an object identifier. A file that fails to
    /// parse is logged and counted, never fatal; a missing directory is
    /// an empty report.
    pub fn scan_dir(&self, dir: &Path) -> ScanReport {
        let mut report = ScanReport::default();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "skipping MIB directory");
                return report;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match parser::parse_file(&path) {
                Ok(symbols) => {
                    report.loaded += 1;
                    let mut tables = self.tables.write().unwrap();
                    for sym in symbols {
                        let symbol = format!("{}::{}", sym.module, sym.name);
                        tables.oid_to_name.insert(sym.oid.clone(), sym.name.clone());
                        tables.name_to_oid.insert(sym.name, sym.oid.clone());
                        tables.oid_to_symbol.insert(sym.oid, symbol);
                    }
                }
                Err(e) => {
                    report.skipped += 1;
                    warn!(file = %path.display(), error = %e, "skipping unparseable MIB file");
                }
            }
        }
        debug!(dir = %dir.display(), loaded = report.loaded, skipped = report.skipped, "MIB scan");
        report
    }

    /// Add a single entry directly. Used by tests to fabricate an index
    /// without MIB files on disk.
    pub fn insert(&self, numeric_oid: &str, name: &str, symbol: &str) {
        let mut tables = self.tables.write().unwrap();
        tables
            .oid_to_name
            .insert(numeric_oid.to_string(), name.to_string());
        tables
            .name_to_oid
            .insert(name.to_string(), numeric_oid.to_string());
        tables
            .oid_to_symbol
            .insert(numeric_oid.to_string(), symbol.to_string());
    }

    /// Convert a numeric OID into its textual representation: an exact
    /// match returns the name, otherwise the nearest named ancestor is
    /// used with the remaining suffix appended. With no match at all the
    /// input is returned unchanged.
    pub fn prettify(&self, target: &str) -> String {
        let tables = self.tables.read().unwrap();
        if let Some(name) = tables.oid_to_name.get(target) {
            return name.clone();
        }
        let mut ancestor = oid::parent(target);
        while let Some(prefix) = ancestor {
            if let Some(name) = tables.oid_to_name.get(prefix) {
                return format!("{}{}", name, &target[prefix.len()..]);
            }
            ancestor = oid::parent(prefix);
        }
        target.to_string()
    }

    /// The declaring MIB symbol for this OID or its nearest named
    /// ancestor, or `None` if nothing in the index matches.
    pub fn nearest_symbol(&self, target: &str) -> Option<String> {
        let tables = self.tables.read().unwrap();
        if let Some(symbol) = tables.oid_to_symbol.get(target) {
            return Some(symbol.clone());
        }
        let mut ancestor = oid::parent(target);
        while let Some(prefix) = ancestor {
            if let Some(symbol) = tables.oid_to_symbol.get(prefix) {
                return Some(symbol.clone());
            }
            ancestor = oid::parent(prefix);
        }
        None
    }

    /// Exact-match reverse lookup.
    pub fn oid_for_name(&self, name: &str) -> Option<String> {
        self.tables.read().unwrap().name_to_oid.get(name).cloned()
    }

    /// Number of named OIDs in the index.
    pub fn len(&self) -> usize {
        self.tables.read().unwrap().oid_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MibIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fabricated() -> MibIndex {
        let index = MibIndex::new();
        index.insert("1.3.6.1.2.1.1.1", "sysDescr", "SNMPv2-MIB::sysDescr");
        index.insert("1.3.6.1.2.1.1", "system", "SNMPv2-MIB::system");
        index
    }

    #[test]
    fn test_prettify_exact_match() {
        let index = fabricated();
        assert_eq!(index.prettify("1.3.6.1.2.1.1.1"), "sysDescr");
    }

    #[test]
    fn test_prettify_nearest_ancestor_keeps_suffix() {
        let index = fabricated();
        assert_eq!(index.prettify("1.3.6.1.2.1.1.1.0"), "sysDescr.0");
        assert_eq!(index.prettify("1.3.6.1.2.1.1.9.1.2.3"), "system.9.1.2.3");
    }

    #[test]
    fn test_prettify_unknown_returns_input() {
        let index = fabricated();
        assert_eq!(index.prettify("1.3.6.1.4.1.4242"), "1.3.6.1.4.1.4242");
        assert_eq!(MibIndex::new().prettify("1.3.6"), "1.3.6");
    }

    #[test]
    fn test_prettify_is_deterministic() {
        let index = fabricated();
        let first = index.prettify("1.3.6.1.2.1.1.1.0");
        let second = index.prettify("1.3.6.1.2.1.1.1.0");
        assert_eq!(first, second);
    }

    #[test]
    fn test_nearest_symbol_distinguishes_miss() {
        let index = fabricated();
        assert_eq!(
            index.nearest_symbol("1.3.6.1.2.1.1.1.0").as_deref(),
            Some("SNMPv2-MIB::sysDescr")
        );
        assert_eq!(index.nearest_symbol("1.3.6.1.4.1.4242"), None);
    }

    #[test]
    fn test_oid_for_name_exact_only() {
        let index = fabricated();
        assert_eq!(
            index.oid_for_name("sysDescr").as_deref(),
            Some("1.3.6.1.2.1.1.1")
        );
        assert_eq!(index.oid_for_name("sysDescr.0"), None);
    }

    #[test]
    fn test_scan_missing_directory_is_empty_report() {
        let index = MibIndex::new();
        let report = index.scan_dir(Path::new("/nonexistent/mib/dir"));
        assert_eq!(report, ScanReport::default());
        assert!(index.is_empty());
    }
}
