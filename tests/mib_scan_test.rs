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

//! Directory scanning against real files on disk.

use std::fs;

use snmpscope::{MibIndex, ScanReport};
use tempfile::tempdir;

const GOOD_MIB: &str = r#"
DEMO-MIB DEFINITIONS ::= BEGIN

demo OBJECT IDENTIFIER ::= { enterprises 4242 }

demoUptime OBJECT-TYPE
    SYNTAX      TimeTicks
    MAX-ACCESS  read-only
    STATUS      current
    DESCRIPTION "Uptime."
    ::= { demo 1 }

END
"#;

#[test]
fn test_scan_counts_loaded_and_skipped() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("DEMO-MIB.txt"), GOOD_MIB).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a MIB file at all").unwrap();

    let index = MibIndex::new();
    let report = index.scan_dir(dir.path());
    assert_eq!(report, ScanReport { loaded: 1, skipped: 1 });
    assert_eq!(index.len(), 2);
}

#[test]
fn test_scanned_symbols_resolve_names() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("DEMO-MIB.txt"), GOOD_MIB).unwrap();

    let index = MibIndex::new();
    index.scan_dir(dir.path());

    assert_eq!(index.prettify("1.3.6.1.4.1.4242"), "demo");
    assert_eq!(index.prettify("1.3.6.1.4.1.4242.1.0"), "demoUptime.0");
    assert_eq!(
        index.oid_for_name("demoUptime").as_deref(),
        Some("1.3.6.1.4.1.4242.1")
    );
    assert_eq!(
        index.nearest_symbol("1.3.6.1.4.1.4242.1.0").as_deref(),
        Some("DEMO-MIB::demoUptime")
    );
}

#[test]
fn test_rescan_extends_never_retracts() {
    let dir_a = tempdir().unwrap();
    fs::write(dir_a.path().join("DEMO-MIB.txt"), GOOD_MIB).unwrap();

    let other = "\
OTHER-MIB DEFINITIONS ::= BEGIN\n\
other OBJECT IDENTIFIER ::= { enterprises 5151 }\n\
END\n";
    let dir_b = tempdir().unwrap();
    fs::write(dir_b.path().join("OTHER-MIB.txt"), other).unwrap();

    let index = MibIndex::new();
    index.scan_dir(dir_a.path());
    let before = index.len();
    index.scan_dir(dir_b.path());

    assert!(index.len() > before);
    // entries from the first scan survive the second
    assert_eq!(index.prettify("1.3.6.1.4.1.4242"), "demo");
    assert_eq!(index.prettify("1.3.6.1.4.1.5151"), "other");
}
