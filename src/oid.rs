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

//! Arithmetic over dotted-decimal OID strings.
//!
//! The textual form is the canonical identity throughout the crate: two
//! OIDs are equal iff their strings are equal, and parent/instance are
//! plain substring operations on the last `.` separator.

/// Return the parent of the given OID, or `None` for a single-component OID.
///
/// ```
/// assert_eq!(snmpscope::oid::parent("1.3.6"), Some("1.3"));
/// assert_eq!(snmpscope::oid::parent("1"), None);
/// ```
pub fn parent(oid: &str) -> Option<&str> {
    oid.rsplit_once('.').map(|(head, _)| head)
}

/// Return the trailing instance component of the given OID, or `None` if
/// there is no `.` separator.
pub fn instance(oid: &str) -> Option<&str> {
    oid.rsplit_once('.').map(|(_, tail)| tail)
}

/// Parent of the parent; `None` for OIDs with fewer than three components.
pub fn grandparent(oid: &str) -> Option<&str> {
    parent(oid).and_then(parent)
}
