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

//! The typed result of a single SNMP query.
//!
//! A [`MetricValue`] pairs an OID with a tagged [`SnmpValue`] captured at
//! one instant. Values are immutable; a later poll of the same OID produces
//! a new `MetricValue` and the owner swaps its reference.

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::oid;

/// OIDs whose children carry DateAndTime-encoded octet strings:
/// hrSystemDate, hrFSLastFullBackupDate, hrFSLastPartialBackupDate and
/// hrSWInstalledDate from HOST-RESOURCES-MIB.
const DATE_PARENT_OIDS: [&str; 4] = [
    "1.3.6.1.2.1.25.1.2",
    "1.3.6.1.2.1.25.3.8.1.8",
    "1.3.6.1.2.1.25.3.8.1.9",
    "1.3.6.1.2.1.25.6.3.1.5",
];

/// A decoded SNMP value, collapsed to the kinds the engine cares about.
///
/// All integral wire types (Integer32, Counter32, Gauge32, TimeTicks,
/// Counter64) arrive as [`SnmpValue::Integer`]; `i128` holds every value a
/// 64-bit counter can take, so deltas never overflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnmpValue {
    Integer(i128),
    OctetString(Vec<u8>),
    /// Another OID, used for indirection.
    ObjectIdentifier(String),
    IpAddress(Ipv4Addr),
    Null,
    /// Anything the transport decoded but we do not model, kept as its
    /// debug rendering.
    Other(String),
}

impl SnmpValue {
    /// Short type tag, as shown by the CLI tools and detail views.
    pub fn type_string(&self) -> &'static str {
        match self {
            SnmpValue::Integer(_) => "Integer",
            SnmpValue::OctetString(_) => "OctetString",
            SnmpValue::ObjectIdentifier(_) => "ObjectIdentifier",
            SnmpValue::IpAddress(_) => "IPAddress",
            SnmpValue::Null => "Null",
            SnmpValue::Other(_) => "Opaque",
        }
    }
}

/// An (OID, value) pair captured by one GET or GET-NEXT exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    oid: String,
    value: SnmpValue,
}

impl MetricValue {
    pub fn new(oid: impl Into<String>, value: SnmpValue) -> Self {
        Self {
            oid: oid.into(),
            value,
        }
    }

    /// The OID in dotted-decimal form.
    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn value(&self) -> &SnmpValue {
        &self.value
    }

    /// Short type tag of the value.
    pub fn type_string(&self) -> &'static str {
        self.value.type_string()
    }

    /// Whether the value is something a rate/value chart can use.
    pub fn is_numeric(&self) -> bool {
        matches!(self.value, SnmpValue::Integer(_))
    }

    /// The numeric value, or 0 if the value is not a number.
    pub fn number(&self) -> i128 {
        match self.value {
            SnmpValue::Integer(n) => n,
            _ => 0,
        }
    }

    /// A plain string rendering of the value. Octet strings are shown as
    /// UTF-8 (lossily) and truncated at the first NUL byte.
    pub fn value_string(&self) -> String {
        match &self.value {
            SnmpValue::Integer(n) => n.to_string(),
            SnmpValue::OctetString(bytes) => {
                let text = String::from_utf8_lossy(bytes);
                match text.find('\0') {
                    Some(pos) => text[..pos].to_string(),
                    None => text.into_owned(),
                }
            }
            SnmpValue::ObjectIdentifier(target) => target.clone(),
            SnmpValue::IpAddress(addr) => addr.to_string(),
            SnmpValue::Null => "Null".to_string(),
            SnmpValue::Other(repr) => repr.clone(),
        }
    }

    /// A display-friendly rendering: values under the well-known date OIDs
    /// are decoded from their DateAndTime octet encoding, everything else
    /// falls back to [`MetricValue::value_string`].
    pub fn nice_string(&self) -> String {
        if let SnmpValue::OctetString(bytes) = &self.value {
            if self.is_date() {
                return octet_date(bytes);
            }
        }
        self.value_string()
    }

    /// Raw hex rendering of an octet-string value.
    pub fn hex_string(&self) -> Option<String> {
        match &self.value {
            SnmpValue::OctetString(bytes) => Some(
                bytes
                    .iter()
                    .map(|b| format!("{b:02x}"))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            _ => None,
        }
    }

    /// Whether this OID sits under one of the parents known to hold
    /// DateAndTime-encoded values.
    pub fn is_date(&self) -> bool {
        match oid::parent(&self.oid) {
            Some(parent) => DATE_PARENT_OIDS.contains(&parent),
            None => false,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.oid)
    }
}

/// Decode a DateAndTime octet payload (see the SNMPv2-TC textual
/// convention) into `YYYY-MM-DD HH:MM:SS`. Payloads shorter than the
/// mandatory eight octets yield an empty string.
pub fn octet_date(bytes: &[u8]) -> String {
    if bytes.len() < 8 {
        return String::new();
    }
    let year = 256 * u32::from(bytes[0]) + u32::from(bytes[1]);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        year, bytes[2], bytes[3], bytes[4], bytes[5], bytes[6]
    )
}
