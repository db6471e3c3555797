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

//! Unified error types for the snmpscope library.
//!
//! Walk termination is not an error: a GET-NEXT that runs off the end of
//! the agent's tree is reported through [`crate::session::WalkStep::End`],
//! and per-file MIB parse failures are absorbed by the directory scan and
//! only counted. Everything here is a real failure.

use thiserror::Error;

/// The main error type for snmpscope operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The target host could not be resolved or a socket to it could not
    /// be opened. A session that failed this way remembers the failure and
    /// returns it on every subsequent call.
    #[error("host unreachable: {0}")]
    HostUnreachable(String),

    /// The request was sent but no response arrived in time.
    #[error("request timed out")]
    Timeout,

    /// The underlying SNMP exchange failed below the protocol level.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived but could not be decoded into an (OID, value)
    /// pair, or a caller-supplied OID string is not dotted-decimal.
    #[error("malformed response: {0}")]
    Protocol(String),

    /// A MIB file could not be parsed. Directory scans absorb this per
    /// file; it never aborts a scan.
    #[error("MIB parse failed: {0}")]
    MibParse(String),

    /// An I/O error occurred while reading MIB files or directories.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for snmpscope operations.
pub type Result<T> = std::result::Result<T, Error>;
