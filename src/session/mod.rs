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

//! Session wrapper around an SNMP transport.
//!
//! A [`SnmpSession`] targets one (host, community, port, version) endpoint.
//! Its two calls deliberately differ in temperament: [`SnmpSession::get`]
//! fails loudly, while [`SnmpSession::get_next`] absorbs transport hiccups
//! so a single flaky response cannot kill a long walk. A session whose
//! initialization failed remembers that failure and returns it on every
//! subsequent call instead of retrying silently.

pub mod transport;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::config::AppConfig;
use crate::error::{Error, Result};
use crate::value::MetricValue;

pub use transport::{Snmp2Transport, SnmpTransport};

/// Protocol revision to speak. SNMPv3 is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnmpVersion {
    V1,
    V2c,
}

/// Connection details for one SNMP agent.
#[derive(Debug, Clone)]
pub struct SnmpEndpoint {
    pub host: String,
    pub community: String,
    pub port: u16,
    pub version: SnmpVersion,
    pub timeout: Duration,
}

impl SnmpEndpoint {
    /// An endpoint for the given host with the default community string
    /// on the default port, speaking SNMPv1.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            community: AppConfig::DEFAULT_COMMUNITY.to_string(),
            port: AppConfig::SNMP_PORT,
            version: SnmpVersion::V1,
            timeout: Duration::from_secs(AppConfig::REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_community(mut self, community: impl Into<String>) -> Self {
        self.community = community.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_version(mut self, version: SnmpVersion) -> Self {
        self.version = version;
        self
    }

    /// The `host:port` form handed to the transport.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The outcome of one GET-NEXT probe during a walk.
#[derive(Debug)]
pub enum WalkStep {
    /// The next entry in the agent's tree.
    Entry(MetricValue),
    /// A non-fatal failure was absorbed; the probe produced nothing.
    Skipped,
    /// The agent signalled end-of-tree. Normal termination, not an error.
    End,
}

enum SessionState {
    Ready(Box<dyn SnmpTransport>),
    /// Initialization failed; the message is replayed on every call.
    Failed(String),
}

/// A session against one SNMP endpoint.
pub struct SnmpSession {
    endpoint: SnmpEndpoint,
    state: SessionState,
}

impl SnmpSession {
    /// Open a session. Resolution or socket failures are not returned
    /// here; they poison the session, and every later call reports them.
    pub async fn connect(endpoint: SnmpEndpoint) -> Self {
        let state = match Snmp2Transport::open(&endpoint).await {
            Ok(transport) => SessionState::Ready(Box::new(transport)),
            Err(e) => {
                warn!(host = %endpoint.host, error = %e, "session initialization failed");
                SessionState::Failed(e.to_string())
            }
        };
        Self { endpoint, state }
    }

    /// Build a session over an already-open transport. This is how tests
    /// substitute a scripted transport for a live agent.
    pub fn with_transport(endpoint: SnmpEndpoint, transport: Box<dyn SnmpTransport>) -> Self {
        Self {
            endpoint,
            state: SessionState::Ready(transport),
        }
    }

    pub fn endpoint(&self) -> &SnmpEndpoint {
        &self.endpoint
    }

    /// Whether initialization succeeded.
    pub fn is_usable(&self) -> bool {
        matches!(self.state, SessionState::Ready(_))
    }

    /// Fetch a single value. Fails loudly: unreachable hosts, timeouts and
    /// undecodable responses all surface to the caller.
    pub async fn get(&mut self, oid: &str) -> Result<MetricValue> {
        match &mut self.state {
            SessionState::Ready(transport) => transport.get(oid).await,
            SessionState::Failed(msg) => Err(Error::HostUnreachable(msg.clone())),
        }
    }

    /// Probe for the entry after `oid`. Transport failures are absorbed
    /// into [`WalkStep::Skipped`] (logged, not propagated); only a session
    /// that never initialized returns an error.
    pub async fn get_next(&mut self, oid: &str) -> Result<WalkStep> {
        match &mut self.state {
            SessionState::Ready(transport) => match transport.get_next(oid).await {
                Ok(Some(entry)) => Ok(WalkStep::Entry(entry)),
                Ok(None) => Ok(WalkStep::End),
                Err(e) => {
                    warn!(oid, error = %e, "absorbing get-next failure");
                    Ok(WalkStep::Skipped)
                }
            },
            SessionState::Failed(msg) => Err(Error::HostUnreachable(msg.clone())),
        }
    }
}
