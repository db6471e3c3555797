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

//! The transport seam between the engine and the SNMP wire protocol.
//!
//! [`SnmpTransport`] is the one call shape the rest of the crate depends
//! on; [`Snmp2Transport`] backs it with the `snmp2` crate. Tests inject a
//! scripted implementation instead of a live agent.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use snmp2::{AsyncSession, Oid, Value};

use crate::error::{Error, Result};
use crate::session::{SnmpEndpoint, SnmpVersion};
use crate::value::{MetricValue, SnmpValue};

/// SNMPv1 noSuchName: the v1 way of signalling the end of the tree.
const ERR_NO_SUCH_NAME: u32 = 2;

/// One (host, community, port, version) exchange surface.
///
/// `get` resolves exactly the requested OID; `get_next` asks for the
/// lexicographically-next entry and returns `Ok(None)` once the agent
/// signals end-of-tree. Both return decoded (OID, value) pairs.
#[async_trait]
pub trait SnmpTransport: Send {
    async fn get(&mut self, oid: &str) -> Result<MetricValue>;
    async fn get_next(&mut self, oid: &str) -> Result<Option<MetricValue>>;
}

/// Live transport backed by [`snmp2::AsyncSession`].
pub struct Snmp2Transport {
    session: AsyncSession,
    timeout: Duration,
}

impl Snmp2Transport {
    /// Resolve the endpoint and open a UDP session to it.
    pub async fn open(endpoint: &SnmpEndpoint) -> Result<Self> {
        let addr = endpoint.addr();
        let community = endpoint.community.as_bytes();
        let session = match endpoint.version {
            SnmpVersion::V1 => AsyncSession::new_v1(&addr, community, 0).await,
            SnmpVersion::V2c => AsyncSession::new_v2c(&addr, community, 0).await,
        }
        .map_err(|e| Error::HostUnreachable(format!("{addr}: {e}")))?;

        Ok(Self {
            session,
            timeout: endpoint.timeout,
        })
    }
}

#[async_trait]
impl SnmpTransport for Snmp2Transport {
    async fn get(&mut self, oid: &str) -> Result<MetricValue> {
        let target = parse_oid(oid)?;
        let pdu = tokio::time::timeout(self.timeout, self.session.get(&target))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|e| Error::Transport(e.to_string()))?;
        if pdu.error_status != 0 {
            return Err(Error::Protocol(format!(
                "agent returned error status {} for {oid}",
                pdu.error_status
            )));
        }
        let (resp_oid, value) = pdu
            .varbinds
            .into_iter()
            .next()
            .ok_or_else(|| Error::Protocol(format!("empty varbind list for {oid}")))?;
        decode_varbind(&resp_oid, &value)
            .ok_or_else(|| Error::Protocol(format!("no value for {oid}")))
    }

    async fn get_next(&mut self, oid: &str) -> Result<Option<MetricValue>> {
        let target = parse_oid(oid)?;
        let pdu = tokio::time::timeout(self.timeout, self.session.getnext(&target))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|e| Error::Transport(e.to_string()))?;
        if pdu.error_status == ERR_NO_SUCH_NAME {
            return Ok(None);
        }
        if pdu.error_status != 0 {
            return Err(Error::Transport(format!(
                "agent returned error status {} after {oid}",
                pdu.error_status
            )));
        }
        let Some((resp_oid, value)) = pdu.varbinds.into_iter().next() else {
            return Ok(None);
        };
        let Some(entry) = decode_varbind(&resp_oid, &value) else {
            return Ok(None);
        };
        // a non-advancing agent would otherwise walk us in circles
        if entry.oid() == oid {
            return Ok(None);
        }
        Ok(Some(entry))
    }
}

/// Parse a dotted-decimal string into a wire OID.
fn parse_oid(s: &str) -> Result<Oid<'static>> {
    let parts: std::result::Result<Vec<u64>, _> = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect();
    let parts = parts.map_err(|_| Error::Protocol(format!("invalid OID: {s}")))?;
    if parts.is_empty() {
        return Err(Error::Protocol(format!("invalid OID: {s}")));
    }
    Oid::from(&parts).map_err(|_| Error::Protocol(format!("invalid OID: {s}")))
}

/// Map a wire varbind into the engine's value model. End-of-tree markers
/// decode to `None`.
fn decode_varbind(oid: &Oid<'_>, value: &Value<'_>) -> Option<MetricValue> {
    let oid = oid.to_string();
    let value = match value {
        Value::Integer(n) => SnmpValue::Integer(i128::from(*n)),
        Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => {
            SnmpValue::Integer(i128::from(*n))
        }
        Value::Counter64(n) => SnmpValue::Integer(i128::from(*n)),
        Value::OctetString(bytes) => SnmpValue::OctetString(bytes.to_vec()),
        Value::ObjectIdentifier(target) => SnmpValue::ObjectIdentifier(target.to_string()),
        Value::IpAddress(octets) => SnmpValue::IpAddress(Ipv4Addr::from(*octets)),
        Value::Null => SnmpValue::Null,
        Value::EndOfMibView | Value::NoSuchObject | Value::NoSuchInstance => return None,
        other => SnmpValue::Other(format!("{other:?}")),
    };
    Some(MetricValue::new(oid, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_oid_rejects_garbage() {
        assert!(parse_oid("1.3.6.1").is_ok());
        assert!(parse_oid("not.an.oid").is_err());
        assert!(parse_oid("").is_err());
    }

    #[test]
    fn test_decode_end_of_tree_markers() {
        let oid = Oid::from(&[1u64, 3, 6, 1]).unwrap();
        assert!(decode_varbind(&oid, &Value::EndOfMibView).is_none());
        assert!(decode_varbind(&oid, &Value::NoSuchObject).is_none());
        assert!(decode_varbind(&oid, &Value::NoSuchInstance).is_none());
    }

    #[test]
    fn test_decode_integer_kinds_collapse() {
        let oid = Oid::from(&[1u64, 3, 6, 1]).unwrap();
        let mv = decode_varbind(&oid, &Value::Counter64(u64::MAX)).unwrap();
        assert_eq!(mv.number(), i128::from(u64::MAX));
        let mv = decode_varbind(&oid, &Value::Integer(-7)).unwrap();
        assert_eq!(mv.number(), -7);
        assert_eq!(mv.oid(), "1.3.6.1");
    }
}
