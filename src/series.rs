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

//! Per-OID bounded-retention time series.
//!
//! Each attached OID owns a ring of (timestamp, value) samples. In rate
//! mode a raw counter snapshot becomes a per-second rate against the
//! previous snapshot; in absolute mode it is stored as-is. Samples older
//! than the retention window are evicted on every ingest.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a tracked OID's samples are derived from its raw counter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesMode {
    /// Per-second first derivative of the counter.
    Rate,
    /// The raw value itself.
    Absolute,
}

/// One point in a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp_ms: i64,
    pub value: f64,
}

#[derive(Debug)]
struct Series {
    mode: SeriesMode,
    samples: VecDeque<Sample>,
    last_counter: Option<(i64, i128)>,
    charted: bool,
}

impl Series {
    fn new(mode: SeriesMode) -> Self {
        Self {
            mode,
            samples: VecDeque::new(),
            last_counter: None,
            charted: true,
        }
    }
}

/// Bounded-duration sample store for a set of tracked OIDs.
pub struct SeriesEngine {
    retention_ms: i64,
    series: HashMap<String, Series>,
}

impl SeriesEngine {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention_ms: retention.as_millis() as i64,
            series: HashMap::new(),
        }
    }

    /// Start tracking an OID. Re-attaching an already-tracked OID keeps
    /// its history and switches its mode.
    pub fn attach(&mut self, oid: &str, mode: SeriesMode) {
        self.series
            .entry(oid.to_string())
            .and_modify(|s| s.mode = mode)
            .or_insert_with(|| Series::new(mode));
    }

    /// Stop tracking an OID, discarding its samples.
    pub fn detach(&mut self, oid: &str) {
        self.series.remove(oid);
    }

    pub fn is_attached(&self, oid: &str) -> bool {
        self.series.contains_key(oid)
    }

    /// Every tracked OID, hidden ones included.
    pub fn attached_oids(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }

    /// The subset of tracked OIDs currently marked for display.
    pub fn charted_oids(&self) -> Vec<String> {
        self.series
            .iter()
            .filter(|(_, s)| s.charted)
            .map(|(oid, _)| oid.clone())
            .collect()
    }

    /// Toggle a series between charted and hidden. Hidden series keep
    /// ingesting so their history is intact when re-enabled.
    pub fn set_charted(&mut self, oid: &str, charted: bool) {
        if let Some(series) = self.series.get_mut(oid) {
            series.charted = charted;
        }
    }

    pub fn is_charted(&self, oid: &str) -> Option<bool> {
        self.series.get(oid).map(|s| s.charted)
    }

    /// Feed one raw counter snapshot. Returns the sample value recorded,
    /// or `None` if the OID is not attached.
    ///
    /// The very first snapshot of a rate series has nothing to delta
    /// against and records exactly `0.0`; so does a snapshot whose
    /// elapsed time is not positive. The subtraction happens in `i128`
    /// before the floating-point division, so 64-bit counters cannot
    /// overflow it.
    pub fn ingest(&mut self, oid: &str, counter: i128, timestamp_ms: i64) -> Option<f64> {
        let retention_ms = self.retention_ms;
        let series = match self.series.get_mut(oid) {
            Some(series) => series,
            None => {
                debug!(oid, "ignoring sample for unattached OID");
                return None;
            }
        };

        let value = match series.mode {
            SeriesMode::Absolute => counter as f64,
            SeriesMode::Rate => {
                let rate = match series.last_counter {
                    Some((last_ts, last_value)) if timestamp_ms > last_ts => {
                        let delta = counter - last_value;
                        1000.0 * (delta as f64) / ((timestamp_ms - last_ts) as f64)
                    }
                    _ => 0.0,
                };
                series.last_counter = Some((timestamp_ms, counter));
                rate
            }
        };

        series.samples.push_back(Sample {
            timestamp_ms,
            value,
        });
        let horizon = timestamp_ms - retention_ms;
        while series
            .samples
            .front()
            .is_some_and(|s| s.timestamp_ms < horizon)
        {
            series.samples.pop_front();
        }
        Some(value)
    }

    /// The samples currently retained for an OID.
    pub fn samples(&self, oid: &str) -> Option<&VecDeque<Sample>> {
        self.series.get(oid).map(|s| &s.samples)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_millis(self.retention_ms as u64)
    }

    /// Change the retention window. Applies retroactively: samples now
    /// outside the window (relative to each series' newest sample) are
    /// evicted immediately.
    pub fn set_retention(&mut self, retention: Duration) {
        self.retention_ms = retention.as_millis() as i64;
        for series in self.series.values_mut() {
            let Some(newest) = series.samples.back().map(|s| s.timestamp_ms) else {
                continue;
            };
            let horizon = newest - self.retention_ms;
            while series
                .samples
                .front()
                .is_some_and(|s| s.timestamp_ms < horizon)
            {
                series.samples.pop_front();
            }
        }
    }
}
