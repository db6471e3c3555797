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

//! Timer-driven polling of tracked OIDs into a series engine.
//!
//! The poller runs as a background task. Every tick it asks the shared
//! [`SeriesEngine`] which OIDs are attached, issues one GET per OID over
//! the shared session, ingests the results, and emits one [`PollEvent`]
//! per OID on a bounded channel. A failed GET is reported and skipped;
//! it never stops the poller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::common::config::AppConfig;
use crate::series::SeriesEngine;
use crate::session::SnmpSession;

/// What one tick produced for one tracked OID.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// A sample was ingested; `value` is the recorded sample (a rate for
    /// rate-mode series, the raw value otherwise).
    Sample { oid: String, value: f64 },
    /// This tick's GET for the OID failed. The series simply has a gap.
    TickFailed { oid: String, error: String },
}

/// Handle to a running background polling task.
pub struct Poller {
    interval_ms: Arc<AtomicU64>,
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn the polling task. Returns the handle and the event stream.
    ///
    /// The session and engine are shared: callers keep issuing one-shot
    /// GETs and reading samples while the poller runs. Events beyond the
    /// channel's capacity are dropped (the sample is already in the
    /// engine by then).
    pub fn spawn(
        session: Arc<Mutex<SnmpSession>>,
        engine: Arc<Mutex<SeriesEngine>>,
        interval: Duration,
    ) -> (Self, mpsc::Receiver<PollEvent>) {
        let interval_ms = Arc::new(AtomicU64::new(interval.as_millis() as u64));
        let (stop_tx, stop_rx) = watch::channel(false);
        let (event_tx, event_rx) = mpsc::channel(AppConfig::POLL_EVENT_QUEUE_DEPTH);

        let handle = tokio::spawn(run_loop(
            session,
            engine,
            Arc::clone(&interval_ms),
            stop_rx,
            event_tx,
        ));

        (
            Self {
                interval_ms,
                stop_tx,
                handle,
            },
            event_rx,
        )
    }

    /// Change the tick interval. Takes effect after the tick currently
    /// being waited for, not retroactively.
    pub fn set_interval(&self, interval: Duration) {
        self.interval_ms
            .store(interval.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::Relaxed))
    }

    /// Stop the task and wait for it to finish its current tick.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "polling task did not shut down cleanly");
        }
    }
}

async fn run_loop(
    session: Arc<Mutex<SnmpSession>>,
    engine: Arc<Mutex<SeriesEngine>>,
    interval_ms: Arc<AtomicU64>,
    mut stop_rx: watch::Receiver<bool>,
    event_tx: mpsc::Sender<PollEvent>,
) {
    info!("poller started");
    loop {
        let sleep_for = Duration::from_millis(interval_ms.load(Ordering::Relaxed));
        tokio::select! {
            _ = tokio::time::sleep(sleep_for) => {}
            _ = stop_rx.changed() => {
                info!("poller stopping");
                return;
            }
        }

        let oids = engine.lock().await.attached_oids();
        if oids.is_empty() {
            continue;
        }
        debug!(oids = oids.len(), "poll tick");

        for oid in oids {
            let fetched = session.lock().await.get(&oid).await;
            let event = match fetched {
                Ok(metric) => {
                    let now_ms = Utc::now().timestamp_millis();
                    match engine.lock().await.ingest(&oid, metric.number(), now_ms) {
                        Some(value) => PollEvent::Sample { oid, value },
                        // detached between the listing and the GET
                        None => continue,
                    }
                }
                Err(e) => {
                    warn!(oid, error = %e, "poll GET failed");
                    PollEvent::TickFailed {
                        oid,
                        error: e.to_string(),
                    }
                }
            };
            if event_tx.try_send(event).is_err() {
                debug!("poll event queue full, dropping event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SeriesMode;
    use crate::session::{SnmpEndpoint, SnmpTransport};
    use crate::value::{MetricValue, SnmpValue};
    use async_trait::async_trait;

    /// Returns a counter that climbs by a fixed step per GET.
    struct ClimbingCounter {
        value: i128,
        step: i128,
    }

    #[async_trait]
    impl SnmpTransport for ClimbingCounter {
        async fn get(&mut self, oid: &str) -> crate::error::Result<MetricValue> {
            self.value += self.step;
            Ok(MetricValue::new(oid, SnmpValue::Integer(self.value)))
        }

        async fn get_next(&mut self, _oid: &str) -> crate::error::Result<Option<MetricValue>> {
            Ok(None)
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl SnmpTransport for AlwaysFails {
        async fn get(&mut self, _oid: &str) -> crate::error::Result<MetricValue> {
            Err(crate::error::Error::Timeout)
        }

        async fn get_next(&mut self, _oid: &str) -> crate::error::Result<Option<MetricValue>> {
            Ok(None)
        }
    }

    fn session_with(transport: Box<dyn SnmpTransport>) -> Arc<Mutex<SnmpSession>> {
        let endpoint = SnmpEndpoint::new("127.0.0.1");
        Arc::new(Mutex::new(SnmpSession::with_transport(endpoint, transport)))
    }

    const OID: &str = "1.3.6.1.2.1.2.2.1.10.1";

    #[tokio::test]
    async fn test_poller_emits_samples() {
        let session = session_with(Box::new(ClimbingCounter {
            value: 0,
            step: 100,
        }));
        let engine = Arc::new(Mutex::new(SeriesEngine::new(Duration::from_secs(60))));
        engine.lock().await.attach(OID, SeriesMode::Absolute);

        let (poller, mut events) = Poller::spawn(
            Arc::clone(&session),
            Arc::clone(&engine),
            Duration::from_millis(5),
        );

        let first = events.recv().await.expect("poller dropped its channel");
        match first {
            PollEvent::Sample { ref oid, value } => {
                assert_eq!(oid, OID);
                assert_eq!(value, 100.0);
            }
            other => panic!("expected a sample, got {other:?}"),
        }

        poller.stop().await;
        assert!(!engine.lock().await.samples(OID).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_tick_is_reported_not_fatal() {
        let session = session_with(Box::new(AlwaysFails));
        let engine = Arc::new(Mutex::new(SeriesEngine::new(Duration::from_secs(60))));
        engine.lock().await.attach(OID, SeriesMode::Rate);

        let (poller, mut events) = Poller::spawn(
            Arc::clone(&session),
            Arc::clone(&engine),
            Duration::from_millis(5),
        );

        // two consecutive failures prove the loop keeps running
        for _ in 0..2 {
            match events.recv().await.expect("poller dropped its channel") {
                PollEvent::TickFailed { ref oid, ref error } => {
                    assert_eq!(oid, OID);
                    assert!(error.contains("timed out"));
                }
                other => panic!("expected a failure event, got {other:?}"),
            }
        }
        poller.stop().await;
        assert!(engine.lock().await.samples(OID).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_interval_applies_to_next_tick() {
        let session = session_with(Box::new(ClimbingCounter { value: 0, step: 1 }));
        let engine = Arc::new(Mutex::new(SeriesEngine::new(Duration::from_secs(60))));

        let (poller, _events) =
            Poller::spawn(session, engine, Duration::from_secs(3600));
        assert_eq!(poller.interval(), Duration::from_secs(3600));
        poller.set_interval(Duration::from_millis(10));
        assert_eq!(poller.interval(), Duration::from_millis(10));
        poller.stop().await;
    }
}
