//! Shared fixtures: a scripted transport and a small report.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use neptune_core::{Credentials, Error, Galaxy, Result, Transport};
use serde_json::{json, Value};

/// Answers every request with the current report; counts calls.
pub struct FakeServer {
    report: Mutex<Value>,
    failures: AtomicUsize,
    calls: AtomicUsize,
    delay: Duration,
    last_request: Mutex<Option<Recorded>>,
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
    pub cookies: String,
}

impl FakeServer {
    pub fn new(report: Value) -> Arc<Self> {
        Self::with_delay(report, Duration::ZERO)
    }

    pub fn with_delay(report: Value, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            report: Mutex::new(report),
            failures: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            delay,
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Fail the next `n` requests with an auth error.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn set_report(&self, report: Value) {
        *self.report.lock().unwrap() = report;
    }

    pub fn last_request(&self) -> Option<Recorded> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeServer {
    async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        credentials: &Credentials,
    ) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(Recorded {
            endpoint: endpoint.to_string(),
            params: params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            cookies: credentials.cookie_header(),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::Api {
                endpoint: endpoint.to_string(),
                message: "must_be_logged_in".to_string(),
            });
        }

        let report = self.report.lock().unwrap().clone();
        Ok(report)
    }
}

pub fn credentials() -> Credentials {
    Credentials::default().with_cookie("auth", "cookie-value")
}

pub fn galaxy(server: &Arc<FakeServer>) -> Galaxy {
    Galaxy::new(1234, credentials(), server.clone())
}

pub fn sample_report() -> Value {
    json!({
        "game_over": false,
        "started": true,
        "paused": false,
        "now": 1_620_000_000_000_i64,
        "start_time": 1_619_990_000_000_i64,
        "turn_based": 1,
        "player_uid": 1,
        "admin": 0,
        "tick": 42,
        "players": {
            "0": {"uid": 0, "alias": "Admiral"},
            "1": {"uid": 1, "alias": "Captain"}
        },
        "stars": {
            "0": {"uid": 0, "n": "Sol", "puid": 0, "x": "0.0", "y": "0.0", "v": "1",
                  "e": 5, "i": 3, "s": 1, "st": 12, "nr": 40, "r": 45, "g": 0, "c": 1},
            "1": {"uid": 1, "n": "Vega", "puid": -1, "x": "3.0", "y": "4.0", "v": "0"},
            "2": {"uid": 2, "n": "Rigel", "puid": 1, "x": "1", "y": "1"}
        },
        "fleets": {
            "4": {"uid": 4, "n": "Sol I", "puid": 0, "st": 10,
                  "x": "0.5", "y": "0.5", "lx": "0.25", "ly": "0.25", "p": [1, 2]},
            "9": {"uid": 9, "n": "Rigel II", "puid": 1, "st": 3,
                  "x": "1", "y": "1", "lx": "1", "ly": "1", "p": ["0"]}
        }
    })
}
