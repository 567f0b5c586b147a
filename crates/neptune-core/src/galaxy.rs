//! Galaxy - root of the entity graph; owns the fetched report.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::ClientConfig;
use crate::entity::{Fleet, Player, Star};
use crate::error::{Error, Result};
use crate::report::Report;
use crate::transport::{Credentials, HttpTransport, Transport, FULL_UNIVERSE_REPORT, ORDER_ENDPOINT};

/// Lifecycle of a game as seen in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Finished,
    NotStarted,
    Paused,
    Running,
}

impl GameState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finished => "finished",
            Self::NotStarted => "not started",
            Self::Paused => "paused",
            Self::Running => "running",
        }
    }

    /// Evaluated in order; a finished game that is also paused is finished.
    pub fn from_report(report: &Report) -> Self {
        if report.flag("game_over") {
            Self::Finished
        } else if !report.flag("started") {
            Self::NotStarted
        } else if report.flag("paused") {
            Self::Paused
        } else {
            Self::Running
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to one game's report.
///
/// Cloning is cheap and every clone shares the same cached report. The
/// report is fetched on first use and only replaced by [`Galaxy::update_state`].
#[derive(Clone)]
pub struct Galaxy {
    inner: Arc<Inner>,
}

struct Inner {
    game_number: u64,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
    // Held across the fetch so concurrent first reads share one request.
    report: Mutex<Option<Arc<Report>>>,
    generation: AtomicU64,
}

impl Galaxy {
    pub fn new(game_number: u64, credentials: Credentials, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(Inner {
                game_number,
                credentials,
                transport,
                report: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Build a galaxy that talks to the configured server over HTTP.
    pub fn connect(
        game_number: u64,
        credentials: Credentials,
        config: &ClientConfig,
    ) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(game_number, credentials, Arc::new(transport)))
    }

    pub fn game_number(&self) -> u64 {
        self.inner.game_number
    }

    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// Generation of the held report; 0 before the first successful fetch.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Fetch a fresh report, replacing whatever was held.
    ///
    /// On failure the previously held report (if any) is left untouched.
    pub async fn update_state(&self) -> Result<()> {
        let mut slot = self.inner.report.lock().await;
        self.fetch_into(&mut slot).await?;
        Ok(())
    }

    /// The current report, fetching it once if nothing has been fetched yet.
    pub async fn report(&self) -> Result<Arc<Report>> {
        let mut slot = self.inner.report.lock().await;
        if let Some(report) = slot.as_ref() {
            return Ok(Arc::clone(report));
        }
        self.fetch_into(&mut slot).await
    }

    async fn fetch_into(&self, slot: &mut Option<Arc<Report>>) -> Result<Arc<Report>> {
        let game_number = self.inner.game_number;
        let params = [
            ("order", FULL_UNIVERSE_REPORT.to_string()),
            ("game_number", game_number.to_string()),
        ];

        tracing::info!(game_number, "Fetching full universe report");

        let payload = self
            .inner
            .transport
            .request(ORDER_ENDPOINT, &params, &self.inner.credentials)
            .await
            .inspect_err(|e| tracing::warn!(game_number, error = %e, "Report fetch failed"))?;

        let generation = self.generation() + 1;
        let report = Arc::new(Report::from_value(payload, generation)?);

        *slot = Some(Arc::clone(&report));
        self.inner.generation.store(generation, Ordering::Release);

        tracing::debug!(
            game_number,
            generation,
            stars = report.collection_len("stars"),
            fleets = report.collection_len("fleets"),
            "Report replaced"
        );

        Ok(report)
    }

    /// Resolve a named field: computed galaxy fields first, then the raw report.
    pub async fn field(&self, name: &str) -> Result<Value> {
        let report = self.report().await?;
        match name {
            "game_state" => Ok(Value::from(GameState::from_report(&report).as_str())),
            "now" => seconds(&report, "now").map(Value::from),
            "start_time" => seconds(&report, "start_time").map(Value::from),
            "turn_based" => Ok(Value::Bool(turn_based(&report))),
            "player" => report
                .get("player_uid")
                .cloned()
                .ok_or_else(|| Error::field_not_found("Galaxy", "player")),
            _ => report
                .get(name)
                .cloned()
                .ok_or_else(|| Error::field_not_found("Galaxy", name)),
        }
    }

    pub async fn game_state(&self) -> Result<GameState> {
        Ok(GameState::from_report(&*self.report().await?))
    }

    /// Server time in epoch seconds.
    pub async fn now(&self) -> Result<f64> {
        seconds(&*self.report().await?, "now")
    }

    /// Game start in epoch seconds.
    pub async fn start_time(&self) -> Result<f64> {
        seconds(&*self.report().await?, "start_time")
    }

    pub async fn now_utc(&self) -> Result<DateTime<Utc>> {
        timestamp(&*self.report().await?, "now")
    }

    pub async fn start_time_utc(&self) -> Result<DateTime<Utc>> {
        timestamp(&*self.report().await?, "start_time")
    }

    pub async fn turn_based(&self) -> Result<bool> {
        Ok(turn_based(&*self.report().await?))
    }

    /// The admin of the game.
    pub async fn admin(&self) -> Result<Player> {
        self.player_from_field("admin").await
    }

    /// The player whose credentials fetched the report.
    pub async fn player(&self) -> Result<Player> {
        self.player_from_field("player_uid").await
    }

    async fn player_from_field(&self, name: &str) -> Result<Player> {
        let report = self.report().await?;
        let index = report
            .get(name)
            .ok_or_else(|| Error::field_not_found("Galaxy", name))?;
        let index = crate::report::as_i64(index)
            .and_then(|i| u64::try_from(i).ok())
            .ok_or_else(|| Error::invalid_field("Galaxy", name, "not a player index"))?;
        Player::from_report(self.clone(), report, index)
    }

    pub async fn player_at(&self, index: u64) -> Result<Player> {
        Player::from_report(self.clone(), self.report().await?, index)
    }

    pub async fn star(&self, star_id: u64) -> Result<Star> {
        Star::from_report(self.clone(), self.report().await?, star_id)
    }

    pub async fn fleet(&self, fleet_id: u64) -> Result<Fleet> {
        Fleet::from_report(self.clone(), self.report().await?, fleet_id)
    }

    /// Every player, by index `0..n`.
    pub async fn players(&self) -> Result<Vec<Player>> {
        let report = self.report().await?;
        (0..report.collection_len("players") as u64)
            .map(|index| Player::from_report(self.clone(), Arc::clone(&report), index))
            .collect()
    }

    /// Every star, by id `0..n`.
    pub async fn stars(&self) -> Result<Vec<Star>> {
        let report = self.report().await?;
        (0..report.collection_len("stars") as u64)
            .map(|star_id| Star::from_report(self.clone(), Arc::clone(&report), star_id))
            .collect()
    }

    /// Fleets currently visible to the requesting player.
    ///
    /// Keyed by fleet id; the ids are sparse.
    pub async fn fleets(&self) -> Result<Fleets> {
        let report = self.report().await?;
        let by_id = report
            .ids("fleets")
            .into_iter()
            .map(|fleet_id| {
                Fleet::from_report(self.clone(), Arc::clone(&report), fleet_id)
                    .map(|fleet| (fleet_id, fleet))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Fleets { by_id })
    }
}

impl fmt::Debug for Galaxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Galaxy")
            .field("game_number", &self.inner.game_number)
            .field("credentials", &self.inner.credentials)
            .field("generation", &self.generation())
            .finish()
    }
}

fn millis(report: &Report, name: &str) -> Result<i64> {
    let value = report
        .get(name)
        .ok_or_else(|| Error::field_not_found("Galaxy", name))?;
    crate::report::as_i64(value)
        .ok_or_else(|| Error::invalid_field("Galaxy", name, "not epoch milliseconds"))
}

fn seconds(report: &Report, name: &str) -> Result<f64> {
    Ok(millis(report, name)? as f64 / 1000.0)
}

fn timestamp(report: &Report, name: &str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis(report, name)?)
        .ok_or_else(|| Error::invalid_field("Galaxy", name, "timestamp out of range"))
}

/// Only the number 1 counts; numeric strings and other values do not.
fn turn_based(report: &Report) -> bool {
    matches!(report.get("turn_based"), Some(Value::Number(n)) if n.as_f64() == Some(1.0))
}

/// Visible fleets keyed by fleet id.
#[derive(Debug, Clone, Default)]
pub struct Fleets {
    by_id: BTreeMap<u64, Fleet>,
}

impl Fleets {
    /// Look up a visible fleet; an id that is not visible is an error.
    pub fn get(&self, fleet_id: u64) -> Result<&Fleet> {
        self.by_id.get(&fleet_id).ok_or(Error::NotFound {
            kind: "Fleet",
            id: fleet_id,
        })
    }

    pub fn contains(&self, fleet_id: u64) -> bool {
        self.by_id.contains_key(&fleet_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.by_id.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &Fleet)> {
        self.by_id.iter().map(|(id, fleet)| (*id, fleet))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl IntoIterator for Fleets {
    type Item = (u64, Fleet);
    type IntoIter = std::collections::btree_map::IntoIter<u64, Fleet>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_id.into_iter()
    }
}
