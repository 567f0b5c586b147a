//! Entities - stars, fleets and players viewed through a report snapshot.

mod fleet;
mod player;
mod star;

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::galaxy::Galaxy;
use crate::report::{as_f64, as_i64, Report};
use crate::transport::{Credentials, Transport};

pub use fleet::Fleet;
pub use player::Player;
pub use star::{range_level, Star};

/// Field lookup shared by every entity.
///
/// Resolution order is fixed: a computed accessor, then the alias table
/// (recursively, so an alias may name an accessor), then the raw data.
pub trait HasData {
    /// Entity name used in error messages.
    const KIND: &'static str;

    /// `(alias, canonical)` pairs.
    const ALIASES: &'static [(&'static str, &'static str)];

    /// This entity's slice of the report.
    fn data(&self) -> &Map<String, Value>;

    /// Computed field, or `None` when `name` is not an accessor.
    fn accessor(&self, name: &str) -> Option<Result<Value>>;

    fn field(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.accessor(name) {
            return value;
        }
        if let Some(canonical) = alias_target(Self::ALIASES, name) {
            return self.field(canonical);
        }
        self.data()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::field_not_found(Self::KIND, name))
    }

    /// Raw data value, skipping accessors and aliases.
    fn raw(&self, name: &str) -> Result<&Value> {
        self.data()
            .get(name)
            .ok_or_else(|| Error::field_not_found(Self::KIND, name))
    }
}

fn alias_target(
    aliases: &'static [(&'static str, &'static str)],
    name: &str,
) -> Option<&'static str> {
    aliases
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
}

/// The snapshot an entity was built from.
#[derive(Debug, Clone)]
pub(crate) struct View {
    galaxy: Galaxy,
    report: Arc<Report>,
    data: Map<String, Value>,
}

impl View {
    pub(crate) fn new(
        galaxy: Galaxy,
        report: Arc<Report>,
        collection: &str,
        kind: &'static str,
        id: u64,
    ) -> Result<Self> {
        let data = report
            .entry(collection, id)
            .cloned()
            .ok_or(Error::NotFound { kind, id })?;
        Ok(Self { galaxy, report, data })
    }

    pub(crate) fn galaxy(&self) -> &Galaxy {
        &self.galaxy
    }

    pub(crate) fn report(&self) -> &Arc<Report> {
        &self.report
    }

    pub(crate) fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub(crate) fn is_stale(&self) -> bool {
        self.galaxy.generation() > self.report.generation()
    }

    fn value(&self, kind: &'static str, name: &str) -> Result<&Value> {
        self.data.get(name).ok_or_else(|| Error::field_not_found(kind, name))
    }

    pub(crate) fn float(&self, kind: &'static str, name: &str) -> Result<f64> {
        let value = self.value(kind, name)?;
        as_f64(value).ok_or_else(|| {
            Error::invalid_field(kind, name, format!("expected a number, got {}", value))
        })
    }

    pub(crate) fn integer(&self, kind: &'static str, name: &str) -> Result<i64> {
        let value = self.value(kind, name)?;
        as_i64(value).ok_or_else(|| {
            Error::invalid_field(kind, name, format!("expected an integer, got {}", value))
        })
    }
}

pub(crate) fn expect_integer(kind: &'static str, name: &str, value: Value) -> Result<i64> {
    as_i64(&value).ok_or_else(|| {
        Error::invalid_field(kind, name, format!("expected an integer, got {}", value))
    })
}

pub(crate) fn expect_string(kind: &'static str, name: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(Error::invalid_field(kind, name, format!("expected a string, got {}", other))),
    }
}

pub(crate) fn player_index(kind: &'static str, name: &str, raw: i64) -> Result<u64> {
    u64::try_from(raw)
        .map_err(|_| Error::invalid_field(kind, name, format!("{} is not a player index", raw)))
}

/// Where a standalone entity gets its galaxy from.
///
/// Either an existing [`Galaxy`], or a game number plus credentials from
/// which a private galaxy is built; that private galaxy fetches its own
/// report.
#[derive(Clone, Default)]
pub struct Origin {
    galaxy: Option<Galaxy>,
    game_number: Option<u64>,
    credentials: Option<Credentials>,
    config: Option<ClientConfig>,
    transport: Option<Arc<dyn Transport>>,
}

impl Origin {
    pub fn galaxy(galaxy: &Galaxy) -> Self {
        Self::default().with_galaxy(galaxy)
    }

    pub fn credentials(game_number: u64, credentials: Credentials) -> Self {
        Self::default()
            .with_game_number(game_number)
            .with_credentials(credentials)
    }

    pub fn with_galaxy(mut self, galaxy: &Galaxy) -> Self {
        self.galaxy = Some(galaxy.clone());
        self
    }

    pub fn with_game_number(mut self, game_number: u64) -> Self {
        self.game_number = Some(game_number);
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Configuration for the private galaxy's HTTP transport.
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Transport for the private galaxy, replacing HTTP.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Resolve to a galaxy without touching the network.
    pub fn into_galaxy(self) -> Result<Galaxy> {
        if let Some(galaxy) = self.galaxy {
            return Ok(galaxy);
        }

        let (Some(game_number), Some(credentials)) = (self.game_number, self.credentials) else {
            return Err(Error::MissingArguments);
        };

        tracing::debug!(game_number, "Building private galaxy");

        match self.transport {
            Some(transport) => Ok(Galaxy::new(game_number, credentials, transport)),
            None => Galaxy::connect(game_number, credentials, &self.config.unwrap_or_default()),
        }
    }

    /// Resolve the galaxy and its current report.
    pub(crate) async fn resolve(self) -> Result<(Galaxy, Arc<Report>)> {
        let galaxy = self.into_galaxy()?;
        let report = galaxy.report().await?;
        Ok((galaxy, report))
    }
}
