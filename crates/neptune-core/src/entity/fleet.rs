//! Fleet - a carrier visible in the report.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{expect_integer, expect_string, player_index, HasData, Origin, Player, Star, View};
use crate::error::{Error, Result};
use crate::galaxy::Galaxy;
use crate::report::{as_i64, Report};

const FLEET_ALIASES: &[(&str, &str)] = &[
    ("owner", "player"),
    ("name", "n"),
    ("ships", "st"),
    ("fleet_id", "uid"),
];

#[derive(Debug, Clone)]
pub struct Fleet {
    fleet_id: u64,
    view: View,
}

impl Fleet {
    pub(crate) fn from_report(galaxy: Galaxy, report: Arc<Report>, fleet_id: u64) -> Result<Self> {
        Ok(Self {
            fleet_id,
            view: View::new(galaxy, report, "fleets", Self::KIND, fleet_id)?,
        })
    }

    /// Build a single fleet, fetching through a private galaxy if needed.
    ///
    /// Fails with `NotFound` when the fleet is not currently visible.
    pub async fn load(fleet_id: u64, origin: Origin) -> Result<Self> {
        let (galaxy, report) = origin.resolve().await?;
        Self::from_report(galaxy, report, fleet_id)
    }

    pub fn fleet_id(&self) -> u64 {
        self.fleet_id
    }

    pub fn galaxy(&self) -> &Galaxy {
        self.view.galaxy()
    }

    pub fn generation(&self) -> u64 {
        self.view.report().generation()
    }

    pub fn is_stale(&self) -> bool {
        self.view.is_stale()
    }

    pub fn player(&self) -> Result<Player> {
        let puid = self.view.integer(Self::KIND, "puid")?;
        let index = player_index(Self::KIND, "puid", puid)?;
        Player::from_report(self.galaxy().clone(), Arc::clone(self.view.report()), index)
    }

    /// Star ids of the fleet's orders, in travel order.
    pub fn waypoint_ids(&self) -> Result<Vec<u64>> {
        let Value::Array(path) = self.raw("p")? else {
            return Err(Error::invalid_field(Self::KIND, "p", "expected a list of star ids"));
        };
        path.iter()
            .map(|star| {
                as_i64(star)
                    .and_then(|id| u64::try_from(id).ok())
                    .ok_or_else(|| {
                        Error::invalid_field(Self::KIND, "p", format!("{} is not a star id", star))
                    })
            })
            .collect()
    }

    /// Waypoint stars, read from the same snapshot as this fleet.
    pub fn waypoints(&self) -> Result<Vec<Star>> {
        self.waypoint_ids()?
            .into_iter()
            .map(|star_id| {
                Star::from_report(self.galaxy().clone(), Arc::clone(self.view.report()), star_id)
            })
            .collect()
    }

    pub fn x(&self) -> Result<f64> {
        self.view.float(Self::KIND, "x")
    }

    pub fn y(&self) -> Result<f64> {
        self.view.float(Self::KIND, "y")
    }

    /// Position at the previous tick.
    pub fn lx(&self) -> Result<f64> {
        self.view.float(Self::KIND, "lx")
    }

    pub fn ly(&self) -> Result<f64> {
        self.view.float(Self::KIND, "ly")
    }

    pub fn name(&self) -> Result<String> {
        expect_string(Self::KIND, "name", self.field("name")?)
    }

    pub fn ships(&self) -> Result<i64> {
        expect_integer(Self::KIND, "ships", self.field("ships")?)
    }
}

impl HasData for Fleet {
    const KIND: &'static str = "Fleet";
    const ALIASES: &'static [(&'static str, &'static str)] = FLEET_ALIASES;

    fn data(&self) -> &Map<String, Value> {
        self.view.data()
    }

    fn accessor(&self, name: &str) -> Option<Result<Value>> {
        let value = match name {
            "player" => self.player().map(|p| Value::from(p.index())),
            "waypoints" => self
                .waypoint_ids()
                .map(|ids| Value::Array(ids.into_iter().map(Value::from).collect())),
            "x" => self.x().map(Value::from),
            "y" => self.y().map(Value::from),
            "lx" => self.lx().map(Value::from),
            "ly" => self.ly().map(Value::from),
            _ => return None,
        };
        Some(value)
    }
}
