//! Star - a star system in the report.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{expect_integer, expect_string, player_index, HasData, Origin, Player, View};
use crate::error::Result;
use crate::galaxy::Galaxy;
use crate::report::Report;

/// Owner index the server uses for unowned stars.
const UNOWNED: i64 = -1;

/// Distance covered without any range upgrades.
const BASE_RANGE: i64 = 3;

const STAR_ALIASES: &[(&str, &str)] = &[
    ("owner", "player"),
    ("name", "n"),
    ("star_id", "uid"),
    ("economy", "e"),
    ("carriers", "c"),
    ("garrison", "g"),
    ("industry", "i"),
    ("resources", "r"),
    ("natural_resources", "nr"),
    ("natural", "nr"),
    ("science", "s"),
    ("ships", "st"),
];

#[derive(Debug, Clone)]
pub struct Star {
    star_id: u64,
    view: View,
}

impl Star {
    pub(crate) fn from_report(galaxy: Galaxy, report: Arc<Report>, star_id: u64) -> Result<Self> {
        Ok(Self {
            star_id,
            view: View::new(galaxy, report, "stars", Self::KIND, star_id)?,
        })
    }

    /// Build a single star, fetching through a private galaxy if needed.
    pub async fn load(star_id: u64, origin: Origin) -> Result<Self> {
        let (galaxy, report) = origin.resolve().await?;
        Self::from_report(galaxy, report, star_id)
    }

    pub fn star_id(&self) -> u64 {
        self.star_id
    }

    pub fn galaxy(&self) -> &Galaxy {
        self.view.galaxy()
    }

    /// Generation of the report this star was read from.
    pub fn generation(&self) -> u64 {
        self.view.report().generation()
    }

    pub fn is_stale(&self) -> bool {
        self.view.is_stale()
    }

    /// Owning player, or `None` for an unowned star.
    pub fn player(&self) -> Result<Option<Player>> {
        let puid = self.view.integer(Self::KIND, "puid")?;
        if puid == UNOWNED {
            return Ok(None);
        }
        let index = player_index(Self::KIND, "puid", puid)?;
        Player::from_report(self.galaxy().clone(), Arc::clone(self.view.report()), index).map(Some)
    }

    pub fn visible(&self) -> bool {
        matches!(self.view.data().get("v"), Some(Value::String(v)) if v == "1")
    }

    pub fn x(&self) -> Result<f64> {
        self.view.float(Self::KIND, "x")
    }

    pub fn y(&self) -> Result<f64> {
        self.view.float(Self::KIND, "y")
    }

    pub fn name(&self) -> Result<String> {
        expect_string(Self::KIND, "name", self.field("name")?)
    }

    pub fn ships(&self) -> Result<i64> {
        self.integer_field("ships")
    }

    pub fn economy(&self) -> Result<i64> {
        self.integer_field("economy")
    }

    pub fn industry(&self) -> Result<i64> {
        self.integer_field("industry")
    }

    pub fn science(&self) -> Result<i64> {
        self.integer_field("science")
    }

    pub fn garrison(&self) -> Result<i64> {
        self.integer_field("garrison")
    }

    pub fn carriers(&self) -> Result<i64> {
        self.integer_field("carriers")
    }

    pub fn resources(&self) -> Result<i64> {
        self.integer_field("resources")
    }

    pub fn natural_resources(&self) -> Result<i64> {
        self.integer_field("natural_resources")
    }

    fn integer_field(&self, name: &str) -> Result<i64> {
        expect_integer(Self::KIND, name, self.field(name)?)
    }

    /// Straight-line distance to another star.
    pub fn distance(&self, other: &Star) -> Result<f64> {
        let dx = self.x()? - other.x()?;
        let dy = self.y()? - other.y()?;
        Ok(dx.hypot(dy))
    }

    /// Minimum range level needed to travel to another star.
    pub fn range_level(&self, other: &Star) -> Result<i64> {
        Ok(range_level(self.distance(other)?))
    }
}

/// Range level for a distance: `ceil(distance) - 3`, never below 1.
pub fn range_level(distance: f64) -> i64 {
    (distance.ceil() as i64 - BASE_RANGE).max(1)
}

impl HasData for Star {
    const KIND: &'static str = "Star";
    const ALIASES: &'static [(&'static str, &'static str)] = STAR_ALIASES;

    fn data(&self) -> &Map<String, Value> {
        self.view.data()
    }

    fn accessor(&self, name: &str) -> Option<Result<Value>> {
        let value = match name {
            "player" => self
                .player()
                .map(|owner| owner.map_or(Value::Null, |p| Value::from(p.index()))),
            "visible" => Ok(Value::Bool(self.visible())),
            "x" => self.x().map(Value::from),
            "y" => self.y().map(Value::from),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_level_subtracts_base_range_after_ceiling() {
        assert_eq!(range_level(5.0), 2);
        assert_eq!(range_level(5.1), 3);
        assert_eq!(range_level(10.0), 7);
    }

    #[test]
    fn range_level_never_drops_below_one() {
        assert_eq!(range_level(2.0_f64.sqrt()), 1);
        assert_eq!(range_level(0.0), 1);
        assert_eq!(range_level(4.0), 1);
    }
}
