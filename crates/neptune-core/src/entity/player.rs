//! Player - one seat in the game.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{HasData, Origin, View};
use crate::error::Result;
use crate::galaxy::Galaxy;
use crate::report::Report;

/// A player, identified by its index into the report's player list.
///
/// Only the index is interpreted; every other field is read straight
/// from the report.
#[derive(Debug, Clone)]
pub struct Player {
    index: u64,
    view: View,
}

impl Player {
    pub(crate) fn from_report(galaxy: Galaxy, report: Arc<Report>, index: u64) -> Result<Self> {
        Ok(Self {
            index,
            view: View::new(galaxy, report, "players", Self::KIND, index)?,
        })
    }

    /// Build a single player, fetching through a private galaxy if needed.
    pub async fn load(index: u64, origin: Origin) -> Result<Self> {
        let (galaxy, report) = origin.resolve().await?;
        Self::from_report(galaxy, report, index)
    }

    pub fn index(&self) -> u64 {
        self.index
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
}

impl PartialEq for Player {
    /// Same seat in the same snapshot.
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && Arc::ptr_eq(self.view.report(), other.view.report())
    }
}

impl HasData for Player {
    const KIND: &'static str = "Player";
    const ALIASES: &'static [(&'static str, &'static str)] = &[];

    fn data(&self) -> &Map<String, Value> {
        self.view.data()
    }

    fn accessor(&self, name: &str) -> Option<Result<Value>> {
        match name {
            "player_uid" => Some(Ok(Value::from(self.index))),
            _ => None,
        }
    }
}
