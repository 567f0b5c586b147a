//! Neptune Core - typed views over a full universe report
//!
//! This crate fetches a game's full universe report once, keeps it as an
//! immutable snapshot, and exposes its players, stars and fleets as
//! entities with friendly field names instead of raw nested JSON.

pub mod config;
pub mod entity;
pub mod error;
pub mod galaxy;
pub mod report;
pub mod transport;

pub use config::ClientConfig;
pub use entity::{range_level, Fleet, HasData, Origin, Player, Star};
pub use error::{Error, Result};
pub use galaxy::{Fleets, Galaxy, GameState};
pub use report::Report;
pub use transport::{Credentials, HttpTransport, Transport};
