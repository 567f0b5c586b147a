//! Transport - the request collaborator the galaxy fetches reports through.

mod http;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub use http::{decode_envelope, HttpTransport};

/// Endpoint that carries game orders.
pub const ORDER_ENDPOINT: &str = "order";

/// Order that returns the whole visible game state.
pub const FULL_UNIVERSE_REPORT: &str = "full_universe_report";

/// Session cookies presented to the game server.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials {
    cookies: BTreeMap<String, String>,
}

impl Credentials {
    pub fn from_cookies(cookies: BTreeMap<String, String>) -> Self {
        Self { cookies }
    }

    /// Add or replace a single cookie
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Render as a `Cookie` header value
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// Cookie values are secrets; only names are printed.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cookies", &self.cookies.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Sends a request to the game server and returns its decoded payload.
///
/// Implementations own retries, timeouts and session handling; callers
/// see a single attempt that either yields the payload or fails.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        credentials: &Credentials,
    ) -> Result<Value>;
}
