//! Error type shared by the galaxy, its entities and the transport.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("server rejected {endpoint}: {message}")]
    Api { endpoint: String, message: String },

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("{entity} has no field `{field}`")]
    FieldNotFound { entity: &'static str, field: String },

    #[error("{entity} field `{field}` is invalid: {reason}")]
    InvalidField {
        entity: &'static str,
        field: String,
        reason: String,
    },

    #[error("{kind} {id} not found in report")]
    NotFound { kind: &'static str, id: u64 },

    #[error("missing required arguments: a galaxy or both game_number and credentials")]
    MissingArguments,
}

impl Error {
    pub(crate) fn field_not_found(entity: &'static str, field: &str) -> Self {
        Self::FieldNotFound {
            entity,
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_field(
        entity: &'static str,
        field: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            entity,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures that came from talking to the server.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Status { .. }
                | Self::Api { .. }
                | Self::Decode(_)
                | Self::Malformed(_)
        )
    }
}
