//! # Origin
//!
//! The scheme+host+port identity of a requesting page. Every capability
//! check keys on `Origin`, never on a tab, so grants survive reloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Errors from origin parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OriginError {
    /// Input was empty.
    #[error("empty origin")]
    Empty,

    /// Not an absolute URL.
    #[error("invalid origin {input}: {reason}")]
    Invalid { input: String, reason: url::ParseError },

    /// Opaque origins (`null`, `data:`, `file:`) cannot hold grants.
    #[error("opaque origin {0}")]
    Opaque(String),
}

/// Normalized page origin, e.g. `https://dapp.example` or `http://localhost:3000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Origin(String);

impl Origin {
    /// Parse an origin, or derive one from a full URL.
    ///
    /// Follows WHATWG URL parsing: the host is decoded and lowercased,
    /// default ports are dropped, and userinfo, path, query and fragment
    /// are discarded.
    pub fn parse(input: &str) -> Result<Self, OriginError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(OriginError::Empty);
        }
        if input == "null" {
            return Err(OriginError::Opaque(input.to_string()));
        }

        let url = Url::parse(input).map_err(|reason| OriginError::Invalid {
            input: input.to_string(),
            reason,
        })?;
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(OriginError::Opaque(input.to_string()));
        }
        Ok(Self(origin.ascii_serialization()))
    }

    /// The normalized origin string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Origin {
    type Error = OriginError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Origin> for String {
    fn from(origin: Origin) -> Self {
        origin.0
    }
}

impl std::str::FromStr for Origin {
    type Err = OriginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
