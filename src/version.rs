//! Docker engine version information and API version negotiation.

use std::fmt;
use std::str::FromStr;

use crate::errors::*;

/// The newest engine API version this client knows how to speak.
pub const MAX_API_VERSION: ApiVersion = ApiVersion { major: 1, minor: 43 };

/// The response to `GET /version`.
#[derive(Debug, Clone, Deserialize)]
#[allow(non_snake_case)]
pub struct Version {
    pub Version: String,
    pub ApiVersion: String,
    #[serde(default)]
    pub MinAPIVersion: Option<String>,
}

/// A `major.minor` engine API version, as used in `/v1.43/...` URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    /// Pick the version to use with a daemon that supports up to `server`.
    pub fn negotiate(server: ApiVersion) -> ApiVersion {
        server.min(MAX_API_VERSION)
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<ApiVersion> {
        let mkerr = || Error::from(ErrorKind::InvalidApiVersion(s.to_owned()));
        let trimmed = s.trim().trim_start_matches('v');
        let mut parts = trimmed.splitn(2, '.');
        let major = parts.next().and_then(|p| p.parse().ok()).ok_or_else(mkerr)?;
        let minor = parts.next().and_then(|p| p.parse().ok()).ok_or_else(mkerr)?;
        Ok(ApiVersion { major, minor })
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
