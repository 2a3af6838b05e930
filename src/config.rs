//! Connection settings for the Docker daemon.
//!
//! These are read from the environment exactly once, by the binary, and then
//! handed to [`Docker::connect`](crate::Docker::connect). Nothing else in the
//! crate looks at the process environment.

use std::env;
use std::path::PathBuf;

use crate::errors::*;

/// The default `DOCKER_HOST` address that we will try to connect to.
#[cfg(unix)]
pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";

/// The default `DOCKER_HOST` address that we will try to connect to.
///
/// This should technically be `"npipe:////./pipe/docker_engine"` on
/// Windows, but we don't support Windows pipes.  However, the TCP port
/// is still available.
#[cfg(windows)]
pub const DEFAULT_DOCKER_HOST: &str = "tcp://localhost:2375";

/// Everything we need to know to reach the Docker daemon.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// A `unix://` or `tcp://` address.
    pub host: String,
    /// Use TLS (and client certificates) for `tcp://` hosts.
    pub tls_verify: bool,
    /// Directory holding `ca.pem`, `cert.pem` and `key.pem`.
    pub cert_path: Option<PathBuf>,
    /// A pinned API version such as `"1.41"`. When `None`, we negotiate.
    pub api_version: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            host: DEFAULT_DOCKER_HOST.to_owned(),
            tls_verify: false,
            cert_path: None,
            api_version: None,
        }
    }
}

impl EngineConfig {
    /// Read `DOCKER_HOST`, `DOCKER_TLS_VERIFY`, `DOCKER_CERT_PATH`,
    /// `DOCKER_CONFIG` and `DOCKER_API_VERSION`, interpreting them as much
    /// like the standard `docker` client as possible.
    pub fn from_env() -> EngineConfig {
        EngineConfig::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration using `lookup` to fetch variables.
    pub fn from_lookup<F>(lookup: F) -> EngineConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());
        EngineConfig {
            host: non_empty("DOCKER_HOST").unwrap_or_else(|| DEFAULT_DOCKER_HOST.to_owned()),
            tls_verify: lookup("DOCKER_TLS_VERIFY").is_some(),
            cert_path: non_empty("DOCKER_CERT_PATH")
                .or_else(|| non_empty("DOCKER_CONFIG"))
                .map(PathBuf::from),
            api_version: non_empty("DOCKER_API_VERSION"),
        }
    }

    /// Replace the host, e.g. from a command-line flag.
    pub fn with_host<S: Into<String>>(mut self, host: S) -> EngineConfig {
        self.host = host.into();
        self
    }

    /// The directory in which to look for our certificate files, falling
    /// back to `~/.docker`.
    pub fn cert_dir(&self) -> Result<PathBuf> {
        match self.cert_path {
            Some(ref path) => Ok(path.clone()),
            None => {
                let home = dirs::home_dir().ok_or(ErrorKind::NoCertPath)?;
                Ok(home.join(".docker"))
            }
        }
    }
}
