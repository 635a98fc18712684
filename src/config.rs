use std::env::{self, VarError};
use std::time::Duration;

use crate::error::{config_error, Error};

const DEFAULT_GEOCODER_BASE: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_ROUTER_BASE: &str = "https://router.project-osrm.org";
const DEFAULT_USER_AGENT: &str = "SheSafe/1.0 (contact@example.com)";
const DEFAULT_REGION_HINT: &str = "India";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub geocoder_base: String,
    pub router_base: String,
    pub user_agent: String,
    /// Appended to every address query to disambiguate it.
    pub region_hint: Option<String>,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoder_base: DEFAULT_GEOCODER_BASE.into(),
            router_base: DEFAULT_ROUTER_BASE.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            region_hint: Some(DEFAULT_REGION_HINT.into()),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn env() -> Result<Self, Error> {
        let defaults = Self::default();

        let geocoder_base = optional_env("SAFEROUTE_GEOCODER_BASE")?
            .unwrap_or(defaults.geocoder_base);
        let router_base = optional_env("SAFEROUTE_ROUTER_BASE")?.unwrap_or(defaults.router_base);
        let user_agent = optional_env("SAFEROUTE_USER_AGENT")?.unwrap_or(defaults.user_agent);

        let region_hint = match optional_env("SAFEROUTE_REGION_HINT")? {
            Some(hint) if hint.trim().is_empty() => None,
            Some(hint) => Some(hint),
            None => defaults.region_hint,
        };

        let request_timeout = match optional_env("SAFEROUTE_REQUEST_TIMEOUT_SECS")? {
            Some(secs) => Duration::from_secs(secs.parse().map_err(|_| config_error(secs))?),
            None => defaults.request_timeout,
        };

        Ok(Self {
            geocoder_base,
            router_base,
            user_agent,
            region_hint,
            request_timeout,
        })
    }
}

fn optional_env(name: &str) -> Result<Option<String>, Error> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[test]
fn env_overrides_defaults() {
    env::set_var("SAFEROUTE_ROUTER_BASE", "http://localhost:5000");
    env::set_var("SAFEROUTE_REGION_HINT", "");
    env::set_var("SAFEROUTE_REQUEST_TIMEOUT_SECS", "3");

    let config = Config::env().unwrap();

    assert_eq!(config.router_base, "http://localhost:5000");
    assert_eq!(config.region_hint, None);
    assert_eq!(config.request_timeout, Duration::from_secs(3));
    assert_eq!(config.user_agent, DEFAULT_USER_AGENT);

    env::set_var("SAFEROUTE_REQUEST_TIMEOUT_SECS", "soon");
    assert_eq!(Config::env().unwrap_err().code, 2);

    env::remove_var("SAFEROUTE_ROUTER_BASE");
    env::remove_var("SAFEROUTE_REGION_HINT");
    env::remove_var("SAFEROUTE_REQUEST_TIMEOUT_SECS");
}
