use std::env;
use std::fmt::Debug;

use crate::entities::Side;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Error {
    pub fn is_user_facing(&self) -> bool {
        self.code >= 100
    }
}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

pub fn invalid_state_error() -> Error {
    Error {
        code: 100,
        message: "invalid state".into(),
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
    }
}

pub fn address_not_found_error(side: Side) -> Error {
    let code = match side {
        Side::Origin => 102,
        Side::Destination => 103,
    };

    Error {
        code,
        message: format!(
            "{} address not found. Try a more specific address.",
            side.label()
        ),
    }
}

pub fn route_not_found_error() -> Error {
    Error {
        code: 104,
        message: "No route found for the provided addresses.".into(),
    }
}

pub fn sensing_unavailable_error() -> Error {
    Error {
        code: 105,
        message: "position sensing unavailable".into(),
    }
}

pub fn container_unavailable_error(container: &str) -> Error {
    Error {
        code: 106,
        message: format!("map container {:?} unavailable", container),
    }
}

pub fn env_var_error(err: env::VarError) -> Error {
    Error {
        code: 1,
        message: format!("environment variable error: {}", err),
    }
}

pub fn config_error<T: Debug>(value: T) -> Error {
    Error {
        code: 2,
        message: format!("invalid configuration value: {:?}", value),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    tracing::debug!("reqwest error: {:?}", err);

    Error {
        code: 3,
        message: "network error".into(),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: 4,
        message: "upstream error".into(),
    }
}

#[test]
fn address_not_found_names_side() {
    let origin = address_not_found_error(Side::Origin);
    let destination = address_not_found_error(Side::Destination);

    assert_ne!(origin.code, destination.code);
    assert!(origin.message.starts_with("Start address not found"));
    assert!(destination.message.starts_with("Destination address not found"));
    assert!(origin.is_user_facing());
}

#[test]
fn internal_errors_are_not_user_facing() {
    assert!(!upstream_error().is_user_facing());
    assert!(!env_var_error(env::VarError::NotPresent).is_user_facing());
    assert_eq!(
        route_not_found_error().to_string(),
        "No route found for the provided addresses. (code 104)"
    );
}
