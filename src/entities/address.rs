use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Origin,
    Destination,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Origin => "Start",
            Self::Destination => "Destination",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origin => write!(f, "origin"),
            Self::Destination => write!(f, "destination"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressPair {
    pub origin: String,
    pub destination: String,
}

impl AddressPair {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }

    /// Both addresses trimmed, or `None` if either one is blank.
    pub fn trimmed(&self) -> Option<(&str, &str)> {
        let origin = self.origin.trim();
        let destination = self.destination.trim();

        if origin.is_empty() || destination.is_empty() {
            return None;
        }

        Some((origin, destination))
    }
}

#[test]
fn blank_side_has_no_trimmed_pair() {
    let pair = AddressPair::new("10 Downing Street, London", "   ");
    assert_eq!(pair.trimmed(), None);

    let pair = AddressPair::new("  Connaught Place ", "India Gate");
    assert_eq!(pair.trimmed(), Some(("Connaught Place", "India Gate")));
}
