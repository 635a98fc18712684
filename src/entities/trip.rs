use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::entities::AddressPair;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Urban,
    Suburban,
    Rural,
    Highway,
}

impl Default for LocationType {
    fn default() -> Self {
        Self::Urban
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripDetails {
    pub addresses: AddressPair,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub location_type: LocationType,
}

impl TripDetails {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            addresses: AddressPair::new(origin, destination),
            date: None,
            time: None,
            location_type: LocationType::default(),
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn at(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[test]
fn location_type_deserializes_from_form_value() {
    let trip: TripDetails = serde_json::from_value(serde_json::json!({
        "addresses": { "origin": "Saket", "destination": "Hauz Khas" },
        "date": "2024-03-08",
        "time": "21:30:00",
        "location_type": "suburban",
    }))
    .unwrap();

    assert_eq!(trip.location_type, LocationType::Suburban);
    assert_eq!(trip.date, NaiveDate::from_ymd_opt(2024, 3, 8));
}
