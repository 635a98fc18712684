use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::entities::{SafetyScore, TripDetails};

const DIRECTIONS_BASE: &str = "https://www.google.com/maps/dir/?api=1";
const SHARE_TITLE: &str = "SafeRoute: Journey details";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShareLink {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl ShareLink {
    pub fn build(trip: &TripDetails, score: Option<SafetyScore>) -> Option<Self> {
        let origin = trip.addresses.origin.as_str();
        let destination = trip.addresses.destination.as_str();

        if origin.is_empty() || destination.is_empty() {
            return None;
        }

        let date = trip.date.map(|d| d.format("%Y-%m-%d").to_string());
        let time = trip.time.map(|t| t.format("%H:%M").to_string());

        let mut url = Url::parse(DIRECTIONS_BASE).ok()?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("origin", origin)
                .append_pair("destination", destination)
                .append_pair("travelmode", "driving");

            if let Some(date) = &date {
                query.append_pair("date", date);
            }
            if let Some(time) = &time {
                query.append_pair("time", time);
            }
            if let Some(score) = score {
                query.append_pair("safety", &score.value().to_string());
            }
        }

        let mut text = format!("Route: {} → {}", origin, destination);
        if let Some(score) = score {
            text.push_str(&format!("\nSafety Score: {}", score));
        }
        if let Some(date) = &date {
            text.push_str(&format!("\nDate: {}", date));
        }
        if let Some(time) = &time {
            text.push_str(&format!("\nTime: {}", time));
        }

        Some(Self {
            title: SHARE_TITLE.into(),
            text,
            url: url.into(),
        })
    }

    pub fn clipboard_text(&self) -> String {
        format!("{}\n{}\n\nOpen directions: {}", self.title, self.text, self.url)
    }
}

#[test]
fn share_link_requires_both_addresses() {
    let trip = TripDetails::new("Lajpat Nagar", "");
    assert!(ShareLink::build(&trip, None).is_none());
}

#[test]
fn share_link_carries_trip_context() {
    use chrono::{NaiveDate, NaiveTime};

    let trip = TripDetails::new("Lajpat Nagar", "Khan Market")
        .on(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap())
        .at(NaiveTime::from_hms_opt(21, 30, 0).unwrap());
    let score = SafetyScore::new(7).unwrap();

    let link = ShareLink::build(&trip, Some(score)).unwrap();

    assert_eq!(
        link.url,
        "https://www.google.com/maps/dir/?api=1&origin=Lajpat+Nagar&destination=Khan+Market&travelmode=driving&date=2024-03-08&time=21%3A30&safety=7"
    );
    assert_eq!(
        link.text,
        "Route: Lajpat Nagar → Khan Market\nSafety Score: 7/10\nDate: 2024-03-08\nTime: 21:30"
    );
    assert!(link
        .clipboard_text()
        .starts_with("SafeRoute: Journey details\nRoute: Lajpat Nagar"));
}
