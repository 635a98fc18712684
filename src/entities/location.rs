use geo_types::{coord, Coord};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn lon_lat(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

impl From<Coord<f64>> for Coordinates {
    fn from(c: Coord<f64>) -> Self {
        Self {
            latitude: c.y,
            longitude: c.x,
        }
    }
}

impl From<Coordinates> for Coord<f64> {
    fn from(c: Coordinates) -> Self {
        coord! { x: c.longitude, y: c.latitude }
    }
}

#[test]
fn geo_coord_uses_longitude_as_x() {
    let delhi = Coordinates::new(28.6139, 77.2090);
    let c: Coord<f64> = delhi.into();

    assert_eq!(c.x, 77.2090);
    assert_eq!(c.y, 28.6139);
    assert_eq!(Coordinates::from(c), delhi);
    assert_eq!(delhi.lon_lat(), "77.209,28.6139");
}
