use geo_types::{coord, LineString, Rect};
use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

/// A path as returned by a routing service. Geometry is in `(longitude, latitude)` order.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteCandidate {
    pub geometry: LineString<f64>,
    pub distance: f64,
    pub duration: f64,
}

/// A driving path in `(latitude, longitude)` order, ready to be drawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    pub points: Vec<Coordinates>,
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
}

impl RoutePath {
    pub fn new(points: Vec<Coordinates>, distance: f64, duration: f64) -> Self {
        Self {
            points,
            distance,
            duration,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        let first = self.points.first()?;

        let (min, max) = self.points.iter().fold(
            ((first.longitude, first.latitude), (first.longitude, first.latitude)),
            |((min_x, min_y), (max_x, max_y)), p| {
                (
                    (min_x.min(p.longitude), min_y.min(p.latitude)),
                    (max_x.max(p.longitude), max_y.max(p.latitude)),
                )
            },
        );

        Some(Rect::new(
            coord! { x: min.0, y: min.1 },
            coord! { x: max.0, y: max.1 },
        ))
    }
}

impl From<&RouteCandidate> for RoutePath {
    fn from(candidate: &RouteCandidate) -> Self {
        let points = candidate
            .geometry
            .coords()
            .map(|c| Coordinates::from(*c))
            .collect();

        Self::new(points, candidate.distance, candidate.duration)
    }
}

#[test]
fn candidate_geometry_is_flipped_to_lat_lon() {
    let candidate = RouteCandidate {
        geometry: LineString::from(vec![(77.2090, 28.6139), (77.2295, 28.6129)]),
        distance: 2400.0,
        duration: 300.0,
    };

    let path = RoutePath::from(&candidate);

    assert_eq!(path.points[0], Coordinates::new(28.6139, 77.2090));
    assert_eq!(path.points[1], Coordinates::new(28.6129, 77.2295));
    assert_eq!(path.distance, 2400.0);
}

#[test]
fn bounds_cover_every_point() {
    let path = RoutePath::new(
        vec![
            Coordinates::new(28.60, 77.20),
            Coordinates::new(28.65, 77.10),
            Coordinates::new(28.55, 77.30),
        ],
        0.0,
        0.0,
    );

    let bounds = path.bounds().unwrap();
    assert_eq!(bounds.min(), coord! { x: 77.10, y: 28.55 });
    assert_eq!(bounds.max(), coord! { x: 77.30, y: 28.65 });

    assert!(RoutePath::new(vec![], 0.0, 0.0).bounds().is_none());
}
