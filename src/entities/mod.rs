mod address;
pub mod emergency;
mod location;
mod overlay;
mod route;
mod safety;
pub mod share;
mod trip;

pub use address::{AddressPair, Side};
pub use emergency::EmergencyPanel;
pub use location::Coordinates;
pub use overlay::{Marker, OverlayId, Padding, Polyline, PolylineStyle, TileLayer};
pub use route::{RouteCandidate, RoutePath};
pub use safety::{Rating, SafetyReport, SafetyScore};
pub use share::ShareLink;
pub use trip::{LocationType, TripDetails};
