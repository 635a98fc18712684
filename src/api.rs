use async_trait::async_trait;
use geo_types::Rect;
use std::sync::Arc;

use crate::entities::{Coordinates, Marker, OverlayId, Padding, Polyline, RouteCandidate, TileLayer};
use crate::error::Error;
use crate::platform::sensor::PositionSubscription;

/// Resolves free-text addresses to coordinates, best candidate first.
#[async_trait]
pub trait Geocoder {
    async fn search(&self, query: &str) -> Result<Vec<Coordinates>, Error>;
}

#[async_trait]
pub trait RoutePlanner {
    async fn find_routes(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Vec<RouteCandidate>, Error>;
}

#[async_trait]
pub trait PositionSensor {
    async fn current_position(&self) -> Result<Coordinates, Error>;

    /// Starts a stream of readings that runs until the subscription is cancelled.
    fn watch(&self) -> Result<PositionSubscription, Error>;
}

pub trait MapSurface: Send {
    fn set_view(&mut self, center: Coordinates, zoom: u8);
    fn pan_to(&mut self, center: Coordinates);
    fn fit_bounds(&mut self, bounds: Rect<f64>, padding: Padding);
    fn add_tile_layer(&mut self, layer: TileLayer);
    fn add_marker(&mut self, marker: Marker) -> OverlayId;
    fn move_marker(&mut self, id: OverlayId, position: Coordinates);
    fn add_polyline(&mut self, polyline: Polyline) -> OverlayId;
    fn remove_overlay(&mut self, id: OverlayId);
    fn dispose(&mut self);
}

pub trait MapHost {
    fn create_surface(&self, container: &str) -> Result<Box<dyn MapSurface>, Error>;
}

pub trait Notifier {
    fn notify(&self, notice: &Error);
}

pub type DynGeocoder = Arc<dyn Geocoder + Send + Sync>;
pub type DynRoutePlanner = Arc<dyn RoutePlanner + Send + Sync>;
pub type DynPositionSensor = Arc<dyn PositionSensor + Send + Sync>;
pub type DynMapHost = Arc<dyn MapHost + Send + Sync>;
pub type DynNotifier = Arc<dyn Notifier + Send + Sync>;
