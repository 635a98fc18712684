use crate::entities::{Coordinates, Padding, PolylineStyle, TileLayer};

#[derive(Clone, Debug, PartialEq)]
pub struct ControllerOptions {
    pub default_center: Coordinates,
    pub default_zoom: u8,
    pub follow_zoom: u8,
    pub fit_padding: Padding,
    pub route_style: PolylineStyle,
    pub tile_layer: TileLayer,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            default_center: Coordinates::new(28.6139, 77.2090),
            default_zoom: 13,
            follow_zoom: 15,
            fit_padding: Padding::uniform(50),
            route_style: PolylineStyle::default(),
            tile_layer: TileLayer::default(),
        }
    }
}
